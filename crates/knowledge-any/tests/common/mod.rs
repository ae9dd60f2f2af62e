// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared test adapters.

#![allow(dead_code)]

use knowledge_any::{AdapterError, ObjectAdapter};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed-layout point: three little-endian f64.
pub struct GeoPoint;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoPointBuilder {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Zero-copy view over the 24 stored bytes.
#[derive(Debug, Clone, Copy)]
pub struct GeoPointReader<'a> {
    bytes: &'a [u8; 24],
}

impl GeoPointReader<'_> {
    fn field(&self, index: usize) -> f64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[index * 8..index * 8 + 8]);
        f64::from_le_bytes(raw)
    }

    pub fn x(&self) -> f64 {
        self.field(0)
    }

    pub fn y(&self) -> f64 {
        self.field(1)
    }

    pub fn z(&self) -> f64 {
        self.field(2)
    }
}

impl ObjectAdapter for GeoPoint {
    type Builder = GeoPointBuilder;
    type Reader<'a> = GeoPointReader<'a>;
    const SCHEMA: &'static str = "test.geo.Point";

    fn build_bytes(builder: &GeoPointBuilder) -> Result<Vec<u8>, AdapterError> {
        let mut out = Vec::with_capacity(24);
        for v in [builder.x, builder.y, builder.z] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        Ok(out)
    }

    fn open_reader(bytes: &[u8]) -> Result<GeoPointReader<'_>, AdapterError> {
        let bytes: &[u8; 24] = bytes.try_into().map_err(|_| AdapterError::Truncated {
            need: 24,
            have: bytes.len(),
        })?;
        Ok(GeoPointReader { bytes })
    }
}

/// Variable-layout record: length-prefixed strings plus a phone list.
pub struct PersonBio;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonBioBuilder {
    pub name: String,
    pub email: String,
    pub birthdate: String,
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonBioReader<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub birthdate: &'a str,
    pub phones: Vec<&'a str>,
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

struct Cursor<'a> {
    bytes: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], AdapterError> {
        if n > self.bytes.len() {
            return Err(AdapterError::Truncated {
                need: n,
                have: self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn u32(&mut self) -> Result<u32, AdapterError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn str(&mut self) -> Result<&'a str, AdapterError> {
        let len = self.u32()? as usize;
        std::str::from_utf8(self.take(len)?)
            .map_err(|e| AdapterError::Malformed(format!("invalid UTF-8: {}", e)))
    }
}

impl ObjectAdapter for PersonBio {
    type Builder = PersonBioBuilder;
    type Reader<'a> = PersonBioReader<'a>;
    const SCHEMA: &'static str = "test.people.PersonBio";

    fn build_bytes(builder: &PersonBioBuilder) -> Result<Vec<u8>, AdapterError> {
        if builder.name.is_empty() {
            return Err(AdapterError::Incomplete("name is required".into()));
        }
        let mut out = Vec::new();
        put_str(&mut out, &builder.name);
        put_str(&mut out, &builder.email);
        put_str(&mut out, &builder.birthdate);
        out.extend_from_slice(&(builder.phones.len() as u32).to_le_bytes());
        for phone in &builder.phones {
            put_str(&mut out, phone);
        }
        Ok(out)
    }

    fn open_reader(bytes: &[u8]) -> Result<PersonBioReader<'_>, AdapterError> {
        let mut cursor = Cursor { bytes };
        let name = cursor.str()?;
        let email = cursor.str()?;
        let birthdate = cursor.str()?;
        let count = cursor.u32()? as usize;
        let mut phones = Vec::with_capacity(count.min(cursor.bytes.len() / 4));
        for _ in 0..count {
            phones.push(cursor.str()?);
        }
        if !cursor.bytes.is_empty() {
            return Err(AdapterError::Malformed(format!(
                "{} trailing bytes",
                cursor.bytes.len()
            )));
        }
        Ok(PersonBioReader {
            name,
            email,
            birthdate,
            phones,
        })
    }
}

pub fn sample_person() -> PersonBioBuilder {
    PersonBioBuilder {
        name: "Ada Lovelace".into(),
        email: "ada@example.org".into(),
        birthdate: "1815-12-10".into(),
        phones: vec!["+44 20 7946 0000".into(), "+44 20 7946 0001".into()],
    }
}
