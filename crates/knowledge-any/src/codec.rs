// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exchange form for `Any` values.
//!
//! Little-endian, CDR-style aligned layout:
//!
//! ```text
//! header : "KA", version u8, flags u8
//! tag    : string (u32 length incl. NUL, bytes, NUL); length 0 = untagged
//! value  : u8 discriminant + payload
//! ```
//!
//! Decoding resolves tag names and object adapters against a
//! [`TypeRegistry`], so both ends must agree on their registrations.

use crate::adapter::{AdapterId, ObjectPayload};
use crate::any::Any;
use crate::error::{AnyError, CodecError, Result};
use crate::kind::{FloatWidth, IntWidth, Kind};
use crate::registry::TypeRegistry;
use crate::value::{Mapping, Sequence, Value};
use std::collections::BTreeMap;

const MAGIC: &[u8; 2] = b"KA";
const VERSION: u8 = 1;
/// Containers nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 64;

const D_EMPTY: u8 = 0;
const D_INT: u8 = 1;
const D_UINT: u8 = 2;
const D_FLOAT: u8 = 3;
const D_CHAR: u8 = 4;
const D_STRING: u8 = 5;
const D_SEQ: u8 = 6;
const D_MAP: u8 = 7;
const D_OBJECT: u8 = 8;

/// Encode `any` (tag name and payload).
pub fn encode(any: &Any) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.buffer.extend_from_slice(MAGIC);
    encoder.buffer.push(VERSION);
    encoder.buffer.push(0);
    match any.tag_name() {
        Some(name) => encoder.write_string(name)?,
        None => encoder.write_u32(0),
    }
    encoder.encode_value(any.value())?;
    Ok(encoder.into_bytes())
}

/// Decode bytes produced by [`encode`], resolving names in `registry`.
pub fn decode(bytes: &[u8], registry: &TypeRegistry) -> Result<Any> {
    let result = Decoder::new(bytes, registry).decode_any();
    if let Err(e) = &result {
        log::warn!("[codec] rejected {} byte payload: {}", bytes.len(), e);
    }
    result
}

struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.buffer.len() % alignment)) % alignment;
        self.buffer.extend(std::iter::repeat_n(0, padding));
    }

    fn write_u32(&mut self, v: u32) {
        self.align(4);
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, n: usize) -> Result<()> {
        let n = u32::try_from(n)
            .map_err(|_| CodecError::InvalidData(format!("count {} exceeds u32", n)))?;
        self.write_u32(n);
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_count(s.len() + 1)?;
        self.buffer.extend_from_slice(s.as_bytes());
        self.buffer.push(0);
        Ok(())
    }

    fn write_wide(&mut self, bits: u8, raw: [u8; 8]) {
        self.buffer.push(bits);
        self.align(8);
        self.buffer.extend_from_slice(&raw);
    }

    fn encode_kind(&mut self, kind: Option<&Kind>) {
        let Some(kind) = kind else {
            self.buffer.push(0);
            return;
        };
        match kind {
            Kind::Int(w) => self.buffer.extend_from_slice(&[D_INT, w.bits()]),
            Kind::UInt(w) => self.buffer.extend_from_slice(&[D_UINT, w.bits()]),
            Kind::Float(w) => self.buffer.extend_from_slice(&[D_FLOAT, w.bits()]),
            Kind::Char => self.buffer.push(D_CHAR),
            Kind::String => self.buffer.push(D_STRING),
            Kind::Sequence(e) => {
                self.buffer.push(D_SEQ);
                self.encode_kind(e.as_deref());
            }
            Kind::Map(e) => {
                self.buffer.push(D_MAP);
                self.encode_kind(e.as_deref());
            }
            Kind::Object(id) => {
                self.buffer.push(D_OBJECT);
                self.buffer.extend_from_slice(id.as_bytes());
            }
        }
    }

    fn encode_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Empty => self.buffer.push(D_EMPTY),
            Value::Int(v, w) => {
                self.buffer.push(D_INT);
                self.write_wide(w.bits(), v.to_le_bytes());
            }
            Value::UInt(v, w) => {
                self.buffer.push(D_UINT);
                self.write_wide(w.bits(), v.to_le_bytes());
            }
            Value::Float(v, w) => {
                self.buffer.push(D_FLOAT);
                self.write_wide(w.bits(), v.to_le_bytes());
            }
            Value::Char(c) => {
                self.buffer.push(D_CHAR);
                self.write_u32(u32::from(*c));
            }
            Value::String(s) => {
                self.buffer.push(D_STRING);
                self.write_string(s)?;
            }
            Value::Sequence(seq) => {
                self.buffer.push(D_SEQ);
                self.encode_kind(seq.element());
                self.write_count(seq.len())?;
                for item in seq.iter() {
                    self.encode_value(item)?;
                }
            }
            Value::Map(map) => {
                self.buffer.push(D_MAP);
                self.encode_kind(map.element());
                self.write_count(map.len())?;
                for (key, item) in map.iter() {
                    self.write_string(key)?;
                    self.encode_value(item)?;
                }
            }
            Value::Object(obj) => {
                self.buffer.push(D_OBJECT);
                self.buffer.extend_from_slice(obj.adapter().as_bytes());
                self.write_count(obj.len())?;
                self.buffer.extend_from_slice(obj.bytes());
            }
        }
        Ok(())
    }
}

struct Decoder<'a> {
    buffer: &'a [u8],
    offset: usize,
    registry: &'a TypeRegistry,
}

impl<'a> Decoder<'a> {
    fn new(buffer: &'a [u8], registry: &'a TypeRegistry) -> Self {
        Self {
            buffer,
            offset: 0,
            registry,
        }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn align(&mut self, alignment: usize) {
        self.offset = (self.offset + alignment - 1) & !(alignment - 1);
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.offset.saturating_add(count) > self.buffer.len() {
            return Err(CodecError::BufferTooSmall {
                need: count,
                have: self.remaining(),
            }
            .into());
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.align(4);
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_wide(&mut self) -> Result<(u8, [u8; 8])> {
        let bits = self.read_u8()?;
        self.align(8);
        let b = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok((bits, raw))
    }

    /// Element count, bounded by what the remaining input could hold.
    fn read_count(&mut self, min_entry: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        let need = count.saturating_mul(min_entry);
        if need > self.remaining() {
            return Err(CodecError::BufferTooSmall {
                need,
                have: self.remaining(),
            }
            .into());
        }
        Ok(count)
    }

    fn read_string(&mut self) -> Result<String> {
        self.read_optional_string()?
            .ok_or_else(|| invalid("string without terminator"))
    }

    /// String whose zero length means "absent".
    fn read_optional_string(&mut self) -> Result<Option<String>> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Ok(None);
        }
        let bytes = self.read_bytes(len)?;
        let (text, nul) = bytes.split_at(len - 1);
        if nul != [0] {
            return Err(invalid("string not NUL-terminated"));
        }
        let text = String::from_utf8(text.to_vec()).map_err(CodecError::from)?;
        Ok(Some(text))
    }

    fn read_adapter(&mut self) -> Result<AdapterId> {
        let mut raw = [0u8; 14];
        raw.copy_from_slice(self.read_bytes(14)?);
        let id = AdapterId::from_bytes(raw);
        if self.registry.adapter(id).is_none() {
            return Err(AnyError::UnknownType(format!("object adapter {}", id)));
        }
        Ok(id)
    }

    fn decode_any(&mut self) -> Result<Any> {
        let header = self.read_bytes(4)?;
        if &header[..2] != MAGIC {
            return Err(invalid("bad magic"));
        }
        if header[2] != VERSION {
            return Err(invalid(format!("unsupported version {}", header[2])));
        }

        let tag = match self.read_optional_string()? {
            Some(name) => Some(self.registry.resolve(&name)?),
            None => None,
        };

        let value = self.decode_value(0)?;
        if self.remaining() != 0 {
            return Err(invalid(format!("{} trailing bytes", self.remaining())));
        }
        if let Some(tag) = &tag {
            if !tag_accepts(tag.kind(), &value) {
                return Err(invalid(format!(
                    "payload {} does not match tag {} ({})",
                    value.kind_name(),
                    tag.name(),
                    tag.kind()
                )));
            }
        }
        Ok(Any::from_parts(tag, value))
    }

    fn decode_kind(&mut self, depth: usize) -> Result<Option<Kind>> {
        let code = self.read_u8()?;
        if code == 0 {
            return Ok(None);
        }
        if depth > MAX_DEPTH {
            return Err(invalid("kind nested too deeply"));
        }
        let kind = match code {
            D_INT => Kind::Int(int_width(self.read_u8()?)?),
            D_UINT => Kind::UInt(int_width(self.read_u8()?)?),
            D_FLOAT => Kind::Float(float_width(self.read_u8()?)?),
            D_CHAR => Kind::Char,
            D_STRING => Kind::String,
            D_SEQ => Kind::Sequence(self.decode_kind(depth + 1)?.map(Box::new)),
            D_MAP => Kind::Map(self.decode_kind(depth + 1)?.map(Box::new)),
            D_OBJECT => Kind::Object(self.read_adapter()?),
            other => return Err(invalid(format!("unknown kind code {}", other))),
        };
        Ok(Some(kind))
    }

    fn decode_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(invalid(format!("nesting exceeds {} levels", MAX_DEPTH)));
        }
        let value = match self.read_u8()? {
            D_EMPTY => Value::Empty,
            D_INT => {
                let (bits, raw) = self.read_wide()?;
                let w = int_width(bits)?;
                let v = i64::from_le_bytes(raw);
                if w.wrap_signed(v) != v {
                    return Err(invalid(format!("{} out of range for int{}", v, bits)));
                }
                Value::Int(v, w)
            }
            D_UINT => {
                let (bits, raw) = self.read_wide()?;
                let w = int_width(bits)?;
                let v = u64::from_le_bytes(raw);
                if w.wrap_unsigned(v) != v {
                    return Err(invalid(format!("{} out of range for uint{}", v, bits)));
                }
                Value::UInt(v, w)
            }
            D_FLOAT => {
                let (bits, raw) = self.read_wide()?;
                Value::Float(f64::from_le_bytes(raw), float_width(bits)?)
            }
            D_CHAR => {
                let code = self.read_u32()?;
                let c = char::from_u32(code)
                    .ok_or_else(|| invalid(format!("invalid code point {:#x}", code)))?;
                Value::Char(c)
            }
            D_STRING => Value::String(self.read_string()?),
            D_SEQ => {
                let element = self.decode_kind(depth + 1)?;
                let count = self.read_count(1)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let item = self.decode_value(depth + 1)?;
                    check_element(&item, element.as_ref())?;
                    items.push(item);
                }
                Value::Sequence(Sequence::from_items(element, items))
            }
            D_MAP => {
                let element = self.decode_kind(depth + 1)?;
                let count = self.read_count(6)?;
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key = self.read_string()?;
                    let item = self.decode_value(depth + 1)?;
                    check_element(&item, element.as_ref())?;
                    if entries.insert(key.clone(), item).is_some() {
                        return Err(invalid(format!("duplicate key {:?}", key)));
                    }
                }
                Value::Map(Mapping::from_entries(element, entries))
            }
            D_OBJECT => {
                let id = self.read_adapter()?;
                let len = self.read_u32()? as usize;
                Value::Object(ObjectPayload::new(id, self.read_bytes(len)?))
            }
            other => return Err(invalid(format!("unknown value discriminant {}", other))),
        };
        Ok(value)
    }
}

/// Container tags take whatever was assigned over them as a whole.
fn tag_accepts(tag: &Kind, value: &Value) -> bool {
    tag.is_container() || value.kind().as_ref() == Some(tag)
}

fn check_element(item: &Value, element: Option<&Kind>) -> Result<()> {
    match (item.kind(), element) {
        (Some(found), Some(expected)) if found != *expected => Err(invalid(format!(
            "element {} in container of {}",
            found, expected
        ))),
        _ => Ok(()),
    }
}

fn int_width(bits: u8) -> Result<IntWidth> {
    IntWidth::from_bits(bits).ok_or_else(|| invalid(format!("invalid integer width {}", bits)))
}

fn float_width(bits: u8) -> Result<FloatWidth> {
    FloatWidth::from_bits(bits).ok_or_else(|| invalid(format!("invalid float width {}", bits)))
}

fn invalid(msg: impl Into<String>) -> AnyError {
    CodecError::InvalidData(msg.into()).into()
}
