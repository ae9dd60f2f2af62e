// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object adapter protocol.
//!
//! Structured record types defined outside this crate (generated by a schema
//! compiler, hand-written, ...) take part in [`Any`](crate::Any) through an
//! [`ObjectAdapter`]. The core never interprets the bytes: it stores them
//! next to the adapter's [`AdapterId`] and hands them back to the same
//! adapter when a reader is requested.
//!
//! # Example
//!
//! ```rust
//! use knowledge_any::adapter::{AdapterError, ObjectAdapter};
//! use knowledge_any::Any;
//!
//! struct Celsius;
//!
//! impl ObjectAdapter for Celsius {
//!     type Builder = f32;
//!     type Reader<'a> = f32;
//!     const SCHEMA: &'static str = "demo.Celsius";
//!
//!     fn build_bytes(builder: &f32) -> Result<Vec<u8>, AdapterError> {
//!         Ok(builder.to_le_bytes().to_vec())
//!     }
//!
//!     fn open_reader(bytes: &[u8]) -> Result<f32, AdapterError> {
//!         let raw: [u8; 4] = bytes
//!             .try_into()
//!             .map_err(|_| AdapterError::Truncated { need: 4, have: bytes.len() })?;
//!         Ok(f32::from_le_bytes(raw))
//!     }
//! }
//!
//! let any = Any::from_builder::<Celsius>(&21.5).unwrap();
//! assert_eq!(any.reader::<Celsius>().unwrap(), 21.5);
//! ```

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Stable identity of an adapter (MD5 prefix of its schema name).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterId([u8; 14]);

impl AdapterId {
    /// Derive the identity from a schema name.
    pub fn from_schema_name(schema: &str) -> Self {
        use md5::{Digest, Md5};
        let mut hasher = Md5::new();
        hasher.update(schema.as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&result[..14]);
        Self(bytes)
    }

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; 14]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }
}

impl fmt::Debug for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdapterId(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "...)")
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Failure reported by an adapter implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("truncated payload: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("builder incomplete: {0}")]
    Incomplete(String),
}

/// Reader/builder pair for one structured schema.
///
/// `open_reader` must accept every buffer `build_bytes` produced for the same
/// adapter and must fail (not panic) on anything else.
pub trait ObjectAdapter: 'static {
    /// Caller-populated builder.
    type Builder;
    /// Read-only view borrowing the stored bytes.
    type Reader<'a>;
    /// Schema name; the identity is derived from it.
    const SCHEMA: &'static str;

    /// Identity token. Override only to keep an identity stable across a
    /// schema rename.
    fn identity() -> AdapterId {
        AdapterId::from_schema_name(Self::SCHEMA)
    }

    /// Serialize a populated builder.
    fn build_bytes(builder: &Self::Builder) -> Result<Vec<u8>, AdapterError>;

    /// Open a reader over bytes previously produced by `build_bytes`.
    fn open_reader(bytes: &[u8]) -> Result<Self::Reader<'_>, AdapterError>;
}

/// What the registry remembers about an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    pub id: AdapterId,
    pub schema: &'static str,
}

impl AdapterInfo {
    pub fn of<A: ObjectAdapter>() -> Self {
        Self {
            id: A::identity(),
            schema: A::SCHEMA,
        }
    }
}

/// Opaque object payload: bytes plus the adapter bound to them.
///
/// The buffer is immutable once built, so clones share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPayload {
    adapter: AdapterId,
    bytes: Arc<[u8]>,
}

impl ObjectPayload {
    pub fn new(adapter: AdapterId, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            adapter,
            bytes: bytes.into(),
        }
    }

    /// Empty buffer bound to `adapter` (provisional object value).
    pub fn empty(adapter: AdapterId) -> Self {
        Self::new(adapter, Vec::new())
    }

    /// Build through `A`.
    pub fn build<A: ObjectAdapter>(builder: &A::Builder) -> Result<Self, AdapterError> {
        let bytes = A::build_bytes(builder)?;
        Ok(Self::new(A::identity(), bytes))
    }

    pub fn adapter(&self) -> AdapterId {
        self.adapter
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
