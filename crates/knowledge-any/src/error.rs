// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for Any construction, access and exchange.

use crate::adapter::{AdapterError, AdapterId};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnyError>;

/// Top-level error kinds.
#[derive(Debug, Error)]
pub enum AnyError {
    /// A tag name (or adapter identity) does not resolve in the registry.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A tag with this name is already registered.
    #[error("duplicate type tag: {0}")]
    DuplicateTag(String),

    /// Kind mismatch, failed coercion, or wrong adapter.
    #[error("bad any access: {0}")]
    BadAnyAccess(#[from] AccessError),

    /// Malformed serialized form.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl AnyError {
    /// Returns `true` for [`AnyError::BadAnyAccess`].
    pub fn is_bad_access(&self) -> bool {
        matches!(self, Self::BadAnyAccess(_))
    }

    /// Returns `true` for [`AnyError::UnknownType`].
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }
}

/// Reason attached to [`AnyError::BadAnyAccess`].
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("value is empty")]
    Empty,

    #[error("{kind} has no scalar representation")]
    NotScalar { kind: String },

    #[error("{kind} cannot be indexed by {segment}")]
    NotIndexable { kind: String, segment: String },

    #[error("cannot parse {input:?} as {target}")]
    Parse { input: String, target: String },

    #[error("{value} is not representable as {target}")]
    NotRepresentable { value: String, target: String },

    #[error("{kind} is not an object")]
    NotAnObject { kind: String },

    #[error("object bound to adapter {found}, requested {expected}")]
    AdapterMismatch { expected: AdapterId, found: AdapterId },

    #[error("expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    #[error("index {index} exceeds the sequence limit of {limit}")]
    IndexOutOfRange { index: usize, limit: usize },

    #[error("adapter rejected payload: {0}")]
    Adapter(#[from] AdapterError),
}

/// Errors from [`crate::codec`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<AdapterError> for AnyError {
    fn from(e: AdapterError) -> Self {
        Self::BadAnyAccess(AccessError::Adapter(e))
    }
}
