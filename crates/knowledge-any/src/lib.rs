// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # knowledge-any
//!
//! Type-erased value container for knowledge-sharing middleware.
//!
//! A producer and a consumer agree on a *type tag* (a registered name such as
//! `"dblvec"` or `"smap"`) instead of a compile-time type. An [`Any`] carries
//! the tag and a payload that is a scalar, a string, a sequence, a keyed map,
//! or an opaque object served by an [`ObjectAdapter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use knowledge_any::{Any, Result};
//!
//! fn main() -> Result<()> {
//!     let mut temps = Any::new("dblvec")?;
//!     temps.at(0)?.assign(21.5)?;
//!     temps.at(3)?.assign("19.25")?; // parsed into the element kind
//!
//!     assert_eq!(temps.at(3)?.to_double()?, 19.25);
//!     assert!(temps.at(1)?.is_empty()); // gap left by the sparse write
//!
//!     let bytes = temps.to_bytes()?;
//!     let copy = Any::from_bytes(&bytes, &knowledge_any::registry::global())?;
//!     assert_eq!(copy, temps);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeRegistry`] | Tag names to kinds, plus known object adapters |
//! | [`Any`] | Owning value: tag plus payload |
//! | [`AnyRef`] | Path handle into a container slot of an `Any` |
//! | [`Value`] | The payload tree |
//! | [`ObjectAdapter`] | Builder/reader pair for structured records |
//!
//! ## Modules Overview
//!
//! - [`registry`] - Tag registration, built-in tags, process-wide registry
//! - [`convert`] - Cross-kind conversion rules
//! - [`codec`] - Exchange form
//! - [`adapter`] - Object adapter protocol
//! - `loader` - YAML tag declarations (feature `registry-loaders`)

/// Object adapter protocol and opaque object payloads.
pub mod adapter;
/// Owning `Any` handle.
mod any;
/// Path handles into container slots.
mod any_ref;
/// Exchange form (encode/decode).
pub mod codec;
/// Cross-kind conversion rules.
pub mod convert;
/// Error types.
pub mod error;
/// Kind descriptors and numeric widths.
pub mod kind;
/// YAML tag declarations.
#[cfg(feature = "registry-loaders")]
pub mod loader;
/// Type tags and the registry.
pub mod registry;
/// Payload tree.
pub mod value;

pub use adapter::{AdapterError, AdapterId, ObjectAdapter, ObjectPayload};
pub use any::Any;
pub use any_ref::{AnyRef, Segment};
pub use error::{AccessError, AnyError, CodecError, Result};
pub use kind::{FloatWidth, IntWidth, Kind};
#[cfg(feature = "registry-loaders")]
pub use loader::{LoaderError, RegistryLoader, TagDocument};
pub use registry::{TagId, TypeRegistry, TypeTag};
pub use value::{Mapping, Sequence, Value, MAX_SEQUENCE_LEN};
