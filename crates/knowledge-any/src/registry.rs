// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type registry.
//!
//! Maps tag names (and numeric [`TagId`]s) to [`Kind`]s, and keeps track of
//! the object adapters those kinds refer to.
//!
//! # Lifecycle
//!
//! ```text
//! init phase : TypeRegistry::with_builtins() -> register*/alias*   (&mut)
//! steady     : resolve / resolve_id / adapter                      (&, any thread)
//! ```
//!
//! The process-wide instance behind [`global()`] follows the same contract:
//! take [`global_mut()`] only while the process is starting up.

use crate::adapter::{AdapterId, AdapterInfo, ObjectAdapter};
use crate::error::{AnyError, Result};
use crate::kind::{FloatWidth, IntWidth, Kind};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Numeric tag identifier, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TagInner {
    name: Arc<str>,
    id: TagId,
    kind: Kind,
}

/// Immutable handle to a registered type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag(Arc<TagInner>);

impl TypeTag {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn id(&self) -> TagId {
        self.0.id
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.name, self.0.kind)
    }
}

/// Tag table plus known adapters.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    by_name: HashMap<Arc<str>, TypeTag>,
    by_id: Vec<TypeTag>,
    adapters: HashMap<AdapterId, AdapterInfo>,
}

impl TypeRegistry {
    /// Empty registry (no built-in tags).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in scalar and container tags.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, kind) in builtin_tags() {
            registry.insert(name, kind);
        }
        registry
    }

    /// Register `name` as `kind`.
    pub fn register(&mut self, name: &str, kind: Kind) -> Result<TypeTag> {
        if self.by_name.contains_key(name) {
            log::warn!("[TypeRegistry] duplicate tag '{}' rejected", name);
            return Err(AnyError::DuplicateTag(name.to_string()));
        }
        if let Some(id) = kind.object_adapter() {
            if !self.adapters.contains_key(&id) {
                return Err(AnyError::UnknownType(format!("adapter {}", id)));
            }
        }
        Ok(self.insert(name, kind))
    }

    /// Register `name` from the kind grammar (`"seq<float64>"`, ...).
    pub fn register_spec(&mut self, name: &str, spec: &str) -> Result<TypeTag> {
        let kind: Kind = spec.parse()?;
        self.register(name, kind)
    }

    /// Register an object kind served by adapter `A`.
    pub fn register_adapter<A: ObjectAdapter>(&mut self, name: &str) -> Result<TypeTag> {
        if self.by_name.contains_key(name) {
            log::warn!("[TypeRegistry] duplicate tag '{}' rejected", name);
            return Err(AnyError::DuplicateTag(name.to_string()));
        }
        let info = AdapterInfo::of::<A>();
        let id = info.id;
        if let Some(existing) = self.adapters.get(&id) {
            if existing.schema != info.schema {
                log::warn!(
                    "[TypeRegistry] adapter id {} shared by '{}' and '{}'",
                    id,
                    existing.schema,
                    info.schema
                );
            }
        } else {
            log::debug!("[TypeRegistry] adapter {} -> {}", info.schema, id);
            self.adapters.insert(id, info);
        }
        Ok(self.insert(name, Kind::Object(id)))
    }

    /// Register `name` with the kind of an existing tag.
    pub fn alias(&mut self, name: &str, existing: &str) -> Result<TypeTag> {
        let kind = self.resolve(existing)?.kind().clone();
        self.register(name, kind)
    }

    /// Look a tag up by name.
    pub fn resolve(&self, name: &str) -> Result<TypeTag> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| AnyError::UnknownType(name.to_string()))
    }

    /// Look a tag up by id.
    pub fn resolve_id(&self, id: TagId) -> Result<TypeTag> {
        self.by_id
            .get(id.0 as usize)
            .cloned()
            .ok_or_else(|| AnyError::UnknownType(id.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn adapter(&self, id: AdapterId) -> Option<&AdapterInfo> {
        self.adapters.get(&id)
    }

    /// Tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.by_id.iter()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn insert(&mut self, name: &str, kind: Kind) -> TypeTag {
        let name: Arc<str> = Arc::from(name);
        let tag = TypeTag(Arc::new(TagInner {
            name: name.clone(),
            id: TagId(self.by_id.len() as u32),
            kind,
        }));
        log::debug!("[TypeRegistry] registered {} as {}", tag, tag.id());
        self.by_name.insert(name, tag.clone());
        self.by_id.push(tag.clone());
        tag
    }
}

static GLOBAL: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

fn global_lock() -> &'static RwLock<TypeRegistry> {
    GLOBAL.get_or_init(|| {
        log::debug!("[TypeRegistry] initializing process-wide registry");
        RwLock::new(TypeRegistry::with_builtins())
    })
}

/// Shared access to the process-wide registry.
///
/// Reads are recursive: a thread already holding a guard may take another
/// (as [`Any::new`](crate::Any::new) does) even while a writer is queued.
pub fn global() -> RwLockReadGuard<'static, TypeRegistry> {
    global_lock().read_recursive()
}

/// Exclusive access to the process-wide registry (initialization only).
///
/// Do not hold a [`global()`] guard on the same thread while calling this.
pub fn global_mut() -> RwLockWriteGuard<'static, TypeRegistry> {
    global_lock().write()
}

/// Built-in tag table.
fn builtin_tags() -> Vec<(&'static str, Kind)> {
    use FloatWidth::{F32, F64};
    use IntWidth::{W16, W32, W64, W8};

    let seq = Kind::seq_of;
    let map = Kind::map_of;
    vec![
        ("int8", Kind::Int(W8)),
        ("int16", Kind::Int(W16)),
        ("int32", Kind::Int(W32)),
        ("int64", Kind::Int(W64)),
        ("uint8", Kind::UInt(W8)),
        ("uint16", Kind::UInt(W16)),
        ("uint32", Kind::UInt(W32)),
        ("uint64", Kind::UInt(W64)),
        ("float32", Kind::Float(F32)),
        ("float64", Kind::Float(F64)),
        ("char", Kind::Char),
        ("string", Kind::String),
        // aliases
        ("schar", Kind::Int(W8)),
        ("short", Kind::Int(W16)),
        ("int", Kind::Int(W32)),
        ("long", Kind::Int(W64)),
        ("uchar", Kind::UInt(W8)),
        ("ushort", Kind::UInt(W16)),
        ("uint", Kind::UInt(W32)),
        ("ulong", Kind::UInt(W64)),
        ("float", Kind::Float(F32)),
        ("double", Kind::Float(F64)),
        // containers
        ("charvec", seq(Kind::Char)),
        ("shvec", seq(Kind::Int(W16))),
        ("intvec", seq(Kind::Int(W32))),
        ("longvec", seq(Kind::Int(W64))),
        ("u8vec", seq(Kind::UInt(W8))),
        ("fltvec", seq(Kind::Float(F32))),
        ("dblvec", seq(Kind::Float(F64))),
        ("strvec", seq(Kind::String)),
        ("anyvec", Kind::Sequence(None)),
        ("smap", map(Kind::String)),
        ("intmap", map(Kind::Int(W64))),
        ("dblmap", map(Kind::Float(F64))),
        ("anymap", Kind::Map(None)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterError;

    struct Blob;

    impl ObjectAdapter for Blob {
        type Builder = Vec<u8>;
        type Reader<'a> = &'a [u8];
        const SCHEMA: &'static str = "test.Blob";

        fn build_bytes(b: &Vec<u8>) -> std::result::Result<Vec<u8>, AdapterError> {
            Ok(b.clone())
        }

        fn open_reader(bytes: &[u8]) -> std::result::Result<&[u8], AdapterError> {
            Ok(bytes)
        }
    }

    #[test]
    fn test_builtins_resolve() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.resolve("strvec").unwrap().kind(), &Kind::seq_of(Kind::String));
        assert_eq!(registry.resolve("long").unwrap().kind(), &Kind::Int(IntWidth::W64));
        assert_eq!(registry.resolve("smap").unwrap().kind(), &Kind::map_of(Kind::String));
        assert_eq!(registry.len(), builtin_tags().len());
    }

    #[test]
    fn test_builtin_names_unique() {
        let mut names: Vec<_> = builtin_tags().into_iter().map(|(n, _)| n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), builtin_tags().len());
    }

    #[test]
    fn test_unknown_and_duplicate() {
        let mut registry = TypeRegistry::with_builtins();
        assert!(matches!(
            registry.resolve("not_a_real_type"),
            Err(AnyError::UnknownType(_))
        ));
        assert!(matches!(
            registry.register("int", Kind::Char),
            Err(AnyError::DuplicateTag(_))
        ));
    }

    #[test]
    fn test_resolve_by_id() {
        let mut registry = TypeRegistry::new();
        let a = registry.register("a", Kind::Char).unwrap();
        let b = registry.register_spec("b", "map<seq<int8>>").unwrap();
        assert_eq!(a.id(), TagId::from_raw(0));
        assert_eq!(registry.resolve_id(b.id()).unwrap(), b);
        assert!(registry.resolve_id(TagId::from_raw(9)).is_err());
        let names: Vec<_> = registry.tags().map(TypeTag::name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_register_adapter_and_alias() {
        let mut registry = TypeRegistry::new();
        let blob = registry.register_adapter::<Blob>("blob").unwrap();
        assert_eq!(blob.kind(), &Kind::Object(Blob::identity()));
        assert_eq!(
            registry.adapter(Blob::identity()).map(|a| a.schema),
            Some("test.Blob")
        );

        let alias = registry.alias("blob2", "blob").unwrap();
        assert_eq!(alias.kind(), blob.kind());
        assert!(registry.register("blobs", Kind::seq_of(blob.kind().clone())).is_ok());
        assert!(registry.register_adapter::<Blob>("blob").is_err());
    }

    #[test]
    fn test_object_kind_needs_known_adapter() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register("ghost", Kind::Object(AdapterId::from_schema_name("ghost")))
            .unwrap_err();
        assert!(err.is_unknown_type());
    }

    #[test]
    fn test_global_has_builtins() {
        assert!(global().contains("dblvec"));
    }
}
