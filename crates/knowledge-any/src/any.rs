// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Any` handle.

use crate::adapter::{ObjectAdapter, ObjectPayload};
use crate::any_ref::{AnyRef, Segment};
use crate::codec;
use crate::convert;
use crate::error::{AccessError, AnyError, Result};
use crate::kind::Kind;
use crate::registry::{self, TypeRegistry, TypeTag};
use crate::value::{Mapping, Sequence, Value};
use std::fmt;

/// Owning, type-erased value.
///
/// An `Any` built from a tag starts *provisional*: the kind is fixed and the
/// payload is the kind's zero value (empty container, zero, empty string).
/// An `Any` built with [`Any::default`] is empty until something is assigned
/// or indexed into it.
///
/// # Example
///
/// ```rust
/// use knowledge_any::Any;
///
/// let mut names = Any::new("strvec").unwrap();
/// names.at(5).unwrap().assign("fifth").unwrap();
/// names.at(2).unwrap().assign("second").unwrap();
///
/// assert_eq!(names.at(2).unwrap().to_string_value().unwrap(), "second");
/// assert!(names.at(0).unwrap().is_empty());
/// assert_eq!(names.len(), Some(6));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Any {
    tag: Option<TypeTag>,
    value: Value,
}

impl Any {
    /// Build from a tag name in the process-wide registry.
    ///
    /// Takes a short-lived [`registry::global`] guard; calling it while the
    /// same thread holds [`registry::global_mut`] deadlocks.
    pub fn new(tag_name: &str) -> Result<Self> {
        Self::with_registry(&registry::global(), tag_name)
    }

    /// Build from a tag name in `registry`.
    pub fn with_registry(registry: &TypeRegistry, tag_name: &str) -> Result<Self> {
        let tag = registry.resolve(tag_name)?;
        Ok(Self::from_tag(&tag))
    }

    /// Build a provisional value of `tag`'s kind.
    pub fn from_tag(tag: &TypeTag) -> Self {
        Self {
            value: Value::default_for(tag.kind()),
            tag: Some(tag.clone()),
        }
    }

    /// Serialize a populated builder through adapter `A`.
    pub fn from_builder<A: ObjectAdapter>(builder: &A::Builder) -> Result<Self> {
        let payload = ObjectPayload::build::<A>(builder)?;
        Ok(Self::from_value(payload))
    }

    /// Untagged `Any` holding `value`.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self {
            tag: None,
            value: value.into(),
        }
    }

    /// Decode the exchange form produced by [`Any::to_bytes`].
    pub fn from_bytes(bytes: &[u8], registry: &TypeRegistry) -> Result<Self> {
        codec::decode(bytes, registry)
    }

    /// Encode into the exchange form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    pub(crate) fn from_parts(tag: Option<TypeTag>, value: Value) -> Self {
        Self { tag, value }
    }

    pub fn tag(&self) -> Option<&TypeTag> {
        self.tag.as_ref()
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_ref().map(TypeTag::name)
    }

    /// Kind of the current payload (`None` while empty).
    pub fn kind(&self) -> Option<Kind> {
        self.value.kind()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// True only while no kind is fixed and nothing was assigned.
    ///
    /// A container with no entries is not empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Set the payload.
    ///
    /// Empty and container values are replaced wholesale by `value`; a
    /// scalar or object kind stays fixed and `value` is coerced into it.
    /// Nothing changes on error. Element kinds of a typed container only
    /// apply to writes through [`AnyRef::assign`].
    pub fn assign(&mut self, value: impl Into<Value>) -> Result<()> {
        let incoming = value.into();
        self.value = if self.value.is_container() {
            incoming
        } else {
            convert::assign_rule(&self.value, incoming)?
        };
        Ok(())
    }

    /// Back to the provisional payload of the tag (or empty when untagged).
    pub fn reset(&mut self) {
        self.value = match &self.tag {
            Some(tag) => Value::default_for(tag.kind()),
            None => Value::Empty,
        };
    }

    pub fn to_integer(&self) -> Result<i64> {
        convert::to_integer(&self.value)
    }

    pub fn to_unsigned(&self) -> Result<u64> {
        convert::to_unsigned(&self.value)
    }

    pub fn to_double(&self) -> Result<f64> {
        convert::to_double(&self.value)
    }

    /// Canonical text of a scalar payload.
    pub fn to_string_value(&self) -> Result<String> {
        convert::to_text(&self.value)
    }

    /// Structured view of an object payload through adapter `A`.
    pub fn reader<A: ObjectAdapter>(&self) -> Result<A::Reader<'_>> {
        open_object::<A>(&self.value)
    }

    /// Address slot `index`, turning an empty value into a sequence first.
    pub fn at(&mut self, index: usize) -> Result<AnyRef<'_>> {
        self.enter(Segment::Index(index))
    }

    /// Address slot `key`, turning an empty value into a map first.
    pub fn at_key(&mut self, key: &str) -> Result<AnyRef<'_>> {
        self.enter(Segment::Key(key.to_string()))
    }

    fn enter(&mut self, segment: Segment) -> Result<AnyRef<'_>> {
        if self.value.is_empty() {
            self.value = match segment {
                Segment::Index(_) => Value::Sequence(Sequence::new()),
                Segment::Key(_) => Value::Map(Mapping::new()),
            };
            log::trace!("[Any] vivified empty value as {}", self.value.kind_name());
        }
        match (&self.value, &segment) {
            (Value::Sequence(_), Segment::Index(_)) | (Value::Map(_), Segment::Key(_)) => {
                Ok(AnyRef::new(&mut self.value, segment))
            }
            (other, _) => Err(AccessError::NotIndexable {
                kind: other.kind_name(),
                segment: segment.to_string(),
            }
            .into()),
        }
    }

    /// Read slot `index` without vivifying anything.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.value.get(index)
    }

    /// Read slot `key` without vivifying anything.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.value.get_key(key)
    }

    /// Entry count for containers.
    pub fn len(&self) -> Option<usize> {
        self.value.len()
    }

    /// Keys of a map payload, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.value.as_map().into_iter().flat_map(|m| m.keys())
    }
}

pub(crate) fn open_object<A: ObjectAdapter>(value: &Value) -> Result<A::Reader<'_>> {
    match value {
        Value::Object(obj) => {
            let expected = A::identity();
            if obj.adapter() != expected {
                return Err(AccessError::AdapterMismatch {
                    expected,
                    found: obj.adapter(),
                }
                .into());
            }
            A::open_reader(obj.bytes()).map_err(AnyError::from)
        }
        other => Err(AccessError::NotAnObject {
            kind: other.kind_name(),
        }
        .into()),
    }
}

impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl From<Value> for Any {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Any> for Value {
    fn from(any: Any) -> Self {
        any.value
    }
}
