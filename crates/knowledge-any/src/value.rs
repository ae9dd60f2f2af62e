// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged value storage.

use crate::adapter::ObjectPayload;
use crate::kind::{FloatWidth, IntWidth, Kind};
use std::collections::BTreeMap;
use std::fmt;

/// The payload carried by an [`Any`](crate::Any).
///
/// Exactly one branch is live. Integers of every declared width share one
/// 64-bit slot and are kept truncated to their width.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No kind fixed, nothing assigned. Also used for sequence gaps.
    #[default]
    Empty,
    Int(i64, IntWidth),
    UInt(u64, IntWidth),
    Float(f64, FloatWidth),
    Char(char),
    String(String),
    Sequence(Sequence),
    Map(Mapping),
    Object(ObjectPayload),
}

impl Value {
    /// Provisional payload for a freshly constructed value of `kind`.
    pub fn default_for(kind: &Kind) -> Self {
        match kind {
            Kind::Int(w) => Self::Int(0, *w),
            Kind::UInt(w) => Self::UInt(0, *w),
            Kind::Float(w) => Self::Float(0.0, *w),
            Kind::Char => Self::Char('\0'),
            Kind::String => Self::String(String::new()),
            Kind::Sequence(e) => Self::Sequence(Sequence::with_element(e.as_deref().cloned())),
            Kind::Map(e) => Self::Map(Mapping::with_element(e.as_deref().cloned())),
            Kind::Object(id) => Self::Object(ObjectPayload::empty(*id)),
        }
    }

    /// Kind of the live branch (`None` when empty).
    pub fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Self::Empty => return None,
            Self::Int(_, w) => Kind::Int(*w),
            Self::UInt(_, w) => Kind::UInt(*w),
            Self::Float(_, w) => Kind::Float(*w),
            Self::Char(_) => Kind::Char,
            Self::String(_) => Kind::String,
            Self::Sequence(s) => Kind::Sequence(s.element.clone().map(Box::new)),
            Self::Map(m) => Kind::Map(m.element.clone().map(Box::new)),
            Self::Object(o) => Kind::Object(o.adapter()),
        };
        Some(kind)
    }

    /// Human-readable kind, for diagnostics.
    pub fn kind_name(&self) -> String {
        self.kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "empty".to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Int(..) | Self::UInt(..) | Self::Float(..) | Self::Char(_) | Self::String(_)
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Map(_))
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectPayload> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Child at `index` of a sequence. Never vivifies.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_sequence().and_then(|s| s.get(index))
    }

    /// Child at `key` of a map. Never vivifies.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Entry count of a container.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Sequence(s) => Some(s.len()),
            Self::Map(m) => Some(m.len()),
            _ => None,
        }
    }
}

/// Upper bound on the length an indexed write may grow a sequence to.
///
/// Gaps are stored densely, so a write at index `i` allocates `i + 1` slots.
pub const MAX_SEQUENCE_LEN: usize = 1 << 20;

/// Positional container. Gaps left by sparse assignment hold [`Value::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    element: Option<Kind>,
    items: Vec<Value>,
}

impl Sequence {
    /// Untyped, empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(element: Option<Kind>) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    pub fn from_items(element: Option<Kind>, items: Vec<Value>) -> Self {
        Self { element, items }
    }

    pub fn element(&self) -> Option<&Kind> {
        self.element.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Slot at `index`, growing with empty gaps as needed.
    ///
    /// Returns `None` for indices at or beyond [`MAX_SEQUENCE_LEN`].
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Value> {
        if index >= MAX_SEQUENCE_LEN {
            return None;
        }
        if index >= self.items.len() {
            self.items.resize(index + 1, Value::Empty);
        }
        self.items.get_mut(index)
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// String-keyed container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    element: Option<Kind>,
    entries: BTreeMap<String, Value>,
}

impl Mapping {
    /// Untyped, empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(element: Option<Kind>) -> Self {
        Self {
            element,
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(element: Option<Kind>, entries: BTreeMap<String, Value>) -> Self {
        Self { element, entries }
    }

    pub fn element(&self) -> Option<&Kind> {
        self.element.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Slot at `key`, inserting an empty entry if absent.
    pub fn slot_mut(&mut self, key: &str) -> &mut Value {
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn into_entries(self) -> BTreeMap<String, Value> {
        self.entries
    }
}

/// Canonical text of a float at its declared width.
pub(crate) fn format_float(v: f64, width: FloatWidth) -> String {
    match width {
        FloatWidth::F32 => (v as f32).to_string(),
        FloatWidth::F64 => v.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(v, _) => write!(f, "{}", v),
            Self::UInt(v, _) => write!(f, "{}", v),
            Self::Float(v, w) => f.write_str(&format_float(*v, *w)),
            Self::Char(c) => write!(f, "{}", c),
            Self::String(s) => f.write_str(s),
            Self::Sequence(s) => {
                f.write_str("[")?;
                for (i, item) in s.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Self::Object(o) => write!(f, "<object {} ({} bytes)>", o.adapter(), o.len()),
        }
    }
}

macro_rules! impl_from_signed {
    ($ty:ty, $width:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::Int(i64::from(v), IntWidth::$width)
            }
        }
    };
}

macro_rules! impl_from_unsigned {
    ($ty:ty, $width:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::UInt(u64::from(v), IntWidth::$width)
            }
        }
    };
}

impl_from_signed!(i8, W8);
impl_from_signed!(i16, W16);
impl_from_signed!(i32, W32);
impl_from_signed!(i64, W64);
impl_from_unsigned!(u8, W8);
impl_from_unsigned!(u16, W16);
impl_from_unsigned!(u32, W32);
impl_from_unsigned!(u64, W64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v), FloatWidth::F32)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v, FloatWidth::F64)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<ObjectPayload> for Value {
    fn from(v: ObjectPayload) -> Self {
        Self::Object(v)
    }
}

impl From<Sequence> for Value {
    fn from(v: Sequence) -> Self {
        Self::Sequence(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(Sequence::from_items(
            None,
            v.into_iter().map(Into::into).collect(),
        ))
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Self::Map(Mapping::from_entries(
            None,
            v.into_iter().map(|(k, v)| (k, v.into())).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_kinds() {
        assert_eq!(Value::default_for(&Kind::Int(IntWidth::W16)), Value::Int(0, IntWidth::W16));
        assert_eq!(Value::default_for(&Kind::String), Value::String(String::new()));

        let seq = Value::default_for(&Kind::seq_of(Kind::String));
        assert_eq!(seq.len(), Some(0));
        assert_eq!(seq.as_sequence().and_then(Sequence::element), Some(&Kind::String));
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_kind_matches_branch() {
        let v = Value::from(7u16);
        assert_eq!(v.kind(), Some(Kind::UInt(IntWidth::W16)));
        assert_eq!(Value::Empty.kind(), None);
        assert_eq!(Value::from(vec![1i32, 2]).kind(), Some(Kind::Sequence(None)));
    }

    #[test]
    fn test_slot_mut_fills_gaps() {
        let mut seq = Sequence::new();
        *seq.slot_mut(3).unwrap() = Value::from("x");
        assert_eq!(seq.len(), 4);
        assert!(seq.items()[..3].iter().all(Value::is_empty));
        assert_eq!(seq.get(3).and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn test_slot_mut_refuses_oversized_index() {
        let mut seq = Sequence::new();
        assert!(seq.slot_mut(usize::MAX).is_none());
        assert!(seq.slot_mut(MAX_SEQUENCE_LEN).is_none());
        assert!(seq.is_empty());
    }

    #[test]
    fn test_display() {
        let mut map = Mapping::new();
        map.insert("a", Value::from(1i64));
        map.insert("b", Value::from(vec!["x", "y"]));
        assert_eq!(Value::Map(map).to_string(), "{a: 1, b: [x, y]}");
        assert_eq!(Value::from(0.1f32).to_string(), "0.1");
    }
}
