// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Path handles into container values.
//!
//! An [`AnyRef`] remembers *where* it points (a path of indices and keys from
//! the owning [`Any`](crate::Any)), not a pointer to the slot. Reads walk the
//! path and treat missing slots as empty. Writes create every missing slot on
//! the way, so `any.at(100)?.assign(x)` grows the sequence to 101 entries with
//! empty gaps in between.

use crate::adapter::ObjectAdapter;
use crate::any::open_object;
use crate::convert;
use crate::error::{AccessError, Result};
use crate::kind::Kind;
use crate::value::{Mapping, Sequence, Value, MAX_SEQUENCE_LEN};
use std::fmt;

static EMPTY: Value = Value::Empty;

/// One step of an [`AnyRef`] path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {}", i),
            Self::Key(k) => write!(f, "key {:?}", k),
        }
    }
}

/// Mutable handle to a slot inside an [`Any`](crate::Any).
#[derive(Debug)]
pub struct AnyRef<'a> {
    root: &'a mut Value,
    path: Vec<Segment>,
}

impl<'a> AnyRef<'a> {
    pub(crate) fn new(root: &'a mut Value, first: Segment) -> Self {
        Self {
            root,
            path: vec![first],
        }
    }

    /// Path from the owning value to this slot.
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// Address element `index` of this slot.
    ///
    /// Fails when the slot holds (or its container's element kind fixes)
    /// something other than a sequence. Nothing is created until a write.
    pub fn at(&mut self, index: usize) -> Result<AnyRef<'_>> {
        self.descend(Segment::Index(index))
    }

    /// Address entry `key` of this slot.
    pub fn at_key(&mut self, key: &str) -> Result<AnyRef<'_>> {
        self.descend(Segment::Key(key.to_string()))
    }

    fn descend(&mut self, segment: Segment) -> Result<AnyRef<'_>> {
        locate(self.root, &self.path)?.child(&segment)?;
        let mut path = self.path.clone();
        path.push(segment);
        Ok(AnyRef {
            root: &mut *self.root,
            path,
        })
    }

    /// Current slot content, `None` when the slot does not exist yet.
    pub fn value(&self) -> Option<&Value> {
        locate(self.root, &self.path).ok().and_then(|slot| slot.value)
    }

    fn current(&self) -> &Value {
        self.value().unwrap_or(&EMPTY)
    }

    /// True when the slot is missing or holds nothing.
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Kind the slot holds, or the kind its container would give it.
    pub fn kind(&self) -> Option<Kind> {
        let slot = locate(self.root, &self.path).ok()?;
        match slot.value.and_then(Value::kind) {
            Some(kind) => Some(kind),
            None => slot.template.cloned(),
        }
    }

    /// Store `value` at this slot, creating missing parents.
    ///
    /// A populated slot keeps its kind. A missing or empty slot in a typed
    /// container is coerced to the element kind. Nothing changes on error.
    pub fn assign(&mut self, value: impl Into<Value>) -> Result<()> {
        for segment in &self.path {
            if let Segment::Index(index) = segment {
                check_index(*index)?;
            }
        }
        let incoming = value.into();
        let slot = locate(self.root, &self.path)?;
        let stored = match (slot.value, slot.template) {
            (Some(existing), _) if !existing.is_empty() => convert::assign_rule(existing, incoming)?,
            (_, Some(kind)) => convert::coerce(incoming, kind)?,
            (_, None) => incoming,
        };
        *vivify(self.root, &self.path)? = stored;
        Ok(())
    }

    pub fn to_integer(&self) -> Result<i64> {
        convert::to_integer(self.current())
    }

    pub fn to_unsigned(&self) -> Result<u64> {
        convert::to_unsigned(self.current())
    }

    pub fn to_double(&self) -> Result<f64> {
        convert::to_double(self.current())
    }

    pub fn to_string_value(&self) -> Result<String> {
        convert::to_text(self.current())
    }

    pub fn reader<A: ObjectAdapter>(&self) -> Result<A::Reader<'_>> {
        open_object::<A>(self.current())
    }

    /// Entry count when the slot holds a container.
    pub fn len(&self) -> Option<usize> {
        self.current().len()
    }
}

impl fmt::Display for AnyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.current(), f)
    }
}

/// Read-only view of a path position.
#[derive(Clone, Copy)]
struct Slot<'v> {
    value: Option<&'v Value>,
    /// Element kind of the enclosing container.
    template: Option<&'v Kind>,
}

impl<'v> Slot<'v> {
    fn child(&self, segment: &Segment) -> Result<Slot<'v>> {
        match (self.value.filter(|v| !v.is_empty()), segment) {
            (Some(Value::Sequence(s)), Segment::Index(i)) => Ok(Slot {
                value: s.get(*i),
                template: s.element(),
            }),
            (Some(Value::Map(m)), Segment::Key(k)) => Ok(Slot {
                value: m.get(k),
                template: m.element(),
            }),
            (Some(other), _) => Err(not_indexable(other.kind_name(), segment)),
            (None, _) => match (self.template, segment) {
                (None, _) => Ok(Slot {
                    value: None,
                    template: None,
                }),
                (Some(Kind::Sequence(e)), Segment::Index(_))
                | (Some(Kind::Map(e)), Segment::Key(_)) => Ok(Slot {
                    value: None,
                    template: e.as_deref(),
                }),
                (Some(kind), _) => Err(not_indexable(kind.to_string(), segment)),
            },
        }
    }
}

fn locate<'v>(root: &'v Value, path: &[Segment]) -> Result<Slot<'v>> {
    let mut slot = Slot {
        value: Some(root),
        template: None,
    };
    for segment in path {
        slot = slot.child(segment)?;
    }
    Ok(slot)
}

/// Walk `path`, creating missing containers and slots.
fn vivify<'v>(root: &'v mut Value, path: &[Segment]) -> Result<&'v mut Value> {
    let mut current = root;
    let mut template: Option<Kind> = None;
    for segment in path {
        if current.is_empty() {
            *current = match (template.take(), segment) {
                (Some(kind), _) => Value::default_for(&kind),
                (None, Segment::Index(_)) => Value::Sequence(Sequence::new()),
                (None, Segment::Key(_)) => Value::Map(Mapping::new()),
            };
            log::trace!("[AnyRef] created {} for {}", current.kind_name(), segment);
        }
        current = match (current, segment) {
            (Value::Sequence(s), Segment::Index(i)) => {
                template = s.element().cloned();
                s.slot_mut(*i).ok_or_else(|| out_of_range(*i))?
            }
            (Value::Map(m), Segment::Key(k)) => {
                template = m.element().cloned();
                m.slot_mut(k)
            }
            (other, _) => return Err(not_indexable(other.kind_name(), segment)),
        };
    }
    Ok(current)
}

fn check_index(index: usize) -> Result<()> {
    if index >= MAX_SEQUENCE_LEN {
        return Err(out_of_range(index));
    }
    Ok(())
}

fn out_of_range(index: usize) -> crate::AnyError {
    AccessError::IndexOutOfRange {
        index,
        limit: MAX_SEQUENCE_LEN,
    }
    .into()
}

fn not_indexable(kind: String, segment: &Segment) -> crate::AnyError {
    AccessError::NotIndexable {
        kind,
        segment: segment.to_string(),
    }
    .into()
}
