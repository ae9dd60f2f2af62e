// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coercion matrix between scalar kinds.
//!
//! | from \ to | integer            | float        | char          | string    |
//! |-----------|--------------------|--------------|---------------|-----------|
//! | integer   | wrap to width      | nearest      | code point    | decimal   |
//! | float     | trunc, saturate    | round to width | code point  | shortest  |
//! | char      | code point         | code point   | identity      | 1 char    |
//! | string    | parse              | parse        | exactly 1 char| identity  |
//!
//! Containers and objects have no scalar form. NaN never becomes an integer.

use crate::error::{AccessError, AnyError, Result};
use crate::kind::{IntWidth, Kind};
use crate::value::{format_float, Mapping, Sequence, Value};

/// Signed 64-bit view of a scalar.
pub fn to_integer(value: &Value) -> Result<i64> {
    match value {
        Value::Int(v, _) => Ok(*v),
        Value::UInt(v, _) => Ok(*v as i64),
        Value::Float(f, _) => float_to_signed(*f, IntWidth::W64),
        Value::Char(c) => Ok(i64::from(u32::from(*c))),
        Value::String(s) => s.parse::<i64>().map_err(|_| parse_error(s, "int64")),
        other => Err(no_scalar(other)),
    }
}

/// Unsigned 64-bit view of a scalar.
pub fn to_unsigned(value: &Value) -> Result<u64> {
    match value {
        Value::Int(v, _) => Ok(*v as u64),
        Value::UInt(v, _) => Ok(*v),
        Value::Float(f, _) => float_to_unsigned(*f, IntWidth::W64),
        Value::Char(c) => Ok(u64::from(u32::from(*c))),
        Value::String(s) => s.parse::<u64>().map_err(|_| parse_error(s, "uint64")),
        other => Err(no_scalar(other)),
    }
}

/// Floating point view of a scalar.
pub fn to_double(value: &Value) -> Result<f64> {
    match value {
        Value::Int(v, _) => Ok(*v as f64),
        Value::UInt(v, _) => Ok(*v as f64),
        Value::Float(f, _) => Ok(*f),
        Value::Char(c) => Ok(f64::from(u32::from(*c))),
        Value::String(s) => s.parse::<f64>().map_err(|_| parse_error(s, "float64")),
        other => Err(no_scalar(other)),
    }
}

/// Canonical text of a scalar.
pub fn to_text(value: &Value) -> Result<String> {
    match value {
        Value::Int(v, _) => Ok(v.to_string()),
        Value::UInt(v, _) => Ok(v.to_string()),
        Value::Float(f, w) => Ok(format_float(*f, *w)),
        Value::Char(c) => Ok(c.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(no_scalar(other)),
    }
}

/// Character view of a scalar.
pub fn to_char(value: &Value) -> Result<char> {
    let code = match value {
        Value::Char(c) => return Ok(*c),
        Value::String(s) => {
            let mut chars = s.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(parse_error(s, "char")),
            };
        }
        Value::Int(v, _) => u32::try_from(*v).ok(),
        Value::UInt(v, _) => u32::try_from(*v).ok(),
        Value::Float(f, _) if f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX) => {
            Some(*f as u32)
        }
        Value::Float(..) => None,
        other => return Err(no_scalar(other)),
    };
    code.and_then(char::from_u32).ok_or_else(|| {
        AccessError::NotRepresentable {
            value: value.to_string(),
            target: "char".to_string(),
        }
        .into()
    })
}

/// Convert `value` into `target`.
///
/// Containers convert into containers of the same shape, re-coercing each
/// non-empty element when `target` names an element kind.
pub fn coerce(value: Value, target: &Kind) -> Result<Value> {
    match target {
        Kind::Int(w) => {
            let v = match &value {
                Value::Float(f, _) => float_to_signed(*f, *w)?,
                other => w.wrap_signed(to_integer(other)?),
            };
            Ok(Value::Int(v, *w))
        }
        Kind::UInt(w) => {
            let v = match &value {
                Value::Float(f, _) => float_to_unsigned(*f, *w)?,
                other => w.wrap_unsigned(to_unsigned(other)?),
            };
            Ok(Value::UInt(v, *w))
        }
        Kind::Float(w) => Ok(Value::Float(w.round(to_double(&value)?), *w)),
        Kind::Char => Ok(Value::Char(to_char(&value)?)),
        Kind::String => match value {
            Value::String(s) => Ok(Value::String(s)),
            other => Ok(Value::String(to_text(&other)?)),
        },
        Kind::Sequence(element) => match value {
            Value::Sequence(seq) => match element.as_deref() {
                None => Ok(Value::Sequence(seq)),
                Some(k) => {
                    let items = seq
                        .into_items()
                        .into_iter()
                        .map(|item| coerce_element(item, k))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Value::Sequence(Sequence::from_items(Some(k.clone()), items)))
                }
            },
            other => Err(mismatch(target, &other)),
        },
        Kind::Map(element) => match value {
            Value::Map(map) => match element.as_deref() {
                None => Ok(Value::Map(map)),
                Some(k) => {
                    let entries = map
                        .into_entries()
                        .into_iter()
                        .map(|(key, item)| coerce_element(item, k).map(|v| (key, v)))
                        .collect::<Result<_>>()?;
                    Ok(Value::Map(Mapping::from_entries(Some(k.clone()), entries)))
                }
            },
            other => Err(mismatch(target, &other)),
        },
        Kind::Object(id) => match value {
            Value::Object(obj) if obj.adapter() == *id => Ok(Value::Object(obj)),
            Value::Object(obj) => Err(AccessError::AdapterMismatch {
                expected: *id,
                found: obj.adapter(),
            }
            .into()),
            other => Err(mismatch(target, &other)),
        },
    }
}

/// Value to store when `incoming` is assigned over `current`.
///
/// Empty and untyped containers take `incoming` as-is; every other kind is
/// fixed and `incoming` is coerced into it.
pub fn assign_rule(current: &Value, incoming: Value) -> Result<Value> {
    match current {
        Value::Empty => Ok(incoming),
        Value::Sequence(s) if s.element().is_none() => Ok(incoming),
        Value::Map(m) if m.element().is_none() => Ok(incoming),
        _ => match current.kind() {
            Some(kind) => coerce(incoming, &kind),
            None => Ok(incoming),
        },
    }
}

fn coerce_element(item: Value, kind: &Kind) -> Result<Value> {
    if item.is_empty() {
        Ok(item)
    } else {
        coerce(item, kind)
    }
}

fn float_to_signed(f: f64, width: IntWidth) -> Result<i64> {
    if f.is_nan() {
        return Err(nan_error(width, "int"));
    }
    Ok(width.saturate_signed(f))
}

fn float_to_unsigned(f: f64, width: IntWidth) -> Result<u64> {
    if f.is_nan() {
        return Err(nan_error(width, "uint"));
    }
    Ok(width.saturate_unsigned(f))
}

fn no_scalar(value: &Value) -> AnyError {
    if value.is_empty() {
        AccessError::Empty.into()
    } else {
        AccessError::NotScalar {
            kind: value.kind_name(),
        }
        .into()
    }
}

fn parse_error(input: &str, target: &str) -> AnyError {
    AccessError::Parse {
        input: input.to_string(),
        target: target.to_string(),
    }
    .into()
}

fn nan_error(width: IntWidth, prefix: &str) -> AnyError {
    AccessError::NotRepresentable {
        value: "NaN".to_string(),
        target: format!("{}{}", prefix, width.bits()),
    }
    .into()
}

fn mismatch(target: &Kind, found: &Value) -> AnyError {
    if found.is_empty() {
        return AccessError::Empty.into();
    }
    AccessError::KindMismatch {
        expected: target.to_string(),
        found: found.kind_name(),
    }
    .into()
}
