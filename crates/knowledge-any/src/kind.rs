// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value kinds and their textual grammar.
//!
//! ```text
//! kind   := scalar | "seq" [ "<" kind ">" ] | "map" [ "<" kind ">" ]
//! scalar := int8 | int16 | int32 | int64 | uint8 | uint16 | uint32 | uint64
//!         | float32 | float64 | char | string
//! ```

use crate::adapter::AdapterId;
use crate::error::AnyError;
use std::fmt;
use std::str::FromStr;

/// Declared integer width. Storage is always 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u8 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::W8),
            16 => Some(Self::W16),
            32 => Some(Self::W32),
            64 => Some(Self::W64),
            _ => None,
        }
    }

    /// Two's-complement wrap to this width, sign-extended back to 64 bits.
    pub fn wrap_signed(self, v: i64) -> i64 {
        match self {
            Self::W8 => v as i8 as i64,
            Self::W16 => v as i16 as i64,
            Self::W32 => v as i32 as i64,
            Self::W64 => v,
        }
    }

    /// Wrap to this width, zero-extended back to 64 bits.
    pub fn wrap_unsigned(self, v: u64) -> u64 {
        match self {
            Self::W8 => v as u8 as u64,
            Self::W16 => v as u16 as u64,
            Self::W32 => v as u32 as u64,
            Self::W64 => v,
        }
    }

    /// Truncate toward zero, saturating at the signed bounds of this width.
    pub fn saturate_signed(self, f: f64) -> i64 {
        match self {
            Self::W8 => f as i8 as i64,
            Self::W16 => f as i16 as i64,
            Self::W32 => f as i32 as i64,
            Self::W64 => f as i64,
        }
    }

    /// Truncate toward zero, saturating at the unsigned bounds of this width.
    pub fn saturate_unsigned(self, f: f64) -> u64 {
        match self {
            Self::W8 => f as u8 as u64,
            Self::W16 => f as u16 as u64,
            Self::W32 => f as u32 as u64,
            Self::W64 => f as u64,
        }
    }
}

/// Declared floating point width. Storage is always `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> u8 {
        match self {
            Self::F32 => 32,
            Self::F64 => 64,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            32 => Some(Self::F32),
            64 => Some(Self::F64),
            _ => None,
        }
    }

    /// Round to this width.
    pub fn round(self, f: f64) -> f64 {
        match self {
            Self::F32 => f as f32 as f64,
            Self::F64 => f,
        }
    }
}

/// Kind of value an [`Any`](crate::Any) or container slot holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Int(IntWidth),
    UInt(IntWidth),
    Float(FloatWidth),
    Char,
    String,
    /// Sequence with an optional element kind (`None` = untyped).
    Sequence(Option<Box<Kind>>),
    /// String-keyed map with an optional element kind.
    Map(Option<Box<Kind>>),
    /// Opaque object bound to an adapter.
    Object(AdapterId),
}

impl Kind {
    pub fn seq_of(element: Kind) -> Self {
        Self::Sequence(Some(Box::new(element)))
    }

    pub fn map_of(element: Kind) -> Self {
        Self::Map(Some(Box::new(element)))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::UInt(_) | Self::Float(_) | Self::Char | Self::String
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Map(_))
    }

    /// Element kind of a typed container.
    pub fn element(&self) -> Option<&Kind> {
        match self {
            Self::Sequence(e) | Self::Map(e) => e.as_deref(),
            _ => None,
        }
    }

    /// Adapter referenced by this kind, looking through container elements.
    pub fn object_adapter(&self) -> Option<AdapterId> {
        match self {
            Self::Object(id) => Some(*id),
            Self::Sequence(e) | Self::Map(e) => e.as_deref().and_then(Kind::object_adapter),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(w) => write!(f, "int{}", w.bits()),
            Self::UInt(w) => write!(f, "uint{}", w.bits()),
            Self::Float(w) => write!(f, "float{}", w.bits()),
            Self::Char => f.write_str("char"),
            Self::String => f.write_str("string"),
            Self::Sequence(None) => f.write_str("seq"),
            Self::Sequence(Some(e)) => write!(f, "seq<{}>", e),
            Self::Map(None) => f.write_str("map"),
            Self::Map(Some(e)) => write!(f, "map<{}>", e),
            Self::Object(id) => write!(f, "object<{}>", id),
        }
    }
}

impl FromStr for Kind {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        parse_kind(&compact).ok_or_else(|| AnyError::UnknownType(s.to_string()))
    }
}

fn parse_kind(s: &str) -> Option<Kind> {
    if let Some(kind) = parse_scalar(s) {
        return Some(kind);
    }
    let (head, inner) = match s.find('<') {
        Some(open) => {
            let inner = s[open + 1..].strip_suffix('>')?;
            (&s[..open], Some(parse_kind(inner)?))
        }
        None => (s, None),
    };
    let inner = inner.map(Box::new);
    match head {
        "seq" => Some(Kind::Sequence(inner)),
        "map" => Some(Kind::Map(inner)),
        _ => None,
    }
}

fn parse_scalar(s: &str) -> Option<Kind> {
    let kind = match s {
        "int8" => Kind::Int(IntWidth::W8),
        "int16" => Kind::Int(IntWidth::W16),
        "int32" => Kind::Int(IntWidth::W32),
        "int64" => Kind::Int(IntWidth::W64),
        "uint8" => Kind::UInt(IntWidth::W8),
        "uint16" => Kind::UInt(IntWidth::W16),
        "uint32" => Kind::UInt(IntWidth::W32),
        "uint64" => Kind::UInt(IntWidth::W64),
        "float32" => Kind::Float(FloatWidth::F32),
        "float64" => Kind::Float(FloatWidth::F64),
        "char" => Kind::Char,
        "string" => Kind::String,
        _ => return None,
    };
    Some(kind)
}
