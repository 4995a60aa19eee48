//! Attribute kinds and decoded values

use std::fmt;

/// How an attribute file is interpreted
///
/// A kind is fixed per attribute name: the same file must always be accessed
/// with the same kind (and, for percent attributes, the same `max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// `"0"` / `"1"` flag
    Flag,
    /// Integer text parsed in `base`. Writes are always decimal.
    Integer { base: u32 },
    /// Value in 0-100. With `max`, the file holds `0..=max`.
    Percent { max: Option<u32> },
    /// Raw byte payload
    Bytes,
    /// Text, surrounding whitespace stripped on read
    Text,
}

impl AttrKind {
    pub const INT: Self = Self::Integer { base: 10 };

    pub const fn percent_of(max: u32) -> Self {
        Self::Percent { max: Some(max) }
    }

    /// Whether values of `other` carry the same meaning as values of `self`.
    ///
    /// Integer bases only affect parsing, so they are ignored here; percent
    /// scale factors are not.
    pub fn same_meaning(&self, other: &AttrKind) -> bool {
        match (self, other) {
            (Self::Flag, Self::Flag)
            | (Self::Integer { .. }, Self::Integer { .. })
            | (Self::Bytes, Self::Bytes)
            | (Self::Text, Self::Text) => true,
            (Self::Percent { max: a }, Self::Percent { max: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "flag"),
            Self::Integer { base } => write!(f, "integer (base {base})"),
            Self::Percent { max: Some(max) } => write!(f, "percent of {max}"),
            Self::Percent { max: None } => write!(f, "percent"),
            Self::Bytes => write!(f, "bytes"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Decoded (external) attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Flag(bool),
    Integer(i64),
    Percent(f64),
    Bytes(Vec<u8>),
    Text(String),
}

impl AttrValue {
    /// Whether this value can be written to / read from an attribute of `kind`
    pub fn fits(&self, kind: &AttrKind) -> bool {
        matches!(
            (self, kind),
            (Self::Flag(_), AttrKind::Flag)
                | (Self::Integer(_), AttrKind::Integer { .. })
                | (Self::Percent(_), AttrKind::Percent { .. })
                | (Self::Bytes(_), AttrKind::Bytes)
                | (Self::Text(_), AttrKind::Text)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flag",
            Self::Integer(_) => "integer",
            Self::Percent(_) => "percent",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Self::Percent(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Whether an access may be served from / recorded in the value cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Always touch the file, leave the cache alone
    #[default]
    Bypass,
    /// Serve reads from the cache when possible and record the value
    Use,
}

impl CachePolicy {
    pub fn enabled(self) -> bool {
        matches!(self, CachePolicy::Use)
    }
}
