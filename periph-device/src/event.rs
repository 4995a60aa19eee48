//! State-change events delivered to observers
//!
//! An event is the ordered tuple `("effect", <origin>, <effect name>, args...)`.
//! Consumers match on position, so argument order is part of the contract:
//! colours are `r, g, b` in that order, speeds come where the setter takes
//! them, brightness is a single float percent.

use std::fmt;

/// Event category (first tuple element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Effect/lighting state change
    Effect,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Effect => "effect",
        }
    }
}

/// Identity of the device that raised an event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub index: usize,
    pub class: &'static str,
    pub serial: String,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.serial)
    }
}

/// Positional event argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventArg {
    Byte(u8),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Slot with no value (a colour the receiver picks itself)
    Absent,
}

impl From<u8> for EventArg {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<i64> for EventArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for EventArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for EventArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Absent => write!(f, "None"),
        }
    }
}

/// A state-change notification
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub category: EventCategory,
    pub origin: Origin,
    pub name: &'static str,
    pub args: Vec<EventArg>,
}

impl Event {
    pub fn effect(origin: Origin, name: &'static str, args: Vec<EventArg>) -> Self {
        Self {
            category: EventCategory::Effect,
            origin,
            name,
            args,
        }
    }

    pub fn is_effect(&self) -> bool {
        self.category == EventCategory::Effect
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(\"{}\", {}, \"{}\"",
            self.category.as_str(),
            self.origin,
            self.name
        )?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display_is_positional() {
        let origin = Origin {
            index: 0,
            class: "chroma_keyboard",
            serial: "XX01".into(),
        };
        let event = Event::effect(origin, "setStatic", vec![255u8.into(), 0u8.into(), 16u8.into()]);
        assert_eq!(
            event.to_string(),
            "(\"effect\", chroma_keyboard:XX01, \"setStatic\", 255, 0, 16)"
        );
    }

    #[test]
    fn test_absent_args_keep_their_position() {
        let origin = Origin {
            index: 0,
            class: "chroma_keyboard",
            serial: "XX01".into(),
        };
        let args = vec![EventArg::Absent, EventArg::Absent, EventArg::Absent, 0.05.into()];
        let event = Event::effect(origin, "setRipple", args);
        assert_eq!(
            event.to_string(),
            "(\"effect\", chroma_keyboard:XX01, \"setRipple\", None, None, None, 0.05)"
        );
    }
}
