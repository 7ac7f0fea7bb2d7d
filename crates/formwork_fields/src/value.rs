//! Typed field values and their type tags.
//!
//! Every field is registered with a [`FieldType`] tag. Values travel through
//! the engine as [`FieldValue`], a closed sum of the supported payloads, and
//! absent values are represented as `None`. The tag recorded at registration
//! is checked explicitly at every read and write boundary.
//!
//! # Example
//!
//! ```
//! use formwork_fields::value::{FieldType, FieldValue};
//!
//! let value = FieldValue::from("alice@example.com");
//! assert_eq!(value.field_type(), FieldType::Text);
//! assert!(FieldType::Text.accepts(Some(&value)));
//! assert!(FieldType::Integer.accepts(None));
//! ```

use core::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validator::ErrorMessage;

/// Current values keyed by field name, in registration order.
pub type FieldValues = IndexMap<String, Option<FieldValue>>;

/// Validation errors keyed by field name. Only invalid fields are present.
pub type FieldErrors = IndexMap<String, ErrorMessage>;

// ─────────────────────────────────────────────────────────────────────────────
// FieldType
// ─────────────────────────────────────────────────────────────────────────────

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Free-form text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point number.
    Float,
    /// Boolean flag.
    Bool,
    /// List of text values (e.g. a multi-select).
    List,
}

impl FieldType {
    /// Returns the display name of this type tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Bool => "Bool",
            Self::List => "List",
        }
    }

    /// Returns whether a value may be stored in a field of this type.
    ///
    /// Absent values are compatible with every type. There is no implicit
    /// widening: an `Integer` value is rejected by a `Float` field.
    #[must_use]
    pub fn accepts(self, value: Option<&FieldValue>) -> bool {
        value.is_none_or(|value| value.field_type() == self)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldValue
// ─────────────────────────────────────────────────────────────────────────────

/// A value stored in a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text payload.
    Text(String),
    /// Integer payload.
    Integer(i64),
    /// Floating point payload.
    Float(f64),
    /// Boolean payload.
    Bool(bool),
    /// List payload.
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Integer(_) => FieldType::Integer,
            Self::Float(_) => FieldType::Float,
            Self::Bool(_) => FieldType::Bool,
            Self::List(_) => FieldType::List,
        }
    }

    /// Returns the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float value.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the numeric payload widened to `f64`, for integers and floats.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns whether the value is blank: whitespace-only text or an empty list.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Integer(_) | Self::Float(_) | Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FromFieldValue
// ─────────────────────────────────────────────────────────────────────────────

/// Conversion from a stored field value into a concrete Rust type.
///
/// Used by typed reads; a conversion that returns `None` is reported as a
/// type mismatch by the caller.
pub trait FromFieldValue: Sized {
    /// The field type this Rust type reads from.
    fn expected_type() -> FieldType;

    /// Converts a stored value, returning `None` if it is incompatible.
    fn from_field_value(value: Option<&FieldValue>) -> Option<Self>;
}

impl FromFieldValue for String {
    fn expected_type() -> FieldType {
        FieldType::Text
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        value.and_then(FieldValue::as_text).map(ToOwned::to_owned)
    }
}

impl FromFieldValue for i64 {
    fn expected_type() -> FieldType {
        FieldType::Integer
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        value.and_then(FieldValue::as_integer)
    }
}

impl FromFieldValue for f64 {
    fn expected_type() -> FieldType {
        FieldType::Float
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        value.and_then(FieldValue::as_float)
    }
}

impl FromFieldValue for bool {
    fn expected_type() -> FieldType {
        FieldType::Bool
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        value.and_then(FieldValue::as_bool)
    }
}

impl FromFieldValue for Vec<String> {
    fn expected_type() -> FieldType {
        FieldType::List
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        value.and_then(FieldValue::as_list).map(<[String]>::to_vec)
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn expected_type() -> FieldType {
        T::expected_type()
    }

    fn from_field_value(value: Option<&FieldValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(value) => T::from_field_value(Some(value)).map(Some),
        }
    }
}
