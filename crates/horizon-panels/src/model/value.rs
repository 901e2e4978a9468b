//! Cell values and per-column value kinds.
//!
//! Column getters produce a [`CellValue`]. Each column also declares a
//! [`ValueKind`] up front, which is what the display layer uses to choose a
//! renderer and what the default editor uses to parse input.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::error::EditError;

/// A value produced or accepted by a table cell.
#[derive(Clone, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    None,
    /// Text.
    Text(String),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Anything else; rendered by the column's delegate.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl CellValue {
    /// Wrap an arbitrary value.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        CellValue::Custom(Arc::new(value))
    }

    /// Returns `true` for [`CellValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, CellValue::None)
    }

    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            CellValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Downcast a custom value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            CellValue::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take the text out of a text value.
    pub fn into_text(self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The kind this value naturally belongs to, or `None` for an empty value.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            CellValue::None => None,
            CellValue::Text(_) => Some(ValueKind::Text),
            CellValue::Int(_) | CellValue::Float(_) => Some(ValueKind::Number),
            CellValue::Bool(_) => Some(ValueKind::Boolean),
            CellValue::Custom(_) => Some(ValueKind::Custom),
        }
    }
}

impl fmt::Debug for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::None => write!(f, "None"),
            CellValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            CellValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            CellValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            CellValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            CellValue::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::None => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Custom(_) => f.write_str("<custom>"),
        }
    }
}

/// Custom values compare by identity.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::None, CellValue::None) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Custom(a), CellValue::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::Text(s.clone())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Float(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::None, Into::into)
    }
}

/// The declared kind of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    /// Free text.
    #[default]
    Text,
    /// Integer or floating point.
    Number,
    /// True/false, typically shown as a check box.
    Boolean,
    /// Application-defined; needs a delegate to render or edit.
    Custom,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Custom => "custom value",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    /// Whether `value` fits this kind. Empty values fit every kind.
    pub fn accepts(&self, value: &CellValue) -> bool {
        match value.kind() {
            None => true,
            Some(kind) => kind == *self,
        }
    }

    /// Parse raw editor input into a value of this kind.
    ///
    /// Blank input yields [`CellValue::None`] for every kind but text.
    pub fn parse_input(&self, input: &str) -> Result<CellValue, EditError> {
        let trimmed = input.trim();
        match self {
            ValueKind::Text => Ok(CellValue::Text(input.to_string())),
            _ if trimmed.is_empty() => Ok(CellValue::None),
            ValueKind::Number => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    Ok(CellValue::Int(n))
                } else {
                    trimmed
                        .parse::<f64>()
                        .map(CellValue::Float)
                        .map_err(|_| EditError::new(format!("'{trimmed}' is not a number")))
                }
            }
            ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(CellValue::Bool(true)),
                "false" | "no" | "0" => Ok(CellValue::Bool(false)),
                _ => Err(EditError::new(format!("'{trimmed}' is not true or false"))),
            },
            ValueKind::Custom => Err(EditError::new(
                "custom values need a cell delegate to be edited",
            )),
        }
    }
}
