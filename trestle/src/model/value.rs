//! Dynamic cell values and record field access.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::Serialize;

/// A dynamic value produced by a column accessor.
///
/// Every cell of the derived table carries one of these. Accessors for
/// string-keyed columns resolve through [`RowData::field`]; function
/// accessors produce them directly.
///
/// # Example
///
/// ```
/// use trestle::model::CellValue;
///
/// let name = CellValue::from("Contoso");
/// let revenue = CellValue::from(1_000_000i64);
/// let active = CellValue::from(true);
/// let empty = CellValue::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// Date and time with timezone.
    DateTime(DateTime<Utc>),
    /// Fallback for structured values (unique-value lists, extents).
    Json(serde_json::Value),
}

impl CellValue {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Decimal(_) => "decimal",
            CellValue::String(_) => "string",
            CellValue::DateTime(_) => "datetime",
            CellValue::Json(_) => "json",
        }
    }

    /// Numeric view of this value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Decimal(d) => d.to_f64(),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Returns `true` if this value cannot participate in an ordered
    /// comparison: nulls and NaN floats.
    pub fn is_unordered(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Converts a JSON value into a cell value.
    ///
    /// Scalars map onto their natural variants; arrays and objects fall
    /// back to [`CellValue::Json`].
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => CellValue::String(s.clone()),
            other => CellValue::Json(other.clone()),
        }
    }

    /// Total ordering across cell values.
    ///
    /// Same-type values compare naturally; the numeric variants coerce to
    /// a common representation first. Mixed non-numeric types compare by a
    /// fixed type rank so the result is deterministic rather than a panic.
    /// NaN compares after every concrete float.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Json(a), Json(b)) => a.to_string().cmp(&b.to_string()),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => {
                    a.partial_cmp(&b).unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        _ => Ordering::Equal,
                    })
                }
                _ => self.type_rank().cmp(&other.type_rank()),
            },
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) | CellValue::Decimal(_) => 2,
            CellValue::DateTime(_) => 3,
            CellValue::String(_) => 4,
            CellValue::Json(_) => 5,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Decimal(d) => write!(f, "{d}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            CellValue::Json(j) => write!(f, "{j}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::Decimal(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(v: DateTime<Utc>) -> Self {
        CellValue::DateTime(v)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Trait for record types whose fields can be read by name.
///
/// String-key column accessors resolve through this trait, so any record
/// shape works as table data as long as it can answer "what is the value
/// of field `key`". Function accessors bypass it entirely.
///
/// # Example
///
/// ```
/// use trestle::model::{CellValue, RowData};
///
/// #[derive(Clone)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl RowData for Person {
///     fn field(&self, key: &str) -> CellValue {
///         match key {
///             "name" => CellValue::from(self.name.as_str()),
///             "age" => CellValue::from(self.age),
///             _ => CellValue::Null,
///         }
///     }
/// }
/// ```
pub trait RowData: Send + Sync + Clone + 'static {
    /// Returns the value of the named field, or [`CellValue::Null`] when
    /// the record has no such field.
    fn field(&self, key: &str) -> CellValue;
}

impl RowData for HashMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or(CellValue::Null)
    }
}

impl RowData for serde_json::Value {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).map(CellValue::from_json).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Int(2).compare(&CellValue::Float(2.0)), Ordering::Equal);
        assert_eq!(CellValue::Int(1).compare(&CellValue::Float(1.5)), Ordering::Less);
        assert_eq!(CellValue::Float(3.0).compare(&CellValue::Int(2)), Ordering::Greater);
    }

    #[test]
    fn test_nan_sorts_after_floats() {
        assert_eq!(
            CellValue::Float(f64::NAN).compare(&CellValue::Float(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            CellValue::Float(f64::NAN).compare(&CellValue::Float(f64::NAN)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_mixed_types_rank_deterministically() {
        let a = CellValue::from("zebra");
        let b = CellValue::Int(10);
        let ab = a.compare(&b);
        let ba = b.compare(&a);
        assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn test_json_record_field_access() {
        let record = serde_json::json!({ "name": "Contoso", "age": 42, "tags": ["a"] });
        assert_eq!(record.field("name"), CellValue::from("Contoso"));
        assert_eq!(record.field("age"), CellValue::Int(42));
        assert_eq!(record.field("missing"), CellValue::Null);
        assert!(matches!(record.field("tags"), CellValue::Json(_)));
    }

    #[test]
    fn test_unordered_detection() {
        assert!(CellValue::Null.is_unordered());
        assert!(CellValue::Float(f64::NAN).is_unordered());
        assert!(!CellValue::Float(0.0).is_unordered());
        assert!(!CellValue::from("x").is_unordered());
    }
}
