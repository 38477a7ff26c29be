//! Bound parameter values.
//!
//! Builders own their arguments as [`Value`]s so one statement can be rendered
//! for either dialect and handed to any driver. For PostgreSQL, `Value`
//! implements `tokio_postgres::types::ToSql` and adapts integer/float width to
//! the parameter type the server reports.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single bound argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
}

impl Value {
    /// Serialize any value into a JSON parameter.
    pub fn json<T>(value: &T) -> serde_json::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map(Value::Json)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use qbd::{args, Value};
///
/// let v = args![1, "alice", true];
/// assert_eq!(v, vec![Value::Int(1), Value::Text("alice".into()), Value::Bool(true)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider than i64 on some inputs; values past `i64::MAX` saturate.
macro_rules! impl_from_int_saturating {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_from_int_saturating!(u64, usize);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Encode through `T` after checking it accepts the server-side type.
fn encode<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(format!(
            "cannot bind {} to a parameter of type {}",
            std::any::type_name::<T>(),
            ty
        )
        .into());
    }
    value.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => encode(v, ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => encode(&i16::try_from(*v)?, ty, out),
                Type::INT4 => encode(&i32::try_from(*v)?, ty, out),
                Type::FLOAT4 => encode(&(*v as f32), ty, out),
                Type::FLOAT8 => encode(&(*v as f64), ty, out),
                _ => encode(v, ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => encode(&(*v as f32), ty, out),
                _ => encode(v, ty, out),
            },
            Value::Text(v) => encode(v, ty, out),
            Value::Bytes(v) => encode(v, ty, out),
            Value::Json(v) => encode(v, ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => encode(&v.naive_utc(), ty, out),
                _ => encode(v, ty, out),
            },
            Value::Uuid(v) => encode(v, ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Checked per variant in `to_sql`.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(7_u8), Value::Int(7));
        assert_eq!(Value::from(2.5_f64), Value::Float(2.5));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("y")), Value::Text("y".to_string()));
        assert!(Value::from(None::<String>).is_null());
    }

    #[test]
    fn unsigned_sizes_saturate() {
        let ids = vec![10, 20, 30];
        assert_eq!(args![ids.len()], vec![Value::Int(3)]);
        assert_eq!(Value::from(42_u64), Value::Int(42));
        assert_eq!(Value::from(u64::MAX), Value::Int(i64::MAX));
        assert_eq!(Value::from(-5_isize), Value::Int(-5));
    }

    #[test]
    fn args_macro_mixes_types() {
        let v = args![1, "a", 2.0_f64, None::<i64>];
        assert_eq!(
            v,
            vec![Value::Int(1), Value::Text("a".into()), Value::Float(2.0), Value::Null]
        );
        assert!(args![].is_empty());
    }

    #[test]
    fn json_helper_serializes() {
        #[derive(Serialize)]
        struct Meta {
            tags: Vec<&'static str>,
        }
        let v = Value::json(&Meta { tags: vec!["a"] }).unwrap();
        assert_eq!(v, Value::Json(serde_json::json!({ "tags": ["a"] })));
    }

    #[test]
    fn int_adapts_to_parameter_width() {
        let mut buf = BytesMut::new();
        Value::Int(5).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &5_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Int(5).to_sql(&Type::INT8, &mut buf).unwrap();
        assert_eq!(&buf[..], &5_i64.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::from(i32::MAX) + 1).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn null_and_type_mismatch() {
        let mut buf = BytesMut::new();
        assert!(matches!(Value::Null.to_sql(&Type::TEXT, &mut buf), Ok(IsNull::Yes)));
        assert!(Value::Bool(true).to_sql(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&args![1, "a", None::<i32>]).unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);
    }
}
