use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Static type of a value, kept alongside nulls so they bind as typed nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    BigInt,
    Float,
    Decimal,
    String,
    Timestamp,
    Uuid,
    Array,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::BigInt => "bigint",
            ValueType::Float => "float",
            ValueType::Decimal => "decimal",
            ValueType::String => "string",
            ValueType::Timestamp => "timestamp",
            ValueType::Uuid => "uuid",
            ValueType::Array => "array",
        };
        f.write_str(name)
    }
}

/// A bindable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL of a known static type
    Null(ValueType),
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    BigInt(i64),
    /// Float
    Float(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// String
    String(String),
    /// Date and time without zone
    Timestamp(NaiveDateTime),
    /// UUID
    Uuid(Uuid),
    /// A whole collection bound as a single parameter
    List(ValueType, Vec<Value>),
}

impl Value {
    /// The static type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null(ty) => *ty,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::BigInt(_) => ValueType::BigInt,
            Value::Float(_) => ValueType::Float,
            Value::Decimal(_) => ValueType::Decimal,
            Value::String(_) => ValueType::String,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Uuid(_) => ValueType::Uuid,
            Value::List(..) => ValueType::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Bundle `items` into a single list value.
    ///
    /// The element type is taken from the first element, nulls included.
    pub fn list(items: Vec<Value>) -> Value {
        let elem = items
            .first()
            .map(Value::value_type)
            .unwrap_or(ValueType::String);
        Value::List(elem, items)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}L", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}m", d),
            Value::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Timestamp(ts) => write!(f, "'{}'", ts),
            Value::Uuid(u) => write!(f, "'{}'", u),
            Value::List(_, items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Rust types with a fixed SQL-side static type.
pub trait SqlTyped {
    const TYPE: ValueType;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl SqlTyped for $ty {
                const TYPE: ValueType = ValueType::$variant;
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    Decimal => Decimal,
    String => String,
    NaiveDateTime => Timestamp,
    Uuid => Uuid,
}

impl SqlTyped for &str {
    const TYPE: ValueType = ValueType::String;
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: SqlTyped + Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null(T::TYPE),
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: SqlTyped + Into<Value>,
{
    fn from(items: Vec<T>) -> Self {
        Value::List(T::TYPE, items.into_iter().map(Into::into).collect())
    }
}
