//! Per-member value converters.
//!
//! A converter maps an application-level value to its storage representation
//! right before it is bound as a parameter.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{Value, ValueType};

/// Transform applied to a value bound against a particular member.
pub trait ValueConverter: Send + Sync {
    /// Registry name, referenced from entity metadata.
    fn name(&self) -> &str;

    /// Map a value to what gets bound. `Err` carries the reason it was rejected.
    fn to_db(&self, value: &Value) -> Result<Value, String>;
}

/// A converter backed by a closure.
pub struct FnConverter<F> {
    name: String,
    f: F,
}

impl<F> FnConverter<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> ValueConverter for FnConverter<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn to_db(&self, value: &Value) -> Result<Value, String> {
        (self.f)(value)
    }
}

/// Named converters available to a schema.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn ValueConverter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_fn("bool_as_string", bool_as_string);
        registry.register_fn("bool_as_int", bool_as_int);
        registry.register_fn("uuid_as_string", uuid_as_string);
        registry.register_fn("timestamp_as_string", timestamp_as_string);
        registry.register_fn("lowercase", lowercase);
        registry
    }

    /// Add a converter under its own name, replacing any previous one.
    pub fn register(&mut self, converter: Arc<dyn ValueConverter>) {
        self.converters
            .insert(converter.name().to_string(), converter);
    }

    pub fn register_fn<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnConverter::new(name, f)));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ValueConverter>> {
        self.converters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .finish()
    }
}

fn bool_as_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(true) => Ok(Value::String("true".into())),
        Value::Bool(false) => Ok(Value::String("false".into())),
        Value::Null(ValueType::Bool) => Ok(Value::String("null".into())),
        other => Err(format!("expected a bool, got {}", other.value_type())),
    }
}

fn bool_as_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(b) => Ok(Value::Int(i32::from(*b))),
        Value::Null(ValueType::Bool) => Ok(Value::Null(ValueType::Int)),
        other => Err(format!("expected a bool, got {}", other.value_type())),
    }
}

fn uuid_as_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::Uuid(u) => Ok(Value::String(u.hyphenated().to_string())),
        Value::Null(ValueType::Uuid) => Ok(Value::Null(ValueType::String)),
        other => Err(format!("expected a uuid, got {}", other.value_type())),
    }
}

fn timestamp_as_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::Timestamp(ts) => Ok(Value::String(
            ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        )),
        Value::Null(ValueType::Timestamp) => Ok(Value::Null(ValueType::String)),
        other => Err(format!("expected a timestamp, got {}", other.value_type())),
    }
}

fn lowercase(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        Value::Null(ValueType::String) => Ok(value.clone()),
        other => Err(format!("expected a string, got {}", other.value_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bool_as_string() {
        let reg = ConverterRegistry::with_builtins();
        let conv = reg.get("bool_as_string").unwrap();
        assert_eq!(conv.to_db(&Value::Bool(true)).unwrap(), Value::String("true".into()));
        assert_eq!(
            conv.to_db(&Value::Null(ValueType::Bool)).unwrap(),
            Value::String("null".into())
        );
        assert!(conv.to_db(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(7, 8, 9, 250)
            .unwrap();
        let out = timestamp_as_string(&Value::Timestamp(ts)).unwrap();
        assert_eq!(out, Value::String("2024-03-05 07:08:09.250".into()));
    }

    #[test]
    fn test_custom_converter_replaces_builtin() {
        let mut reg = ConverterRegistry::with_builtins();
        reg.register_fn("lowercase", |_| Ok(Value::String("fixed".into())));
        let conv = reg.get("lowercase").unwrap();
        assert_eq!(conv.to_db(&Value::String("ABC".into())).unwrap(), Value::String("fixed".into()));
        assert_eq!(
            reg.names(),
            vec!["bool_as_int", "bool_as_string", "lowercase", "timestamp_as_string", "uuid_as_string"]
        );
    }
}
