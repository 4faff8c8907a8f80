//! Null-literal rewriting and has-value tests.

use pretty_assertions::assert_eq;

use super::{translate, translator};
use crate::ast::builders::*;
use crate::ast::{Value, ValueType};
use crate::error::PredError;

#[test]
fn test_eq_null_literal() {
    let (sql, params) = translate(&field("nullableInt").eq(null(ValueType::Int)));
    assert_eq!(sql, "WHERE <nullableInt> IS NULL");
    assert!(params.is_empty());
}

#[test]
fn test_null_literal_on_the_left() {
    let (sql, params) = translate(&null(ValueType::Int).eq(field("nullableInt")));
    assert_eq!(sql, "WHERE <nullableInt> IS NULL");
    assert!(params.is_empty());
}

#[test]
fn test_ne_null_literal() {
    let (sql, params) = translate(&field("nullableInt").ne(None::<i32>));
    assert_eq!(sql, "WHERE <nullableInt> IS NOT NULL");
    assert!(params.is_empty());
}

#[test]
fn test_has_value_and_is_null() {
    assert_eq!(
        translate(&field("nullableInt").has_value()).0,
        "WHERE <nullableInt> IS NOT NULL"
    );
    assert_eq!(
        translate(&field("nullableInt").is_null()).0,
        "WHERE <nullableInt> IS NULL"
    );
}

#[test]
fn test_captured_has_value_then_compare() {
    let p = var("prm", Some(5))
        .has_value()
        .and(field("nullableInt").eq(var("prm", Some(5))));
    let (sql, params) = translate(&p);
    assert_eq!(sql, "WHERE @0 IS NOT NULL AND <nullableInt> = @1");
    assert_eq!(params, vec![Value::Int(5), Value::Int(5)]);
}

#[test]
fn test_captured_lacks_value_or_compare() {
    let p = (!var("prm", Some(5)).has_value()).or(field("nullableInt").eq(var("prm", Some(5))));
    let (sql, params) = translate(&p);
    assert_eq!(sql, "WHERE @0 IS NULL OR <nullableInt> = @1");
    assert_eq!(params, vec![Value::Int(5), Value::Int(5)]);

    let p = (!var("prm", None::<i32>).has_value())
        .or(field("nullableInt").eq(var("prm", None::<i32>)));
    let (sql, params) = translate(&p);
    assert_eq!(sql, "WHERE @0 IS NULL OR <nullableInt> = @1");
    assert_eq!(
        params,
        vec![Value::Null(ValueType::Int), Value::Null(ValueType::Int)]
    );
}

#[test]
fn test_captured_null_binds_typed_null() {
    let (sql, params) = translate(&field("nullableInt").eq(var("prm", None::<i32>)));
    assert_eq!(sql, "WHERE <nullableInt> = @0");
    assert_eq!(params, vec![Value::Null(ValueType::Int)]);
}

#[test]
fn test_negated_null_tests_flip() {
    assert_eq!(
        translate(&!field("nullableInt").is_null()).0,
        "WHERE <nullableInt> IS NOT NULL"
    );
    assert_eq!(
        translate(&!field("nullableInt").has_value()).0,
        "WHERE <nullableInt> IS NULL"
    );
    assert_eq!(
        translate(&!field("nullableInt").eq(None::<i32>)).0,
        "WHERE <nullableInt> IS NOT NULL"
    );
}

#[test]
fn test_null_inside_conjunction() {
    let p = field("aString")
        .eq("foo")
        .and(field("nullableInt").eq(None::<i32>));
    let (sql, params) = translate(&p);
    assert_eq!(sql, "WHERE <aString> = @0 AND <nullableInt> IS NULL");
    assert_eq!(params, vec![Value::String("foo".into())]);
}

#[test]
fn test_ordering_against_null_is_unsupported() {
    let err = translator()
        .compile("SomeEntity", &field("nullableInt").lt(None::<i32>))
        .unwrap_err();
    assert!(matches!(err, PredError::Unsupported { node: "comparison", .. }));
}

#[test]
fn test_null_against_null_is_unsupported() {
    let err = translator()
        .compile("SomeEntity", &null(ValueType::Int).eq(null(ValueType::Int)))
        .unwrap_err();
    assert!(matches!(err, PredError::Unsupported { .. }));
}
