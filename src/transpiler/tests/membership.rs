//! Collection membership strategy tests.

use pretty_assertions::assert_eq;

use super::translate;
use crate::ast::builders::*;
use crate::ast::{Value, ValueType};
use crate::convert::ConverterRegistry;
use crate::error::PredError;
use crate::schema::{EntityDef, IdentityResolver, MemberDef, Schema};
use crate::transpiler::{ALWAYS_FALSE, Dialect, MembershipStrategy, Translator};

fn with_strategy(dialect: Dialect, strategy: MembershipStrategy) -> Translator<'static> {
    Translator::new(dialect.generator(), &IdentityResolver).with_membership(strategy)
}

#[test]
fn test_expand_one_placeholder_per_element() {
    let (sql, params) = translate(&field("anInt").is_in([1, 2, 3]));
    assert_eq!(sql, "WHERE <anInt> IN (@0, @1, @2)");
    assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_empty_collection_is_always_false() {
    let (sql, params) = translate(&field("anInt").is_in(Vec::<i32>::new()));
    assert_eq!(sql, format!("WHERE {}", ALWAYS_FALSE));
    assert!(params.is_empty());
}

#[test]
fn test_empty_collection_binds_nothing_for_captured_item() {
    let (sql, params) = translate(&var("v", 3).is_in(Vec::<i32>::new()));
    assert_eq!(sql, "WHERE 1 = 0");
    assert!(params.is_empty());
}

#[test]
fn test_membership_after_other_params() {
    let p = field("aString").eq("a").and(field("anInt").is_in([6, 7]));
    let (sql, params) = translate(&p);
    assert_eq!(sql, "WHERE <aString> = @0 AND <anInt> IN (@1, @2)");
    assert_eq!(params.len(), 3);
}

#[test]
fn test_negated_membership() {
    let (sql, _) = translate(&!field("anInt").is_in([6, 7]));
    assert_eq!(sql, "WHERE NOT (<anInt> IN (@0, @1))");
}

#[test]
fn test_native_array_on_postgres() {
    let t = with_strategy(Dialect::Postgresql, MembershipStrategy::NativeArray)
        .compile("SomeEntity", &field("anInt").is_in([1, 2]))
        .unwrap();
    assert_eq!(t.sql(), "WHERE \"anInt\" = ANY(@0)");
    assert_eq!(
        t.params(),
        &[Value::List(ValueType::Int, vec![Value::Int(1), Value::Int(2)])]
    );
    assert_eq!(
        t.to_native_sql(Dialect::Postgresql.generator()),
        "WHERE \"anInt\" = ANY($1)"
    );
}

#[test]
fn test_table_valued_on_sqlserver() {
    let t = with_strategy(Dialect::SqlServer, MembershipStrategy::TableValued)
        .compile("SomeEntity", &field("aString").is_in(["a", "b"]))
        .unwrap();
    assert_eq!(t.sql(), "WHERE [aString] IN (SELECT V FROM @0)");
    assert_eq!(t.params().len(), 1);
}

#[test]
fn test_native_array_requires_support() {
    let err = with_strategy(Dialect::Sqlite, MembershipStrategy::NativeArray)
        .compile("SomeEntity", &field("anInt").is_in([1]))
        .unwrap_err();
    match err {
        PredError::UnsupportedDialect { dialect, .. } => assert_eq!(dialect, "sqlite"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_table_valued_requires_support() {
    let err = with_strategy(Dialect::Postgresql, MembershipStrategy::TableValued)
        .compile("SomeEntity", &field("anInt").is_in([1]))
        .unwrap_err();
    assert!(matches!(err, PredError::UnsupportedDialect { .. }));
}

#[test]
fn test_constant_item_is_unsupported() {
    let err = with_strategy(Dialect::Sqlite, MembershipStrategy::Expand)
        .compile("SomeEntity", &lit(1).is_in([1, 2]))
        .unwrap_err();
    assert!(matches!(err, PredError::Unsupported { node: "membership test", .. }));
}

#[test]
fn test_empty_collection_still_resolves_item() {
    let schema = Schema::build(
        vec![EntityDef::new("SomeEntity").member(MemberDef::new("anInt"))],
        &ConverterRegistry::with_builtins(),
    )
    .unwrap();
    let translator = Translator::for_schema(Dialect::Sqlite.generator(), &schema);

    let err = translator
        .compile("SomeEntity", &field("missing").is_in(Vec::<i32>::new()))
        .unwrap_err();
    assert!(matches!(err, PredError::UnresolvableColumn { .. }));

    let t = translator
        .compile("SomeEntity", &field("anInt").is_in(Vec::<i32>::new()))
        .unwrap();
    assert_eq!(t.sql(), format!("WHERE {}", ALWAYS_FALSE));
}

#[test]
fn test_empty_collection_rejects_nested_path() {
    let err = with_strategy(Dialect::Sqlite, MembershipStrategy::Expand)
        .compile("SomeEntity", &field("a.b").is_in(Vec::<i32>::new()))
        .unwrap_err();
    assert!(matches!(err, PredError::Unsupported { node: "member access", .. }));
}

#[test]
fn test_empty_collection_checks_strategy_support() {
    let err = with_strategy(Dialect::Sqlite, MembershipStrategy::NativeArray)
        .compile("SomeEntity", &field("anInt").is_in(Vec::<i32>::new()))
        .unwrap_err();
    assert!(matches!(err, PredError::UnsupportedDialect { .. }));

    let t = with_strategy(Dialect::Postgresql, MembershipStrategy::NativeArray)
        .compile("SomeEntity", &field("anInt").is_in(Vec::<i32>::new()))
        .unwrap();
    assert_eq!(t.sql(), "WHERE 1 = 0");
    assert!(t.params().is_empty());
}
