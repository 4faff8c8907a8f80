//! Multi-predicate conjunction tests.

use pretty_assertions::assert_eq;

use super::{strings, translator};
use crate::ast::ConjunctionWord;
use crate::ast::builders::*;
use crate::ast::Value;
use crate::error::PredError;
use crate::transpiler::{Shape, combine};

#[test]
fn test_or_of_two_equalities() {
    let t = translator()
        .compile_all(
            "SomeEntity",
            ConjunctionWord::Or,
            &[field("aString").eq("foo2"), field("aString").eq("foo")],
        )
        .unwrap();
    assert_eq!(t.sql(), "WHERE (<aString> = @0) OR (<aString> = @1)");
    assert_eq!(t.params(), strings(&["foo2", "foo"]).as_slice());
    assert_eq!(t.shape(), Shape::Or);
}

#[test]
fn test_and_of_disjunction_and_atom() {
    let t = translator()
        .compile_all(
            "SomeEntity",
            ConjunctionWord::And,
            &[
                field("anInt").eq(1).or(field("aLong").eq(2i64)),
                field("aString").eq("x"),
            ],
        )
        .unwrap();
    assert_eq!(
        t.sql(),
        "WHERE (<anInt> = @0 OR <aLong> = @1) AND (<aString> = @2)"
    );
    assert_eq!(
        t.params(),
        &[Value::Int(1), Value::BigInt(2), Value::String("x".into())]
    );
}

#[test]
fn test_renumbers_parameters() {
    let tr = translator();
    let x = tr.compile("SomeEntity", &field("x").eq(1)).unwrap();
    let y = tr.compile("SomeEntity", &field("y").eq(2)).unwrap();
    assert_eq!(x.sql(), "WHERE <x> = @0");
    assert_eq!(y.sql(), "WHERE <y> = @0");

    let t = combine(ConjunctionWord::And, vec![x, y]).unwrap();
    assert_eq!(t.sql(), "WHERE (<x> = @0) AND (<y> = @1)");
    assert_eq!(t.params(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_renumbers_across_three_parts() {
    let t = translator()
        .compile_all(
            "SomeEntity",
            ConjunctionWord::And,
            &[
                field("a").is_in([1, 2]),
                field("b").is_null(),
                field("c").eq(3).and(field("d").eq(4)),
            ],
        )
        .unwrap();
    assert_eq!(
        t.sql(),
        "WHERE (<a> IN (@0, @1)) AND (<b> IS NULL) AND (<c> = @2 AND <d> = @3)"
    );
    assert_eq!(t.params().len(), 4);
}

#[test]
fn test_single_predicate_is_unchanged() {
    let tr = translator();
    let p = field("anInt").eq(5).or(field("aLong").eq(6i64));
    let alone = tr.compile("SomeEntity", &p).unwrap();
    let combined = tr
        .compile_all("SomeEntity", ConjunctionWord::And, std::slice::from_ref(&p))
        .unwrap();
    assert_eq!(combined, alone);
    assert_eq!(combined.sql(), "WHERE <anInt> = @0 OR <aLong> = @1");
}

#[test]
fn test_empty_list_is_rejected() {
    let err = translator()
        .compile_all("SomeEntity", ConjunctionWord::Or, &[])
        .unwrap_err();
    assert!(matches!(err, PredError::Unsupported { node: "conjunction", .. }));
}
