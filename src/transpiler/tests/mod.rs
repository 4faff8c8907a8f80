//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: comparisons, logical nesting, negation
//! - `nulls`: null-literal rewriting and has-value tests
//! - `combine`: multi-predicate conjunctions and renumbering
//! - `dialects`: identifier quoting and native placeholders
//! - `membership`: collection membership strategies
//! - `convert`: per-member value converters and column overrides

mod combine;
mod membership;
mod nulls;

use crate::ast::{Predicate, Value};
use crate::schema::IdentityResolver;
use crate::transpiler::{SqlGenerator, Translator};

/// Quotes identifiers as `<name>` so expected SQL stays readable.
pub(super) struct AngleQuoter;

impl SqlGenerator for AngleQuoter {
    fn name(&self) -> &str {
        "angle"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("<{}>", name)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@{}", index - 1)
    }
}

pub(super) fn translator() -> Translator<'static> {
    Translator::new(&AngleQuoter, &IdentityResolver)
}

pub(super) fn translate(p: &Predicate) -> (String, Vec<Value>) {
    translator()
        .compile("SomeEntity", p)
        .expect("predicate should compile")
        .into_parts()
}

pub(super) fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::String(s.to_string())).collect()
}
