//! Predicate AST.
//!
//! Predicates are built statically (see [`builders`]) or parsed from text
//! (see [`crate::parser`]). The tree is never mutated by compilation.

pub mod builders;
pub mod operators;
pub mod predicate;
pub mod values;

pub use operators::{CompareOp, ConjunctionWord};
pub use predicate::{MemberPath, Operand, Owner, Predicate};
pub use values::{SqlTyped, Value, ValueType};
