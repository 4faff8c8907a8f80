//! Builders for predicates.
//!
//! ```
//! use predsql::ast::builders::*;
//!
//! let p = field("anInt").eq(5).and(field("aString").eq("foo"));
//! assert_eq!(p.to_string(), "(x.anInt == 5 && x.aString == \"foo\")");
//! ```

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ast::{CompareOp, Operand, Predicate, SqlTyped, Value, ValueType};

/// Anything usable as one side of a comparison.
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

impl IntoOperand for Value {
    fn into_operand(self) -> Operand {
        Operand::constant(self)
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self) -> Operand {
                    Operand::constant(self)
                }
            }
        )*
    };
}

literal_operand!(bool, i32, i64, f64, Decimal, String, &str, NaiveDateTime, Uuid);

impl<T: SqlTyped + Into<Value>> IntoOperand for Option<T> {
    fn into_operand(self) -> Operand {
        Operand::constant(self)
    }
}

/// An entity member.
pub fn field(member: &str) -> Operand {
    Operand::field(member)
}

/// A captured variable (or a dotted member of one) holding `value`.
pub fn var(path: &str, value: impl Into<Value>) -> Operand {
    Operand::captured(path, value)
}

/// A literal.
pub fn lit(value: impl Into<Value>) -> Operand {
    Operand::constant(value)
}

/// The null literal, typed.
pub fn null(ty: ValueType) -> Operand {
    Operand::null(ty)
}

fn compare(op: CompareOp, left: Operand, right: impl IntoOperand) -> Predicate {
    Predicate::Compare {
        op,
        left,
        right: right.into_operand(),
    }
}

impl Operand {
    pub fn eq(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Eq, self, rhs)
    }

    pub fn ne(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Ne, self, rhs)
    }

    pub fn lt(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Lt, self, rhs)
    }

    pub fn le(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Le, self, rhs)
    }

    pub fn gt(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Gt, self, rhs)
    }

    pub fn ge(self, rhs: impl IntoOperand) -> Predicate {
        compare(CompareOp::Ge, self, rhs)
    }

    /// `IS NULL`
    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(self)
    }

    /// "has a value" test, i.e. `IS NOT NULL`
    pub fn has_value(self) -> Predicate {
        Predicate::IsNotNull(self)
    }

    /// Membership in a fixed collection.
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        Predicate::Membership {
            item: self,
            collection: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Use a boolean operand directly as a condition.
    pub fn truth(self) -> Predicate {
        Predicate::Truth(self)
    }
}

/// Fold predicates left-to-right with AND. `None` when empty.
pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
    preds.into_iter().reduce(Predicate::and)
}

/// Fold predicates left-to-right with OR. `None` when empty.
pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
    preds.into_iter().reduce(Predicate::or)
}
