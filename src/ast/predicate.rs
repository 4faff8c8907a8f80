use serde::{Deserialize, Serialize};

use crate::ast::{CompareOp, Value, ValueType};

/// A dotted member access path, e.g. `address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberPath(Vec<String>);

impl MemberPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Split a dotted string into segments.
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.'))
    }

    /// The member when the path has exactly one segment.
    pub fn single(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemberPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Where a member access is rooted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Owner {
    /// The predicate's subject entity; lowered to a quoted column.
    Entity,
    /// A variable captured from the enclosing scope, holding its current value.
    Captured(Value),
}

/// A value-producing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A literal with its declared type.
    Constant { value: Value, ty: ValueType },
    /// A member access rooted at the entity or at a captured variable.
    FieldRef { path: MemberPath, owner: Owner },
}

impl Operand {
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.value_type();
        Operand::Constant { value, ty }
    }

    /// The null literal of a given static type.
    pub fn null(ty: ValueType) -> Self {
        Operand::Constant {
            value: Value::Null(ty),
            ty,
        }
    }

    pub fn field(path: &str) -> Self {
        Operand::FieldRef {
            path: MemberPath::parse(path),
            owner: Owner::Entity,
        }
    }

    pub fn captured(path: &str, value: impl Into<Value>) -> Self {
        Operand::FieldRef {
            path: MemberPath::parse(path),
            owner: Owner::Captured(value.into()),
        }
    }

    /// True for the null literal. Captured variables holding null are not literals.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Operand::Constant { value, .. } if value.is_null())
    }

    /// The entity member path, when this operand reads an entity column.
    pub fn entity_path(&self) -> Option<&MemberPath> {
        match self {
            Operand::FieldRef {
                path,
                owner: Owner::Entity,
            } => Some(path),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Constant { value, .. } => write!(f, "{}", value),
            Operand::FieldRef {
                path,
                owner: Owner::Entity,
            } => write!(f, "x.{}", path),
            Operand::FieldRef {
                path,
                owner: Owner::Captured(_),
            } => write!(f, "${}", path),
        }
    }
}

/// A boolean-valued predicate node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    IsNull(Operand),
    IsNotNull(Operand),
    /// `item` is one of the literal `collection` values.
    Membership {
        item: Operand,
        collection: Vec<Value>,
    },
    /// A boolean operand used directly as a condition.
    Truth(Operand),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Short node name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Compare { .. } => "comparison",
            Predicate::Not(_) => "negation",
            Predicate::And(..) => "conjunction",
            Predicate::Or(..) => "disjunction",
            Predicate::IsNull(_) => "null test",
            Predicate::IsNotNull(_) => "not-null test",
            Predicate::Membership { .. } => "membership test",
            Predicate::Truth(_) => "truth test",
        }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Compare { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Predicate::Not(inner) => write!(f, "!({})", inner),
            Predicate::And(l, r) => write!(f, "({} && {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} || {})", l, r),
            Predicate::IsNull(o) => write!(f, "{}.is_none", o),
            Predicate::IsNotNull(o) => write!(f, "{}.has_value", o),
            Predicate::Membership { item, collection } => {
                write!(f, "{} in {}", item, Value::list(collection.clone()))
            }
            Predicate::Truth(o) => write!(f, "{}", o),
        }
    }
}
