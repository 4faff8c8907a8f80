//! Collection-membership lowering.

use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::{PredError, PredResult};
use crate::transpiler::translation::Chunk;
use crate::transpiler::traits::SqlGenerator;

/// How `item IN collection` is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStrategy {
    /// One placeholder per element: `item IN (@0, @1, …)`.
    #[default]
    Expand,
    /// The whole collection bound as one array: `item = ANY(@0)`.
    NativeArray,
    /// The whole collection bound as one table-valued parameter:
    /// `item IN (SELECT V FROM @0)`.
    TableValued,
}

impl MembershipStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MembershipStrategy::Expand => "expand",
            MembershipStrategy::NativeArray => "native_array",
            MembershipStrategy::TableValued => "table_valued",
        }
    }
}

impl std::fmt::Display for MembershipStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for MembershipStrategy {
    type Err = PredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "expand" | "inline" => Ok(MembershipStrategy::Expand),
            "native_array" | "array" => Ok(MembershipStrategy::NativeArray),
            "table_valued" | "tvp" => Ok(MembershipStrategy::TableValued),
            other => Err(PredError::Config(format!(
                "unknown membership strategy '{}'. Expected: expand, native_array, or table_valued",
                other
            ))),
        }
    }
}

/// Fail when `generator` cannot render `strategy`, whatever the collection.
pub(crate) fn ensure_supported(
    strategy: MembershipStrategy,
    generator: &dyn SqlGenerator,
) -> PredResult<()> {
    match strategy {
        MembershipStrategy::Expand => Ok(()),
        MembershipStrategy::NativeArray => generator
            .array_membership()
            .map(|_| ())
            .ok_or_else(|| PredError::dialect(generator.name(), "native array membership")),
        MembershipStrategy::TableValued => generator
            .table_valued_membership()
            .map(|_| ())
            .ok_or_else(|| PredError::dialect(generator.name(), "table-valued parameters")),
    }
}

/// Lower a non-empty membership test whose item is already compiled.
///
/// `bind` appends a value to the parameter list and returns its chunk.
pub(crate) fn lower(
    strategy: MembershipStrategy,
    generator: &dyn SqlGenerator,
    mut item: Vec<Chunk>,
    values: Vec<Value>,
    mut bind: impl FnMut(Value) -> Chunk,
) -> PredResult<Vec<Chunk>> {
    match strategy {
        MembershipStrategy::Expand => {
            item.push(Chunk::text(" IN ("));
            for (i, value) in values.into_iter().enumerate() {
                if i > 0 {
                    item.push(Chunk::text(", "));
                }
                item.push(bind(value));
            }
            item.push(Chunk::text(")"));
            Ok(item)
        }
        MembershipStrategy::NativeArray => {
            let (between, after) = generator
                .array_membership()
                .ok_or_else(|| PredError::dialect(generator.name(), "native array membership"))?;
            Ok(wrap_single(item, between, bind(Value::list(values)), after))
        }
        MembershipStrategy::TableValued => {
            let (between, after) = generator
                .table_valued_membership()
                .ok_or_else(|| PredError::dialect(generator.name(), "table-valued parameters"))?;
            Ok(wrap_single(item, between, bind(Value::list(values)), after))
        }
    }
}

fn wrap_single(mut item: Vec<Chunk>, between: &str, param: Chunk, after: &str) -> Vec<Chunk> {
    item.push(Chunk::text(between));
    item.push(param);
    item.push(Chunk::text(after));
    item
}
