//! Recursive lowering of one predicate into SQL chunks and parameters.

use crate::ast::{CompareOp, MemberPath, Operand, Owner, Predicate, Value, ValueType};
use crate::error::{PredError, PredResult};
use crate::schema::{ColumnResolver, ConverterLookup};
use crate::transpiler::membership::{self, MembershipStrategy};
use crate::transpiler::traits::SqlGenerator;
use crate::transpiler::translation::{Chunk, Shape, Translation};

/// The always-false condition an empty membership test lowers to.
pub const ALWAYS_FALSE: &str = "1 = 0";

struct Fragment {
    chunks: Vec<Chunk>,
    shape: Shape,
}

impl Fragment {
    fn atom(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            shape: Shape::Atom,
        }
    }
}

/// Per-call compilation state. Parameters are appended in emission order.
pub(crate) struct Compiler<'t> {
    generator: &'t dyn SqlGenerator,
    resolver: &'t dyn ColumnResolver,
    converters: Option<&'t dyn ConverterLookup>,
    membership: MembershipStrategy,
    entity: &'t str,
    params: Vec<Value>,
}

impl<'t> Compiler<'t> {
    pub fn new(
        generator: &'t dyn SqlGenerator,
        resolver: &'t dyn ColumnResolver,
        converters: Option<&'t dyn ConverterLookup>,
        membership: MembershipStrategy,
        entity: &'t str,
    ) -> Self {
        Self {
            generator,
            resolver,
            converters,
            membership,
            entity,
            params: Vec::new(),
        }
    }

    pub fn finish(mut self, predicate: &Predicate) -> PredResult<Translation> {
        let fragment = self.predicate(predicate)?;
        Ok(Translation::new(fragment.chunks, self.params, fragment.shape))
    }

    fn predicate(&mut self, predicate: &Predicate) -> PredResult<Fragment> {
        match predicate {
            Predicate::Compare { op, left, right } => self.compare(*op, left, right),
            Predicate::Not(inner) => self.negation(inner),
            Predicate::And(l, r) => self.logical(Shape::And, l, r),
            Predicate::Or(l, r) => self.logical(Shape::Or, l, r),
            Predicate::IsNull(o) => self.null_test(o, " IS NULL"),
            Predicate::IsNotNull(o) => self.null_test(o, " IS NOT NULL"),
            Predicate::Membership { item, collection } => self.membership(item, collection),
            Predicate::Truth(o) => self.truth(o, true),
        }
    }

    fn compare(&mut self, op: CompareOp, left: &Operand, right: &Operand) -> PredResult<Fragment> {
        match (left.is_null_literal(), right.is_null_literal()) {
            (true, true) => Err(PredError::unsupported(
                "comparison",
                "both sides are the null literal",
            )),
            (false, true) => self.null_comparison(op, left),
            (true, false) => self.null_comparison(op, right),
            (false, false) => {
                let mut chunks = self.operand(left, right.entity_path())?;
                chunks.push(Chunk::text(format!(" {} ", op.sql_symbol())));
                chunks.extend(self.operand(right, left.entity_path())?);
                Ok(Fragment::atom(chunks))
            }
        }
    }

    fn null_comparison(&mut self, op: CompareOp, other: &Operand) -> PredResult<Fragment> {
        match op {
            CompareOp::Eq => self.null_test(other, " IS NULL"),
            CompareOp::Ne => self.null_test(other, " IS NOT NULL"),
            _ => Err(PredError::unsupported(
                "comparison",
                format!("'{}' against the null literal", op),
            )),
        }
    }

    fn null_test(&mut self, operand: &Operand, keyword: &str) -> PredResult<Fragment> {
        let mut chunks = self.operand(operand, None)?;
        chunks.push(Chunk::text(keyword));
        Ok(Fragment::atom(chunks))
    }

    fn negation(&mut self, inner: &Predicate) -> PredResult<Fragment> {
        match inner {
            Predicate::Compare { op, left, right } => self.compare(op.negate(), left, right),
            Predicate::Not(twice) => self.predicate(twice),
            Predicate::IsNull(o) => self.null_test(o, " IS NOT NULL"),
            Predicate::IsNotNull(o) => self.null_test(o, " IS NULL"),
            Predicate::Truth(o) => self.truth(o, false),
            Predicate::And(..) | Predicate::Or(..) | Predicate::Membership { .. } => {
                let fragment = self.predicate(inner)?;
                let mut chunks = vec![Chunk::text("NOT (")];
                chunks.extend(fragment.chunks);
                chunks.push(Chunk::text(")"));
                Ok(Fragment::atom(chunks))
            }
        }
    }

    fn logical(&mut self, shape: Shape, left: &Predicate, right: &Predicate) -> PredResult<Fragment> {
        let keyword = match shape {
            Shape::Or => " OR ",
            _ => " AND ",
        };
        let left = self.predicate(left)?;
        let right = self.predicate(right)?;

        let mut chunks = group(left, shape);
        chunks.push(Chunk::text(keyword));
        chunks.extend(group(right, shape));
        Ok(Fragment { chunks, shape })
    }

    fn truth(&mut self, operand: &Operand, expected: bool) -> PredResult<Fragment> {
        let bound = match operand {
            Operand::Constant { value, .. } => Some(value),
            Operand::FieldRef {
                owner: Owner::Captured(value),
                ..
            } => Some(value),
            Operand::FieldRef { .. } => None,
        };
        if let Some(value) = bound
            && value.value_type() != ValueType::Bool
        {
            return Err(PredError::unsupported(
                "truth test",
                format!("'{}' is not a boolean", operand),
            ));
        }

        let mut chunks = self.operand(operand, None)?;
        chunks.push(Chunk::text(" = "));
        chunks.push(self.bind(&Value::Bool(expected), operand.entity_path())?);
        Ok(Fragment::atom(chunks))
    }

    fn membership(&mut self, item: &Operand, collection: &[Value]) -> PredResult<Fragment> {
        if matches!(item, Operand::Constant { .. }) {
            return Err(PredError::unsupported(
                "membership test",
                format!("item '{}' must be a member access", item),
            ));
        }
        membership::ensure_supported(self.membership, self.generator)?;
        if collection.is_empty() {
            if let Some(path) = item.entity_path() {
                self.column(path)?;
            }
            return Ok(Fragment::atom(vec![Chunk::text(ALWAYS_FALSE)]));
        }

        let item_chunks = self.operand(item, None)?;
        let peer = item.entity_path();
        let values = collection
            .iter()
            .map(|v| self.convert(v, peer))
            .collect::<PredResult<Vec<_>>>()?;

        let chunks = membership::lower(self.membership, self.generator, item_chunks, values, |v| {
            self.push_param(v)
        })?;
        Ok(Fragment::atom(chunks))
    }

    /// Compile one side of a test. `peer` is the entity member on the other
    /// side, whose converter applies to a bound value.
    fn operand(&mut self, operand: &Operand, peer: Option<&MemberPath>) -> PredResult<Vec<Chunk>> {
        match operand {
            Operand::FieldRef {
                path,
                owner: Owner::Entity,
            } => Ok(vec![Chunk::Text(self.column(path)?)]),
            Operand::FieldRef {
                owner: Owner::Captured(value),
                ..
            }
            | Operand::Constant { value, .. } => Ok(vec![self.bind(value, peer)?]),
        }
    }

    fn column(&self, path: &MemberPath) -> PredResult<String> {
        let member = path.single().ok_or_else(|| {
            PredError::unsupported("member access", format!("nested entity path 'x.{}'", path))
        })?;
        let column = self.resolver.resolve_column(self.entity, member)?;
        Ok(self.generator.quote_identifier(&column))
    }

    fn bind(&mut self, value: &Value, peer: Option<&MemberPath>) -> PredResult<Chunk> {
        let value = self.convert(value, peer)?;
        Ok(self.push_param(value))
    }

    fn push_param(&mut self, value: Value) -> Chunk {
        self.params.push(value);
        Chunk::Param(self.params.len() - 1)
    }

    fn convert(&self, value: &Value, peer: Option<&MemberPath>) -> PredResult<Value> {
        let (Some(lookup), Some(member)) = (self.converters, peer.and_then(MemberPath::single))
        else {
            return Ok(value.clone());
        };
        let Some(converter) = lookup.converter_for(self.entity, member) else {
            return Ok(value.clone());
        };
        converter.to_db(value).map_err(|reason| {
            tracing::warn!(
                converter = converter.name(),
                entity = self.entity,
                member,
                %value,
                "converter rejected value"
            );
            PredError::Conversion {
                converter: converter.name().to_string(),
                entity: self.entity.to_string(),
                member: member.to_string(),
                value: value.to_string(),
                reason,
            }
        })
    }
}

/// Parenthesize a logical child whose operator differs from its parent's.
fn group(fragment: Fragment, parent: Shape) -> Vec<Chunk> {
    if fragment.shape == Shape::Atom || fragment.shape == parent {
        return fragment.chunks;
    }
    let mut chunks = Vec::with_capacity(fragment.chunks.len() + 2);
    chunks.push(Chunk::text("("));
    chunks.extend(fragment.chunks);
    chunks.push(Chunk::text(")"));
    chunks
}
