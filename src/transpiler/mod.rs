//! Predicate to SQL transpiler.
//!
//! Lowers a [`Predicate`] over one entity into a `WHERE` fragment with
//! `@k` placeholders and the ordered parameters they index.
//!
//! ```
//! use predsql::ast::builders::field;
//! use predsql::schema::IdentityResolver;
//! use predsql::transpiler::{Dialect, Translator};
//!
//! let translator = Translator::new(Dialect::SqlServer.generator(), &IdentityResolver);
//! let t = translator
//!     .compile("SomeEntity", &field("anInt").eq(5).and(field("aString").eq("foo")))
//!     .unwrap();
//! assert_eq!(t.sql(), "WHERE [anInt] = @0 AND [aString] = @1");
//! ```

pub mod combine;
pub(crate) mod compiler;
pub mod dialect;
pub mod membership;
pub mod sql;
pub mod traits;
pub mod translation;

#[cfg(test)]
mod tests;

use crate::ast::{ConjunctionWord, Predicate};
use crate::error::PredResult;
use crate::schema::{ColumnResolver, ConverterLookup, Schema};

pub use combine::combine;
pub use compiler::ALWAYS_FALSE;
pub use dialect::Dialect;
pub use membership::MembershipStrategy;
pub use traits::SqlGenerator;
pub use translation::{Chunk, Shape, Translation};

use compiler::Compiler;

/// Compiles predicates for one dialect and one set of entity metadata.
///
/// Holds only shared references; a single translator can be used from any
/// number of threads.
#[derive(Clone, Copy)]
pub struct Translator<'a> {
    generator: &'a dyn SqlGenerator,
    resolver: &'a dyn ColumnResolver,
    converters: Option<&'a dyn ConverterLookup>,
    membership: MembershipStrategy,
}

impl<'a> Translator<'a> {
    pub fn new(generator: &'a dyn SqlGenerator, resolver: &'a dyn ColumnResolver) -> Self {
        Self {
            generator,
            resolver,
            converters: None,
            membership: MembershipStrategy::default(),
        }
    }

    /// Resolve columns and converters from the same schema.
    pub fn for_schema(generator: &'a dyn SqlGenerator, schema: &'a Schema) -> Self {
        Self::new(generator, schema).with_converters(schema)
    }

    pub fn with_converters(mut self, converters: &'a dyn ConverterLookup) -> Self {
        self.converters = Some(converters);
        self
    }

    pub fn with_membership(mut self, membership: MembershipStrategy) -> Self {
        self.membership = membership;
        self
    }

    pub fn generator(&self) -> &'a dyn SqlGenerator {
        self.generator
    }

    pub fn membership(&self) -> MembershipStrategy {
        self.membership
    }

    /// Compile one predicate over `entity`.
    pub fn compile(&self, entity: &str, predicate: &Predicate) -> PredResult<Translation> {
        let compiler = Compiler::new(
            self.generator,
            self.resolver,
            self.converters,
            self.membership,
            entity,
        );
        let translation = compiler.finish(predicate).inspect_err(|e| {
            tracing::debug!(
                dialect = self.generator.name(),
                entity,
                root = predicate.kind(),
                error = %e,
                "predicate rejected"
            );
        })?;
        tracing::debug!(
            dialect = self.generator.name(),
            entity,
            sql = %translation.sql(),
            params = translation.params().len(),
            "compiled predicate"
        );
        Ok(translation)
    }

    /// Compile each predicate independently and join them with `word`.
    pub fn compile_all(
        &self,
        entity: &str,
        word: ConjunctionWord,
        predicates: &[Predicate],
    ) -> PredResult<Translation> {
        let parts = predicates
            .iter()
            .map(|p| self.compile(entity, p))
            .collect::<PredResult<Vec<_>>>()?;
        combine(word, parts)
    }
}

impl std::fmt::Debug for Translator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("dialect", &self.generator.name())
            .field("converters", &self.converters.is_some())
            .field("membership", &self.membership)
            .finish()
    }
}
