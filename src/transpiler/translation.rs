//! Compiled predicate: structured SQL chunks plus positional parameters.

use crate::ast::Value;
use crate::transpiler::traits::SqlGenerator;

/// A piece of a compiled condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Literal SQL text.
    Text(String),
    /// Placeholder for the parameter at this 0-based index.
    Param(usize),
}

impl Chunk {
    pub(crate) fn text(s: impl Into<String>) -> Self {
        Chunk::Text(s.into())
    }
}

/// Top-level operator of a compiled condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// A single test or a parenthesized group.
    #[default]
    Atom,
    And,
    Or,
}

/// A `WHERE` condition with its parameters.
///
/// Placeholders are `@0, @1, …` in emission order and index directly into
/// [`Translation::params`].
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    chunks: Vec<Chunk>,
    params: Vec<Value>,
    shape: Shape,
}

impl Translation {
    pub(crate) fn new(chunks: Vec<Chunk>, params: Vec<Value>, shape: Shape) -> Self {
        Self {
            chunks,
            params,
            shape,
        }
    }

    /// `WHERE …` with `@k` placeholders.
    pub fn sql(&self) -> String {
        format!("WHERE {}", self.condition())
    }

    /// The condition without the `WHERE ` prefix.
    pub fn condition(&self) -> String {
        self.render(|i| format!("@{}", i))
    }

    /// `WHERE …` with the generator's own placeholders (1-based).
    pub fn to_native_sql(&self, generator: &dyn SqlGenerator) -> String {
        format!("WHERE {}", self.render(|i| generator.placeholder(i + 1)))
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// `(sql, params)` as handed to an executor.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql(), self.params)
    }

    pub(crate) fn into_inner(self) -> (Vec<Chunk>, Vec<Value>, Shape) {
        (self.chunks, self.params, self.shape)
    }

    fn render(&self, placeholder: impl Fn(usize) -> String) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Text(t) => out.push_str(t),
                Chunk::Param(i) => out.push_str(&placeholder(*i)),
            }
        }
        out
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}
