//! Merging independently compiled predicates with a conjunction word.

use crate::ast::ConjunctionWord;
use crate::error::{PredError, PredResult};
use crate::transpiler::translation::{Chunk, Shape, Translation};

/// Join `parts` with `word`, renumbering every placeholder to its absolute
/// position in the concatenated parameter list.
///
/// With two or more parts each one is parenthesized. A single part is
/// returned unchanged.
pub fn combine(word: ConjunctionWord, parts: Vec<Translation>) -> PredResult<Translation> {
    if parts.len() <= 1 {
        return parts
            .into_iter()
            .next()
            .ok_or_else(|| PredError::unsupported("conjunction", "no predicates to combine"));
    }

    let separator = format!(" {} ", word.sql_keyword());
    let mut chunks = Vec::new();
    let mut params = Vec::new();

    for (i, part) in parts.into_iter().enumerate() {
        let (part_chunks, part_params, _) = part.into_inner();
        let offset = params.len();
        if i > 0 {
            chunks.push(Chunk::text(separator.as_str()));
        }
        chunks.push(Chunk::text("("));
        chunks.extend(part_chunks.into_iter().map(|chunk| match chunk {
            Chunk::Param(k) => Chunk::Param(k + offset),
            text => text,
        }));
        chunks.push(Chunk::text(")"));
        params.extend(part_params);
    }

    let shape = match word {
        ConjunctionWord::And => Shape::And,
        ConjunctionWord::Or => Shape::Or,
    };
    let combined = Translation::new(chunks, params, shape);
    tracing::debug!(
        sql = %combined.sql(),
        params = combined.params().len(),
        "combined predicates"
    );
    Ok(combined)
}
