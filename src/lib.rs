//! # predsql: typed predicates to parameterized SQL
//!
//! Builds a boolean predicate over an entity's members and lowers it to a
//! `WHERE` fragment plus the ordered parameters its `@k` placeholders index,
//! for SQL Server, SQLite, PostgreSQL, MySQL and Oracle.
//!
//! ## Quick Example
//!
//! ```
//! use predsql::prelude::*;
//!
//! let p = field("anInt").eq(5).and(field("aString").eq("foo"));
//! let t = predsql::translate(Dialect::Sqlite, "SomeEntity", &p).unwrap();
//!
//! assert_eq!(t.sql(), "WHERE `anInt` = @0 AND `aString` = @1");
//! assert_eq!(t.params(), &[Value::Int(5), Value::String("foo".into())]);
//! ```
//!
//! ## Pieces
//!
//! | Module         | Role                                              |
//! |----------------|---------------------------------------------------|
//! | `ast`          | Predicate tree and builders                       |
//! | `parser`       | `x => x.a == 1 && …` text into the tree           |
//! | `schema`       | Member to column mapping, inheritance overrides   |
//! | `convert`      | Per-member value converters                       |
//! | `transpiler`   | Dialects, compilation, combination                |
//! | `engine`       | sqlx executor and whole-row helpers               |
//! | `config`       | `predsql.toml`                                    |

pub mod ast;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod parser;
pub mod schema;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::convert::{ConverterRegistry, FnConverter, ValueConverter};
    pub use crate::engine::{Entities, Executor, PredDB, Row};
    pub use crate::error::*;
    pub use crate::parser::{Variables, parse_predicate};
    pub use crate::schema::{
        ColumnResolver, ConverterLookup, EntityDef, IdentityResolver, MemberDef, Schema,
    };
    pub use crate::transpiler::{
        Dialect, MembershipStrategy, SqlGenerator, Translation, Translator, combine,
    };
}

/// Compile a predicate with member names used as column names.
///
/// # Example
///
/// ```
/// use predsql::prelude::*;
///
/// let t = predsql::translate(Dialect::SqlServer, "SomeEntity", &field("nullableInt").is_null()).unwrap();
/// assert_eq!(t.sql(), "WHERE [nullableInt] IS NULL");
/// assert!(t.params().is_empty());
/// ```
pub fn translate(
    dialect: transpiler::Dialect,
    entity: &str,
    predicate: &ast::Predicate,
) -> error::PredResult<transpiler::Translation> {
    transpiler::Translator::new(dialect.generator(), &schema::IdentityResolver)
        .compile(entity, predicate)
}
