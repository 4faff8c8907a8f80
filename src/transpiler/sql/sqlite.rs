use super::super::traits::{SqlGenerator, wrap_escaped};

/// SQLite generator. Backticks are accepted by SQLite for MySQL compatibility.
pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn quote_identifier(&self, id: &str) -> String {
        wrap_escaped(id, '`', '`')
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}
