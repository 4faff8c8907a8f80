use super::super::traits::{SqlGenerator, wrap_escaped};

pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn quote_identifier(&self, id: &str) -> String {
        wrap_escaped(id, '"', '"')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn array_membership(&self) -> Option<(&'static str, &'static str)> {
        Some((" = ANY(", ")"))
    }
}
