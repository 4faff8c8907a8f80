use super::super::traits::{SqlGenerator, wrap_escaped};

pub struct SqlServerGenerator;

impl SqlGenerator for SqlServerGenerator {
    fn name(&self) -> &str {
        "sqlserver"
    }

    fn quote_identifier(&self, id: &str) -> String {
        wrap_escaped(id, '[', ']')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{}", index)
    }

    fn table_valued_membership(&self) -> Option<(&'static str, &'static str)> {
        // The structured parameter is a single-column table named V.
        Some((" IN (SELECT V FROM ", ")"))
    }
}
