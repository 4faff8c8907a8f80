use super::super::traits::{SqlGenerator, wrap_escaped};

pub struct OracleGenerator;

impl SqlGenerator for OracleGenerator {
    fn name(&self) -> &str {
        "oracle"
    }

    fn quote_identifier(&self, id: &str) -> String {
        // Quoted identifiers are case-sensitive in Oracle.
        wrap_escaped(id, '"', '"')
    }

    fn placeholder(&self, index: usize) -> String {
        // Oracle uses :1, :2, etc. (1-based index)
        format!(":{}", index)
    }
}
