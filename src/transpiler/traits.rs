//! Dialect generator trait.

/// Per-dialect SQL syntax: identifier quoting, native placeholders and the
/// collection-membership fragments a dialect can express.
///
/// Implement this for a custom quoter; every entry point taking a dialect
/// accepts `&dyn SqlGenerator`.
pub trait SqlGenerator: Send + Sync {
    /// Dialect name used in diagnostics.
    fn name(&self) -> &str;

    /// Wrap an identifier for safe inclusion in SQL.
    fn quote_identifier(&self, name: &str) -> String;

    /// The driver's own placeholder syntax for a 1-based parameter index.
    fn placeholder(&self, index: usize) -> String;

    /// Text around an array parameter for `item = ANY(param)` membership,
    /// as `(between item and param, after param)`.
    fn array_membership(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    /// Text around a table-valued parameter, as for [`Self::array_membership`].
    fn table_valued_membership(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    /// Whether a whole collection can be bound as one array parameter.
    fn supports_native_arrays(&self) -> bool {
        self.array_membership().is_some()
    }
}

/// Double every occurrence of `close` inside `name` and wrap it.
pub(crate) fn wrap_escaped(name: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(open);
    for c in name.chars() {
        if c == close {
            out.push(close);
        }
        out.push(c);
    }
    out.push(close);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_escaped() {
        assert_eq!(wrap_escaped("a]b", '[', ']'), "[a]]b]");
        assert_eq!(wrap_escaped("plain", '"', '"'), "\"plain\"");
        assert_eq!(wrap_escaped("we`ird", '`', '`'), "`we``ird`");
    }
}
