//! SQL escaping helpers used when rendering compiled queries

/// Escape a SQL identifier (table name, column name, etc.)
///
/// Existing double quotes are doubled and the result is wrapped in double
/// quotes, so any identifier can be embedded safely.
///
/// # Examples
/// ```
/// use rideshare_orm::security::escape_identifier;
///
/// assert_eq!(escape_identifier("rides"), "\"rides\"");
/// assert_eq!(escape_identifier("table\"name"), "\"table\"\"name\"");
/// ```
pub fn escape_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Quote a string literal, doubling embedded single quotes
pub fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

/// Turn a raw search term into an `ILIKE` substring pattern.
///
/// `%`, `_` and the backslash escape character match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("user_id"), "\"user_id\"");
        assert_eq!(
            escape_identifier("x\"; DROP TABLE rides; --"),
            "\"x\"\"; DROP TABLE rides; --\""
        );
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("user"), "'user'");
        assert_eq!(quote_literal("o'neil"), "'o''neil'");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("sedan"), "%sedan%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
