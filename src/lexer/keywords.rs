//! The closed set of DDL reserved words.
//!
//! An identifier whose uppercased form appears here is re-tagged as
//! [`crate::lexer::TokenKind::Keyword`] by the lexer. The set is built once
//! behind a `once_cell::sync::Lazy` rather than scattered across match arms,
//! so parser code never has to special-case a keyword string twice.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// All reserved words recognized by the lexer, uppercase.
pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "AND", "ANY", "ARRAY", "AS",
        "BEFORE", "BETWEEN", "BY", "CACHE", "CASCADE", "CASE", "CHECK", "COLLATE", "COLUMN",
        "COMMENT", "CONCURRENTLY", "CONSTRAINT", "CONTINUOUS", "CREATE", "CROSS", "CYCLE",
        "DATA", "DEFAULT", "DEFINER", "DELETE", "DISTINCT", "DO", "DOMAIN", "DROP", "EACH",
        "ELSE", "END", "ENUM", "EXCEPT", "EXCLUDE", "EXECUTE", "EXISTS", "EXTENSION", "FALSE",
        "FOR", "FOREIGN", "FROM", "FULL", "FUNCTION", "GENERATED", "GROUP", "HASH", "HAVING",
        "ILIKE", "IF", "IMMUTABLE", "IN", "INCLUDE", "INCREMENT", "INDEX", "INNER", "INOUT",
        "INPUT", "INSERT", "INSTEAD", "INTERSECT", "INTERVAL", "INVOKER", "IS", "JOIN", "KEY",
        "LANGUAGE", "LEFT", "LIKE", "LIMIT", "LIST", "MATERIALIZED", "MAXVALUE", "MINVALUE",
        "NATURAL", "NO", "NONE", "NOT", "NULL", "OF", "OFFSET", "ON", "ONLY", "OR", "ORDER",
        "OUT", "OUTER", "OWNED", "PARTITION", "POLICY", "PRIMARY", "PROCEDURE", "RANGE",
        "REFERENCES", "REPLACE", "RESTRICT", "RETENTION", "RETURNS", "RIGHT", "ROW", "SCHEMA",
        "SECURITY", "SELECT", "SEQUENCE", "SET", "SOME", "STABLE", "START", "STATEMENT",
        "STRICT", "TABLE", "TABLESPACE", "TEMP", "TEMPORARY", "THEN", "TRIGGER", "TRUE",
        "TRUNCATE", "TYPE", "UNION", "UNIQUE", "UNLOGGED", "UPDATE", "USING", "VARIADIC",
        "VIEW", "VOLATILE", "WHEN", "WHERE", "WITH",
    ]
    .into_iter()
    .collect()
});

/// Returns `true` if `word` (compared case-insensitively) is a reserved word.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word.to_ascii_uppercase().as_str())
}
