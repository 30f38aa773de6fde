//! Escaping helpers for `PostgreSQL` connection strings and identifiers.
//!
//! These helpers keep quoting logic consistent between the connection
//! gateway, provisioning DDL, and tests.

/// Escapes a value for inclusion in a libpq keyword/value connection string.
///
/// Uses single-quote wrapping with backslash escapes for embedded quotes and
/// backslashes.
#[must_use]
pub fn conninfo_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for ch in value.chars() {
        if matches!(ch, '\'' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('\'');
    escaped
}

/// Quotes an SQL identifier such as a database or role name.
///
/// Embedded double quotes are doubled, so the result always denotes exactly
/// the given name.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
