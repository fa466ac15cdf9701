//! PostgREST horizontal filter syntax.
//!
//! Filters are sent as query parameters (`?id=eq.4`, `?id=in.("a","b")`);
//! reqwest takes care of URL encoding, so these helpers only produce the
//! operator syntax.

/// `column = value`.
#[must_use]
pub fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// `column IN (values...)`.
///
/// Every value is double-quoted so that commas, parentheses and other
/// reserved characters inside IDs survive; embedded quotes and backslashes
/// are escaped.
#[must_use]
pub fn in_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted = values
        .into_iter()
        .map(|v| quote(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");

    format!("in.({quoted})")
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
