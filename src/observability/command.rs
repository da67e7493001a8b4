//! Copy-paste reproduction of a forwarded request.
//!
//! Renders a single-line `curl` invocation. Every user-controlled value is
//! placed inside single quotes with backslashes doubled first and single
//! quotes backslash-escaped second; doing it the other way round would
//! double the backslashes the quote escaping inserted.
//!
//! The output is for humans only. Nothing parses it back.

use axum::http::{header, HeaderMap, Method};

/// Escape a value for a single-quoted shell token.
pub fn escape_shell(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render `method url headers body` as a `curl` command line.
///
/// Headers with empty values and `content-length` are skipped, as is an
/// empty body.
pub fn to_curl_command(method: &Method, url: &str, headers: &HeaderMap, body: Option<&str>) -> String {
    let mut command = format!("curl -X {} '{}'", method, escape_shell(url));

    for (name, value) in headers.iter() {
        if *name == header::CONTENT_LENGTH {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes());
        if value.is_empty() {
            continue;
        }
        command.push_str(&format!(
            " -H '{}: {}'",
            escape_shell(name.as_str()),
            escape_shell(&value)
        ));
    }

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        command.push_str(&format!(" -d '{}'", escape_shell(body)));
    }

    command
}
