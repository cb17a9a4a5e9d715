//! Parsing of per-path status lines printed by the client under test.
//!
//! A status line is two status columns, an optional lock column (`B`),
//! whitespace, then the path:
//!
//! ```text
//! A    wc/A/mu
//!  U   wc/iota
//! Exported revision 1.
//! ```
//!
//! The last line is not a status line (`x` is not a status character) and
//! is skipped by [`parse_status_line`].

use crate::types::StatusCode;

/// One parsed status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub status: StatusCode,
    pub path: &'a str,
}

/// Parse one line of client output, or `None` if it is not a status line.
pub fn parse_status_line(line: &str) -> Option<StatusLine<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    let bytes = line.as_bytes();
    if bytes.len() < 4 {
        return None;
    }

    let status = StatusCode::from_columns(bytes[0], bytes[1])?;
    // The first two bytes are ASCII, so index 2 is a char boundary.
    let rest = line.get(2..)?;
    let rest = match rest.strip_prefix('B') {
        Some(after_lock) if after_lock.starts_with(char::is_whitespace) => after_lock,
        _ => rest,
    };

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim_start();
    if path.is_empty() {
        return None;
    }

    Some(StatusLine { status, path })
}
