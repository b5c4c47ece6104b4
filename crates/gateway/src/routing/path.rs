//! Request path canonicalization
//!
//! The gate and the page entry compare paths against prefixes, so they must
//! see the path the renderer will act on: percent-decoded once, with empty
//! and `.` segments dropped and `..` resolved. `//sa`, `/./sa` and `/%73a`
//! are all `/sa`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes re-encoded when a canonical path is written back into a URL
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Canonical form of a raw request path.
///
/// `None` when the decoded bytes are not UTF-8. A trailing slash is kept;
/// `..` never climbs above the root.
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if !segments.is_empty() && decoded.ends_with('/') {
        path.push('/');
    }
    Some(path)
}

/// A canonical path as it must appear on the wire
pub fn encode_path(canonical: &str) -> String {
    utf8_percent_encode(canonical, PATH_ENCODE_SET).to_string()
}

/// True when `raw` is already the wire form of its own canonical path
pub fn is_canonical(raw: &str) -> bool {
    canonical_path(raw).is_some_and(|c| encode_path(&c) == raw)
}
