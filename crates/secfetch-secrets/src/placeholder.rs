//! Placeholder grammar
//!
//! ```text
//! <prefix><identifier>[//<key>][//base64]
//! ```
//!
//! A provider pattern matches the prefix and the identifier, bounded by the
//! provider's charset. Once the matched text holds a `//` separator, the
//! match is extended across the suffix charset, so a key may contain
//! characters the identifier charset excludes. The parser then splits the
//! suffixes back out on the first `//`.

use regex::Regex;

/// Segment that requests base64 output instead of a key lookup
pub const ENCODE_SEGMENT: &str = "base64";

/// Separator between identifier, key and modifier segments
pub const SEGMENT_SEPARATOR: &str = "//";

/// Characters allowed in a `//key` or `//base64` suffix segment
const SUFFIX_SEGMENT: &str = r"[A-Za-z0-9_.@:+=-]+";

/// Whether `c` may continue a placeholder past its `//` separator
fn is_suffix_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | ':' | '+' | '=' | '-' | '/')
}

/// Build the match pattern for `prefix` with identifier charset `charset`
///
/// `charset` is a character class body without brackets, e.g. `a-zA-Z0-9_`.
pub fn build_pattern(prefix: &str, charset: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "{}([{}]+)((?:{}{})*)",
        regex::escape(prefix),
        charset,
        SEGMENT_SEPARATOR,
        SUFFIX_SEGMENT
    ))
}

/// One placeholder occurrence in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Exact matched text, replaced on success
    pub raw: &'a str,
    /// Identifier handed to the provider
    pub path: String,
    /// Field to extract from a structured body
    pub key: Option<String>,
    /// Re-encode the final value as base64
    pub wants_encoding: bool,
}

impl<'a> Placeholder<'a> {
    /// Decompose the matched text `raw`, which starts with `prefix`
    pub fn parse(raw: &'a str, prefix: &str) -> Self {
        let body = raw.strip_prefix(prefix).unwrap_or(raw);

        let (path, remainder) = match body.split_once(SEGMENT_SEPARATOR) {
            Some((path, remainder)) => (path, Some(remainder)),
            None => (body, None),
        };

        let mut wants_encoding = false;
        let mut key_segments = Vec::new();
        for segment in remainder.into_iter().flat_map(|r| r.split(SEGMENT_SEPARATOR)) {
            if segment == ENCODE_SEGMENT {
                wants_encoding = true;
            } else if !segment.is_empty() {
                key_segments.push(segment);
            }
        }

        let key = if key_segments.is_empty() {
            None
        } else {
            Some(key_segments.join(SEGMENT_SEPARATOR))
        };

        Self {
            raw,
            path: path.trim().to_string(),
            key,
            wants_encoding,
        }
    }
}

/// All non-overlapping placeholders of one provider in `line`, left to right
pub fn scan<'a>(pattern: &Regex, prefix: &str, line: &'a str) -> Vec<Placeholder<'a>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(m) = pattern.find_at(line, pos) {
        let end = suffix_end(line, m.start() + prefix.len(), m.end());
        found.push(Placeholder::parse(&line[m.start()..end], prefix));
        pos = end;
    }

    found
}

/// End of the placeholder whose pattern match spans `body_start..end`
///
/// A match with a `//` after its prefix runs on through every suffix
/// character that follows it.
fn suffix_end(line: &str, body_start: usize, end: usize) -> usize {
    let body = line.get(body_start..end).unwrap_or_default();
    if !body.contains(SEGMENT_SEPARATOR) {
        return end;
    }

    let rest = &line[end..];
    end + rest.find(|c: char| !is_suffix_char(c)).unwrap_or(rest.len())
}
