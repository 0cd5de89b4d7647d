//! Placeholder grammar for reference tokens embedded in free text.
//!
//! A token looks like `{{@::TYPE::ID}}` or, for chapters only,
//! `{{@::Chapter::ID::VARIANT}}`. `TYPE` is one of the fixed label tokens of
//! [`RefKind`], `ID` is a run of ASCII digits that fits in a `u64`, and
//! `VARIANT` is `full` or `summary`. Anything that does not match exactly is
//! ordinary text.
//!
//! All offsets produced here are byte offsets into the scanned string. The
//! grammar is pure ASCII, so a token's byte length equals its length in
//! characters.

use std::ops::Range;

use quill_protocol::ChapterVariant;
use quill_protocol::RefKind;
use quill_protocol::Reference;
use strum::IntoEnumIterator;

/// Opening delimiter of every reference token.
pub const TOKEN_OPEN: &str = "{{@::";
/// Closing delimiter of every reference token.
pub const TOKEN_CLOSE: &str = "}}";
const FIELD_SEPARATOR: &str = "::";

/// One reference token found in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken {
    pub range: Range<usize>,
    pub reference: Reference,
}

impl ReferenceToken {
    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    /// True when `pos` lies strictly between the token's boundaries.
    pub fn contains_strictly(&self, pos: usize) -> bool {
        self.range.start < pos && pos < self.range.end
    }
}

/// Serialize a single reference into its placeholder form.
pub fn encode(reference: &Reference) -> String {
    let kind = reference.kind().token();
    let id = reference.id();
    match reference.variant() {
        Some(variant) => format!(
            "{TOKEN_OPEN}{kind}{FIELD_SEPARATOR}{id}{FIELD_SEPARATOR}{}{TOKEN_CLOSE}",
            variant.token()
        ),
        None => format!("{TOKEN_OPEN}{kind}{FIELD_SEPARATOR}{id}{TOKEN_CLOSE}"),
    }
}

/// Serialize several references, joined by a single space.
pub fn encode_all(references: &[Reference]) -> String {
    references
        .iter()
        .map(encode)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan `text` left to right and return every token, in order.
///
/// Each candidate opener is parsed at most once; a failed parse resumes the
/// search one byte later so an opener nested inside a broken fragment is
/// still found.
pub fn decode(text: &str) -> Vec<ReferenceToken> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(TOKEN_OPEN) {
        let start = pos + rel;
        match parse_token(&text[start..]) {
            Some((reference, len)) => {
                tokens.push(ReferenceToken {
                    range: start..start + len,
                    reference,
                });
                pos = start + len;
            }
            // The opener starts with an ASCII byte, so `start + 1` is a char
            // boundary.
            None => pos = start + 1,
        }
    }
    tokens
}

/// Only the references of `text`, in order of appearance.
pub fn references(text: &str) -> Vec<Reference> {
    decode(text).into_iter().map(|t| t.reference).collect()
}

/// Rewrite every token into its canonical spelling (e.g. `007` becomes `7`).
/// Plain text is copied unchanged.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in decode(text) {
        out.push_str(&text[last..token.start()]);
        out.push_str(&encode(&token.reference));
        last = token.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Try to parse one token at the very start of `s`. Returns the reference
/// and the number of bytes consumed.
fn parse_token(s: &str) -> Option<(Reference, usize)> {
    let rest = s.strip_prefix(TOKEN_OPEN)?;

    let (kind, rest) = RefKind::iter().find_map(|kind| {
        rest.strip_prefix(kind.token())
            .and_then(|r| r.strip_prefix(FIELD_SEPARATOR))
            .map(|r| (kind, r))
    })?;

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    // Overflowing ids make the whole fragment plain text.
    let id: u64 = rest[..digits].parse().ok()?;
    let rest = &rest[digits..];

    let (variant, rest) = match rest.strip_prefix(FIELD_SEPARATOR) {
        Some(after) => {
            if !kind.supports_variant() {
                return None;
            }
            let variant = ChapterVariant::iter().find(|v| after.starts_with(v.token()))?;
            (Some(variant), &after[variant.token().len()..])
        }
        None => (None, rest),
    };

    let rest = rest.strip_prefix(TOKEN_CLOSE)?;
    Some((Reference::new(kind, id, variant), s.len() - rest.len()))
}

/// The token that starts exactly at `pos`.
pub fn token_starting_at(tokens: &[ReferenceToken], pos: usize) -> Option<&ReferenceToken> {
    tokens.iter().find(|t| t.start() == pos)
}

/// The token that ends exactly at `pos`.
pub fn token_ending_at(tokens: &[ReferenceToken], pos: usize) -> Option<&ReferenceToken> {
    tokens.iter().find(|t| t.end() == pos)
}

/// The token whose interior (excluding its boundaries) contains `pos`.
pub fn token_containing(tokens: &[ReferenceToken], pos: usize) -> Option<&ReferenceToken> {
    tokens.iter().find(|t| t.contains_strictly(pos))
}
