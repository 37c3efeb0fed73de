//! Canonicalization of raw submission text.
//!
//! Sanitization strips markup and control characters and trims the result;
//! it does NOT entity-escape. Escaping belongs to the composer, right where
//! text is interpolated into HTML, so that sanitizing twice is the same as
//! sanitizing once and subjects never accumulate `&amp;` noise.

/// Strips HTML/script markup and control characters, then trims.
///
/// Markup removal is a single pass that drops everything from a `<` to the
/// matching `>`; an unterminated `<` drops the remainder of the string. A
/// bare `>` with no opening bracket is ordinary text. Newlines survive the
/// control-character filter because the composer turns them into `<br>`.
///
/// Idempotent: `sanitize_text(sanitize_text(x)) == sanitize_text(x)`.
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut in_tag = false;

    for c in raw.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        match c {
            '<' => in_tag = true,
            c if c.is_control() && c != '\n' => {}
            c => cleaned.push(c),
        }
    }

    cleaned.trim().to_owned()
}

/// [`sanitize_text`] plus address-safe normalization: every character not
/// legal in an email address is removed. Format checking is the validator's
/// job; this only guarantees the value cannot smuggle header separators or
/// whitespace into a mailbox field.
#[must_use]
pub fn sanitize_email(raw: &str) -> String {
    const ADDRESS_CHARSET: &str = "!#$%&'*+/=?^_`{|}~@.[]-";

    sanitize_text(raw)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ADDRESS_CHARSET.contains(*c))
        .collect()
}
