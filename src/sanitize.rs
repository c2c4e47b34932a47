//! Text sanitizer for user submitted comment fields
//!
//! Strips script blocks, HTML tags, `javascript:` URIs and inline event
//! handler attributes, then truncates to the field limit. Passes repeat until
//! the text is stable, so nested payloads like `<scr<script></script>ipt>`
//! cannot reassemble after one pass.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of comment content, in characters
pub const MAX_CONTENT_LENGTH: usize = 500;
/// Maximum length of an author display name, in characters
pub const MAX_AUTHOR_LENGTH: usize = 50;
/// Maximum length of an email address, in characters
pub const MAX_EMAIL_LENGTH: usize = 255;
/// Maximum length of a review id, in characters
pub const MAX_REVIEW_ID_LENGTH: usize = 255;

static SCRIPT_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("Invalid script regex"));

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

static JAVASCRIPT_URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript\s*:").expect("Invalid javascript regex"));

static EVENT_HANDLER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+\s*=").expect("Invalid event handler regex"));

/// Raw input beyond this many characters is dropped before stripping.
pub const MAX_RAW_INPUT_LENGTH: usize = 10_000;

/// Remove markup and script vectors from free text.
///
/// Repeats until a pass changes nothing. Every pass that changes the text
/// makes it shorter, so the loop terminates.
pub fn strip_markup(input: &str) -> String {
    let mut current = truncate_chars(input.trim(), MAX_RAW_INPUT_LENGTH);

    loop {
        let next = SCRIPT_BLOCK_REGEX.replace_all(&current, "");
        let next = TAG_REGEX.replace_all(&next, "");
        let next = JAVASCRIPT_URI_REGEX.replace_all(&next, "");
        let next = EVENT_HANDLER_REGEX.replace_all(&next, "").into_owned();

        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((byte_index, _)) => input[..byte_index].to_string(),
        None => input.to_string(),
    }
}

/// Sanitize comment content. Excess length is truncated, never rejected.
pub fn sanitize_content(input: &str) -> String {
    let stripped = strip_markup(input);
    truncate_chars(&stripped, MAX_CONTENT_LENGTH).trim_end().to_string()
}

/// Sanitize an author name, substituting `default_author` when nothing usable remains.
pub fn sanitize_author(input: Option<&str>, default_author: &str) -> String {
    let stripped = strip_markup(input.unwrap_or_default());
    let author = truncate_chars(&stripped, MAX_AUTHOR_LENGTH).trim().to_string();

    if author.is_empty() {
        default_author.to_string()
    } else {
        author
    }
}

/// Normalize an email address. Returns `None` when absent or malformed.
pub fn sanitize_email(input: Option<&str>) -> Option<String> {
    let email = input?.trim().to_lowercase();

    if email.is_empty() || !validator::validate_email(email.as_str()) {
        return None;
    }

    Some(truncate_chars(&email, MAX_EMAIL_LENGTH))
}

/// True when the text contains any vector the sanitizer removes.
pub fn contains_markup(input: &str) -> bool {
    let lower = input.to_lowercase();
    lower.contains("<script")
        || JAVASCRIPT_URI_REGEX.is_match(input)
        || EVENT_HANDLER_REGEX.is_match(input)
        || TAG_REGEX.is_match(input)
}
