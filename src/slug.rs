//! Blog slug derivation.
//!
//! A slug is the lowercased title with every run of non-alphanumerics
//! collapsed to one hyphen, edge hyphens trimmed, followed by `-` and the
//! creation instant in milliseconds written in base 36. The suffix makes
//! collisions unlikely without consulting the store.

use chrono::{DateTime, Utc};
use regex::Regex;

lazy_static::lazy_static! {
    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    /// Shape of every slug produced by [`generate`].
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Base used when a title has no usable characters at all.
const EMPTY_TITLE_BASE: &str = "post";

/// Title part of the slug, without the uniqueness suffix.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Lowercase base-36 rendering of `value`.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Full slug for a post titled `title` created at `at`.
pub fn generate(title: &str, at: DateTime<Utc>) -> String {
    let base = slugify(title);
    let base = if base.is_empty() {
        EMPTY_TITLE_BASE.to_string()
    } else {
        base
    };
    let millis = at.timestamp_millis().max(0) as u64;
    format!("{}-{}", base, to_base36(millis))
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}
