//! Server-side HTML for the public pages.
//!
//! Every user-supplied string goes through [`escape`] before it is written
//! into markup.

pub mod blog;
pub mod content;
pub mod portfolio;

use crate::templates::Theme;

pub use blog::{render_blog_index, render_blog_post, IndexEntry};
pub use portfolio::render_portfolio;

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Escapes only the characters that can break out of a quoted attribute.
/// URLs keep their `/`, `+` and `=` so inline data URLs stay compact.
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Only http(s), mailto and data:image URLs make it into `href`/`src`.
pub(crate) fn safe_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("data:image/")
        || trimmed.starts_with('/');
    if allowed {
        Some(escape_attr(trimmed))
    } else {
        None
    }
}

/// Wraps `body` in a full document styled with `theme`.
pub fn layout(title: &str, description: &str, theme: &Theme, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<style>
:root {{ --bg: {bg}; --fg: {fg}; --accent: {accent}; }}
body {{ margin: 0; background: var(--bg); color: var(--fg); font-family: {font}; line-height: 1.6; }}
main {{ max-width: 960px; margin: 0 auto; padding: 2rem 1.25rem; }}
a {{ color: var(--accent); }}
section {{ margin: 2.5rem 0; }}
.tags span {{ display: inline-block; border: 1px solid var(--accent); border-radius: 999px; padding: 0.1rem 0.7rem; margin: 0.2rem; }}
.cover {{ width: 100%; max-height: 320px; object-fit: cover; }}
.avatar {{ width: 112px; height: 112px; border-radius: 50%; object-fit: cover; }}
.muted {{ opacity: 0.7; }}
</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        description = escape(description),
        bg = theme.background,
        fg = theme.foreground,
        accent = theme.accent,
        font = theme.font.css_stack(),
        body = body,
    )
}

/// Character-safe prefix of `text`, at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn plain_theme() -> Theme {
    crate::templates::PortfolioTemplate::resolve(None).theme()
}

pub fn not_found_page(what: &str) -> String {
    let body = format!(
        "<main><h1>{} Not Found</h1><p class=\"muted\">The page you are looking for does not exist.</p><p><a href=\"/\">Go home</a></p></main>",
        escape(what)
    );
    layout(&format!("{} Not Found", what), "", &plain_theme(), &body)
}

pub fn error_page() -> String {
    layout(
        "Something went wrong",
        "",
        &plain_theme(),
        "<main><h1>Something went wrong</h1><p class=\"muted\">Please try again later.</p></main>",
    )
}
