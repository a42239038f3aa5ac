/**
 * Feed Routes
 * RSS 2.0 feed of the newest posts and robots.txt
 */
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::db::models::BlogPost;
use crate::render::truncate_chars;
use crate::state::SharedState;
use crate::store::BlogStore;

const FEED_ITEMS: usize = 50;
const DESCRIPTION_CHARS: usize = 200;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Builds the feed document. `posts` must already be newest first.
pub fn build_feed(posts: &[BlogPost], site_url: &str, site_title: &str) -> String {
    let items: String = posts
        .iter()
        .take(FEED_ITEMS)
        .map(|post| {
            let post_url = format!("{}/blog/{}", site_url, post.slug);
            format!(
                "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <description>{}</description>\n      <pubDate>{}</pubDate>\n      <guid isPermaLink=\"true\">{}</guid>\n    </item>\n",
                escape_xml(&post.title),
                escape_xml(&post_url),
                escape_xml(truncate_chars(&post.content, DESCRIPTION_CHARS)),
                rfc822(&post.created_at),
                escape_xml(&post_url),
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{title}</title>
    <link>{link}</link>
    <description>Latest posts on {title}</description>
    <language>en-us</language>
    <atom:link href="{feed}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{built}</lastBuildDate>
{items}  </channel>
</rss>"#,
        title = escape_xml(site_title),
        link = escape_xml(&format!("{}/blogs", site_url)),
        feed = escape_xml(&format!("{}/rss.xml", site_url)),
        built = posts
            .first()
            .map(|post| rfc822(&post.created_at))
            .unwrap_or_default(),
        items = items,
    )
}

/// GET /rss.xml
pub async fn rss_feed(State(state): State<SharedState>) -> Response {
    let posts = match state.store.list_all().await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!(error = %e, "failed to load posts for feed");
            return (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response();
        }
    };

    let xml = build_feed(&posts, &state.config.site_url, &state.config.site_title);
    (
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=600",
            ),
        ],
        xml,
    )
        .into_response()
}

/// GET /robots.txt
pub async fn robots_txt() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\nDisallow: /dashboard/\nDisallow: /api/\n",
    )
        .into_response()
}
