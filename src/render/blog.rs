use crate::db::models::{BlogPost, UserRecord};
use crate::templates::{BlogTemplate, PortfolioTemplate};

use super::content::{parse_blocks, reading_time_minutes};
use super::{escape, layout, safe_url, truncate_chars};

const EXCERPT_CHARS: usize = 120;
const DESCRIPTION_CHARS: usize = 160;

/// A post on the public index together with its author.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub post: BlogPost,
    pub author_name: String,
    pub author_username: String,
}

impl IndexEntry {
    pub fn new(post: BlogPost, author: &UserRecord) -> Self {
        Self {
            post,
            author_name: author.display_name().to_string(),
            author_username: author.username.clone(),
        }
    }

    pub fn excerpt(&self) -> String {
        format!("{}...", truncate_chars(&self.post.content, EXCERPT_CHARS))
    }
}

/// Renders one post with its author's blog variant.
pub fn render_blog_post(post: &BlogPost, author: &UserRecord) -> String {
    let template = BlogTemplate::resolve(Some(&author.blog_template));

    let mut meta = vec![
        format!(
            "<a href=\"/u/{}\">{}</a>",
            escape(&author.username),
            escape(author.display_name())
        ),
        post.created_at.format("%B %-d, %Y").to_string(),
    ];
    if template.shows_reading_time() {
        meta.push(format!("{} min read", reading_time_minutes(&post.content)));
    }

    let cover = post
        .cover_image
        .as_ref()
        .and_then(|image| safe_url(&image.src()))
        .map(|src| format!(r#"<img class="cover" src="{}" alt="{}">"#, src, escape(&post.title)))
        .unwrap_or_default();

    let blocks: String = parse_blocks(&post.content, template)
        .iter()
        .map(|block| block.to_html())
        .collect();

    let body = format!(
        r#"<main class="blog template-{id}"><article>{cover}<h1>{title}</h1><p class="muted">{meta}</p>{blocks}</article><nav><a href="/blogs">All posts</a> &middot; <a href="/u/{username}">More from {author}</a></nav></main>"#,
        id = template.id().as_str(),
        cover = cover,
        title = escape(&post.title),
        meta = meta.join(" &middot; "),
        blocks = blocks,
        username = escape(&author.username),
        author = escape(author.display_name()),
    );

    layout(
        &post.title,
        truncate_chars(&post.content, DESCRIPTION_CHARS),
        &template.theme(),
        &body,
    )
}

/// The cross-user index at `/blogs`, newest first as given.
pub fn render_blog_index(entries: &[IndexEntry], site_title: &str) -> String {
    let items: String = if entries.is_empty() {
        "<p class=\"muted\">No blog posts yet.</p>".to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                format!(
                    "<article><h2><a href=\"/blog/{}\">{}</a></h2><p>{}</p><p class=\"muted\"><a href=\"/u/{}\">{}</a> @{} &middot; {}</p></article>",
                    escape(&entry.post.slug),
                    escape(&entry.post.title),
                    escape(&entry.excerpt()),
                    escape(&entry.author_username),
                    escape(&entry.author_name),
                    escape(&entry.author_username),
                    entry.post.created_at.format("%B %-d, %Y")
                )
            })
            .collect()
    };

    let body = format!(
        "<main class=\"blog-index\"><h1>Blogs</h1>{}</main>",
        items
    );
    layout(
        &format!("Blogs | {}", site_title),
        "Latest posts from every author",
        &PortfolioTemplate::resolve(None).theme(),
        &body,
    )
}
