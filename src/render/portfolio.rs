use crate::db::models::{BlogPost, PortfolioData, UserRecord};
use crate::templates::PortfolioTemplate;

use super::{escape, layout, safe_url, truncate_chars};

/// Posts shown on a portfolio before linking to the full index.
const MAX_PORTFOLIO_POSTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Hero,
    Stats,
    About,
    Skills,
    Projects,
    Experience,
    Education,
    Certifications,
    Testimonials,
    Blogs,
    Contact,
}

/// Section order per variant; the footer with social links always follows.
fn sections(template: PortfolioTemplate) -> &'static [Section] {
    use Section::*;
    match template {
        PortfolioTemplate::AuroraGlass | PortfolioTemplate::DarkMinimalist => &[
            Hero, About, Skills, Projects, Experience, Education, Certifications, Testimonials,
            Blogs,
        ],
        PortfolioTemplate::ProfessionalCard => &[
            Hero, About, Experience, Projects, Stats, Skills, Education, Certifications,
            Testimonials, Blogs,
        ],
        PortfolioTemplate::CyberpunkNeon => &[Hero, Skills, Projects, Blogs],
        PortfolioTemplate::MinimalEditorial => &[
            Hero, About, Experience, Projects, Skills, Education, Certifications, Testimonials,
            Blogs,
        ],
        PortfolioTemplate::VibrantGradient => &[Hero, Stats, Skills, Projects, Blogs],
        PortfolioTemplate::TerminalHacker => {
            &[Hero, Stats, Skills, Projects, Experience, Blogs, Contact]
        }
        PortfolioTemplate::LuxuryDark => &[Hero, About, Experience, Skills, Projects, Blogs],
    }
}

fn image_tag(src: Option<String>, class: &str, alt: &str) -> String {
    match src.as_deref().and_then(safe_url) {
        Some(src) => format!(r#"<img class="{}" src="{}" alt="{}">"#, class, src, escape(alt)),
        None => String::new(),
    }
}

fn link(url: &str, label: &str) -> String {
    match safe_url(url) {
        Some(href) => format!(
            r#"<a href="{}" rel="noopener noreferrer">{}</a>"#,
            href,
            escape(label)
        ),
        None => String::new(),
    }
}

fn tags(items: &[String]) -> String {
    let spans: String = items
        .iter()
        .map(|item| format!("<span>{}</span>", escape(item)))
        .collect();
    format!(r#"<div class="tags">{}</div>"#, spans)
}

fn hero(user: &UserRecord, data: &PortfolioData) -> String {
    let mut out = String::from("<header>");
    out.push_str(&image_tag(
        data.cover_image.as_ref().map(|i| i.src()),
        "cover",
        "Cover",
    ));
    out.push_str(&image_tag(
        data.profile_image.as_ref().map(|i| i.src()),
        "avatar",
        user.display_name(),
    ));
    out.push_str(&format!("<h1>{}</h1>", escape(user.display_name())));
    if !data.title.trim().is_empty() {
        out.push_str(&format!("<p class=\"title\">{}</p>", escape(&data.title)));
    }
    if !data.bio.trim().is_empty() {
        out.push_str(&format!("<p>{}</p>", escape(&data.bio)));
    }
    let mut facts = Vec::new();
    if !data.location.trim().is_empty() {
        facts.push(escape(&data.location));
    }
    if !data.availability.trim().is_empty() {
        facts.push(escape(&data.availability));
    }
    if !facts.is_empty() {
        out.push_str(&format!("<p class=\"muted\">{}</p>", facts.join(" &middot; ")));
    }
    if !data.resume_url.trim().is_empty() {
        out.push_str(&format!("<p>{}</p>", link(&data.resume_url, "Resume")));
    }
    out.push_str("</header>");
    out
}

fn section(id: &str, heading: &str, inner: String) -> String {
    format!(
        r#"<section id="{}"><h2>{}</h2>{}</section>"#,
        id, heading, inner
    )
}

fn render_section(kind: Section, user: &UserRecord, data: &PortfolioData, posts: &[BlogPost]) -> String {
    match kind {
        Section::Hero => hero(user, data),
        Section::Stats => section(
            "stats",
            "At a glance",
            format!(
                "<ul><li>{} years of experience</li><li>{} projects</li><li>{} skills</li></ul>",
                data.years_of_experience,
                data.projects.len(),
                data.skills.len()
            ),
        ),
        Section::About if !data.about.trim().is_empty() => {
            section("about", "About", format!("<p>{}</p>", escape(&data.about)))
        }
        Section::Skills if !data.skills.is_empty() => section("skills", "Skills", tags(&data.skills)),
        Section::Projects if !data.projects.is_empty() => {
            let items: String = data
                .projects
                .iter()
                .map(|project| {
                    let mut links = String::new();
                    if let Some(github) = project.github.as_deref() {
                        links.push_str(&link(github, "Code"));
                    }
                    if let Some(live) = project.live.as_deref() {
                        links.push(' ');
                        links.push_str(&link(live, "Live"));
                    }
                    format!(
                        "<article>{}<h3>{}</h3><p>{}</p>{}<p>{}</p></article>",
                        image_tag(project.image.as_ref().map(|i| i.src()), "cover", &project.title),
                        escape(&project.title),
                        escape(&project.description),
                        tags(&project.tech_stack),
                        links
                    )
                })
                .collect();
            section("projects", "Projects", items)
        }
        Section::Experience if !data.experience.is_empty() => {
            let items: String = data
                .experience
                .iter()
                .map(|entry| {
                    let location = entry
                        .location
                        .as_deref()
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| format!(" &middot; {}", escape(l)))
                        .unwrap_or_default();
                    format!(
                        "<article><h3>{} &middot; {}</h3><p class=\"muted\">{}{}</p><p>{}</p></article>",
                        escape(&entry.position),
                        escape(&entry.company),
                        escape(&entry.duration),
                        location,
                        escape(&entry.description)
                    )
                })
                .collect();
            section("experience", "Experience", items)
        }
        Section::Education if !data.education.is_empty() => {
            let items: String = data
                .education
                .iter()
                .map(|entry| {
                    format!(
                        "<article><h3>{}</h3><p>{}</p><p class=\"muted\">{}</p><p>{}</p></article>",
                        escape(&entry.degree),
                        escape(&entry.institution),
                        escape(&entry.duration),
                        escape(&entry.description)
                    )
                })
                .collect();
            section("education", "Education", items)
        }
        Section::Certifications if !data.certifications.is_empty() => {
            let items: String = data
                .certifications
                .iter()
                .map(|c| format!("<li>{}</li>", escape(c)))
                .collect();
            section("certifications", "Certifications", format!("<ul>{}</ul>", items))
        }
        Section::Testimonials if !data.testimonials.is_empty() => {
            let items: String = data
                .testimonials
                .iter()
                .map(|t| {
                    format!(
                        "<blockquote><p>{}</p><footer>{}, {} at {}</footer></blockquote>",
                        escape(&t.text),
                        escape(&t.name),
                        escape(&t.role),
                        escape(&t.company)
                    )
                })
                .collect();
            section("testimonials", "Testimonials", items)
        }
        Section::Blogs if !posts.is_empty() => {
            let mut items: String = posts
                .iter()
                .take(MAX_PORTFOLIO_POSTS)
                .map(|post| {
                    format!(
                        "<article><h3><a href=\"/blog/{}\">{}</a></h3><p class=\"muted\">{}</p><p>{}...</p></article>",
                        escape(&post.slug),
                        escape(&post.title),
                        post.created_at.format("%B %-d, %Y"),
                        escape(truncate_chars(&post.content, 120))
                    )
                })
                .collect();
            if posts.len() > MAX_PORTFOLIO_POSTS {
                items.push_str("<p><a href=\"/blogs\">View All Blogs</a></p>");
            }
            section("blogs", "Blog", items)
        }
        Section::Contact => {
            let mut lines = Vec::new();
            if !data.email.trim().is_empty() {
                lines.push(format!(
                    "<li>{}</li>",
                    link(&format!("mailto:{}", data.email.trim()), &data.email)
                ));
            }
            if !data.phone.trim().is_empty() {
                lines.push(format!("<li>{}</li>", escape(&data.phone)));
            }
            if !data.website.trim().is_empty() {
                lines.push(format!("<li>{}</li>", link(&data.website, &data.website)));
            }
            if lines.is_empty() {
                String::new()
            } else {
                section("contact", "Contact", format!("<ul>{}</ul>", lines.concat()))
            }
        }
        _ => String::new(),
    }
}

fn footer(user: &UserRecord, data: &PortfolioData) -> String {
    let socials: Vec<String> = data
        .social
        .entries()
        .into_iter()
        .map(|(label, url)| link(url, label))
        .filter(|a| !a.is_empty())
        .collect();
    format!(
        "<footer><p>{}</p><p class=\"muted\">&copy; {}</p></footer>",
        socials.join(" "),
        escape(user.display_name())
    )
}

/// Renders `user`'s portfolio with the variant stored on the record.
pub fn render_portfolio(user: &UserRecord, posts: &[BlogPost]) -> String {
    let template = PortfolioTemplate::resolve(Some(&user.portfolio_template));
    let data = &user.portfolio_data;

    let mut body = format!(
        r#"<main class="portfolio template-{}">"#,
        template.id().as_str()
    );
    for kind in sections(template) {
        body.push_str(&render_section(*kind, user, data, posts));
    }
    body.push_str(&footer(user, data));
    body.push_str("</main>");

    let description = if data.bio.trim().is_empty() {
        format!("Portfolio of {}", user.display_name())
    } else {
        data.bio.clone()
    };
    layout(
        &format!("{} | Portfolio", user.display_name()),
        &description,
        &template.theme(),
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Project;
    use chrono::Utc;

    fn user(template: &str) -> UserRecord {
        let mut user = UserRecord::new("uid-1", "ada", "ada@example.com");
        user.portfolio_template = template.to_string();
        user.portfolio_data.skills = vec!["Rust".into()];
        user.portfolio_data.about = "Mathematician".into();
        user.portfolio_data.projects = vec![Project {
            title: "Engine".into(),
            ..Project::default()
        }];
        user
    }

    fn post(slug: &str) -> BlogPost {
        BlogPost {
            id: slug.into(),
            uid: "uid-1".into(),
            title: "Notes".into(),
            content: "Body".into(),
            cover_image: None,
            slug: slug.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_template_falls_back_to_first() {
        let html = render_portfolio(&user("9"), &[]);
        assert!(html.contains("template-1"));
        let html = render_portfolio(&user(""), &[]);
        assert!(html.contains("template-1"));
    }

    #[test]
    fn test_variant_sections_differ() {
        let aurora = render_portfolio(&user("1"), &[]);
        assert!(aurora.contains(r#"id="about""#));

        let cyberpunk = render_portfolio(&user("4"), &[]);
        assert!(cyberpunk.contains("template-4"));
        assert!(!cyberpunk.contains(r#"id="about""#));
        assert!(cyberpunk.contains(r#"id="skills""#));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut user = user("1");
        user.portfolio_data.bio = "<script>x</script>".into();
        let html = render_portfolio(&user, &[]);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_more_than_six_posts_link_to_index() {
        let posts: Vec<BlogPost> = (0..7).map(|i| post(&format!("p-{}", i))).collect();
        let html = render_portfolio(&user("1"), &posts);
        assert!(html.contains("href=\"/blogs\""));
        assert!(!html.contains("p-6"));

        let html = render_portfolio(&user("1"), &posts[..2]);
        assert!(!html.contains("href=\"/blogs\""));
    }
}
