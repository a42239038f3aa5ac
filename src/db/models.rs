//! Data model shared by the stores, the edit surface and the renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::image::ImageRef;

/// One record per authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub portfolio_template: String,
    pub blog_template: String,
    pub portfolio_data: PortfolioData,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Fresh record as written at registration.
    pub fn new(uid: &str, username: &str, email: &str) -> Self {
        Self {
            uid: uid.to_string(),
            username: username.to_lowercase(),
            email: email.to_string(),
            portfolio_template: "1".to_string(),
            blog_template: "1".to_string(),
            portfolio_data: PortfolioData::for_new_user(username, email),
            created_at: Utc::now(),
        }
    }

    /// Name shown as post author: the portfolio name, else the username.
    pub fn display_name(&self) -> &str {
        let name = self.portfolio_data.name.trim();
        if name.is_empty() {
            &self.username
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioData {
    pub name: String,
    pub bio: String,
    pub about: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub resume_url: String,
    #[serde(deserialize_with = "lenient_years")]
    pub years_of_experience: u32,
    pub availability: String,
    pub profile_image: Option<ImageRef>,
    pub cover_image: Option<ImageRef>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub certifications: Vec<String>,
    pub testimonials: Vec<Testimonial>,
}

impl PortfolioData {
    pub fn for_new_user(username: &str, email: &str) -> Self {
        Self {
            name: username.to_string(),
            email: email.to_string(),
            ..Self::default()
        }
    }
}

/// Parse years of experience from form input; anything unusable is 0.
pub fn coerce_years(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        serde_json::Value::String(s) => coerce_years(&s),
        _ => 0,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub instagram: String,
    pub youtube: String,
    pub discord: String,
    pub dribbble: String,
    pub behance: String,
}

impl SocialLinks {
    /// Non-empty links in display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("GitHub", self.github.as_str()),
            ("LinkedIn", self.linkedin.as_str()),
            ("Twitter", self.twitter.as_str()),
            ("Instagram", self.instagram.as_str()),
            ("YouTube", self.youtube.as_str()),
            ("Discord", self.discord.as_str()),
            ("Dribbble", self.dribbble.as_str()),
            ("Behance", self.behance.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github: Option<String>,
    pub live: Option<String>,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub duration: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Testimonial {
    pub name: String,
    pub role: String,
    pub company: String,
    pub text: String,
    pub image: Option<ImageRef>,
}

/// Top-level fields of [`PortfolioData`] addressable by a single-field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortfolioField {
    Name,
    Bio,
    About,
    Title,
    Location,
    Email,
    Phone,
    Website,
    ResumeUrl,
    YearsOfExperience,
    Availability,
    ProfileImage,
    CoverImage,
    Skills,
    Social,
    Projects,
    Experience,
    Education,
    Certifications,
    Testimonials,
}

impl PortfolioField {
    pub const ALL: [PortfolioField; 20] = [
        PortfolioField::Name,
        PortfolioField::Bio,
        PortfolioField::About,
        PortfolioField::Title,
        PortfolioField::Location,
        PortfolioField::Email,
        PortfolioField::Phone,
        PortfolioField::Website,
        PortfolioField::ResumeUrl,
        PortfolioField::YearsOfExperience,
        PortfolioField::Availability,
        PortfolioField::ProfileImage,
        PortfolioField::CoverImage,
        PortfolioField::Skills,
        PortfolioField::Social,
        PortfolioField::Projects,
        PortfolioField::Experience,
        PortfolioField::Education,
        PortfolioField::Certifications,
        PortfolioField::Testimonials,
    ];

    /// JSON key inside `portfolioData`.
    pub fn key(self) -> &'static str {
        match self {
            PortfolioField::Name => "name",
            PortfolioField::Bio => "bio",
            PortfolioField::About => "about",
            PortfolioField::Title => "title",
            PortfolioField::Location => "location",
            PortfolioField::Email => "email",
            PortfolioField::Phone => "phone",
            PortfolioField::Website => "website",
            PortfolioField::ResumeUrl => "resumeUrl",
            PortfolioField::YearsOfExperience => "yearsOfExperience",
            PortfolioField::Availability => "availability",
            PortfolioField::ProfileImage => "profileImage",
            PortfolioField::CoverImage => "coverImage",
            PortfolioField::Skills => "skills",
            PortfolioField::Social => "social",
            PortfolioField::Projects => "projects",
            PortfolioField::Experience => "experience",
            PortfolioField::Education => "education",
            PortfolioField::Certifications => "certifications",
            PortfolioField::Testimonials => "testimonials",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Check `value` against the field's type and return it in stored form.
    pub fn normalize(self, value: serde_json::Value) -> Result<serde_json::Value, serde_json::Error> {
        let mut probe = serde_json::Map::new();
        probe.insert(self.key().to_string(), value);
        let parsed: PortfolioData = serde_json::from_value(serde_json::Value::Object(probe))?;
        let mut stored = serde_json::to_value(parsed)?;
        Ok(stored
            .get_mut(self.key())
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

/// Blog post document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub uid: String,
    pub title: String,
    pub content: String,
    pub cover_image: Option<ImageRef>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<ImageRef>,
}

/// Partial update of a post. Slug and owner are not part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image: Option<Option<ImageRef>>,
}

/// `absent` → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
fn double_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<ImageRef>>, D::Error> {
    Option::<ImageRef>::deserialize(deserializer).map(Some)
}

impl BlogPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.cover_image.is_none()
    }

    pub fn apply(&self, post: &mut BlogPost) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(cover) = &self.cover_image {
            post.cover_image = cover.clone();
        }
    }
}
