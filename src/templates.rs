/**
 * Template Resolver
 * Maps a stored template id onto one of eight portfolio or blog variants.
 */
use serde::{Deserialize, Serialize};

/// The eight template slots. Stored on the wire as the strings "1".."8".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateId {
    #[default]
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl TemplateId {
    pub const ALL: [TemplateId; 8] = [
        TemplateId::One,
        TemplateId::Two,
        TemplateId::Three,
        TemplateId::Four,
        TemplateId::Five,
        TemplateId::Six,
        TemplateId::Seven,
        TemplateId::Eight,
    ];

    /// Exact match on "1".."8"; anything else, including no value, is slot one.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("1") => TemplateId::One,
            Some("2") => TemplateId::Two,
            Some("3") => TemplateId::Three,
            Some("4") => TemplateId::Four,
            Some("5") => TemplateId::Five,
            Some("6") => TemplateId::Six,
            Some("7") => TemplateId::Seven,
            Some("8") => TemplateId::Eight,
            _ => TemplateId::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::One => "1",
            TemplateId::Two => "2",
            TemplateId::Three => "3",
            TemplateId::Four => "4",
            TemplateId::Five => "5",
            TemplateId::Six => "6",
            TemplateId::Seven => "7",
            TemplateId::Eight => "8",
        }
    }
}

/// Which of a user's two template choices is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Portfolio,
    Blog,
}

impl TemplateKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "portfolio" => Some(TemplateKind::Portfolio),
            "blog" => Some(TemplateKind::Blog),
            _ => None,
        }
    }

    /// Column / document field holding this choice.
    pub fn field(self) -> &'static str {
        match self {
            TemplateKind::Portfolio => "portfolioTemplate",
            TemplateKind::Blog => "blogTemplate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioTemplate {
    AuroraGlass,
    DarkMinimalist,
    ProfessionalCard,
    CyberpunkNeon,
    MinimalEditorial,
    VibrantGradient,
    TerminalHacker,
    LuxuryDark,
}

impl From<TemplateId> for PortfolioTemplate {
    fn from(id: TemplateId) -> Self {
        match id {
            TemplateId::One => PortfolioTemplate::AuroraGlass,
            TemplateId::Two => PortfolioTemplate::DarkMinimalist,
            TemplateId::Three => PortfolioTemplate::ProfessionalCard,
            TemplateId::Four => PortfolioTemplate::CyberpunkNeon,
            TemplateId::Five => PortfolioTemplate::MinimalEditorial,
            TemplateId::Six => PortfolioTemplate::VibrantGradient,
            TemplateId::Seven => PortfolioTemplate::TerminalHacker,
            TemplateId::Eight => PortfolioTemplate::LuxuryDark,
        }
    }
}

impl PortfolioTemplate {
    pub fn resolve(raw: Option<&str>) -> Self {
        TemplateId::resolve(raw).into()
    }

    pub fn id(self) -> TemplateId {
        match self {
            PortfolioTemplate::AuroraGlass => TemplateId::One,
            PortfolioTemplate::DarkMinimalist => TemplateId::Two,
            PortfolioTemplate::ProfessionalCard => TemplateId::Three,
            PortfolioTemplate::CyberpunkNeon => TemplateId::Four,
            PortfolioTemplate::MinimalEditorial => TemplateId::Five,
            PortfolioTemplate::VibrantGradient => TemplateId::Six,
            PortfolioTemplate::TerminalHacker => TemplateId::Seven,
            PortfolioTemplate::LuxuryDark => TemplateId::Eight,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PortfolioTemplate::AuroraGlass => "Aurora Glass",
            PortfolioTemplate::DarkMinimalist => "Dark Minimalist",
            PortfolioTemplate::ProfessionalCard => "Professional Card",
            PortfolioTemplate::CyberpunkNeon => "Cyberpunk Neon",
            PortfolioTemplate::MinimalEditorial => "Minimal Editorial",
            PortfolioTemplate::VibrantGradient => "Vibrant Gradient",
            PortfolioTemplate::TerminalHacker => "Terminal Hacker",
            PortfolioTemplate::LuxuryDark => "Luxury Dark",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PortfolioTemplate::AuroraGlass => {
                "Modern design with glass-morphism effects and gradient backgrounds."
            }
            PortfolioTemplate::DarkMinimalist => {
                "Dark theme with minimalist aesthetics and bold typography."
            }
            PortfolioTemplate::ProfessionalCard => {
                "Clean card-based layout with blue gradients, perfect for professionals."
            }
            PortfolioTemplate::CyberpunkNeon => {
                "Futuristic dark theme with neon accents and animated particles."
            }
            PortfolioTemplate::MinimalEditorial => {
                "Ultra-minimal black and white design with editorial typography."
            }
            PortfolioTemplate::VibrantGradient => {
                "Colorful gradients with orange and pink tones, modern and playful."
            }
            PortfolioTemplate::TerminalHacker => {
                "Terminal-inspired green monochrome theme for developers."
            }
            PortfolioTemplate::LuxuryDark => {
                "Premium dark design with purple accents and smooth parallax effects."
            }
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            PortfolioTemplate::AuroraGlass => Theme::new("#0f172a", "#e2e8f0", "#38bdf8", Font::Sans),
            PortfolioTemplate::DarkMinimalist => Theme::new("#0a0a0a", "#fafafa", "#a3a3a3", Font::Sans),
            PortfolioTemplate::ProfessionalCard => Theme::new("#f8fafc", "#0f172a", "#2563eb", Font::Sans),
            PortfolioTemplate::CyberpunkNeon => Theme::new("#050014", "#f0abfc", "#22d3ee", Font::Mono),
            PortfolioTemplate::MinimalEditorial => Theme::new("#ffffff", "#111111", "#111111", Font::Serif),
            PortfolioTemplate::VibrantGradient => Theme::new("#fff7ed", "#431407", "#ec4899", Font::Sans),
            PortfolioTemplate::TerminalHacker => Theme::new("#000000", "#22c55e", "#4ade80", Font::Mono),
            PortfolioTemplate::LuxuryDark => Theme::new("#0c0a13", "#ede9fe", "#a855f7", Font::Serif),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogTemplate {
    ClassicReader,
    DarkMagazine,
    GradientModern,
    ParallaxDark,
    MinimalEditorial,
    SocialVibrant,
    TerminalCode,
    LuxuryReading,
}

impl From<TemplateId> for BlogTemplate {
    fn from(id: TemplateId) -> Self {
        match id {
            TemplateId::One => BlogTemplate::ClassicReader,
            TemplateId::Two => BlogTemplate::DarkMagazine,
            TemplateId::Three => BlogTemplate::GradientModern,
            TemplateId::Four => BlogTemplate::ParallaxDark,
            TemplateId::Five => BlogTemplate::MinimalEditorial,
            TemplateId::Six => BlogTemplate::SocialVibrant,
            TemplateId::Seven => BlogTemplate::TerminalCode,
            TemplateId::Eight => BlogTemplate::LuxuryReading,
        }
    }
}

/// How a template cuts post content into paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphBreak {
    /// Every newline starts a paragraph.
    Line,
    /// Only blank lines separate paragraphs.
    BlankLine,
}

impl BlogTemplate {
    pub fn resolve(raw: Option<&str>) -> Self {
        TemplateId::resolve(raw).into()
    }

    pub fn id(self) -> TemplateId {
        match self {
            BlogTemplate::ClassicReader => TemplateId::One,
            BlogTemplate::DarkMagazine => TemplateId::Two,
            BlogTemplate::GradientModern => TemplateId::Three,
            BlogTemplate::ParallaxDark => TemplateId::Four,
            BlogTemplate::MinimalEditorial => TemplateId::Five,
            BlogTemplate::SocialVibrant => TemplateId::Six,
            BlogTemplate::TerminalCode => TemplateId::Seven,
            BlogTemplate::LuxuryReading => TemplateId::Eight,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlogTemplate::ClassicReader => "Classic Reader",
            BlogTemplate::DarkMagazine => "Dark Magazine",
            BlogTemplate::GradientModern => "Gradient Modern",
            BlogTemplate::ParallaxDark => "Parallax Dark",
            BlogTemplate::MinimalEditorial => "Minimal Editorial",
            BlogTemplate::SocialVibrant => "Social Vibrant",
            BlogTemplate::TerminalCode => "Terminal Code",
            BlogTemplate::LuxuryReading => "Luxury Reading",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BlogTemplate::ClassicReader => "Traditional blog layout focused on readability.",
            BlogTemplate::DarkMagazine => "Magazine-style dark theme with reading time estimates.",
            BlogTemplate::GradientModern => {
                "Modern blog with blue-purple gradients and floating elements."
            }
            BlogTemplate::ParallaxDark => {
                "Immersive dark theme with parallax scrolling and progress bar."
            }
            BlogTemplate::MinimalEditorial => {
                "Clean and minimal design focused on typography and content."
            }
            BlogTemplate::SocialVibrant => {
                "Engaging design with social features and vibrant orange-pink colors."
            }
            BlogTemplate::TerminalCode => {
                "Developer-focused terminal theme with code syntax highlighting."
            }
            BlogTemplate::LuxuryReading => {
                "Premium dark reading experience with purple accents and smooth animations."
            }
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            BlogTemplate::ClassicReader => Theme::new("#ffffff", "#1f2937", "#2563eb", Font::Serif),
            BlogTemplate::DarkMagazine => Theme::new("#111827", "#f3f4f6", "#f59e0b", Font::Sans),
            BlogTemplate::GradientModern => Theme::new("#eef2ff", "#1e1b4b", "#7c3aed", Font::Sans),
            BlogTemplate::ParallaxDark => Theme::new("#030712", "#e5e7eb", "#60a5fa", Font::Sans),
            BlogTemplate::MinimalEditorial => Theme::new("#ffffff", "#111111", "#111111", Font::Serif),
            BlogTemplate::SocialVibrant => Theme::new("#fff7ed", "#431407", "#f97316", Font::Sans),
            BlogTemplate::TerminalCode => Theme::new("#0d1117", "#3fb950", "#58a6ff", Font::Mono),
            BlogTemplate::LuxuryReading => Theme::new("#0c0a13", "#ede9fe", "#a855f7", Font::Serif),
        }
    }

    pub fn paragraph_break(self) -> ParagraphBreak {
        match self {
            BlogTemplate::ClassicReader | BlogTemplate::DarkMagazine | BlogTemplate::GradientModern => {
                ParagraphBreak::Line
            }
            _ => ParagraphBreak::BlankLine,
        }
    }

    /// Whether a paragraph starting with "# " renders as a heading.
    pub fn renders_headings(self) -> bool {
        matches!(
            self,
            BlogTemplate::MinimalEditorial | BlogTemplate::TerminalCode | BlogTemplate::LuxuryReading
        )
    }

    /// Whether a paragraph opening with a ``` fence renders as preformatted code.
    pub fn renders_code_blocks(self) -> bool {
        self == BlogTemplate::TerminalCode
    }

    pub fn shows_reading_time(self) -> bool {
        matches!(
            self,
            BlogTemplate::DarkMagazine | BlogTemplate::GradientModern | BlogTemplate::MinimalEditorial
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Sans,
    Serif,
    Mono,
}

impl Font {
    pub fn css_stack(self) -> &'static str {
        match self {
            Font::Sans => "system-ui, -apple-system, 'Segoe UI', sans-serif",
            Font::Serif => "Georgia, 'Times New Roman', serif",
            Font::Mono => "ui-monospace, 'SFMono-Regular', Menlo, monospace",
        }
    }
}

/// Colours and type used when rendering a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: &'static str,
    pub foreground: &'static str,
    pub accent: &'static str,
    pub font: Font,
}

impl Theme {
    const fn new(
        background: &'static str,
        foreground: &'static str,
        accent: &'static str,
        font: Font,
    ) -> Self {
        Self {
            background,
            foreground,
            accent,
            font,
        }
    }
}

/// One selectable entry in the template chooser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateOption {
    pub id: String,
    pub name: String,
    pub description: String,
}

pub fn catalog(kind: TemplateKind) -> Vec<TemplateOption> {
    TemplateId::ALL
        .into_iter()
        .map(|id| {
            let (name, description) = match kind {
                TemplateKind::Portfolio => {
                    let t = PortfolioTemplate::from(id);
                    (t.name(), t.description())
                }
                TemplateKind::Blog => {
                    let t = BlogTemplate::from(id);
                    (t.name(), t.description())
                }
            };
            TemplateOption {
                id: id.as_str().to_string(),
                name: name.to_string(),
                description: description.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve_to_their_slot() {
        for id in TemplateId::ALL {
            assert_eq!(TemplateId::resolve(Some(id.as_str())), id);
            assert_eq!(PortfolioTemplate::from(id).id(), id);
            assert_eq!(BlogTemplate::from(id).id(), id);
        }
        assert_eq!(PortfolioTemplate::resolve(Some("7")), PortfolioTemplate::TerminalHacker);
        assert_eq!(BlogTemplate::resolve(Some("8")), BlogTemplate::LuxuryReading);
    }

    #[test]
    fn test_unknown_ids_fall_back_to_first_variant() {
        for raw in [None, Some(""), Some("9"), Some("0"), Some(" 1"), Some("one"), Some("10")] {
            assert_eq!(TemplateId::resolve(raw), TemplateId::One, "{:?}", raw);
            assert_eq!(PortfolioTemplate::resolve(raw), PortfolioTemplate::AuroraGlass);
            assert_eq!(BlogTemplate::resolve(raw), BlogTemplate::ClassicReader);
        }
    }

    #[test]
    fn test_catalog_lists_eight_options_per_kind() {
        let portfolio = catalog(TemplateKind::Portfolio);
        let blog = catalog(TemplateKind::Blog);
        assert_eq!(portfolio.len(), 8);
        assert_eq!(blog.len(), 8);
        assert_eq!(portfolio[3].name, "Cyberpunk Neon");
        assert_eq!(blog[0].id, "1");
        assert_eq!(blog[7].name, "Luxury Reading");
    }

    #[test]
    fn test_blog_content_conventions() {
        assert_eq!(BlogTemplate::ClassicReader.paragraph_break(), ParagraphBreak::Line);
        assert_eq!(BlogTemplate::ParallaxDark.paragraph_break(), ParagraphBreak::BlankLine);
        assert!(BlogTemplate::TerminalCode.renders_headings());
        assert!(!BlogTemplate::ClassicReader.renders_headings());
        assert!(BlogTemplate::DarkMagazine.shows_reading_time());
    }

    #[test]
    fn test_template_kind_parse() {
        assert_eq!(TemplateKind::parse("blog"), Some(TemplateKind::Blog));
        assert_eq!(TemplateKind::parse("Blog"), None);
        assert_eq!(TemplateKind::Portfolio.field(), "portfolioTemplate");
    }
}
