//! Post bodies are plain text. Each blog template splits them into blocks
//! its own way.

use crate::templates::{BlogTemplate, ParagraphBreak};

use super::escape;

const WORDS_PER_MINUTE: usize = 200;
const CODE_FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    /// Fence markers already removed.
    Code(String),
}

impl Block {
    pub fn to_html(&self) -> String {
        match self {
            Block::Heading(text) => format!("<h2>{}</h2>", escape(text)),
            Block::Paragraph(text) => format!("<p>{}</p>", escape(text)),
            Block::Code(text) => format!("<pre><code>{}</code></pre>", escape(text)),
        }
    }
}

pub fn parse_blocks(content: &str, template: BlogTemplate) -> Vec<Block> {
    let content = content.replace("\r\n", "\n");
    let pieces: Vec<&str> = match template.paragraph_break() {
        ParagraphBreak::Line => content.split('\n').collect(),
        ParagraphBreak::BlankLine => content.split("\n\n").collect(),
    };

    pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| {
            if let Some(heading) = piece.strip_prefix("# ") {
                if template.renders_headings() {
                    return Block::Heading(heading.to_string());
                }
            }
            if piece.starts_with(CODE_FENCE) && template.renders_code_blocks() {
                return Block::Code(piece.replace(CODE_FENCE, ""));
            }
            Block::Paragraph(piece.to_string())
        })
        .collect()
}

/// Whole minutes at 200 words per minute, never less than one.
pub fn reading_time_minutes(content: &str) -> usize {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateId;

    fn template(id: TemplateId) -> BlogTemplate {
        BlogTemplate::from(id)
    }

    #[test]
    fn test_line_split_templates_break_on_every_newline() {
        let blocks = parse_blocks("one\ntwo\n\nthree", template(TemplateId::One));
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("one".into()),
                Block::Paragraph("two".into()),
                Block::Paragraph("three".into()),
            ]
        );
    }

    #[test]
    fn test_blank_line_templates_keep_soft_breaks_together() {
        let blocks = parse_blocks("one\ntwo\n\nthree", template(TemplateId::Four));
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("one\ntwo".into()),
                Block::Paragraph("three".into()),
            ]
        );
    }

    #[test]
    fn test_headings_only_where_supported() {
        let body = "# Intro\n\nText";
        assert_eq!(
            parse_blocks(body, template(TemplateId::Five))[0],
            Block::Heading("Intro".into())
        );
        assert_eq!(
            parse_blocks(body, template(TemplateId::Four))[0],
            Block::Paragraph("# Intro".into())
        );
    }

    #[test]
    fn test_fenced_paragraph_is_code_only_in_terminal_template() {
        let body = "Intro\n\n```\nlet x = 1 < 2;\n```";
        assert_eq!(
            parse_blocks(body, template(TemplateId::Seven))[1],
            Block::Code("\nlet x = 1 < 2;\n".into())
        );
        assert_eq!(
            parse_blocks(body, template(TemplateId::Five))[1],
            Block::Paragraph("```\nlet x = 1 < 2;\n```".into())
        );
    }

    #[test]
    fn test_code_block_html_is_escaped() {
        let html = Block::Code("a<b".into()).to_html();
        assert!(html.starts_with("<pre><code>"));
        assert!(html.ends_with("</code></pre>"));
        assert!(!html.contains("a<b"));
    }

    #[test]
    fn test_crlf_content_splits_into_paragraphs() {
        let blocks = parse_blocks("one\r\ntwo\r\n\r\nthree", template(TemplateId::Four));
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("one\ntwo".into()),
                Block::Paragraph("three".into()),
            ]
        );
        assert_eq!(
            parse_blocks("a\r\nb", template(TemplateId::One)),
            vec![Block::Paragraph("a".into()), Block::Paragraph("b".into())]
        );
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_block_html_is_escaped() {
        let html = Block::Paragraph("<b>bold</b>".into()).to_html();
        assert!(html.starts_with("<p>"));
        assert!(!html.contains("<b>"));
    }
}
