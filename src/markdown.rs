//! Minimal Markdown-to-HTML converter for step descriptions.
//!
//! Supported syntax, and nothing else:
//!
//! - `**bold**` / `__bold__`, `*italic*` / `_italic_`, `` `code` ``
//! - `[links](url)` and `![images](src "optional title")`
//! - `###` to `######` headings (h1/h2 are too large for popovers)
//! - `> ` blockquotes, `---` / `***` / `___` rules
//! - `- ` / `* ` unordered and `1. ` ordered lists
//! - blank line = paragraph break, single newline = `<br>`
//!
//! `&` and `<` are escaped unless they start an entity or a tag, so authors
//! can write raw HTML. Rendering is not idempotent: feed it raw source once.

mod inline;

/// Convert Markdown source to HTML.
pub fn render(source: &str) -> String {
    if source.is_empty() {
        return String::new();
    }

    let text = source.replace("\r\n", "\n").replace('\r', "\n");
    parse_blocks(&text).iter().map(Block::to_html).collect()
}

/// A block-level element.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Paragraph(Vec<&'a str>),
    Heading { level: usize, text: &'a str },
    Quote(Vec<&'a str>),
    Rule,
    List { ordered: bool, items: Vec<&'a str> },
}

impl<'a> Block<'a> {
    /// Append `line` when it continues this block.
    fn extend(&mut self, line: &Line<'a>) -> bool {
        match (self, line) {
            (Self::Paragraph(lines), Line::Text(t)) | (Self::Quote(lines), Line::Quote(t)) => {
                lines.push(*t);
                true
            }
            (Self::List { ordered: false, items }, Line::Bullet(t))
            | (Self::List { ordered: true, items }, Line::Numbered(t)) => {
                items.push(*t);
                true
            }
            _ => false,
        }
    }

    fn to_html(&self) -> String {
        match self {
            Self::Paragraph(lines) => format!("<p>{}</p>", join_lines(lines)),
            Self::Heading { level, text } => {
                format!("<h{level}>{}</h{level}>", inline::render(text))
            }
            Self::Quote(lines) => format!("<blockquote>{}</blockquote>", join_lines(lines)),
            Self::Rule => "<hr>".to_string(),
            Self::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", inline::render(item)))
                    .collect();
                format!("<{tag}>{items}</{tag}>")
            }
        }
    }
}

fn join_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| inline::render(line))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// What a single source line is, on its own.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Rule,
    Heading(usize, &'a str),
    Quote(&'a str),
    Bullet(&'a str),
    Numbered(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    let body = line.trim_end();
    if body.len() >= 3 && body.chars().all(|c| matches!(c, '-' | '*' | '_')) {
        return Line::Rule;
    }

    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (3..=6).contains(&hashes)
        && let Some(text) = after_space(&line[hashes..])
    {
        return Line::Heading(hashes, text);
    }

    if let Some(rest) = line.strip_prefix('>')
        && let Some(text) = after_space(rest)
    {
        return Line::Quote(text);
    }

    if let Some(rest) = line.strip_prefix(['-', '*'])
        && let Some(text) = after_space(rest)
    {
        return Line::Bullet(text);
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0
        && let Some(rest) = line[digits..].strip_prefix('.')
        && let Some(text) = after_space(rest)
    {
        return Line::Numbered(text);
    }

    Line::Text(line)
}

/// The text after at least one whitespace character, if non-empty.
fn after_space(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

fn parse_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut open: Option<Block<'_>> = None;

    for line in text.split('\n') {
        let kind = classify(line);
        if let Some(block) = open.as_mut()
            && block.extend(&kind)
        {
            continue;
        }

        blocks.extend(open.take());
        open = match kind {
            Line::Blank => None,
            Line::Rule => {
                blocks.push(Block::Rule);
                None
            }
            Line::Heading(level, text) => {
                blocks.push(Block::Heading { level, text });
                None
            }
            Line::Text(t) => Some(Block::Paragraph(vec![t])),
            Line::Quote(t) => Some(Block::Quote(vec![t])),
            Line::Bullet(t) => Some(Block::List {
                ordered: false,
                items: vec![t],
            }),
            Line::Numbered(t) => Some(Block::List {
                ordered: true,
                items: vec![t],
            }),
        };
    }

    blocks.extend(open);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic_paragraph() {
        assert_eq!(
            render("**bold** and *italic*"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn empty_source_renders_nothing() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n"), "");
    }

    #[test]
    fn blank_line_splits_paragraphs_single_newline_breaks() {
        assert_eq!(
            render("one\ntwo\n\nthree"),
            "<p>one<br>two</p><p>three</p>"
        );
        assert_eq!(render("a\r\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn only_small_headings() {
        assert_eq!(render("### Title"), "<h3>Title</h3>");
        assert_eq!(render("###### Tiny"), "<h6>Tiny</h6>");
        assert_eq!(render("# Big"), "<p># Big</p>");
        assert_eq!(render("## Big"), "<p>## Big</p>");
        assert_eq!(render("####### Seven"), "<p>####### Seven</p>");
    }

    #[test]
    fn adjacent_quote_lines_merge() {
        assert_eq!(
            render("> first\n> second"),
            "<blockquote>first<br>second</blockquote>"
        );
    }

    #[test]
    fn rules() {
        assert_eq!(render("---"), "<hr>");
        assert_eq!(render("text\n***\nmore"), "<p>text</p><hr><p>more</p>");
    }

    #[test]
    fn lists() {
        assert_eq!(
            render("- one\n* two"),
            "<ul><li>one</li><li>two</li></ul>"
        );
        assert_eq!(
            render("1. first\n2. **second**"),
            "<ol><li>first</li><li><strong>second</strong></li></ol>"
        );
    }

    #[test]
    fn list_after_paragraph_starts_new_block() {
        assert_eq!(
            render("Steps:\n- open\n- click"),
            "<p>Steps:</p><ul><li>open</li><li>click</li></ul>"
        );
    }

    #[test]
    fn bold_at_line_start_is_not_a_bullet() {
        assert_eq!(render("**Note** this"), "<p><strong>Note</strong> this</p>");
    }

    #[test]
    fn mixed_document() {
        let source = "### Welcome\n\nThis is the **sales** sheet.\n\n> Tip: use `filters`\n\n---\n1. Pick a year";
        assert_eq!(
            render(source),
            "<h3>Welcome</h3>\
             <p>This is the <strong>sales</strong> sheet.</p>\
             <blockquote>Tip: use <code>filters</code></blockquote>\
             <hr>\
             <ol><li>Pick a year</li></ol>"
        );
    }
}
