//! Inline spans: emphasis, code, links, images, and escaping.
//!
//! A single left-to-right scan. At each position the recognized constructs
//! are tried in a fixed order (code, image, link, strong, emphasis); text
//! that starts none of them is copied through the escaper.

/// Render one line of inline Markdown.
pub(super) fn render(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_inline(text, &mut out);
    out
}

fn push_inline(text: &str, out: &mut String) {
    let mut rest = text;
    let mut prev: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if let Some((html, used)) = construct(rest, prev) {
            out.push_str(&html);
            prev = rest[..used].chars().next_back();
            rest = &rest[used..];
            continue;
        }

        push_escaped(rest, c, out);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }
}

/// Try every construct at the start of `rest`.
///
/// Returns the rendered HTML and the number of bytes consumed.
fn construct(rest: &str, prev: Option<char>) -> Option<(String, usize)> {
    match rest.as_bytes()[0] {
        b'`' => code(rest),
        b'!' => image(rest),
        b'[' => link(rest),
        b'*' => delimited(rest, "**", "strong").or_else(|| delimited(rest, "*", "em")),
        b'_' => delimited(rest, "__", "strong").or_else(|| underscore_em(rest, prev)),
        _ => None,
    }
}

fn code(rest: &str) -> Option<(String, usize)> {
    let end = rest[1..].find('`')? + 1;
    let content = &rest[1..end];
    if content.is_empty() {
        return None;
    }
    Some((format!("<code>{}</code>", escape(content)), end + 1))
}

/// `![alt](src "title")`, title optional.
fn image(rest: &str) -> Option<(String, usize)> {
    let body = rest.strip_prefix("![")?;
    let alt_end = body.find(']')?;
    let alt = &body[..alt_end];
    let after = body[alt_end + 1..].strip_prefix('(')?;

    let src_end = after.find(|c: char| c == ')' || c.is_whitespace())?;
    let src = &after[..src_end];
    if src.is_empty() {
        return None;
    }

    let tail = &after[src_end..];
    let (title, close) = if let Some(close) = tail.strip_prefix(')') {
        (None, close)
    } else {
        let quoted = tail.trim_start().strip_prefix('"')?;
        let title_end = quoted.find('"')?;
        let close = quoted[title_end + 1..].strip_prefix(')')?;
        (Some(&quoted[..title_end]), close)
    };

    let title_attr = title
        .filter(|t| !t.is_empty())
        .map(|t| format!(" title=\"{}\"", escape(t)))
        .unwrap_or_default();
    let html = format!(
        "<img src=\"{}\" alt=\"{}\"{title_attr} style=\"max-width:100%;height:auto;\" />",
        escape(src),
        escape(alt),
    );
    Some((html, rest.len() - close.len()))
}

/// `[text](url)`. Links open in a new tab.
fn link(rest: &str) -> Option<(String, usize)> {
    let body = rest.strip_prefix('[')?;
    let text_end = body.find(']')?;
    let label = &body[..text_end];
    let after = body[text_end + 1..].strip_prefix('(')?;
    let url_end = after.find(')')?;
    let url = &after[..url_end];
    if label.is_empty() || url.is_empty() {
        return None;
    }

    let html = format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        escape(url),
        render(label),
    );
    Some((html, rest.len() - after.len() + url_end + 1))
}

/// `<delim>content<delim>` with non-empty content, rendered recursively.
fn delimited(rest: &str, delim: &str, tag: &str) -> Option<(String, usize)> {
    let body = rest.strip_prefix(delim)?;
    // Skip the first character so the content is never empty.
    let first = body.chars().next()?;
    let end = body[first.len_utf8()..].find(delim)? + first.len_utf8();
    let content = &body[..end];

    Some((
        format!("<{tag}>{}</{tag}>", render(content)),
        delim.len() + end + delim.len(),
    ))
}

/// `_italic_`, only at word boundaries so `snake_case_names` stay intact.
fn underscore_em(rest: &str, prev: Option<char>) -> Option<(String, usize)> {
    if prev.is_some_and(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let body = rest.strip_prefix('_')?;
    let first = body.chars().next()?;
    let mut from = first.len_utf8();
    while let Some(pos) = body[from..].find('_') {
        let end = from + pos;
        let next = body[end + 1..].chars().next();
        if !next.is_some_and(|c| c.is_ascii_alphanumeric()) {
            let content = &body[..end];
            return Some((format!("<em>{}</em>", render(content)), end + 2));
        }
        from = end + 1;
    }
    None
}

/// Copy one character, escaping `&` and `<` unless they begin an entity
/// or a tag.
fn push_escaped(rest: &str, c: char, out: &mut String) {
    match c {
        '&' if !starts_entity(rest) => out.push_str("&amp;"),
        '<' if !starts_tag(rest) => out.push_str("&lt;"),
        _ => out.push(c),
    }
}

/// Escape a whole span (code, attribute values).
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        push_escaped(&text[i..], c, &mut out);
    }
    out
}

/// `&name;`, `&#123;`, `&#x1F;`: an ampersand followed by word characters
/// and a semicolon, with an optional `#`.
fn starts_entity(rest: &str) -> bool {
    let body = rest[1..].strip_prefix('#').unwrap_or(&rest[1..]);
    let word = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    word > 0 && body[word..].starts_with(';')
}

/// `<` followed by a tag name, closing slash, or `!` (comments, doctype).
fn starts_tag(rest: &str) -> bool {
    rest[1..]
        .chars()
        .next()
        .is_some_and(|c| c == '/' || c == '!' || c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_and_em_both_spellings() {
        assert_eq!(render("**a** __b__"), "<strong>a</strong> <strong>b</strong>");
        assert_eq!(render("*a* _b_"), "<em>a</em> <em>b</em>");
    }

    #[test]
    fn nested_emphasis() {
        assert_eq!(
            render("**bold *and* italic**"),
            "<strong>bold <em>and</em> italic</strong>"
        );
    }

    #[test]
    fn snake_case_is_not_emphasis() {
        assert_eq!(render("use my_field_name here"), "use my_field_name here");
    }

    #[test]
    fn unmatched_delimiters_are_literal() {
        assert_eq!(render("2 * 3"), "2 * 3");
        assert_eq!(render("**open"), "**open");
        assert_eq!(render("``"), "``");
    }

    #[test]
    fn code_is_escaped_and_not_formatted() {
        assert_eq!(
            render("`a < b && *c*`"),
            "<code>a &lt; b &amp;&amp; *c*</code>"
        );
    }

    #[test]
    fn links_open_in_new_tab() {
        assert_eq!(
            render("see [the **docs**](https://x.io/a_b)"),
            "see <a href=\"https://x.io/a_b\" target=\"_blank\" rel=\"noopener\">the <strong>docs</strong></a>"
        );
    }

    #[test]
    fn images_with_and_without_title() {
        assert_eq!(
            render("![logo](img.png)"),
            "<img src=\"img.png\" alt=\"logo\" style=\"max-width:100%;height:auto;\" />"
        );
        assert_eq!(
            render("![](a.png \"Chart\")"),
            "<img src=\"a.png\" alt=\"\" title=\"Chart\" style=\"max-width:100%;height:auto;\" />"
        );
    }

    #[test]
    fn incomplete_link_is_text() {
        assert_eq!(render("[not a link]"), "[not a link]");
        assert_eq!(render("[x]()"), "[x]()");
    }

    #[test]
    fn escapes_bare_ampersand_and_angle() {
        assert_eq!(render("Q&A 1 < 2"), "Q&amp;A 1 &lt; 2");
    }

    #[test]
    fn keeps_entities_and_raw_tags() {
        assert_eq!(render("&nbsp;&#169;"), "&nbsp;&#169;");
        assert_eq!(
            render("<span class=\"x\">hi</span>"),
            "<span class=\"x\">hi</span>"
        );
        assert_eq!(render("<!-- note -->"), "<!-- note -->");
    }

    #[test]
    fn rendering_twice_changes_code_spans() {
        let once = render("`*a*`");
        assert_eq!(once, "<code>*a*</code>");
        assert_eq!(render(&once), "<code><em>a</em></code>");
    }
}
