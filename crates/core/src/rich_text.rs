//! Helpers over the rich-text (HTML fragment) representation of a text box.
//!
//! The editor surface produces small HTML fragments. `content` is always the
//! visible text of `richText`; [`visible_text`] is how it is derived.

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "pre", "tr",
];

const ZERO_WIDTH_SPACE: char = '\u{200b}';

struct Tag<'a> {
    name: String,
    closing: bool,
    attrs: &'a str,
}

enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        if start > 0 {
            tokens.push(Token::Text(&rest[..start]));
        }
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            // unterminated tag: keep the remainder as text
            tokens.push(Token::Text(&rest[start..]));
            return tokens;
        };
        let inner = after[..end].trim();
        rest = &after[end + 1..];

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body.trim_start()),
            None => (false, inner),
        };
        let name_len = body
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(body.len());
        tokens.push(Token::Tag(Tag {
            name: body[..name_len].to_ascii_lowercase(),
            closing,
            attrs: &body[name_len..],
        }));
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn attr_value(attrs: &str, key: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let needle = format!("{key}=");
    let mut from = 0;
    while let Some(found) = lower[from..].find(&needle) {
        let at = from + found;
        let preceded_ok = at == 0 || lower[..at].ends_with(|c: char| c.is_whitespace());
        let value = &attrs[at + needle.len()..];
        if preceded_ok {
            let value = match value.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &value[1..];
                    &body[..body.find(q).unwrap_or(body.len())]
                }
                _ => {
                    let end = value
                        .find(|c: char| c.is_whitespace() || c == '/')
                        .unwrap_or(value.len());
                    &value[..end]
                }
            };
            return Some(decode_entities(value));
        }
        from = at + needle.len();
    }
    None
}

/// Decode the handful of character references an editor emits.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Visible text of a rich-text fragment: tags stripped, block boundaries and
/// `<br>` turned into newlines, entities decoded, non-breaking spaces
/// flattened.
pub fn visible_text(html: &str) -> String {
    let mut out = String::new();
    for token in tokenize(html) {
        match token {
            Token::Text(text) => out.push_str(&decode_entities(text).replace('\u{a0}', " ")),
            Token::Tag(tag) if tag.name == "br" => out.push('\n'),
            Token::Tag(tag) if is_block(&tag.name) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Token::Tag(_) => {}
        }
    }
    out.trim_matches('\n').to_string()
}

fn wrap_code(code: &str) -> String {
    if code.contains('`') {
        format!("`{ZERO_WIDTH_SPACE}{code}{ZERO_WIDTH_SPACE}`")
    } else {
        format!("`{code}`")
    }
}

/// Lossy HTML to Markdown conversion used for exports and previews.
pub fn html_to_markdown_lite(html: &str) -> String {
    let mut out = String::new();
    let mut links: Vec<Option<String>> = Vec::new();
    let mut code_start: Option<usize> = None;

    for token in tokenize(html) {
        let tag = match token {
            Token::Text(text) => {
                out.push_str(&decode_entities(text));
                continue;
            }
            Token::Tag(tag) => tag,
        };
        match (tag.name.as_str(), tag.closing) {
            ("strong" | "b", _) => out.push_str("**"),
            ("em" | "i", _) => out.push('*'),
            ("u", _) => out.push('_'),
            ("code", false) => code_start = Some(out.len()),
            ("code", true) => {
                if let Some(start) = code_start.take() {
                    let code = out.split_off(start);
                    out.push_str(&wrap_code(&code));
                }
            }
            ("a", false) => {
                let href = attr_value(tag.attrs, "href");
                if href.is_some() {
                    out.push('[');
                }
                links.push(href);
            }
            ("a", true) => {
                if let Some(Some(href)) = links.pop() {
                    out.push_str("](");
                    out.push_str(&href);
                    out.push(')');
                }
            }
            ("br", _) => out.push(' '),
            (name, _) if is_block(name) => out.push(' '),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_zwsp(s: &str) -> String {
        s.replace(ZERO_WIDTH_SPACE, "")
    }

    #[test]
    fn converts_basic_formatting() {
        assert_eq!(html_to_markdown_lite("<strong>Bold</strong>"), "**Bold**");
        assert_eq!(html_to_markdown_lite("<b>Bold</b>"), "**Bold**");
        assert_eq!(html_to_markdown_lite("<em>Ital</em>"), "*Ital*");
        assert_eq!(html_to_markdown_lite("<i>Ital</i>"), "*Ital*");
        assert_eq!(html_to_markdown_lite("<u>Under</u>"), "_Under_");
    }

    #[test]
    fn handles_code_and_backticks() {
        assert_eq!(html_to_markdown_lite("<code>sum()</code>"), "`sum()`");
        assert_eq!(
            strip_zwsp(&html_to_markdown_lite("<code>`ticks`</code>")),
            "``ticks``"
        );
    }

    #[test]
    fn handles_links_and_headings() {
        assert_eq!(
            html_to_markdown_lite(r#"<a href="https://x.test">site</a>"#),
            "[site](https://x.test)"
        );
        assert_eq!(html_to_markdown_lite("<h2>Title</h2>"), "Title");
    }

    #[test]
    fn strips_other_tags_and_collapses_whitespace() {
        assert_eq!(
            html_to_markdown_lite("<div> A  <span> B </span> C </div>"),
            "A B C"
        );
    }

    #[test]
    fn anchor_without_href_keeps_text_only() {
        assert_eq!(html_to_markdown_lite("<a name=\"x\">site</a>"), "site");
    }

    #[test]
    fn visible_text_splits_blocks() {
        assert_eq!(visible_text("<div>misty</div><div>forest</div>"), "misty\nforest");
        assert_eq!(visible_text("a<br>b"), "a\nb");
        assert_eq!(visible_text("<b>cat</b> &amp; dog"), "cat & dog");
    }

    #[test]
    fn visible_text_of_plain_input_is_identity() {
        assert_eq!(visible_text("a red fox"), "a red fox");
        assert_eq!(visible_text(""), "");
    }

    #[test]
    fn decodes_numeric_entities_and_leaves_stray_ampersands() {
        assert_eq!(decode_entities("&#65;&#x42; & co"), "AB & co");
        assert_eq!(decode_entities("fish &chips"), "fish &chips");
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(visible_text("a < b"), "a < b");
    }
}
