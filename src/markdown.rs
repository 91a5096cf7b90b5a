//! Markdown rendering for thought content.
//!
//! Wraps pulldown-cmark with two event-level rewrites: code blocks become
//! `codehilite` containers with per-token spans, and footnote references
//! become numbered superscripts paired with a back-linked footnote list at
//! the end of the document. Rendering never fails; malformed markup falls
//! through as plain text.

use std::collections::BTreeMap;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, html};

pub fn render(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let events: Vec<Event> = Parser::new_ext(input, options).collect();
    let events = rewrite_code_blocks(events);

    // Footnotes are numbered by order of first reference.
    let mut order: Vec<String> = Vec::new();
    for event in &events {
        if let Event::FootnoteReference(name) = event {
            if !order.iter().any(|n| n == name.as_ref()) {
                order.push(name.to_string());
            }
        }
    }

    let mut body_events: Vec<Event> = Vec::new();
    let mut definitions: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    let mut current: Option<(String, Vec<Event>)> = None;

    for event in events {
        let event = match event {
            Event::Start(Tag::FootnoteDefinition(name)) => {
                current = Some((name.to_string(), Vec::new()));
                continue;
            }
            Event::End(Tag::FootnoteDefinition(_)) => {
                if let Some((name, buffered)) = current.take() {
                    definitions.insert(name, buffered);
                }
                continue;
            }
            Event::FootnoteReference(name) => {
                let number = order
                    .iter()
                    .position(|n| n == name.as_ref())
                    .map(|index| index + 1)
                    .unwrap_or(0);
                let name = escape_html(&name);
                Event::Html(
                    format!(
                        "<sup id=\"fnref:{name}\"><a href=\"#fn:{name}\" rel=\"footnote\">{number}</a></sup>"
                    )
                    .into(),
                )
            }
            event => event,
        };

        match current.as_mut() {
            Some((_, buffered)) => buffered.push(event),
            None => body_events.push(event),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, body_events.into_iter());

    if !order.is_empty() {
        while out.ends_with('\n') {
            out.pop();
        }
        out.push('\n');
        out.push_str("<div class=\"footnote\">\n<hr />\n<ol>\n");
        for (index, name) in order.iter().enumerate() {
            let number = index + 1;
            let mut definition = String::new();
            if let Some(buffered) = definitions.remove(name) {
                html::push_html(&mut definition, buffered.into_iter());
            }
            let definition = definition.trim_end();
            let attr = escape_html(name);
            let backlink = format!(
                "&#160;<a href=\"#fnref:{attr}\" rev=\"footnote\" title=\"Jump back to footnote {number} in the text\">&#8617;</a>"
            );
            // The back-link rides inside the last paragraph of the footnote body.
            let item = match definition.strip_suffix("</p>") {
                Some(rest) => format!("{rest}\n{backlink}</p>"),
                None if definition.is_empty() => format!("<p>{backlink}</p>"),
                None => format!("{definition}\n<p>{backlink}</p>"),
            };
            out.push_str(&format!("<li id=\"fn:{attr}\">\n{item}\n</li>\n"));
        }
        out.push_str("</ol>\n</div>");
    }

    out.trim_end().to_string()
}

/// Replaces fenced and indented code blocks with a highlighted
/// `<div class="codehilite">` container. Indented blocks take their language
/// hint from a `:::lang` directive on the first line, which is consumed.
fn rewrite_code_blocks(events: Vec<Event>) -> Vec<Event> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let kind = match event {
            Event::Start(Tag::CodeBlock(kind)) => kind,
            event => {
                out.push(event);
                continue;
            }
        };

        let mut language = match &kind {
            CodeBlockKind::Fenced(info) => {
                info.split_whitespace().next().unwrap_or("").to_string()
            }
            CodeBlockKind::Indented => String::new(),
        };

        let mut code = String::new();
        for event in iter.by_ref() {
            match event {
                Event::Text(text) => code.push_str(&text),
                Event::End(Tag::CodeBlock(_)) => break,
                _ => {}
            }
        }

        if language.is_empty() {
            if let Some(rest) = code.strip_prefix(":::") {
                match rest.split_once('\n') {
                    Some((directive, remainder)) => {
                        language = directive.trim().to_string();
                        code = remainder.to_string();
                    }
                    None => {
                        language = rest.trim().to_string();
                        code.clear();
                    }
                }
            }
        }

        // Indented blocks at the end of the input arrive without a trailing
        // newline; fenced blocks always carry one. Normalize so both close
        // with `\n</pre>`.
        if !code.is_empty() && !code.ends_with('\n') {
            code.push('\n');
        }

        out.push(Event::Html(
            format!(
                "<div class=\"codehilite\"><pre>{}</pre></div>\n",
                highlight(&language, &code)
            )
            .into(),
        ));
    }

    out
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
];

const OPERATOR_CHARS: &str = "+-*/%=<>!&|^~@?";

fn keywords_for(language: &str) -> &'static [&'static str] {
    match language {
        "python" | "py" => PYTHON_KEYWORDS,
        "rust" | "rs" => RUST_KEYWORDS,
        _ => &[],
    }
}

/// Tokenizes a code block into Pygments-style short-class spans: `k`eywords,
/// `n`ames, `o`perators, `s`trings, `mi`/`mf` numbers, `c1` comments and
/// `p`unctuation. Whitespace passes through untouched.
fn highlight(language: &str, code: &str) -> String {
    let keywords = keywords_for(language);
    let line_comment_hash = !matches!(language, "rust" | "rs");
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            out.push(c);
            i += 1;
        } else if c == '"' || c == '\'' {
            let quote = c;
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != quote && chars[i] != '\n' {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    i += 1;
                }
                i += 1;
            }
            if i < chars.len() && chars[i] == quote {
                i += 1;
            }
            push_span(&mut out, "s", &collect(&chars[start..i]));
        } else if (c == '#' && line_comment_hash)
            || (c == '/' && !line_comment_hash && chars.get(i + 1) == Some(&'/'))
        {
            let start = i;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            push_span(&mut out, "c1", &collect(&chars[start..i]));
        } else if c.is_ascii_digit() {
            let start = i;
            let mut float = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                if chars[i] == '.' {
                    float = true;
                }
                i += 1;
            }
            push_span(&mut out, if float { "mf" } else { "mi" }, &collect(&chars[start..i]));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word = collect(&chars[start..i]);
            let class = if keywords.contains(&word.as_str()) { "k" } else { "n" };
            push_span(&mut out, class, &word);
        } else if OPERATOR_CHARS.contains(c) {
            let start = i;
            while i < chars.len() && OPERATOR_CHARS.contains(chars[i]) {
                i += 1;
            }
            push_span(&mut out, "o", &collect(&chars[start..i]));
        } else {
            push_span(&mut out, "p", &c.to_string());
            i += 1;
        }
    }

    out
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str(&format!("<span class=\"{}\">{}</span>", class, escape_html(text)));
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_emphasis_in_a_paragraph() {
        assert_eq!(render("A *test* string"), "<p>A <em>test</em> string</p>");
    }

    #[test]
    fn rendering_is_idempotent() {
        let input = "A *test* string\n\n\t:::python\n\tx = 1\n\nFootnote[^label]\n\n[^label]: Footnote";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn renders_indented_python_block_with_token_spans() {
        let result = render("\t:::python\n\ttest_var = \"test\"");
        assert_eq!(
            result,
            "<div class=\"codehilite\"><pre><span class=\"n\">test_var</span> <span class=\"o\">=</span> <span class=\"s\">&quot;test&quot;</span>\n</pre></div>"
        );
    }

    #[test]
    fn indented_block_output_is_newline_terminated_either_way() {
        // With and without a trailing newline in the source, the block must
        // close identically.
        let bare = render("\t:::python\n\ttest_var = \"test\"");
        let terminated = render("\t:::python\n\ttest_var = \"test\"\n");
        assert_eq!(bare, terminated);
        assert!(bare.ends_with("</span>\n</pre></div>"));
    }

    #[test]
    fn renders_fenced_block_with_language_info() {
        let result = render("```python\nreturn 42\n```");
        assert_eq!(
            result,
            "<div class=\"codehilite\"><pre><span class=\"k\">return</span> <span class=\"mi\">42</span>\n</pre></div>"
        );
    }

    #[test]
    fn renders_footnotes_with_backlinks() {
        let result = render("Footnote[^label]\n\n[^label]: Footnote");
        assert_eq!(
            result,
            "<p>Footnote<sup id=\"fnref:label\"><a href=\"#fn:label\" rel=\"footnote\">1</a></sup></p>\n<div class=\"footnote\">\n<hr />\n<ol>\n<li id=\"fn:label\">\n<p>Footnote\n&#160;<a href=\"#fnref:label\" rev=\"footnote\" title=\"Jump back to footnote 1 in the text\">&#8617;</a></p>\n</li>\n</ol>\n</div>"
        );
    }

    #[test]
    fn numbers_footnotes_by_first_reference() {
        let result = render(
            "First[^a] then[^b] and again[^a]\n\n[^a]: Alpha\n\n[^b]: Beta",
        );
        assert!(result.contains("<a href=\"#fn:a\" rel=\"footnote\">1</a>"));
        assert!(result.contains("<a href=\"#fn:b\" rel=\"footnote\">2</a>"));
        // The repeated reference reuses number 1.
        assert_eq!(result.matches("rel=\"footnote\">1</a>").count(), 2);
        let alpha = result.find("<li id=\"fn:a\">").unwrap();
        let beta = result.find("<li id=\"fn:b\">").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn malformed_markup_degrades_to_plain_text() {
        let result = render("*unclosed emphasis and [broken](link");
        assert!(result.starts_with("<p>"));
        assert!(result.contains("unclosed emphasis"));
    }

    #[test]
    fn unreferenced_definitions_are_dropped() {
        let result = render("No references here\n\n[^orphan]: Never cited");
        assert_eq!(result, "<p>No references here</p>");
    }

    #[test]
    fn highlights_comments_and_keywords() {
        let result = render("\t:::python\n\t# note\n\tif x:\n\t    pass");
        assert!(result.contains("<span class=\"c1\"># note</span>"));
        assert!(result.contains("<span class=\"k\">if</span>"));
        assert!(result.contains("<span class=\"k\">pass</span>"));
    }
}
