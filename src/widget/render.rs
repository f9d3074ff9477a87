//! Markup produced for log entries.
//!
//! User text is always escaped. Answers, source titles and source ids come from
//! the backend and are inserted verbatim so the server can return formatted HTML.

use crate::protocol::{ChatAnswer, Source};

/// Separator between citation links.
pub const SOURCE_SEPARATOR: &str = ", ";

/// Escape text for insertion between tags or inside a quoted attribute.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Link to the detail view of one cited material.
pub fn source_link(source: &Source, detail_prefix: &str) -> String {
    format!(
        r#"<a href="{detail_prefix}{id}/">{title}</a>"#,
        id = source.id,
        title = source.title
    )
}

/// Full assistant markup: the answer, then a sources block when there are any.
pub fn answer_markup(answer: &ChatAnswer, detail_prefix: &str) -> String {
    let mut html = format!("<div>{}</div>", answer.html);
    if !answer.sources.is_empty() {
        let links = answer
            .sources
            .iter()
            .map(|s| source_link(s, detail_prefix))
            .collect::<Vec<_>>()
            .join(SOURCE_SEPARATOR);
        html.push_str(r#"<div class="sources"><b>Sources:</b> "#);
        html.push_str(&links);
        html.push_str("</div>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SourceId;

    fn source(id: SourceId, title: &str) -> Source {
        Source {
            id,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("<b>x</b>"), "&lt;b&gt;x&lt;/b&gt;");
        assert_eq!(escape_text(r#"a & "b" 'c'"#), "a &amp; &quot;b&quot; &#39;c&#39;");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_answer_with_sources() {
        let answer = ChatAnswer {
            html: "Hello".to_string(),
            sources: vec![
                source(SourceId::Number(1.into()), "Doc A"),
                source(SourceId::Text("x9".to_string()), "Doc B"),
            ],
        };
        assert_eq!(
            answer_markup(&answer, "/material-detail/"),
            concat!(
                "<div>Hello</div>",
                r#"<div class="sources"><b>Sources:</b> "#,
                r#"<a href="/material-detail/1/">Doc A</a>, "#,
                r#"<a href="/material-detail/x9/">Doc B</a>"#,
                "</div>"
            )
        );
    }

    #[test]
    fn test_answer_markup_is_not_escaped() {
        let answer = ChatAnswer {
            html: "<p><strong>Recursion</strong> is...</p>".to_string(),
            sources: Vec::new(),
        };
        assert_eq!(
            answer_markup(&answer, "/material-detail/"),
            "<div><p><strong>Recursion</strong> is...</p></div>"
        );
    }
}
