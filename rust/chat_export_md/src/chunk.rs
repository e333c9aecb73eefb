// Chunk-based extraction: split the export on the role marker and pull each turn's content out
// with container-specific patterns.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::message::{render_sections, Message, Role};
use crate::rules::{assistant_html_to_markdown, collapse_blank_lines, strip_tags};

/// Literal that precedes every role value in the export.
pub const ROLE_MARKER: &str = "data-message-author-role=\"";

const ASSISTANT_OPEN_MARKER: &str = "<div class=\"markdown prose";
const FOOTER_MARKER: &str = "<div class=\"z-0 flex";

lazy_static! {
    static ref USER_CONTENT: Regex =
        Regex::new(r#"(?s)<div class="whitespace-pre-wrap">(.*?)</div>"#).expect("user pattern must compile");
    static ref ASSISTANT_CONTENT: Regex =
        Regex::new(r#"(?s)<div class="markdown prose[^>]*">(.*?)</div>\s*</div>\s*</div>"#)
            .expect("assistant pattern must compile");
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkOptions {
    /// When the nested-closing pattern misses, take the assistant body up to the action footer.
    pub footer_fallback: bool,
    /// Collapse runs of blank lines inside each message.
    pub collapse_blank_lines: bool,
}

/// Splits `document` into per-message chunks; the header before the first marker is dropped.
pub fn split_chunks(document: &str) -> impl Iterator<Item = &str> {
    document.split(ROLE_MARKER).skip(1)
}

/// Role value of a chunk: everything up to the next `"`.
pub fn chunk_role(chunk: &str) -> &str {
    chunk.split('"').next().unwrap_or("")
}

fn user_text(chunk: &str) -> String {
    match USER_CONTENT.captures(chunk).and_then(|c| c.get(1)) {
        Some(m) => strip_tags(m.as_str()),
        None => String::new(),
    }
}

fn assistant_body_after_footer_cut(chunk: &str) -> Option<&str> {
    let start = chunk.find(ASSISTANT_OPEN_MARKER)?;
    let rest = &chunk[start..];
    let tag_end = rest.find('>')?;
    let body = &rest[tag_end + 1..];
    match body.find(FOOTER_MARKER) {
        Some(end) => Some(&body[..end]),
        None => Some(body),
    }
}

fn assistant_text(chunk: &str, opts: &ChunkOptions) -> String {
    if let Some(m) = ASSISTANT_CONTENT.captures(chunk).and_then(|c| c.get(1)) {
        return assistant_html_to_markdown(m.as_str());
    }
    if opts.footer_fallback {
        if let Some(body) = assistant_body_after_footer_cut(chunk) {
            return assistant_html_to_markdown(body);
        }
    }
    String::new()
}

/// Extracts one message per chunk whose content is recognised and non-blank, in document order.
pub fn extract_messages(document: &str, opts: &ChunkOptions) -> Vec<Message> {
    let mut messages = Vec::new();
    for (idx, chunk) in split_chunks(document).enumerate() {
        let role = Role::parse(chunk_role(chunk));
        let mut text = match role {
            Role::User => user_text(chunk),
            Role::Assistant => assistant_text(chunk, opts),
            Role::Other(_) => String::new(),
        };
        if opts.collapse_blank_lines {
            text = collapse_blank_lines(&text);
        }
        match Message::new(role, &text) {
            Some(m) => messages.push(m),
            None => debug!(chunk = idx, "no content extracted from chunk"),
        }
    }
    messages
}

/// Concatenated Markdown sections for every extracted message.
pub fn extract(document: &str, opts: &ChunkOptions) -> String {
    render_sections(&extract_messages(document, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_block(text: &str) -> String {
        format!(
            r#"<div data-message-author-role="user" data-message-id="u1"><div class="flex"><div class="whitespace-pre-wrap">{text}</div></div></div>"#
        )
    }

    fn assistant_block(html: &str) -> String {
        format!(
            r#"<div data-message-author-role="assistant" data-message-id="a1"><div class="flex"><div class="markdown prose w-full break-words dark:prose-invert light">{html}</div>
            </div>
        </div><div class="z-0 flex"><button>Copy</button></div>"#
        )
    }

    fn doc(blocks: &[String]) -> String {
        format!(
            "<html><head><title>Chat</title></head><body>{}</body></html>",
            blocks.concat()
        )
    }

    #[test]
    fn extracts_blocks_in_document_order() {
        let d = doc(&[
            user_block("What is Rust?"),
            assistant_block("<p>A systems language.</p>"),
            user_block("Thanks"),
        ]);
        let out = extract(&d, &ChunkOptions::default());
        assert_eq!(
            out,
            "## USER\n\nWhat is Rust?\n\n---\n## ASSISTANT\n\nA systems language.\n\n---\n## USER\n\nThanks\n\n---\n"
        );
    }

    #[test]
    fn unknown_role_produces_no_section() {
        let d = format!(
            r#"{}<div data-message-author-role="system"><div class="whitespace-pre-wrap">hidden</div></div>"#,
            user_block("hi")
        );
        let messages = extract_messages(&d, &ChunkOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn user_tags_are_stripped_without_entity_decoding() {
        let d = doc(&[user_block("<b>hi</b> &amp; bye")]);
        let messages = extract_messages(&d, &ChunkOptions::default());
        assert_eq!(messages[0].text, "hi &amp; bye");
    }

    #[test]
    fn assistant_heading_and_fenced_code() {
        let body = concat!(
            "<h2>Title</h2>",
            r#"<pre><div class="a"><div class="b">python</div></div><div><code class="language-python">print(1)</code></div></pre>"#
        );
        let out = extract(&doc(&[assistant_block(body)]), &ChunkOptions::default());
        assert!(out.contains("## Title\n"));
        assert!(out.contains("```python\nprint(1)\n```"));
    }

    #[test]
    fn assistant_entities_are_decoded() {
        let d = doc(&[assistant_block("<p>&lt;tag&gt; &amp; &quot;q&quot;</p>")]);
        let messages = extract_messages(&d, &ChunkOptions::default());
        assert_eq!(messages[0].text, "<tag> & \"q\"");
    }

    #[test]
    fn structural_mismatch_is_silently_empty() {
        let d = r#"<div data-message-author-role="assistant"><div class="markdown prose">half</div></div>"#;
        assert!(extract_messages(d, &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn footer_fallback_recovers_unclosed_assistant_body() {
        let d = r#"<div data-message-author-role="assistant"><div class="markdown prose x"><p>kept</p></div></div><div class="z-0 flex">Copy</div>"#;
        let opts = ChunkOptions {
            footer_fallback: true,
            ..ChunkOptions::default()
        };
        let messages = extract_messages(d, &opts);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "kept");
    }

    #[test]
    fn blank_content_suppresses_section() {
        let d = doc(&[user_block("   \n  "), assistant_block("<p> </p>")]);
        assert_eq!(extract(&d, &ChunkOptions::default()), "");
    }

    #[test]
    fn collapse_blank_lines_is_opt_in() {
        let d = doc(&[assistant_block("<p>a</p><p>b</p>")]);
        let plain = extract_messages(&d, &ChunkOptions::default());
        assert_eq!(plain[0].text, "a\n\nb");
        let d = doc(&[user_block("a\n\n\n\nb")]);
        let opts = ChunkOptions {
            collapse_blank_lines: true,
            ..ChunkOptions::default()
        };
        assert_eq!(extract_messages(&d, &opts)[0].text, "a\n\nb");
        assert_eq!(extract_messages(&d, &ChunkOptions::default())[0].text, "a\n\n\n\nb");
    }

    #[test]
    fn role_is_text_up_to_quote() {
        assert_eq!(chunk_role(r#"assistant" data-x="1">"#), "assistant");
        assert_eq!(chunk_role("user"), "user");
    }
}
