// Ordered HTML -> Markdown rewrite rules for assistant message bodies.
//
// Each rule is one non-overlapping replace-all over the whole fragment. Order matters: later rules
// see the output of earlier ones.

use lazy_static::lazy_static;
use regex::Regex;

use crate::entities::decode_basic_entities;

pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
}

fn rule(name: &'static str, pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        name,
        pattern: Regex::new(pattern).expect("rewrite rule pattern must compile"),
        replacement,
    }
}

lazy_static! {
    static ref ASSISTANT_RULES: Vec<Rule> = vec![
        rule("h3", r"<h3>(.*?)</h3>", "### ${1}\n"),
        rule("h2", r"<h2>(.*?)</h2>", "## ${1}\n"),
        rule("h1", r"<h1>(.*?)</h1>", "# ${1}\n"),
        rule("strong", r"<strong>(.*?)</strong>", "**${1}**"),
        rule("em", r"<em>(.*?)</em>", "*${1}*"),
        // Must run before inline code, otherwise a one-line code body loses its <code> tag first.
        rule(
            "pre",
            r"(?s)<pre[^>]*><div[^>]*><div[^>]*>([a-z]*)</div>.*?<code[^>]*>(.*?)</code>.*?</pre>",
            "```${1}\n${2}\n```",
        ),
        rule("code", r"<code[^>]*>(.*?)</code>", "`${1}`"),
        rule("li_open", r"<li>", "\n- "),
        rule("li_close", r"</li>", ""),
        rule("p_open", r"<p[^>]*>", "\n\n"),
        rule("p_close", r"</p>", ""),
    ];
    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("tag pattern must compile");
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").expect("blank line pattern must compile");
}

pub fn assistant_rules() -> &'static [Rule] {
    &ASSISTANT_RULES
}

/// Applies every rewrite rule once, in table order.
pub fn apply_rules(html: &str) -> String {
    let mut out = html.to_string();
    for r in assistant_rules() {
        out = r.pattern.replace_all(&out, r.replacement).into_owned();
    }
    out
}

pub fn strip_tags(s: &str) -> String {
    TAG.replace_all(s, "").into_owned()
}

/// Collapses runs of blank (or whitespace-only) lines into a single empty line.
pub fn collapse_blank_lines(s: &str) -> String {
    BLANK_LINES.replace_all(s, "\n\n").into_owned()
}

/// Full assistant pipeline: rewrite rules, strip leftover tags, then decode the basic entities.
pub fn assistant_html_to_markdown(html: &str) -> String {
    let rewritten = apply_rules(html);
    decode_basic_entities(&strip_tags(&rewritten))
}
