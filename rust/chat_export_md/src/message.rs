// Conversation turns and their Markdown rendering.

use std::fmt;

pub const DEFAULT_TITLE: &str = "Cleaned Conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Any other `data-message-author-role` value (e.g. `system`, `tool`).
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(s) => s.as_str(),
        }
    }

    /// Section header text: the role uppercased.
    pub fn header(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted turn. `text` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Builds a message from raw captured text; `None` when nothing but whitespace was captured.
    pub fn new(role: Role, raw_text: &str) -> Option<Message> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Message {
            role,
            text: text.to_string(),
        })
    }

    pub fn to_section(&self) -> String {
        format!("## {}\n\n{}\n\n---\n", self.role.header(), self.text)
    }
}

pub fn render_sections(messages: &[Message]) -> String {
    let mut out = String::new();
    for m in messages {
        out.push_str(&m.to_section());
    }
    out
}

pub fn render_document(title: &str, messages: &[Message]) -> String {
    let mut out = format!("# {title}\n\n");
    out.push_str(&render_sections(messages));
    out
}
