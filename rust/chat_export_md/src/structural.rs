// Structural extraction: tokenize the export, track `div` nesting from the role-carrying block
// and collect every text run until a real `</div>` brings the block back to depth zero.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tracing::debug;

use crate::message::{Message, Role};

pub const ROLE_ATTR: &str = "data-message-author-role";

/// What to do with a role-carrying `div` that appears inside an already open message block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NestedRoles {
    /// Overwrite the role and restart depth tracking from the nested block.
    #[default]
    Restart,
    /// Treat it as an ordinary nested `div`; only the outermost block delimits the message.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralOptions {
    pub nested_roles: NestedRoles,
}

struct State {
    opts: StructuralOptions,
    role: Option<Role>,
    depth: u32,
    // Character tokens since the last tag; one text event once flushed.
    pending: String,
    buf: Vec<String>,
    messages: Vec<Message>,
}

impl State {
    fn new(opts: StructuralOptions) -> Self {
        Self {
            opts,
            role: None,
            depth: 0,
            pending: String::new(),
            buf: Vec::new(),
            messages: Vec::new(),
        }
    }

    fn in_block(&self) -> bool {
        self.role.is_some()
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        if self.in_block() && !text.trim().is_empty() {
            self.buf.push(text);
        }
    }

    fn open_div(&mut self, role_attr: Option<String>) {
        if let Some(raw) = role_attr {
            let restart = !self.in_block() || self.opts.nested_roles == NestedRoles::Restart;
            if restart {
                if self.in_block() {
                    debug!(role = %raw, "nested role block restarts message tracking");
                }
                self.role = Some(Role::parse(&raw));
                self.depth = 0;
            }
        }
        if self.in_block() {
            self.depth += 1;
        }
    }

    fn close_div(&mut self) {
        if !self.in_block() {
            return;
        }
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return;
        }
        let text = self.buf.concat();
        self.buf.clear();
        if let Some(role) = self.role.take() {
            match Message::new(role, &text) {
                Some(m) => self.messages.push(m),
                None => debug!("message block closed without text"),
            }
        }
    }

    fn finish(&mut self) {
        self.flush_text();
        if let Some(role) = &self.role {
            debug!(role = %role, depth = self.depth, "document ended inside an unclosed message block");
        }
    }
}

fn role_attr(tag: &Tag) -> Option<String> {
    tag.attrs
        .iter()
        .find(|a| &*a.name.local == ROLE_ATTR)
        .map(|a| a.value.to_string())
}

struct MessageSink {
    state: RefCell<State>,
}

impl TokenSink for MessageSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut st = self.state.borrow_mut();
        match token {
            Token::CharacterTokens(text) => st.pending.push_str(&text),
            Token::NullCharacterToken => st.pending.push('\0'),
            Token::TagToken(tag) => {
                st.flush_text();
                let name: &str = &tag.name;
                match tag.kind {
                    TagKind::StartTag => {
                        if name == "div" {
                            st.open_div(role_attr(&tag));
                            if tag.self_closing {
                                st.close_div();
                            }
                        } else if !tag.self_closing {
                            // Script and style bodies are opaque text, never markup.
                            match name {
                                "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                                "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                                _ => {}
                            }
                        }
                    }
                    TagKind::EndTag => {
                        if name == "div" {
                            st.close_div();
                        }
                    }
                }
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) => st.flush_text(),
            Token::EOFToken => st.finish(),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Tokenizes `document` and returns every closed, non-empty message block in document order.
/// A block still open when the document ends is discarded.
pub fn parse_messages(document: &str, opts: &StructuralOptions) -> Vec<Message> {
    let sink = MessageSink {
        state: RefCell::new(State::new(*opts)),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(document));
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    let mut st = tokenizer.sink.state.borrow_mut();
    std::mem::take(&mut st.messages)
}
