//! Converts exported chat-transcript HTML into a cleaned Markdown conversation.
//!
//! Two extraction strategies are available: [`chunk`] splits the raw export on the role marker
//! and matches the known content containers (the default), [`structural`] follows the
//! tokenizer's `div` open/close events.
//! Both produce [`Message`]s which render as `## <ROLE>` sections under a single title line.

pub mod chunk;
pub mod entities;
pub mod error;
pub mod message;
pub mod rules;
pub mod store;
pub mod structural;

use std::path::PathBuf;

use tracing::info;

pub use chunk::ChunkOptions;
pub use error::ExportError;
pub use message::{render_document, Message, Role, DEFAULT_TITLE};
pub use store::{DocumentStore, FsStore, MemoryStore};
pub use structural::{NestedRoles, StructuralOptions};

pub const DEFAULT_INPUT: &str = "MetaFlutter.md";
pub const DEFAULT_OUTPUT: &str = "MetaFlutter_Clean.md";

#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    Chunk(ChunkOptions),
    Structural(StructuralOptions),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Chunk(ChunkOptions::default())
    }
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Chunk(_) => "chunk",
            Strategy::Structural(_) => "structural",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub strategy: Strategy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            strategy: Strategy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub messages: usize,
    pub output: PathBuf,
}

pub fn extract_messages(document: &str, strategy: &Strategy) -> Vec<Message> {
    match strategy {
        Strategy::Chunk(opts) => chunk::extract_messages(document, opts),
        Strategy::Structural(opts) => structural::parse_messages(document, opts),
    }
}

/// Pure conversion: the complete output document for `document`.
pub fn convert(document: &str, title: &str, strategy: &Strategy) -> String {
    render_document(title, &extract_messages(document, strategy))
}

/// Reads the input, converts it and writes the output, all through `store`.
pub fn export<S: DocumentStore>(store: &S, settings: &ExportSettings) -> Result<ExportReport, ExportError> {
    let document = store.read(&settings.input)?;
    let messages = extract_messages(&document, &settings.strategy);
    let rendered = render_document(&settings.title, &messages);
    store.write(&settings.output, &rendered)?;

    info!(
        input = %settings.input.display(),
        output = %settings.output.display(),
        strategy = settings.strategy.name(),
        messages = messages.len(),
        "conversation exported"
    );

    Ok(ExportReport {
        messages: messages.len(),
        output: settings.output.clone(),
    })
}
