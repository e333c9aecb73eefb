use std::path::PathBuf;

use anyhow::{Context, Result};
use chat_export_md::{
    export, ChunkOptions, ExportSettings, FsStore, NestedRoles, Strategy, StructuralOptions,
    DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_TITLE,
};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Split on the role marker and match known content containers.
    Chunk,
    /// Follow `div` open/close tags and collect all text inside each message block.
    Structural,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NestedRolesArg {
    Restart,
    Ignore,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Exported chat transcript (HTML).
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output Markdown path.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Text of the title line.
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    #[arg(long, value_enum, default_value_t = StrategyArg::Chunk)]
    strategy: StrategyArg,

    /// Structural strategy only: how to treat a role block nested in another.
    #[arg(long, value_enum, default_value_t = NestedRolesArg::Restart)]
    nested_roles: NestedRolesArg,

    /// Chunk strategy only: cut unmatched assistant bodies at the action footer instead of dropping them.
    #[arg(long)]
    footer_fallback: bool,

    /// Collapse runs of blank lines inside messages (chunk strategy).
    #[arg(long)]
    collapse_blank_lines: bool,
}

impl Args {
    fn settings(&self) -> ExportSettings {
        let strategy = match self.strategy {
            StrategyArg::Chunk => Strategy::Chunk(ChunkOptions {
                footer_fallback: self.footer_fallback,
                collapse_blank_lines: self.collapse_blank_lines,
            }),
            StrategyArg::Structural => Strategy::Structural(StructuralOptions {
                nested_roles: match self.nested_roles {
                    NestedRolesArg::Restart => NestedRoles::Restart,
                    NestedRolesArg::Ignore => NestedRoles::Ignore,
                },
            }),
        };
        ExportSettings {
            input: self.input.clone(),
            output: self.output.clone(),
            title: self.title.clone(),
            strategy,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings();
    let report = export(&FsStore, &settings)
        .with_context(|| format!("export {}", settings.input.display()))?;

    println!("Successfully created {}", report.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_paths() {
        let args = Args::try_parse_from(["chat-export-md"]).unwrap();
        let settings = args.settings();
        assert_eq!(settings.input, PathBuf::from("MetaFlutter.md"));
        assert_eq!(settings.output, PathBuf::from("MetaFlutter_Clean.md"));
        assert_eq!(settings.title, "Cleaned Conversation");
        assert!(matches!(
            settings.strategy,
            Strategy::Chunk(ChunkOptions {
                footer_fallback: false,
                collapse_blank_lines: false
            })
        ));
    }

    #[test]
    fn structural_strategy_with_ignore_policy() {
        let args = Args::try_parse_from([
            "chat-export-md",
            "--input",
            "a.html",
            "--strategy",
            "structural",
            "--nested-roles",
            "ignore",
        ])
        .unwrap();
        match args.settings().strategy {
            Strategy::Structural(opts) => assert_eq!(opts.nested_roles, NestedRoles::Ignore),
            other => panic!("unexpected strategy: {other:?}"),
        }
    }
}
