//! This module contains everything needed for parsing the CLI arguments for wfc.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Struct containing the CLI configuration for wfc.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the front-end.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of wfc.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,

    #[value(alias("1"))]
    Warn,

    #[value(alias("2"))]
    Info,

    #[value(alias("3"))]
    Debug,

    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a source file and print its diagnostics (and, optionally, its AST).
    Parse(ParseArgs),

    /// Parse, then run the optimizer pipeline at the given level.
    Optimize(OptimizeArgs),

    /// Parse, then run the structural validator and print its report.
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// The path to the source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// Dump the parsed AST as JSON instead of a human summary.
    #[arg(long)]
    pub json: bool,

    /// Print the session's parse statistics (tokens processed, nodes
    /// created, error/suggestion counts, whether either cap was hit).
    #[arg(long)]
    pub stats: bool,

    #[command(flatten)]
    pub parser_config: ParserConfigArgs,
}

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// The path to the source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// Optimization level: none, basic, default, or aggressive.
    #[arg(long, default_value = "default")]
    pub level: String,

    /// Pretty-print the optimized module back to source instead of dumping JSON.
    #[arg(long)]
    pub print: bool,

    #[command(flatten)]
    pub parser_config: ParserConfigArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// The path to the source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// Promote warnings (e.g. an empty program) to errors.
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub parser_config: ParserConfigArgs,
}

/// CLI surface over [`why_front::parser::ParserConfig`] (spec.md §6
/// Configure interface), shared by every subcommand that parses a file.
#[derive(Args, Debug, Clone)]
pub struct ParserConfigArgs {
    /// Error-recovery strategy: panic, phrase, or global.
    #[arg(long, value_enum, default_value_t = RecoveryModeArg::Global)]
    pub recovery_mode: RecoveryModeArg,

    /// Maximum number of diagnostics to collect before truncating.
    #[arg(long, default_value_t = 5000)]
    pub max_errors: usize,

    /// Maximum number of suggestions to collect for the whole session.
    #[arg(long, default_value_t = 5000)]
    pub max_suggestions: usize,

    /// Disable the suggestion engine entirely.
    #[arg(long)]
    pub no_suggestions: bool,

    /// Enable token-frequency profiling (spec.md §4.4 "internal statistics table").
    #[arg(long)]
    pub profile: bool,
}

impl From<&ParserConfigArgs> for why_front::parser::ParserConfig {
    fn from(args: &ParserConfigArgs) -> Self {
        why_front::parser::ParserConfig {
            recovery_mode: (&args.recovery_mode).into(),
            max_errors: args.max_errors,
            max_suggestions: args.max_suggestions,
            suggestions_enabled: !args.no_suggestions,
            profiling_enabled: args.profile,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum RecoveryModeArg {
    Panic,
    Phrase,
    Global,
}

impl From<&RecoveryModeArg> for why_front::parser::recovery::RecoveryMode {
    fn from(value: &RecoveryModeArg) -> Self {
        match value {
            RecoveryModeArg::Panic => why_front::parser::recovery::RecoveryMode::Panic,
            RecoveryModeArg::Phrase => why_front::parser::recovery::RecoveryMode::Phrase,
            RecoveryModeArg::Global => why_front::parser::recovery::RecoveryMode::Global,
        }
    }
}
