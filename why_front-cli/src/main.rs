//! # wfc
//!
//! This binary is a thin smoke-test driver around [`why_front`]: it reads a
//! source file from disk, runs the lexer/parser, prints the resulting
//! diagnostics, and optionally runs the optimizer and/or validator. It owns
//! none of the front-end's actual logic -- file I/O and CLI argument
//! handling are the only things this crate is responsible for.

mod cli;

use std::{fs, process::ExitCode};

use anyhow::{Context, Result};
use cli::*;
use colored::Colorize;
use log::info;

use why_front::optimizer::{self, validator, Level};
use why_front::parser;

fn main() -> Result<ExitCode> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into())
        .context("failed to initialize logger")?;

    match args.command {
        Commands::Parse(parse_args) => run_parse(parse_args),
        Commands::Optimize(optimize_args) => run_optimize(optimize_args),
        Commands::Validate(validate_args) => run_validate(validate_args),
    }
}

fn read_source(path: &std::path::Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read file: '{}'", path.display()))
}

fn run_parse(args: ParseArgs) -> Result<ExitCode> {
    let source = read_source(&args.file)?;
    let file_name = args.file.to_string_lossy().to_string();
    let config = (&args.parser_config).into();
    let outcome = parser::parse_with_config(&source, file_name, &config);

    info!("parsed {} top-level declaration(s)", outcome.module.len());
    if outcome.truncated {
        println!("{}", "warning: parse was truncated after hitting the error cap".yellow());
    }

    for diagnostic in &outcome.diagnostics {
        println!("{}", diagnostic.render_for_cli(&source));
    }

    if args.stats {
        let stats = outcome.statistics;
        println!(
            "tokens: {}, nodes: {}, errors: {}, suggestions: {}, error_cap_hit: {}, suggestion_cap_hit: {}, approx_bytes: {}, global_recoveries: {}",
            stats.tokens_processed,
            stats.nodes_created,
            stats.error_count,
            stats.suggestion_count,
            stats.error_cap_hit,
            stats.suggestion_cap_hit,
            stats.approx_memory_bytes,
            stats.global_recoveries,
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.module)?);
    }

    Ok(exit_code_for(outcome.has_errors()))
}

fn run_optimize(args: OptimizeArgs) -> Result<ExitCode> {
    let source = read_source(&args.file)?;
    let file_name = args.file.to_string_lossy().to_string();
    let config = (&args.parser_config).into();
    let outcome = parser::parse_with_config(&source, file_name, &config);

    for diagnostic in &outcome.diagnostics {
        println!("{}", diagnostic.render_for_cli(&source));
    }
    if outcome.has_errors() {
        return Ok(ExitCode::FAILURE);
    }

    let level = Level::from_name(&args.level)
        .with_context(|| format!("unknown optimization level '{}'", args.level))?;
    let (module, reports) = optimizer::optimize(outcome.module, level);

    for report in &reports {
        info!(
            "pass '{}' ran {} iteration(s), processed {} node(s), optimized {} node(s) \
             ({} constant(s) folded, {} dead statement(s) removed, {:.2}x estimated speedup)",
            report.pass_name,
            report.iterations_run,
            report.metrics.nodes_processed,
            report.metrics.nodes_optimized,
            report.metrics.constants_folded,
            report.metrics.dead_code_removed,
            report.metrics.estimated_speedup
        );
    }

    if args.print {
        println!("{}", validator::pretty_print(&module));
    } else {
        println!("{}", serde_json::to_string_pretty(&module)?);
    }

    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: ValidateArgs) -> Result<ExitCode> {
    let source = read_source(&args.file)?;
    let file_name = args.file.to_string_lossy().to_string();
    let config = (&args.parser_config).into();
    let outcome = parser::parse_with_config(&source, file_name, &config);

    for diagnostic in &outcome.diagnostics {
        println!("{}", diagnostic.render_for_cli(&source));
    }
    if outcome.has_errors() {
        return Ok(ExitCode::FAILURE);
    }

    let report = validator::collect_reports(&outcome.module, args.strict);
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow(), warning.message);
    }
    for error in &report.errors {
        println!("{} {}", "error:".red(), error.message);
    }

    println!(
        "{} node(s), depth {}",
        validator::count_nodes(&outcome.module),
        validator::get_depth(&outcome.module)
    );

    Ok(exit_code_for(!report.errors.is_empty()))
}

fn exit_code_for(has_errors: bool) -> ExitCode {
    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
