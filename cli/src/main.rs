//! rabnf CLI, a thin driver over the rabnf grammar engine.
//!
//! Subcommands:
//! - `check <grammar>`: load a grammar config and report its rules
//! - `rules [--grammar <file>]`: print rule definitions (core rules by default)
//! - `validate <rule> [--grammar <file>] (--input | --file | --hex)`: validate bytes
//!
//! Grammar files are JSON when they end in `.json`, YAML otherwise.
//! Set `RUST_LOG=debug` to see what the engine is doing.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use rabnf::{CoreRule, Grammar, GrammarBuilder, GrammarConfig, Strategy};

#[derive(Parser, Debug)]
#[command(name = "rabnf", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a grammar config loads
    Check {
        /// Grammar config file (JSON or YAML)
        grammar: PathBuf,
    },
    /// Print rule definitions as ABNF
    Rules {
        /// Grammar config file; the core rules are printed when omitted
        #[arg(short, long)]
        grammar: Option<PathBuf>,
    },
    /// Validate input against a rule
    Validate {
        /// Rule name (case-insensitive)
        rule: String,
        /// Grammar config file; only the core rules are available when omitted
        #[arg(short, long)]
        grammar: Option<PathBuf>,
        #[command(flatten)]
        input: InputArgs,
        /// Explore every alternative instead of committing to the first match
        #[arg(short, long)]
        backtracking: bool,
        /// Print the match trace
        #[arg(short, long)]
        trace: bool,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Input text (its UTF-8 bytes)
    #[arg(short, long)]
    input: Option<String>,
    /// Read input bytes from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Input as hex digits
    #[arg(long)]
    hex: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { grammar } => cmd_check(&grammar),
        Command::Rules { grammar } => cmd_rules(grammar.as_deref()),
        Command::Validate {
            rule,
            grammar,
            input,
            backtracking,
            trace,
        } => {
            let strategy = if backtracking {
                Strategy::Backtracking
            } else {
                Strategy::Greedy
            };
            cmd_validate(&rule, grammar.as_deref(), &input, strategy, trace).map(|matched| {
                if !matched {
                    process::exit(1);
                }
            })
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(path: &Path) -> Result<(), String> {
    let grammar = load_grammar(path)?;
    println!("Grammar valid: {} rules", grammar.len());
    Ok(())
}

fn cmd_rules(path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(path) => {
            for rule in load_grammar(path)?.rules() {
                println!("{rule}");
            }
        }
        None => {
            for core in CoreRule::ALL {
                println!("{}", core.rule());
            }
        }
    }
    Ok(())
}

/// Returns whether the input matched; errors are reserved for bad arguments.
fn cmd_validate(
    rule: &str,
    path: Option<&Path>,
    input: &InputArgs,
    strategy: Strategy,
    trace: bool,
) -> Result<bool, String> {
    let grammar = match path {
        Some(path) => load_grammar(path)?,
        None => GrammarBuilder::new()
            .core_rules()
            .build()
            .map_err(|e| e.to_string())?,
    };
    let bytes = input.bytes()?;
    let target = grammar
        .get(rule)
        .ok_or_else(|| format!("unknown rule \"{rule}\""))?;
    let matcher = grammar.matcher().with_strategy(strategy);

    if trace {
        let trace = matcher.validate_with_trace(&bytes, target);
        println!("{trace}");
        return Ok(trace.is_match());
    }

    match matcher.validate(&bytes, target) {
        Ok(()) => {
            println!("match");
            Ok(true)
        }
        Err(e) => {
            println!("{e}");
            Ok(false)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

impl InputArgs {
    fn bytes(&self) -> Result<Vec<u8>, String> {
        if let Some(text) = &self.input {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(path) = &self.file {
            return std::fs::read(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()));
        }
        if let Some(digits) = &self.hex {
            return hex::decode(digits).map_err(|e| format!("invalid hex input: {e}"));
        }
        Err("no input given".into())
    }
}

fn load_grammar(path: &Path) -> Result<Grammar, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    let config: GrammarConfig = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))?
    };

    log::debug!("loaded grammar config from {}", path.display());
    config
        .load()
        .map_err(|e| format!("grammar load failed: {e}"))
}
