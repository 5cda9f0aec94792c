use anyhow::{bail, Context};
use clap::{Args, Parser as ClapParser, ValueEnum};
use directories::BaseDirs;
use quill_parser::{scan_all, Parser, ParserConfig, TokenType};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{fs, path::PathBuf};
use tracing::{debug, info};

/// Quill SQL parser command-line client.
#[derive(ClapParser)]
#[command(name = "quillctl", author, version, about = "Quill SQL parser CLI", long_about = None)]
struct Cli {
    /// Parse SQL directly and exit.
    #[arg(short = 'e', long = "exec")]
    sql: Option<String>,

    /// Parse every statement of a SQL file and exit.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    #[command(flatten)]
    opts: Options,
}

#[derive(Args)]
struct Options {
    /// Path to parser configuration (default: $HOME/.quillrc).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Output format of trees and tokens.
    #[arg(long, value_enum, default_value_t = Format::Debug)]
    format: Format,

    /// Print the token stream instead of the tree.
    #[arg(long)]
    tokens: bool,

    /// Log filter directives.
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write logs to hourly rolling files in this directory instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Debug,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = quill_log::init(cli.opts.log_dir.as_deref(), &cli.opts.log_level, cli.opts.log_json)?;

    let config = load_config(cli.opts.config.clone())?;
    let parser = Parser::with_config(config);

    if let Some(sql) = cli.sql.as_deref() {
        if !execute_sql(&parser, sql, &cli.opts)? {
            bail!("statement failed");
        }
        return Ok(());
    }

    if let Some(file) = cli.file.as_ref() {
        let content =
            fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
        let mut failed = 0;
        for stmt in split_statements(&content) {
            if !execute_sql(&parser, stmt, &cli.opts)? {
                failed += 1;
            }
        }
        if failed > 0 {
            bail!("{failed} statement(s) failed");
        }
        return Ok(());
    }

    interactive_shell(&parser, cli.opts, &log)
}

/// Explicit path must exist; the default path is optional.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<ParserConfig> {
    if let Some(path) = explicit {
        let config = ParserConfig::load(&path)
            .with_context(|| format!("load config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        return Ok(config);
    }
    match BaseDirs::new().map(|b| b.home_dir().join(".quillrc")) {
        Some(path) if path.exists() => {
            let config = ParserConfig::load(&path)
                .with_context(|| format!("load config {}", path.display()))?;
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        _ => Ok(ParserConfig::default()),
    }
}

/// Split a script into statements at `;` tokens, so that semicolons inside
/// literals and comments do not count. Empty statements are dropped.
fn split_statements(sql: &str) -> Vec<&str> {
    let (tokens, outcome) = scan_all(sql);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut pending = false;
    for t in &tokens {
        if t.typ == TokenType::Eof {
            break;
        }
        if t.is_special(';') {
            if pending {
                statements.push(&sql[start..t.end()]);
            }
            start = t.end();
            pending = false;
        } else {
            pending = true;
        }
    }
    // An aborted scan leaves the rest unread; hand it to the parser to report.
    if pending || (outcome.is_err() && !sql[start..].trim().is_empty()) {
        statements.push(&sql[start..]);
    }
    statements
}

/// Parse one statement and print the tree, tokens or diagnostics.
/// Returns whether the statement was accepted.
fn execute_sql(parser: &Parser, sql: &str, opts: &Options) -> anyhow::Result<bool> {
    debug!(sql, "execute");
    if opts.tokens {
        let (tokens, outcome) = scan_all(sql);
        match opts.format {
            Format::Debug => tokens.iter().for_each(|t| println!("{t}")),
            Format::Json => println!("{}", serde_json::to_string_pretty(&tokens)?),
        }
        if let Err(e) = outcome {
            eprintln!("Error: {e}");
            return Ok(false);
        }
        return Ok(tokens.iter().all(|t| t.typ != TokenType::Error));
    }

    match parser.parse(sql) {
        Ok(ast) => {
            match opts.format {
                Format::Debug => println!("{:#?}", ast),
                Format::Json => println!("{}", serde_json::to_string_pretty(&ast)?),
            }
            Ok(true)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(false)
        }
    }
}

/// Interactive readline shell.
///
/// `\tokens` toggles token output, `\log <filter>` changes the log filter,
/// `exit` or `\q` leaves.
fn interactive_shell(parser: &Parser, mut opts: Options, log: &quill_log::LogHandle) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let prompt = "quillctl> ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq("\\q") {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed.eq("\\tokens") {
                    opts.tokens = !opts.tokens;
                    println!("token output {}", if opts.tokens { "on" } else { "off" });
                    continue;
                }
                if let Some(directives) = trimmed.strip_prefix("\\log ") {
                    if let Err(e) = log.set_level(directives.trim()) {
                        eprintln!("Error: {e}");
                    }
                    continue;
                }
                execute_sql(parser, trimmed, &opts)?;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_split_on_semicolon_tokens() {
        let script = "SELECT 'a;b' FROM t; /* ; */ SELECT 2;\n-- trailing ;\n";
        let statements = split_statements(script);
        assert_eq!(statements, vec!["SELECT 'a;b' FROM t;", " /* ; */ SELECT 2;"]);
    }

    #[test]
    fn unterminated_last_statement_is_kept() {
        assert_eq!(split_statements("SELECT 1; SELECT 2"), vec!["SELECT 1;", " SELECT 2"]);
        assert!(split_statements(";;  ").is_empty());
    }

    #[test]
    fn aborted_scan_keeps_the_rest() {
        assert_eq!(split_statements("SELECT 1; # x"), vec!["SELECT 1;", " # x"]);
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::try_parse_from(["quillctl", "-e", "SELECT 1", "--format", "json", "--tokens"])
            .unwrap();
        assert_eq!(cli.sql.as_deref(), Some("SELECT 1"));
        assert!(cli.opts.format == Format::Json);
        assert!(cli.opts.tokens);
        assert_eq!(cli.opts.log_level, "warn");
    }
}
