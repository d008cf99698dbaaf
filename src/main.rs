use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use rill::ast::printer;
use rill::error::CompileError;
use rill::interpreter::Interpreter;
use rill::parser::Parser as RillParser;
use rill::scanner;

#[derive(Parser, Debug)]
#[command(
    name = "rill",
    about = "A tree-walking interpreter for the Rill scripting language"
)]
struct Cli {
    /// Rill source file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,
}

/// Process exit codes for the two failure taxonomies.
const EXIT_SYNTAX_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

fn read_source(cli: &Cli) -> Result<String> {
    match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read source file '{}'", path.display())),
        None => bail!("source file required for this operation"),
    }
}

fn source_name(cli: &Cli) -> String {
    cli.file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<script>".to_string())
}

fn report_errors(errors: Vec<CompileError>, name: &str, source: &str) {
    for e in errors {
        let report = miette::Report::new(e.with_source_code(name, source));
        eprintln!("{report:?}");
    }
}

fn scan_or_exit(name: &str, source: &str) -> Vec<rill::scanner::token::Token> {
    match scanner::scan(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            report_errors(errors, name, source);
            std::process::exit(EXIT_SYNTAX_ERROR);
        }
    }
}

fn parse_or_exit(name: &str, source: &str) -> rill::ast::Program {
    let tokens = scan_or_exit(name, source);
    match RillParser::new(tokens).parse() {
        Ok(program) => program,
        Err(errors) => {
            report_errors(errors, name, source);
            std::process::exit(EXIT_SYNTAX_ERROR);
        }
    }
}

fn run_source(name: &str, source: &str) {
    let program = parse_or_exit(name, source);
    let mut interpreter = Interpreter::new();
    if let Err(e) = interpreter.interpret(&program) {
        eprintln!("{}", e.display_with_line(source));
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.dump_tokens {
        let source = read_source(&cli)?;
        let tokens = scan_or_exit(&source_name(&cli), &source);
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    if cli.dump_ast {
        let source = read_source(&cli)?;
        let program = parse_or_exit(&source_name(&cli), &source);
        match cli.ast_format.as_str() {
            "json" => print!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(());
    }

    match cli.file {
        Some(_) => {
            let source = read_source(&cli)?;
            run_source(&source_name(&cli), &source);
            Ok(())
        }
        None => {
            rill::repl::run_repl();
            Ok(())
        }
    }
}
