use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::CompileError;
use crate::interpreter::Interpreter;
use crate::parser::{Parser, ReplParse};
use crate::scanner;

/// Run the interactive REPL. Environment persists across lines.
pub fn run_repl() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("failed to start line editor: {e}");
            return;
        }
    };
    let mut interpreter = Interpreter::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                run_line(&mut interpreter, trimmed);
            }
            // Ctrl-C clears the line, Ctrl-D leaves the REPL.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }
    }
}

/// One full scan -> parse -> interpret cycle for a single input line. A bare
/// trailing expression is evaluated and its result printed without needing
/// an explicit `print`.
fn run_line(interpreter: &mut Interpreter, source: &str) {
    let tokens = match scanner::scan(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            report_errors(errors, source);
            return;
        }
    };

    match Parser::new(tokens).parse_interactive() {
        Ok(ReplParse::Expression(expr)) => match interpreter.interpret_expression(&expr) {
            Ok(result) => println!("{result}"),
            Err(e) => eprintln!("{}", e.display_with_line(source)),
        },
        Ok(ReplParse::Program(program)) => {
            if let Err(e) = interpreter.interpret(&program) {
                eprintln!("{}", e.display_with_line(source));
            }
        }
        Err(errors) => report_errors(errors, source),
    }
}

fn report_errors(errors: Vec<CompileError>, source: &str) {
    for e in errors {
        let report = miette::Report::new(e.with_source_code("repl", source));
        eprintln!("{report:?}");
    }
}
