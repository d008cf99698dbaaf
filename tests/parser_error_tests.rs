use rill::parser::Parser;
use rill::scanner;

fn parse_errors(source: &str) -> Vec<String> {
    let tokens = scanner::scan(source).expect("scan should succeed");
    Parser::new(tokens)
        .parse()
        .unwrap_err()
        .into_iter()
        .map(|e| e.to_string())
        .collect()
}

#[test]
fn missing_semicolon_reports_single_error() {
    let source = include_str!("../fixtures/error_missing_semicolon.rill");
    let errors = parse_errors(source);
    assert_eq!(
        errors.len(),
        1,
        "expected 1 error but got {}: {errors:?}",
        errors.len()
    );
    assert!(
        errors[0].contains("';'"),
        "error should mention missing semicolon: {}",
        errors[0]
    );
}

#[test]
fn valid_code_after_error_in_block_still_parses() {
    // The second statement in the block is valid; the parser should recover
    // from the first statement's error and not report additional errors.
    let source = r#"
        {
            var x = 1
            print x;
        }
        var y = 2;
        print y;
    "#;
    let errors = parse_errors(source);
    assert_eq!(
        errors.len(),
        1,
        "only the broken statement should produce an error, got: {errors:?}"
    );
}

#[test]
fn multiple_independent_errors_all_reported() {
    // Two separate statements each missing a semicolon, separated by enough
    // context that synchronization recovers before the second error.
    let source = "var x = 1\nprint x;\nvar y = 2\nprint y;\n";
    let errors = parse_errors(source);
    assert_eq!(
        errors.len(),
        2,
        "each missing semicolon should be reported independently: {errors:?}"
    );
}

#[test]
fn missing_left_operand_does_not_cascade() {
    let source = "* 3;\nprint 1;\n";
    let errors = parse_errors(source);
    assert_eq!(errors.len(), 1, "got: {errors:?}");
    assert!(errors[0].contains("missing left-hand operand"));
}

#[test]
fn loop_control_outside_loop_is_rejected_at_parse_time() {
    let errors = parse_errors("break;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("'break'"));

    let errors = parse_errors("if (true) continue;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("'continue'"));
}

#[test]
fn syntax_errors_leave_nothing_to_interpret() {
    // parse() returns Err, so the caller never reaches the interpreter.
    let tokens = scanner::scan("1 +;").expect("scan should succeed");
    assert!(Parser::new(tokens).parse().is_err());
}
