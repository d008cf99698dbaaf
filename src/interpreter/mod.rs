pub mod environment;
pub mod value;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::environment::{Binding, Environment};
use crate::interpreter::value::Value;
use crate::scanner::token::Span;

/// Control-flow signal produced by executing a statement. Loops intercept
/// `Break` and `Continue`; every other construct passes them upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

pub struct Interpreter {
    /// Current scope; the chain is rooted at the session's global scope.
    environment: Rc<RefCell<Environment>>,
    output: Vec<String>,
    /// Writer for print output (allows testing without stdout)
    writer: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Create an interpreter that captures output (for testing).
    #[cfg(test)]
    fn new_capturing() -> Self {
        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
            writer: Box::new(Vec::<u8>::new()),
        }
    }

    /// Execute statements in order against the current environment. The run
    /// stops at the first runtime error; there is no resynchronization.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            self.execute_stmt(statement)?;
        }
        Ok(())
    }

    /// Evaluate one bare expression and return its printable form (REPL
    /// auto-print).
    pub fn interpret_expression(&mut self, expr: &Expr) -> Result<String, RuntimeError> {
        let value = self.evaluate_expr(expr)?;
        Ok(value.to_string())
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate_expr(&e.expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(p) => {
                let value = self.evaluate_expr(&p.expression)?;
                self.emit(value.to_string());
                Ok(Flow::Normal)
            }
            Stmt::Var(v) => {
                match &v.initializer {
                    Some(init) => {
                        let value = self.evaluate_expr(init)?;
                        self.environment.borrow_mut().define(v.name.clone(), value);
                    }
                    // No initializer binds the uninitialized marker, not nil.
                    None => self.environment.borrow_mut().declare(v.name.clone()),
                }
                Ok(Flow::Normal)
            }
            Stmt::Block(b) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));
                self.execute_block(&b.statements, env)
            }
            Stmt::If(i) => {
                if self.evaluate_expr(&i.condition)?.is_truthy() {
                    self.execute_stmt(&i.then_branch)
                } else if let Some(ref else_branch) = i.else_branch {
                    self.execute_stmt(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(w) => {
                while self.evaluate_expr(&w.condition)?.is_truthy() {
                    match self.execute_stmt(&w.body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For(f) => {
                // The initializer gets its own scope for the whole loop.
                let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));
                let previous = Rc::clone(&self.environment);
                self.environment = env;
                let result = self.run_for(f);
                self.environment = previous;
                result
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
        }
    }

    /// Body of a `for` loop, already inside the loop's own scope. `continue`
    /// falls through to the increment clause before the condition re-test.
    fn run_for(&mut self, f: &ForStmt) -> Result<Flow, RuntimeError> {
        if let Some(ref initializer) = f.initializer {
            self.execute_stmt(initializer)?;
        }
        loop {
            if let Some(ref condition) = f.condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    break;
                }
            }
            match self.execute_stmt(&f.body)? {
                Flow::Break => break,
                Flow::Normal | Flow::Continue => {}
            }
            if let Some(ref increment) = f.increment {
                self.evaluate_expr(increment)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let previous = Rc::clone(&self.environment);
        self.environment = env;
        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute_stmt(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.environment = previous;
        result
    }

    fn emit(&mut self, text: String) {
        writeln!(self.writer, "{text}").expect("write should succeed");
        self.output.push(text);
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(match &l.value {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::Str(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),
            Expr::Grouping(g) => self.evaluate_expr(&g.expression),
            Expr::Unary(u) => self.evaluate_unary(u),
            Expr::Postfix(p) => self.evaluate_postfix(p),
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Variable(v) => self.read_variable(&v.name, v.span),
            Expr::Assign(a) => {
                let value = self.evaluate_expr(&a.value)?;
                self.assign_variable(&a.name, value.clone(), a.span)?;
                Ok(value)
            }
            Expr::Logical(l) => {
                let left = self.evaluate_expr(&l.left)?;
                // The deciding operand is returned unchanged, not coerced.
                match l.operator {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate_expr(&l.right),
                }
            }
            Expr::Conditional(c) => {
                if self.evaluate_expr(&c.condition)?.is_truthy() {
                    self.evaluate_expr(&c.then_branch)
                } else {
                    self.evaluate_expr(&c.else_branch)
                }
            }
        }
    }

    fn evaluate_unary(&mut self, u: &UnaryExpr) -> Result<Value, RuntimeError> {
        let operand = self.evaluate_expr(&u.operand)?;
        match u.operator {
            UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnaryOp::Negate => match operand {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::with_span("operand must be a number", u.span)),
            },
            UnaryOp::Increment => self.adjust_prefix(u, 1.0, operand),
            UnaryOp::Decrement => self.adjust_prefix(u, -1.0, operand),
        }
    }

    /// Prefix `++`/`--`: yields the adjusted value; stores it back only when
    /// the operand is a bare variable reference.
    fn adjust_prefix(
        &mut self,
        u: &UnaryExpr,
        delta: f64,
        operand: Value,
    ) -> Result<Value, RuntimeError> {
        let Value::Number(n) = operand else {
            return Err(RuntimeError::with_span("operand must be a number", u.span));
        };
        let adjusted = n + delta;
        if let Expr::Variable(v) = &*u.operand {
            self.assign_variable(&v.name, Value::Number(adjusted), u.span)?;
        }
        Ok(Value::Number(adjusted))
    }

    /// Postfix `++`/`--`: yields the original value; stores the adjusted one
    /// only when the operand is a bare variable reference.
    fn evaluate_postfix(&mut self, p: &PostfixExpr) -> Result<Value, RuntimeError> {
        let operand = self.evaluate_expr(&p.operand)?;
        let Value::Number(n) = operand else {
            return Err(RuntimeError::with_span("operand must be a number", p.span));
        };
        let delta = match p.operator {
            PostfixOp::Increment => 1.0,
            PostfixOp::Decrement => -1.0,
        };
        if let Expr::Variable(v) = &*p.operand {
            self.assign_variable(&v.name, Value::Number(n + delta), p.span)?;
        }
        Ok(Value::Number(n))
    }

    fn evaluate_binary(&mut self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate_expr(&b.left)?;
        let right = self.evaluate_expr(&b.right)?;

        match b.operator {
            BinaryOp::Add => match (&left, &right) {
                (Value::Number(a), Value::Number(c)) => Ok(Value::Number(a + c)),
                // With a string on either side, both sides are stringified.
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{left}{right}")))
                }
                _ => Err(RuntimeError::with_span(
                    "operands must be numbers or strings",
                    b.span,
                )),
            },
            BinaryOp::Subtract => number_binop(&left, &right, |a, c| a - c, b),
            BinaryOp::Multiply => number_binop(&left, &right, |a, c| a * c, b),
            BinaryOp::Divide => match (&left, &right) {
                (Value::Number(_), Value::Number(c)) if *c == 0.0 => {
                    Err(RuntimeError::with_span("division by zero", b.span))
                }
                _ => number_binop(&left, &right, |a, c| a / c, b),
            },
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                compare_values(&left, &right, b.operator, b.span)
            }
            BinaryOp::Equal => Ok(Value::Bool(left.is_equal(&right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!left.is_equal(&right))),
            // Both operands evaluate, the right one wins.
            BinaryOp::Comma => Ok(right),
        }
    }

    fn read_variable(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        match self.environment.borrow().get(name) {
            Some(Binding::Value(value)) => Ok(value),
            Some(Binding::Uninitialized) => Err(RuntimeError::with_span(
                format!("uninitialized variable '{name}'"),
                span,
            )),
            None => Err(RuntimeError::with_span(
                format!("undefined variable '{name}'"),
                span,
            )),
        }
    }

    fn assign_variable(
        &mut self,
        name: &str,
        value: Value,
        span: Span,
    ) -> Result<(), RuntimeError> {
        if self.environment.borrow_mut().assign(name, value) {
            Ok(())
        } else {
            Err(RuntimeError::with_span(
                format!("undefined variable '{name}'"),
                span,
            ))
        }
    }
}

fn number_binop(
    left: &Value,
    right: &Value,
    op: fn(f64, f64) -> f64,
    b: &BinaryExpr,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(c)) => Ok(Value::Number(op(*a, *c))),
        _ => Err(RuntimeError::with_span("operands must be numbers", b.span)),
    }
}

/// Relational comparison: two numbers compare numerically, two strings
/// lexicographically; anything else is an error.
fn compare_values(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    span: Span,
) -> Result<Value, RuntimeError> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(c)) => a.partial_cmp(c),
        (Value::Str(a), Value::Str(c)) => Some(a.cmp(c)),
        _ => {
            return Err(RuntimeError::with_span(
                "operands must be two numbers or two strings",
                span,
            ));
        }
    };
    // NaN comparisons come back as None and are false for every operator.
    let result = match ordering {
        None => false,
        Some(ordering) => match op {
            BinaryOp::Less => ordering.is_lt(),
            BinaryOp::LessEqual => ordering.is_le(),
            BinaryOp::Greater => ordering.is_gt(),
            BinaryOp::GreaterEqual => ordering.is_ge(),
            _ => unreachable!("only called with comparison operators"),
        },
    };
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner;
    use rstest::rstest;

    fn run(source: &str) -> Vec<String> {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let program = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interp = Interpreter::new_capturing();
        interp.interpret(&program).expect("interpret should succeed");
        interp.output.clone()
    }

    fn run_err(source: &str) -> RuntimeError {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let program = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interp = Interpreter::new_capturing();
        interp.interpret(&program).unwrap_err()
    }

    fn run_with_error(source: &str) -> (Vec<String>, RuntimeError) {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let program = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interp = Interpreter::new_capturing();
        let err = interp.interpret(&program).unwrap_err();
        (interp.output.clone(), err)
    }

    fn eval(source: &str) -> String {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let expr = Parser::new(tokens)
            .parse_expression()
            .expect("parse should succeed");
        let mut interp = Interpreter::new_capturing();
        interp
            .interpret_expression(&expr)
            .expect("evaluate should succeed")
    }

    #[rstest]
    #[case("print 1 + 2;", "3")]
    #[case("print 1 + 2 * 3;", "7")]
    #[case("print 10 - 3;", "7")]
    #[case("print 2 * 3;", "6")]
    #[case("print 10 / 4;", "2.5")]
    #[case("print -5;", "-5")]
    #[case("print (1 + 2) * 3;", "9")]
    fn arithmetic(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(run(source), vec![expected]);
    }

    #[test]
    fn commutative_operators() {
        assert_eq!(run("print 2 + 7;"), run("print 7 + 2;"));
        assert_eq!(run("print 2 * 7;"), run("print 7 * 2;"));
    }

    #[test]
    fn division_by_self_is_one() {
        assert_eq!(run("print 17 / 17;"), vec!["1"]);
        assert_eq!(run("print 0.5 / 0.5;"), vec!["1"]);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = run_err("print 1 / 0;");
        assert!(err.to_string().contains("division by zero"));
        let err = run_err("var x = 4; print x / (2 - 2);");
        assert!(err.to_string().contains("division by zero"));
    }

    #[rstest]
    #[case("print \"hello\" + \" world\";", "hello world")]
    #[case("print \"a\" + 1;", "a1")]
    #[case("print 1 + \"a\";", "1a")]
    #[case("print \"n = \" + 2.5;", "n = 2.5")]
    #[case("print \"v: \" + nil;", "v: nil")]
    #[case("print \"b: \" + true;", "b: true")]
    fn string_concatenation(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(run(source), vec![expected]);
    }

    #[test]
    fn addition_of_mismatched_types_is_an_error() {
        let err = run_err("print true + nil;");
        assert!(err.to_string().contains("operands must be"));
    }

    #[test]
    fn truthiness() {
        assert_eq!(run("print !nil;"), vec!["true"]);
        assert_eq!(run("print !false;"), vec!["true"]);
        assert_eq!(run("print !0;"), vec!["false"]);
        assert_eq!(run("print !\"\";"), vec!["false"]);
    }

    #[test]
    fn equality() {
        assert_eq!(run("print 1 == 1;"), vec!["true"]);
        assert_eq!(run("print 1 == 2;"), vec!["false"]);
        assert_eq!(run("print nil == nil;"), vec!["true"]);
        assert_eq!(run("print 1 != 2;"), vec!["true"]);
        assert_eq!(run("print \"1\" == 1;"), vec!["false"]);
        assert_eq!(run("print nil == false;"), vec!["false"]);
    }

    #[test]
    fn numeric_comparison() {
        assert_eq!(run("print 1 < 2;"), vec!["true"]);
        assert_eq!(run("print 2 <= 2;"), vec!["true"]);
        assert_eq!(run("print 1 > 2;"), vec!["false"]);
        assert_eq!(run("print 3 >= 2;"), vec!["true"]);
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        assert_eq!(run("print \"apple\" < \"banana\";"), vec!["true"]);
        assert_eq!(run("print \"b\" >= \"b\";"), vec!["true"]);
        assert_eq!(run("print \"z\" < \"a\";"), vec!["false"]);
    }

    #[test]
    fn comparing_string_with_nil_is_an_error() {
        let err = run_err("print \"a\" < nil;");
        assert!(
            err.to_string()
                .contains("operands must be two numbers or two strings")
        );
    }

    #[test]
    fn comparing_mixed_types_is_an_error() {
        let err = run_err("print 1 < \"2\";");
        assert!(err.to_string().contains("operands must be"));
    }

    #[test]
    fn variables() {
        assert_eq!(run("var x = 10; print x;"), vec!["10"]);
        assert_eq!(run("var x = 1; x = 2; print x;"), vec!["2"]);
        assert_eq!(run("var x = 1; var x = 2; print x;"), vec!["2"]);
    }

    #[test]
    fn assignment_yields_the_assigned_value() {
        assert_eq!(run("var x; var y = x = 3; print y;"), vec!["3"]);
    }

    #[test]
    fn uninitialized_variable_read_is_an_error() {
        let (output, err) = run_with_error("var x; print x;");
        assert!(output.is_empty());
        assert!(err.to_string().contains("uninitialized variable 'x'"));
    }

    #[test]
    fn uninitialized_then_assigned_reads_back() {
        assert_eq!(run("var x; x = 42; print x;"), vec!["42"]);
    }

    #[test]
    fn undefined_variable_read_is_an_error() {
        let err = run_err("print missing;");
        assert!(err.to_string().contains("undefined variable 'missing'"));
    }

    #[test]
    fn assignment_to_undefined_variable_is_an_error() {
        let err = run_err("missing = 1;");
        assert!(err.to_string().contains("undefined variable 'missing'"));
    }

    #[test]
    fn uninitialized_is_not_nil() {
        let err = run_err("var x; print x == nil;");
        assert!(err.to_string().contains("uninitialized variable"));
    }

    #[test]
    fn blocks_and_scoping() {
        let output = run("var x = 1; { var x = 2; print x; } print x;");
        assert_eq!(output, vec!["2", "1"]);
    }

    #[test]
    fn block_locals_do_not_escape() {
        let err = run_err("{ var inner = 1; } print inner;");
        assert!(err.to_string().contains("undefined variable 'inner'"));
    }

    #[test]
    fn assignment_in_block_mutates_outer_binding() {
        let output = run("var x = 1; { x = 2; } print x;");
        assert_eq!(output, vec!["2"]);
    }

    #[test]
    fn scope_is_restored_after_runtime_error_in_block() {
        let tokens = scanner::scan("var x = 1; { var x = 2; print y; }").expect("scan");
        let program = Parser::new(tokens).parse().expect("parse");
        let mut interp = Interpreter::new_capturing();
        interp.interpret(&program).unwrap_err();

        // The interpreter is back in the global scope: x is 1 again.
        let tokens = scanner::scan("print x;").expect("scan");
        let followup = Parser::new(tokens).parse().expect("parse");
        interp.interpret(&followup).expect("interpret");
        assert_eq!(interp.output, vec!["1"]);
    }

    #[test]
    fn if_else() {
        assert_eq!(run("if (true) print 1; else print 2;"), vec!["1"]);
        assert_eq!(run("if (false) print 1; else print 2;"), vec!["2"]);
        assert_eq!(run("if (false) print 1;"), Vec::<String>::new());
    }

    #[test]
    fn while_loop() {
        let output = run("var i = 0; while (i < 3) { print i; i = i + 1; }");
        assert_eq!(output, vec!["0", "1", "2"]);
    }

    #[test]
    fn for_loop() {
        let output = run("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(output, vec!["0", "1", "2"]);
    }

    #[test]
    fn for_loop_with_increment_operator() {
        let output = run("for (var i = 0; i < 3; i++) print i;");
        assert_eq!(output, vec!["0", "1", "2"]);
    }

    #[test]
    fn for_variable_is_loop_scoped() {
        let err = run_err("for (var i = 0; i < 1; i++) print i; print i;");
        assert!(err.to_string().contains("undefined variable 'i'"));
    }

    #[test]
    fn break_exits_loop() {
        let output = run("for (var i = 0; i < 10; i++) { if (i == 2) break; print i; }");
        assert_eq!(output, vec!["0", "1"]);
    }

    #[test]
    fn continue_in_for_still_runs_increment() {
        let output = run("for (var i = 0; i < 3; i++) { if (i == 1) continue; print i; }");
        assert_eq!(output, vec!["0", "2"]);
    }

    #[test]
    fn continue_in_while_retests_condition() {
        let output = run("var i = 0; while (i < 3) { i = i + 1; if (i == 2) continue; print i; }");
        assert_eq!(output, vec!["1", "3"]);
    }

    #[test]
    fn break_exits_only_innermost_loop() {
        let output = run("for (var i = 0; i < 2; i++) {
                for (var j = 0; j < 10; j++) {
                    if (j == 1) break;
                    print i + j;
                }
            }");
        assert_eq!(output, vec!["0", "1"]);
    }

    #[test]
    fn continue_applies_to_innermost_loop() {
        let output = run("for (var i = 0; i < 2; i++) {
                for (var j = 0; j < 2; j++) {
                    if (j == 0) continue;
                    print i + j;
                }
            }");
        assert_eq!(output, vec!["1", "2"]);
    }

    #[test]
    fn while_with_break_only() {
        let output = run("var i = 0; while (true) { if (i == 3) break; i = i + 1; } print i;");
        assert_eq!(output, vec!["3"]);
    }

    #[test]
    fn prefix_increment_mutates_variable() {
        assert_eq!(run("var x = 1; print ++x; print x;"), vec!["2", "2"]);
        assert_eq!(run("var x = 1; print --x; print x;"), vec!["0", "0"]);
    }

    #[test]
    fn postfix_increment_yields_old_value() {
        assert_eq!(run("var x = 1; print x++; print x;"), vec!["1", "2"]);
        assert_eq!(run("var x = 1; print x--; print x;"), vec!["1", "0"]);
    }

    #[test]
    fn prefix_on_non_variable_does_not_store() {
        assert_eq!(run("var x = 5; print ++(x); print x;"), vec!["6", "5"]);
        assert_eq!(run("print --10;"), vec!["9"]);
    }

    #[test]
    fn postfix_on_non_variable_does_not_store() {
        assert_eq!(run("var x = 5; print (x)++; print x;"), vec!["5", "5"]);
    }

    #[test]
    fn increment_of_non_number_is_an_error() {
        let err = run_err("var s = \"a\"; print s++;");
        assert!(err.to_string().contains("operand must be a number"));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(run("print true or false;"), vec!["true"]);
        assert_eq!(run("print false and true;"), vec!["false"]);
        assert_eq!(run("print nil or \"yes\";"), vec!["yes"]);
        assert_eq!(run("print 1 and 2;"), vec!["2"]);
        assert_eq!(run("print nil and 2;"), vec!["nil"]);
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right operand would blow up; short-circuiting must skip it.
        assert_eq!(run("var x = 1; true or (x = x / 0); print x;"), vec!["1"]);
        assert_eq!(run("var x = 1; false and (x = x / 0); print x;"), vec!["1"]);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(run("print 90;"), vec!["90"]);
        assert_eq!(run("print 90.0;"), vec!["90"]);
        assert_eq!(run("print 90.5;"), vec!["90.5"]);
        assert_eq!(run("print nil;"), vec!["nil"]);
    }

    #[test]
    fn runtime_error_stops_the_run() {
        let (output, err) = run_with_error("print 1; print missing; print 2;");
        assert_eq!(output, vec!["1"]);
        assert!(err.to_string().contains("undefined variable"));
    }

    #[test]
    fn negate_requires_number() {
        let err = run_err("print -\"a\";");
        assert!(err.to_string().contains("operand must be a number"));
    }

    // Expression-only surface: ternary and comma.

    #[test]
    fn bare_expression_result_is_stringified() {
        assert_eq!(eval("\"a\" + 1"), "a1");
        assert_eq!(eval("1 + 2 * 3"), "7");
    }

    #[test]
    fn conditional_evaluates_only_taken_branch() {
        assert_eq!(eval("true ? 1 : 2"), "1");
        assert_eq!(eval("false ? 1 : 2"), "2");
        // The untaken branch would divide by zero.
        assert_eq!(eval("true ? 1 : 1 / 0"), "1");
    }

    #[test]
    fn comma_yields_right_operand() {
        assert_eq!(eval("1, 2"), "2");
        assert_eq!(eval("1, 2, 3"), "3");
    }
}
