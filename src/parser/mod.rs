use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::token::{Span, Token, TokenKind};

/// Result of an interactive parse: either an ordinary program, or a single
/// trailing bare expression (no semicolon, only statement, at end of input)
/// that the REPL should evaluate and print.
#[derive(Debug)]
pub enum ReplParse {
    Program(Program),
    Expression(Expr),
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<CompileError>,
    loop_depth: usize,
    allow_expression: bool,
    found_expression: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            loop_depth: 0,
            allow_expression: false,
            found_expression: false,
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        if self.errors.is_empty() {
            Ok(Program { statements })
        } else {
            Err(self.errors)
        }
    }

    /// Parse in REPL mode: a bare expression with no terminating semicolon is
    /// tolerated when it is the only statement and sits at end of input, and
    /// is signaled distinctly so the caller can print its value.
    pub fn parse_interactive(mut self) -> Result<ReplParse, Vec<CompileError>> {
        self.allow_expression = true;
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            if self.found_expression {
                break;
            }
            self.allow_expression = false;
        }
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        if self.found_expression
            && statements.len() == 1
            && matches!(statements.last(), Some(Stmt::Expression(_)))
        {
            if let Some(Stmt::Expression(e)) = statements.pop() {
                return Ok(ReplParse::Expression(e.expression));
            }
        }
        Ok(ReplParse::Program(Program { statements }))
    }

    /// Parse a single standalone expression with the full expression grammar,
    /// including the conditional (`?:`) and comma operators. The statement
    /// grammar's `expression` chain never reaches those two rules.
    pub fn parse_expression(mut self) -> Result<Expr, Vec<CompileError>> {
        match self.conditional() {
            Ok(expr) => {
                if !self.is_at_end() {
                    let token = self.peek().clone();
                    self.errors.push(CompileError::parse(
                        format!("expected end of expression, found '{}'", token.lexeme),
                        token.span.offset,
                        token.span.len.max(1),
                    ));
                }
                if self.errors.is_empty() {
                    Ok(expr)
                } else {
                    Err(self.errors)
                }
            }
            Err(e) => {
                self.errors.push(e);
                Err(self.errors)
            }
        }
    }

    fn declaration(&mut self) -> Result<Stmt, CompileError> {
        if self.check(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'var'
        let name = self.expect_identifier("variable name")?;

        let initializer = if self.match_token(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "';' after variable declaration")?;
        let span = self.span_from(start);
        Ok(Stmt::Var(VarStmt {
            name,
            initializer,
            span,
        }))
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        match self.peek().kind {
            TokenKind::Print => self.print_statement(),
            TokenKind::LeftBrace => self.block_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Break => self.break_statement(),
            TokenKind::Continue => self.continue_statement(),
            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'print'
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after print value")?;
        let span = self.span_from(start);
        Ok(Stmt::Print(PrintStmt { expression, span }))
    }

    fn block_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume '{'
        let mut statements = Vec::new();
        // Recover per statement so one bad statement does not take the
        // whole block (and its closing brace) down with it.
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        self.consume(TokenKind::RightBrace, "'}' after block")?;
        let span = self.span_from(start);
        Ok(Stmt::Block(BlockStmt { statements, span }))
    }

    fn if_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'if'
        self.consume(TokenKind::LeftParen, "'(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after if condition")?;

        // A dangling else binds to the nearest unmatched if.
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn while_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'while'
        self.consume(TokenKind::LeftParen, "'(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after while condition")?;
        let body = self.loop_body()?;
        let span = self.span_from(start);
        Ok(Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
            span,
        }))
    }

    fn for_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'for'
        self.consume(TokenKind::LeftParen, "'(' after 'for'")?;

        let initializer = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) {
            Some(Box::new(self.var_declaration()?))
        } else {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "';' after for initializer")?;
            let span = expr.span();
            Some(Box::new(Stmt::Expression(ExprStmt {
                expression: expr,
                span,
            })))
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "')' after for clauses")?;

        let body = self.loop_body()?;
        let span = self.span_from(start);
        Ok(Stmt::For(ForStmt {
            initializer,
            condition,
            increment,
            body: Box::new(body),
            span,
        }))
    }

    fn loop_body(&mut self) -> Result<Stmt, CompileError> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn break_statement(&mut self) -> Result<Stmt, CompileError> {
        let token = self.advance().clone(); // consume 'break'
        if self.loop_depth == 0 {
            return Err(CompileError::parse(
                "'break' is not allowed outside of a loop",
                token.span.offset,
                token.span.len,
            ));
        }
        self.consume(TokenKind::Semicolon, "';' after 'break'")?;
        let span = token.span.to(self.previous_span());
        Ok(Stmt::Break(BreakStmt { span }))
    }

    fn continue_statement(&mut self) -> Result<Stmt, CompileError> {
        let token = self.advance().clone(); // consume 'continue'
        if self.loop_depth == 0 {
            return Err(CompileError::parse(
                "'continue' is not allowed outside of a loop",
                token.span.offset,
                token.span.len,
            ));
        }
        self.consume(TokenKind::Semicolon, "';' after 'continue'")?;
        let span = token.span.to(self.previous_span());
        Ok(Stmt::Continue(ContinueStmt { span }))
    }

    fn expression_statement(&mut self) -> Result<Stmt, CompileError> {
        let expression = self.expression()?;
        if self.allow_expression && self.is_at_end() {
            self.found_expression = true;
        } else {
            self.consume(TokenKind::Semicolon, "';' after expression")?;
        }
        let span = expression.span();
        Ok(Stmt::Expression(ExprStmt { expression, span }))
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, CompileError> {
        let expr = self.or()?;

        if self.check(TokenKind::Equal) {
            let equals = self.advance().clone();
            let value = self.assignment()?;
            let span = expr.span().to(value.span());

            match expr {
                Expr::Variable(v) => {
                    return Ok(Expr::Assign(AssignExpr {
                        name: v.name,
                        value: Box::new(value),
                        span,
                    }));
                }
                other => {
                    // Recorded, not raised: parsing proceeds with the left
                    // expression as the result.
                    self.report(CompileError::parse(
                        "invalid assignment target",
                        equals.span.offset,
                        equals.span.len,
                    ));
                    return Ok(other);
                }
            }
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.and()?;
        while self.match_token(TokenKind::Or) {
            let right = self.and()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.equality()?;
        while self.match_token(TokenKind::And) {
            let right = self.equality()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator: LogicalOp::And,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    /// Ternary conditional, right-associative on the else branch. Together
    /// with [`Parser::comma`] this forms the head of the full expression
    /// grammar reachable only through [`Parser::parse_expression`].
    fn conditional(&mut self) -> Result<Expr, CompileError> {
        let expr = self.comma()?;
        if self.match_token(TokenKind::Question) {
            let then_branch = self.expression()?;
            self.consume(TokenKind::Colon, "':' after then branch of conditional")?;
            let else_branch = self.conditional()?;
            let span = expr.span().to(else_branch.span());
            return Ok(Expr::Conditional(ConditionalExpr {
                condition: Box::new(expr),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            }));
        }
        Ok(expr)
    }

    fn comma(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.equality()?;
        while self.match_token(TokenKind::Comma) {
            let right = self.equality()?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: BinaryOp::Comma,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.comparison()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::EqualEqual, TokenKind::BangEqual]) {
            let right = self.comparison()?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.term()?;
        while let Some(op) = self.match_binary_op(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let right = self.term()?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.factor()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.factor()?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.unary()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Star, TokenKind::Slash]) {
            let right = self.unary()?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        let operator = match self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::PlusPlus => Some(UnaryOp::Increment),
            TokenKind::MinusMinus => Some(UnaryOp::Decrement),
            _ => None,
        };
        if let Some(operator) = operator {
            let start = self.current_span();
            self.advance();
            let operand = self.unary()?;
            let span = start.to(operand.span());
            return Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
                span,
            }));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, CompileError> {
        let expr = self.primary()?;
        let operator = match self.peek().kind {
            TokenKind::PlusPlus => Some(PostfixOp::Increment),
            TokenKind::MinusMinus => Some(PostfixOp::Decrement),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let span = expr.span().to(self.previous_span());
            return Ok(Expr::Postfix(PostfixExpr {
                operand: Box::new(expr),
                operator,
                span,
            }));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value: f64 = token
                    .lexeme
                    .parse()
                    .expect("scanner guarantees valid number");
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Number(value),
                    span: token.span,
                }))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::String(token.lexeme),
                    span: token.span,
                }))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(true),
                    span: token.span,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(false),
                    span: token.span,
                }))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Nil,
                    span: token.span,
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Variable(VariableExpr {
                    name: token.lexeme,
                    span: token.span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                let span = token.span.to(self.previous_span());
                Ok(Expr::Grouping(GroupingExpr {
                    expression: Box::new(expr),
                    span,
                }))
            }
            // A leading binary operator means the left operand is missing:
            // report it, then parse and discard the right-hand operand so the
            // error does not cascade.
            TokenKind::EqualEqual | TokenKind::BangEqual => self.missing_operand(Self::equality),
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => self.missing_operand(Self::comparison),
            TokenKind::Plus => self.missing_operand(Self::term),
            TokenKind::Slash | TokenKind::Star => self.missing_operand(Self::factor),
            _ => Err(CompileError::parse(
                format!("expected expression, found '{}'", token.lexeme),
                token.span.offset,
                token.span.len.max(1),
            )),
        }
    }

    fn missing_operand(
        &mut self,
        rest: fn(&mut Self) -> Result<Expr, CompileError>,
    ) -> Result<Expr, CompileError> {
        let token = self.advance().clone();
        self.report(CompileError::parse(
            "missing left-hand operand",
            token.span.offset,
            token.span.len,
        ));
        rest(self)
    }

    // --- Helper methods ---

    /// Record an error without aborting the current production.
    fn report(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return Some(token_to_binary_op(kind));
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {message}, found '{}'", token.lexeme),
                token.span.offset,
                token.span.len.max(1),
            ))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, CompileError> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance().clone();
            Ok(token.lexeme)
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {context}"),
                token.span.offset,
                token.span.len.max(1),
            ))
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current - 1].span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.tokens[self.current - 1].kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

fn token_to_binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::BangEqual => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        _ => unreachable!("only called with matched operator tokens"),
    }
}
