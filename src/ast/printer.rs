use crate::ast::*;

pub fn to_sexp(program: &Program) -> String {
    let mut buf = String::new();
    for stmt in &program.statements {
        sexp_stmt(&mut buf, stmt);
        buf.push('\n');
    }
    buf
}

pub fn to_json(program: &Program) -> String {
    serde_json::to_string_pretty(program).expect("AST should be serializable")
}

/// Render one expression on its own (used by the expression-only entry
/// point's debug output).
pub fn expr_to_sexp(expr: &Expr) -> String {
    let mut buf = String::new();
    sexp_expr(&mut buf, expr);
    buf
}

fn sexp_stmt(buf: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(e) => sexp_expr(buf, &e.expression),
        Stmt::Print(p) => {
            buf.push_str("(print ");
            sexp_expr(buf, &p.expression);
            buf.push(')');
        }
        Stmt::Var(v) => {
            buf.push_str("(var ");
            buf.push_str(&v.name);
            if let Some(ref init) = v.initializer {
                buf.push(' ');
                sexp_expr(buf, init);
            }
            buf.push(')');
        }
        Stmt::Block(b) => {
            buf.push_str("(block");
            for stmt in &b.statements {
                buf.push(' ');
                sexp_stmt(buf, stmt);
            }
            buf.push(')');
        }
        Stmt::If(i) => {
            buf.push_str("(if ");
            sexp_expr(buf, &i.condition);
            buf.push(' ');
            sexp_stmt(buf, &i.then_branch);
            if let Some(ref else_branch) = i.else_branch {
                buf.push(' ');
                sexp_stmt(buf, else_branch);
            }
            buf.push(')');
        }
        Stmt::While(w) => {
            buf.push_str("(while ");
            sexp_expr(buf, &w.condition);
            buf.push(' ');
            sexp_stmt(buf, &w.body);
            buf.push(')');
        }
        Stmt::For(f) => {
            buf.push_str("(for ");
            match f.initializer {
                Some(ref init) => sexp_stmt(buf, init),
                None => buf.push('_'),
            }
            buf.push(' ');
            match f.condition {
                Some(ref cond) => sexp_expr(buf, cond),
                None => buf.push('_'),
            }
            buf.push(' ');
            match f.increment {
                Some(ref inc) => sexp_expr(buf, inc),
                None => buf.push('_'),
            }
            buf.push(' ');
            sexp_stmt(buf, &f.body);
            buf.push(')');
        }
        Stmt::Break(_) => buf.push_str("(break)"),
        Stmt::Continue(_) => buf.push_str("(continue)"),
    }
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Postfix(p) => {
            buf.push('(');
            sexp_expr(buf, &p.operand);
            buf.push(' ');
            buf.push_str(&p.operator.to_string());
            buf.push(')');
        }
        Expr::Literal(l) => match &l.value {
            LiteralValue::Number(n) => buf.push_str(&format!("{n}")),
            LiteralValue::String(s) => {
                buf.push('"');
                buf.push_str(s);
                buf.push('"');
            }
            LiteralValue::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
            LiteralValue::Nil => buf.push_str("nil"),
        },
        Expr::Grouping(g) => {
            buf.push_str("(group ");
            sexp_expr(buf, &g.expression);
            buf.push(')');
        }
        Expr::Variable(v) => buf.push_str(&v.name),
        Expr::Assign(a) => {
            buf.push_str("(= ");
            buf.push_str(&a.name);
            buf.push(' ');
            sexp_expr(buf, &a.value);
            buf.push(')');
        }
        Expr::Logical(l) => {
            buf.push('(');
            buf.push_str(&l.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &l.left);
            buf.push(' ');
            sexp_expr(buf, &l.right);
            buf.push(')');
        }
        Expr::Conditional(c) => {
            buf.push_str("(? ");
            sexp_expr(buf, &c.condition);
            buf.push(' ');
            sexp_expr(buf, &c.then_branch);
            buf.push(' ');
            sexp_expr(buf, &c.else_branch);
            buf.push(')');
        }
    }
}
