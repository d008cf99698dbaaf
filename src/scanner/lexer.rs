use winnow::combinator::{alt, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_till, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

fn shebang(input: &mut Input<'_>) -> ModalResult<()> {
    ("#!", take_till(0.., '\n'), opt('\n'))
        .void()
        .parse_next(input)
}

/// Consume `literal` if the input starts with it.
fn eat_literal(input: &mut Input<'_>, literal: &'static str) -> bool {
    let matched: ModalResult<Option<&str>> = opt(literal).parse_next(input);
    matches!(matched, Ok(Some(_)))
}

/// Block comments nest: every `/*` must be balanced by a `*/`.
fn block_comment(input: &mut Input<'_>) -> Result<(), CompileError> {
    let start = input.current_token_start();
    eat_literal(input, "/*");
    let mut depth = 1usize;
    while depth > 0 {
        if eat_literal(input, "/*") {
            depth += 1;
        } else if eat_literal(input, "*/") {
            depth -= 1;
        } else if any::<_, ContextError>.parse_next(input).is_err() {
            return Err(CompileError::scan(
                "unterminated block comment",
                start,
                input.current_token_start() - start,
            ));
        }
    }
    Ok(())
}

fn skip_trivia(input: &mut Input<'_>) -> Result<(), CompileError> {
    loop {
        let before = input.current_token_start();
        let _: ModalResult<()> = take_while(0.., |c: char| {
            c == ' ' || c == '\t' || c == '\r' || c == '\n'
        })
        .void()
        .parse_next(input);

        if input.starts_with("//") {
            let _: ModalResult<()> = take_while(0.., |c: char| c != '\n').void().parse_next(input);
        } else if input.starts_with("/*") {
            block_comment(input)?;
        } else if input.current_token_start() == before {
            break;
        }
    }
    Ok(())
}

/// Scan a string literal, decoding escapes as it goes. The token's lexeme is
/// the decoded text. Recognized escapes are `\\`, `\n` and `\t`; anything
/// else after a backslash is an error naming the offending code.
fn string_literal(input: &mut Input<'_>) -> Result<Token, CompileError> {
    let start = input.current_token_start();
    let _: ModalResult<char> = any.parse_next(input); // opening quote
    let mut decoded = String::new();
    let mut bad_escape: Option<CompileError> = None;
    loop {
        let at = input.current_token_start();
        let Ok(c) = any::<_, ContextError>.parse_next(input) else {
            return Err(CompileError::scan("unterminated string", start, at - start));
        };
        match c {
            '"' => break,
            '\\' => {
                let Ok(esc) = any::<_, ContextError>.parse_next(input) else {
                    return Err(CompileError::scan(
                        "unterminated string",
                        start,
                        input.current_token_start() - start,
                    ));
                };
                match esc {
                    'n' => decoded.push('\n'),
                    't' => decoded.push('\t'),
                    '\\' => decoded.push('\\'),
                    other => {
                        if bad_escape.is_none() {
                            bad_escape = Some(CompileError::scan(
                                format!("unknown escape code '\\{other}'"),
                                at,
                                2,
                            ));
                        }
                    }
                }
            }
            other => decoded.push(other),
        }
    }
    if let Some(err) = bad_escape {
        return Err(err);
    }
    let end = input.current_token_start();
    Ok(Token::new(
        TokenKind::String,
        decoded,
        Span::new(start, end - start),
    ))
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut lexeme = whole.to_string();

    // One extra char of lookahead: a dot counts only when digits follow.
    let fraction: Option<(char, &str)> =
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))).parse_next(input)?;
    if let Some((_, digits)) = fraction {
        lexeme.push('.');
        lexeme.push_str(digits);
    }

    let end = input.current_token_start();
    Ok(Token::new(
        TokenKind::Number,
        lexeme,
        Span::new(start, end - start),
    ))
}

fn identifier_or_keyword(input: &mut Input<'_>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let first: char = any
        .verify(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let end = input.current_token_start();
    let mut lexeme = String::with_capacity(1 + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
    Ok(Token::new(kind, lexeme, Span::new(start, end - start)))
}

fn two_char_token(input: &mut Input<'_>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let (kind, lexeme) = alt((
        "--".value((TokenKind::MinusMinus, "--")),
        "++".value((TokenKind::PlusPlus, "++")),
        "!=".value((TokenKind::BangEqual, "!=")),
        "==".value((TokenKind::EqualEqual, "==")),
        ">=".value((TokenKind::GreaterEqual, ">=")),
        "<=".value((TokenKind::LessEqual, "<=")),
    ))
    .parse_next(input)?;
    Ok(Token::new(kind, lexeme, Span::new(start, 2)))
}

fn single_char_token(input: &mut Input<'_>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "(){}.,;-+/*!=<>?:".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        ';' => TokenKind::Semicolon,
        '/' => TokenKind::Slash,
        '*' => TokenKind::Star,
        '!' => TokenKind::Bang,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        '?' => TokenKind::Question,
        ':' => TokenKind::Colon,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn scan_token(input: &mut Input<'_>) -> ModalResult<Token> {
    alt((
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Scan all tokens from source. Lexical errors are collected and scanning
/// continues; the result is `Err` when any were recorded.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let mut input = LocatingSlice::new(source);
    let _ = opt(shebang).parse_next(&mut input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if let Err(e) = skip_trivia(&mut input) {
            errors.push(e);
        }
        if input.is_empty() {
            break;
        }
        if input.starts_with("\"") {
            match string_literal(&mut input) {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
            continue;
        }
        match scan_token(&mut input) {
            Ok(token) => tokens.push(token),
            Err(_) => {
                let offset = input.current_token_start();
                let c = any::<_, ContextError>.parse_next(&mut input).ok();
                let ch = c.unwrap_or('?');
                errors.push(CompileError::scan(
                    format!("unexpected character '{ch}'"),
                    offset,
                    1,
                ));
            }
        }
    }

    let eof_offset = source.len();
    tokens.push(Token::new(TokenKind::Eof, "", Span::new(eof_offset, 0)));

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
