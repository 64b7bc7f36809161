//! Parser for the host grammar
//!
//! A hand-written cursor parser over the token stream. It deliberately
//! accepts more than the restricted grammar — operators, attribute access,
//! subscripts, tuple and chained assignment targets — so the validator can
//! reject those shapes with a precise diagnostic rather than a bare parse
//! failure. Newlines terminate statements; inside brackets they are
//! swallowed, so collections and argument lists may span lines.

use crate::ast::{BinOp, Expr, Program, Span, Spanned, Stmt, StmtKind, UnOp};
use crate::error::{Error, Result};
use crate::lexer::Token;


/// Parse tokens into a program
pub fn parse(tokens: Vec<(Token, Span)>) -> Result<Program> {
    Parser::new(tokens).program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    /// Span of the current token, or a zero-width span at the end of input
    fn span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => {
                let end = self.tokens.last().map(|(_, s)| s.end).unwrap_or(0);
                Span::new(end, end)
            }
        }
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Span> {
        match self.peek() {
            Some(found) if *found == token => {
                let span = self.span();
                self.pos += 1;
                Ok(span)
            }
            Some(found) => Err(Error::syntax(
                format!("expected {what}, found `{found}`"),
                self.span(),
            )),
            None => Err(Error::syntax(
                format!("expected {what}, found end of input"),
                self.span(),
            )),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Whether the current token can begin an expression
    fn starts_expr(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::IntLit(_)
                    | Token::FloatLit(_)
                    | Token::StringLit(_)
                    | Token::True
                    | Token::False
                    | Token::NoneKw
                    | Token::Ident(_)
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Minus
            )
        )
    }

    fn program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            stmts.push(self.statement()?);
            match self.peek() {
                None => break,
                Some(Token::Newline) => self.skip_newlines(),
                Some(found) => {
                    return Err(Error::syntax(
                        format!("expected end of statement, found `{found}`"),
                        self.span(),
                    ));
                }
            }
        }
        Ok(Program { stmts })
    }

    fn statement(&mut self) -> Result<Stmt> {
        let first = self.expr_list()?;
        let mut targets = Vec::new();
        let mut current = first;
        while self.eat(&Token::Assign) {
            targets.push(current);
            current = self.expr_list()?;
        }
        if targets.is_empty() {
            let span = current.span;
            Ok(Stmt {
                kind: StmtKind::Expr(current),
                span,
            })
        } else {
            let span = targets[0].span.merge(current.span);
            Ok(Stmt {
                kind: StmtKind::Assign {
                    targets,
                    value: current,
                },
                span,
            })
        }
    }

    /// A comma-separated expression list; more than one element (or a
    /// trailing comma) builds a tuple
    fn expr_list(&mut self) -> Result<Spanned<Expr>> {
        let first = self.expr()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let mut span = first.span;
        let mut items = vec![first];
        while self.peek() == Some(&Token::Comma) {
            span = span.merge(self.span());
            self.pos += 1;
            if !self.starts_expr() {
                break;
            }
            let item = self.expr()?;
            span = span.merge(item.span);
            items.push(item);
        }
        Ok(Expr::Tuple(items).spanned(span))
    }

    fn expr(&mut self) -> Result<Spanned<Expr>> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::LtEq) => BinOp::Le,
                Some(Token::GtEq) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let right = self.additive()?;
            let span = left.span.merge(right.span);
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            }
            .spanned(span);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            let span = left.span.merge(right.span);
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            }
            .spanned(span);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            let span = left.span.merge(right.span);
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            }
            .spanned(span);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>> {
        if self.peek() == Some(&Token::Minus) {
            let start = self.span();
            self.pos += 1;
            let expr = self.unary()?;
            let span = start.merge(expr.span);
            return Ok(Expr::Unary {
                op: UnOp::Neg,
                expr: Box::new(expr),
            }
            .spanned(span));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::LParen) => {
                    self.pos += 1;
                    let (args, kwargs, close) = self.call_args()?;
                    let span = expr.span.merge(close);
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        kwargs,
                    }
                    .spanned(span);
                }
                Some(Token::Dot) => {
                    self.pos += 1;
                    let (attr, attr_span) = self.ident("attribute name")?;
                    let span = expr.span.merge(attr_span);
                    expr = Expr::Attribute {
                        expr: Box::new(expr),
                        attr: Spanned::new(attr, attr_span),
                    }
                    .spanned(span);
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    self.skip_newlines();
                    let index = self.expr()?;
                    self.skip_newlines();
                    let close = self.expect(Token::RBracket, "`]`")?;
                    let span = expr.span.merge(close);
                    expr = Expr::Subscript {
                        expr: Box::new(expr),
                        index: Box::new(index),
                    }
                    .spanned(span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn ident(&mut self, what: &str) -> Result<(String, Span)> {
        match self.bump() {
            Some((Token::Ident(name), span)) => Ok((name, span)),
            Some((found, span)) => Err(Error::syntax(
                format!("expected {what}, found `{found}`"),
                span,
            )),
            None => Err(Error::syntax(
                format!("expected {what}, found end of input"),
                self.span(),
            )),
        }
    }

    fn call_args(
        &mut self,
    ) -> Result<(
        Vec<Spanned<Expr>>,
        Vec<(Spanned<String>, Spanned<Expr>)>,
        Span,
    )> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(Spanned<String>, Spanned<Expr>)> = Vec::new();
        self.skip_newlines();
        loop {
            if self.peek() == Some(&Token::RParen) {
                break;
            }
            let is_kwarg = matches!(self.peek(), Some(Token::Ident(_)))
                && self.peek2() == Some(&Token::Assign);
            if is_kwarg {
                let (name, name_span) = self.ident("keyword argument name")?;
                self.expect(Token::Assign, "`=`")?;
                let value = self.expr()?;
                kwargs.push((Spanned::new(name, name_span), value));
            } else {
                if !kwargs.is_empty() {
                    return Err(Error::syntax(
                        "positional argument follows keyword argument",
                        self.span(),
                    ));
                }
                args.push(self.expr()?);
            }
            self.skip_newlines();
            if self.eat(&Token::Comma) {
                self.skip_newlines();
            } else {
                break;
            }
        }
        let close = self.expect(Token::RParen, "`)`")?;
        Ok((args, kwargs, close))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>> {
        let span = self.span();
        match self.bump() {
            Some((Token::IntLit(n), _)) => Ok(Expr::IntLit(n).spanned(span)),
            Some((Token::FloatLit(x), _)) => Ok(Expr::FloatLit(x).spanned(span)),
            Some((Token::StringLit(s), _)) => Ok(Expr::StrLit(s).spanned(span)),
            Some((Token::True, _)) => Ok(Expr::BoolLit(true).spanned(span)),
            Some((Token::False, _)) => Ok(Expr::BoolLit(false).spanned(span)),
            Some((Token::NoneKw, _)) => Ok(Expr::NoneLit.spanned(span)),
            Some((Token::Ident(name), _)) => Ok(Expr::Name(name).spanned(span)),
            Some((Token::LParen, _)) => self.paren_group(span),
            Some((Token::LBracket, _)) => {
                let (items, close) = self.bracketed_elements(Token::RBracket, "`]`")?;
                Ok(Expr::List(items).spanned(span.merge(close)))
            }
            Some((Token::LBrace, _)) => self.brace_group(span),
            Some((Token::Keyword(k), _)) => Err(Error::syntax(
                format!("the `{k}` keyword is not part of the expression grammar"),
                span,
            )),
            Some((found, _)) => Err(Error::syntax(
                format!("unexpected token `{found}`"),
                span,
            )),
            None => Err(Error::syntax("unexpected end of input", span)),
        }
    }

    /// After `(`: an empty tuple, a parenthesized expression, or a tuple
    fn paren_group(&mut self, open: Span) -> Result<Spanned<Expr>> {
        self.skip_newlines();
        if self.peek() == Some(&Token::RParen) {
            let close = self.span();
            self.pos += 1;
            return Ok(Expr::Tuple(Vec::new()).spanned(open.merge(close)));
        }
        let first = self.expr()?;
        self.skip_newlines();
        if self.peek() == Some(&Token::Comma) {
            let mut items = vec![first];
            while self.eat(&Token::Comma) {
                self.skip_newlines();
                if self.peek() == Some(&Token::RParen) {
                    break;
                }
                items.push(self.expr()?);
                self.skip_newlines();
            }
            let close = self.expect(Token::RParen, "`)`")?;
            Ok(Expr::Tuple(items).spanned(open.merge(close)))
        } else {
            let close = self.expect(Token::RParen, "`)`")?;
            Ok(Spanned::new(first.node, open.merge(close)))
        }
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed
    fn bracketed_elements(
        &mut self,
        close: Token,
        what: &str,
    ) -> Result<(Vec<Spanned<Expr>>, Span)> {
        let mut items = Vec::new();
        self.skip_newlines();
        loop {
            if self.peek() == Some(&close) {
                break;
            }
            items.push(self.expr()?);
            self.skip_newlines();
            if self.eat(&Token::Comma) {
                self.skip_newlines();
            } else {
                break;
            }
        }
        let close_span = self.expect(close, what)?;
        Ok((items, close_span))
    }

    /// After `{`: an empty dict, a dict literal, or a set literal
    fn brace_group(&mut self, open: Span) -> Result<Spanned<Expr>> {
        self.skip_newlines();
        if self.peek() == Some(&Token::RBrace) {
            let close = self.span();
            self.pos += 1;
            return Ok(Expr::Dict(Vec::new()).spanned(open.merge(close)));
        }
        let first = self.expr()?;
        self.skip_newlines();
        if self.eat(&Token::Colon) {
            // Dict literal
            self.skip_newlines();
            let value = self.expr()?;
            let mut entries = vec![(first, value)];
            self.skip_newlines();
            while self.eat(&Token::Comma) {
                self.skip_newlines();
                if self.peek() == Some(&Token::RBrace) {
                    break;
                }
                let key = self.expr()?;
                self.skip_newlines();
                self.expect(Token::Colon, "`:`")?;
                self.skip_newlines();
                let val = self.expr()?;
                entries.push((key, val));
                self.skip_newlines();
            }
            let close = self.expect(Token::RBrace, "`}`")?;
            Ok(Expr::Dict(entries).spanned(open.merge(close)))
        } else {
            // Set literal
            let mut items = vec![first];
            while self.eat(&Token::Comma) {
                self.skip_newlines();
                if self.peek() == Some(&Token::RBrace) {
                    break;
                }
                items.push(self.expr()?);
                self.skip_newlines();
            }
            let close = self.expect(Token::RBrace, "`}`")?;
            Ok(Expr::Set(items).spanned(open.merge(close)))
        }
    }
}
