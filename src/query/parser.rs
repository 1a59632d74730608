//! Parser turning caller-supplied statement text into the shared AST.
//!
//! The dialect is the Cypher subset the catalog itself uses: `MATCH`,
//! `OPTIONAL MATCH`, `WHERE`, `WITH`, `MERGE`, `SET`, `DELETE`, `RETURN`
//! with `DISTINCT`, `ORDER BY`, and `LIMIT`. Anything outside the subset is
//! a syntax error carrying the offending token.

use crate::error::{CatalogError, Result};
use crate::model::Value;
use crate::query::ast::{
    Clause, CmpOp, Direction, Expr, NodePattern, OrderKey, PathPattern, Projection, RelPattern,
    ReturnClause, Statement,
};

/// Parses one statement.
pub fn parse(input: &str) -> Result<Statement> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let stmt = parser.statement()?;
    if let Some(tok) = parser.peek() {
        return Err(syntax(format!("unexpected trailing `{tok}`")));
    }
    Ok(stmt)
}

fn syntax(msg: impl Into<String>) -> CatalogError {
    CatalogError::Syntax(msg.into())
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Param(String),
    Str(String),
    Int(i64),
    Float(f64),
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Star,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    PlusEq,
    Dash,
    ArrowRight, // ->
    ArrowLeft,  // <-
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{s}"),
            Token::Param(s) => write!(f, "${s}"),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::Int(i) => write!(f, "{i}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::Star => write!(f, "*"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::PlusEq => write!(f, "+="),
            Token::Dash => write!(f, "-"),
            Token::ArrowRight => write!(f, "->"),
            Token::ArrowLeft => write!(f, "<-"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '{' => {
                tokens.push(Token::LBrace);
                i += 1;
            }
            '}' => {
                tokens.push(Token::RBrace);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Eq);
                i += 1;
            }
            '+' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::PlusEq);
                i += 2;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else if chars.get(i + 1) == Some(&'-') {
                    tokens.push(Token::ArrowLeft);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '-' => {
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token::ArrowRight);
                    i += 2;
                } else if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
                    let (tok, next) = lex_number(&chars, i + 1, true)?;
                    tokens.push(tok);
                    i = next;
                } else {
                    tokens.push(Token::Dash);
                    i += 1;
                }
            }
            '$' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if end == start {
                    return Err(syntax("`$` must be followed by a parameter name"));
                }
                tokens.push(Token::Param(chars[start..end].iter().collect()));
                i = end;
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                let mut j = i + 1;
                loop {
                    match chars.get(j) {
                        None => return Err(syntax("unterminated string literal")),
                        Some(&ch) if ch == quote => {
                            j += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars
                                .get(j + 1)
                                .ok_or_else(|| syntax("unterminated escape sequence"))?;
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => *other,
                            });
                            j += 2;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            j += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
                i = j;
            }
            c if c.is_ascii_digit() => {
                let (tok, next) = lex_number(&chars, i, false)?;
                tokens.push(tok);
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                let mut end = i;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                tokens.push(Token::Ident(chars[start..end].iter().collect()));
                i = end;
            }
            other => return Err(syntax(format!("unexpected character `{other}`"))),
        }
    }
    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize, negative: bool) -> Result<(Token, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    let mut is_float = false;
    if chars.get(end) == Some(&'.') && chars.get(end + 1).is_some_and(|c| c.is_ascii_digit()) {
        is_float = true;
        end += 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
    }
    let text: String = chars[start..end].iter().collect();
    let token = if is_float {
        let value: f64 = text
            .parse()
            .map_err(|_| syntax(format!("invalid number `{text}`")))?;
        Token::Float(if negative { -value } else { value })
    } else {
        let value: i64 = text
            .parse()
            .map_err(|_| syntax(format!("invalid number `{text}`")))?;
        Token::Int(if negative { -value } else { value })
    };
    Ok((token, end))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(tok) if tok == *expected => Ok(()),
            Some(tok) => Err(syntax(format!("expected `{expected}`, found `{tok}`"))),
            None => Err(syntax(format!("expected `{expected}`, found end of input"))),
        }
    }

    /// Consumes the next token if it is the given keyword (case-insensitive).
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if let Some(Token::Ident(word)) = self.peek() {
            if word.eq_ignore_ascii_case(keyword) {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            match self.peek() {
                Some(tok) => Err(syntax(format!("expected `{keyword}`, found `{tok}`"))),
                None => Err(syntax(format!("expected `{keyword}`, found end of input"))),
            }
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            Some(tok) => Err(syntax(format!("expected identifier, found `{tok}`"))),
            None => Err(syntax("expected identifier, found end of input")),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let mut clauses = Vec::new();
        while self.peek().is_some() {
            if matches!(clauses.last(), Some(Clause::Return(_))) {
                return Err(syntax("RETURN must be the final clause"));
            }
            clauses.push(self.clause()?);
        }
        if clauses.is_empty() {
            return Err(syntax("empty statement"));
        }
        Ok(Statement { clauses })
    }

    fn clause(&mut self) -> Result<Clause> {
        if self.eat_keyword("OPTIONAL") {
            self.expect_keyword("MATCH")?;
            return self.match_clause(true);
        }
        if self.eat_keyword("MATCH") {
            return self.match_clause(false);
        }
        if self.eat_keyword("WITH") {
            let mut vars = vec![self.ident()?];
            while matches!(self.peek(), Some(Token::Comma)) {
                self.pos += 1;
                vars.push(self.ident()?);
            }
            let filter = if self.eat_keyword("WHERE") {
                Some(self.expr()?)
            } else {
                None
            };
            return Ok(Clause::With { vars, filter });
        }
        if self.eat_keyword("MERGE") {
            return Ok(Clause::Merge(self.path_pattern()?));
        }
        if self.eat_keyword("SET") {
            return self.set_clause();
        }
        if self.eat_keyword("DETACH") {
            self.expect_keyword("DELETE")?;
            return self.delete_clause(true);
        }
        if self.eat_keyword("DELETE") {
            return self.delete_clause(false);
        }
        if self.eat_keyword("RETURN") {
            return self.return_clause();
        }
        match self.peek() {
            Some(tok) => Err(syntax(format!("expected a clause keyword, found `{tok}`"))),
            None => Err(syntax("expected a clause keyword, found end of input")),
        }
    }

    fn match_clause(&mut self, optional: bool) -> Result<Clause> {
        let pattern = self.path_pattern()?;
        let filter = if self.eat_keyword("WHERE") {
            Some(self.expr()?)
        } else {
            None
        };
        Ok(Clause::Match {
            optional,
            pattern,
            filter,
        })
    }

    fn set_clause(&mut self) -> Result<Clause> {
        // One item per SET clause; multi-item SET is written as repeated
        // SET clauses in this dialect.
        let var = self.ident()?;
        match self.next() {
            Some(Token::PlusEq) => {
                let value = self.expr()?;
                Ok(Clause::SetMerge { var, value })
            }
            Some(Token::Dot) => {
                let key = self.ident()?;
                self.eat(&Token::Eq)?;
                let value = self.expr()?;
                Ok(Clause::SetProperty { var, key, value })
            }
            Some(tok) => Err(syntax(format!("expected `+=` or `.`, found `{tok}`"))),
            None => Err(syntax("unterminated SET clause")),
        }
    }

    fn delete_clause(&mut self, detach: bool) -> Result<Clause> {
        let mut vars = vec![self.ident()?];
        while matches!(self.peek(), Some(Token::Comma)) {
            self.pos += 1;
            vars.push(self.ident()?);
        }
        Ok(Clause::Delete { detach, vars })
    }

    fn return_clause(&mut self) -> Result<Clause> {
        let distinct = self.eat_keyword("DISTINCT");
        let mut items = vec![self.projection()?];
        while matches!(self.peek(), Some(Token::Comma)) {
            self.pos += 1;
            items.push(self.projection()?);
        }
        let mut order_by = Vec::new();
        if self.eat_keyword("ORDER") {
            self.expect_keyword("BY")?;
            loop {
                let expr = self.expr()?;
                let descending = if self.eat_keyword("DESC") {
                    true
                } else {
                    self.eat_keyword("ASC");
                    false
                };
                order_by.push(OrderKey { expr, descending });
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        let limit = if self.eat_keyword("LIMIT") {
            match self.next() {
                Some(Token::Int(n)) if n >= 0 => Some(n as u64),
                Some(tok) => return Err(syntax(format!("LIMIT expects an integer, found `{tok}`"))),
                None => return Err(syntax("LIMIT expects an integer")),
            }
        } else {
            None
        };
        Ok(Clause::Return(ReturnClause {
            distinct,
            items,
            order_by,
            limit,
        }))
    }

    fn projection(&mut self) -> Result<Projection> {
        let expr = self.expr()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.ident()?)
        } else {
            None
        };
        Ok(Projection { expr, alias })
    }

    // ---- patterns ----

    fn path_pattern(&mut self) -> Result<PathPattern> {
        let start = self.node_pattern()?;
        let mut hops = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Dash) => {
                    self.pos += 1;
                    let (var, type_name) = self.rel_body()?;
                    self.eat(&Token::ArrowRight)?;
                    let node = self.node_pattern()?;
                    hops.push((
                        RelPattern {
                            var,
                            type_name,
                            direction: Direction::Out,
                        },
                        node,
                    ));
                }
                Some(Token::ArrowLeft) => {
                    self.pos += 1;
                    let (var, type_name) = self.rel_body()?;
                    self.eat(&Token::Dash)?;
                    let node = self.node_pattern()?;
                    hops.push((
                        RelPattern {
                            var,
                            type_name,
                            direction: Direction::In,
                        },
                        node,
                    ));
                }
                _ => break,
            }
        }
        Ok(PathPattern { start, hops })
    }

    fn rel_body(&mut self) -> Result<(Option<String>, Option<String>)> {
        self.eat(&Token::LBracket)?;
        let var = if let Some(Token::Ident(_)) = self.peek() {
            Some(self.ident()?)
        } else {
            None
        };
        let type_name = if matches!(self.peek(), Some(Token::Colon)) {
            self.pos += 1;
            Some(self.ident()?)
        } else {
            None
        };
        self.eat(&Token::RBracket)?;
        Ok((var, type_name))
    }

    fn node_pattern(&mut self) -> Result<NodePattern> {
        self.eat(&Token::LParen)?;
        let var = if let Some(Token::Ident(_)) = self.peek() {
            Some(self.ident()?)
        } else {
            None
        };
        let label = if matches!(self.peek(), Some(Token::Colon)) {
            self.pos += 1;
            Some(self.ident()?)
        } else {
            None
        };
        let mut props = Vec::new();
        if matches!(self.peek(), Some(Token::LBrace)) {
            self.pos += 1;
            loop {
                let key = self.ident()?;
                self.eat(&Token::Colon)?;
                props.push((key, self.expr()?));
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            self.eat(&Token::RBrace)?;
        }
        self.eat(&Token::RParen)?;
        Ok(NodePattern { var, label, props })
    }

    // ---- expressions ----

    fn expr(&mut self) -> Result<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.eat_keyword("OR") {
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.not_expr()?;
        while self.eat_keyword("AND") {
            let rhs = self.not_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat_keyword("NOT") {
            let inner = self.not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let lhs = self.primary()?;
        if self.eat_keyword("CONTAINS") {
            let rhs = self.primary()?;
            return Ok(Expr::Contains(Box::new(lhs), Box::new(rhs)));
        }
        if self.eat_keyword("IS") {
            let negated = self.eat_keyword("NOT");
            self.expect_keyword("NULL")?;
            return Ok(Expr::IsNull {
                expr: Box::new(lhs),
                negated,
            });
        }
        let op = match self.peek() {
            Some(Token::Eq) => Some(CmpOp::Eq),
            Some(Token::Ne) => Some(CmpOp::Ne),
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Le) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::Ge) => Some(CmpOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let rhs = self.primary()?;
            return Ok(Expr::Cmp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Param(name)) => {
                self.pos += 1;
                Ok(Expr::Param(name))
            }
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::String(s)))
            }
            Some(Token::Int(i)) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::Int(i)))
            }
            Some(Token::Float(v)) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::Float(v)))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.eat(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(word)) => {
                if word.eq_ignore_ascii_case("TRUE") {
                    self.pos += 1;
                    return Ok(Expr::Literal(Value::Bool(true)));
                }
                if word.eq_ignore_ascii_case("FALSE") {
                    self.pos += 1;
                    return Ok(Expr::Literal(Value::Bool(false)));
                }
                if word.eq_ignore_ascii_case("NULL") {
                    self.pos += 1;
                    return Ok(Expr::Literal(Value::Null));
                }
                if self.tokens.get(self.pos + 1) == Some(&Token::LParen) {
                    return self.function_call(&word);
                }
                self.pos += 1;
                if matches!(self.peek(), Some(Token::Dot)) {
                    self.pos += 1;
                    let key = self.ident()?;
                    return Ok(Expr::Property(word, key));
                }
                Ok(Expr::Var(word))
            }
            Some(tok) => Err(syntax(format!("expected an expression, found `{tok}`"))),
            None => Err(syntax("expected an expression, found end of input")),
        }
    }

    fn function_call(&mut self, name: &str) -> Result<Expr> {
        self.pos += 1; // function name
        self.eat(&Token::LParen)?;
        if name.eq_ignore_ascii_case("count") {
            if matches!(self.peek(), Some(Token::Star)) {
                self.pos += 1;
                self.eat(&Token::RParen)?;
                return Ok(Expr::CountStar);
            }
            let distinct = self.eat_keyword("DISTINCT");
            let inner = self.expr()?;
            self.eat(&Token::RParen)?;
            return Ok(Expr::Count {
                distinct,
                expr: Box::new(inner),
            });
        }
        if name.eq_ignore_ascii_case("collect") {
            let distinct = self.eat_keyword("DISTINCT");
            let inner = self.expr()?;
            self.eat(&Token::RParen)?;
            return Ok(Expr::Collect {
                distinct,
                expr: Box::new(inner),
            });
        }
        if name.eq_ignore_ascii_case("toLower") {
            let inner = self.expr()?;
            self.eat(&Token::RParen)?;
            return Ok(Expr::Lower(Box::new(inner)));
        }
        if name.eq_ignore_ascii_case("toUpper") {
            let inner = self.expr()?;
            self.eat(&Token::RParen)?;
            return Ok(Expr::Upper(Box::new(inner)));
        }
        Err(syntax(format!("unknown function `{name}`")))
    }
}
