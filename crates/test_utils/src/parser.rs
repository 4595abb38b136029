//! Recursive-descent parser for the declaration subset of fixture sources.
//!
//! Only what the package scope needs is parsed: imports, type, const and var
//! declarations, and function signatures. Function bodies are skipped.

use typegraph_frontend::syntax::{
    ArrayLen, BinaryOp, Decl, FieldSyntax, FuncDecl, FuncTypeExpr, GenDecl, ImportSpec,
    InterfaceElem, Spec, SyntaxFile, TypeExpr, TypeSpec, UnaryOp, ValueExpr, ValueSpec,
};
use typegraph_frontend::ChanFlags;

use crate::lexer::{tokenize, Lexeme, Token};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Parses one source file.
pub fn parse_file(name: &str, source: &str) -> Result<SyntaxFile, ParseError> {
    let mut parser = Parser {
        lexemes: tokenize(source),
        pos: 0,
    };
    parser.file(name)
}

fn starts_type(token: Token<'_>) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Star
            | Token::LParen
            | Token::LBrack
            | Token::Map
            | Token::Chan
            | Token::Arrow
            | Token::Func
            | Token::Struct
            | Token::Interface
    )
}

fn binary_op(token: Token<'_>) -> Option<(BinaryOp, u8)> {
    let op = match token {
        Token::Plus => (BinaryOp::Add, 4),
        Token::Minus => (BinaryOp::Sub, 4),
        Token::Pipe => (BinaryOp::Or, 4),
        Token::Caret => (BinaryOp::Xor, 4),
        Token::Star => (BinaryOp::Mul, 5),
        Token::Slash => (BinaryOp::Div, 5),
        Token::Shl => (BinaryOp::Shl, 5),
        Token::Shr => (BinaryOp::Shr, 5),
        Token::Amp => (BinaryOp::And, 5),
        _ => return None,
    };
    Some(op)
}

pub(crate) fn parse_int(literal: &str) -> Option<i128> {
    let digits = literal.replace('_', "");
    let (digits, radix) = match digits.get(..2) {
        Some("0x" | "0X") => (&digits[2..], 16),
        Some("0b" | "0B") => (&digits[2..], 2),
        Some("0o" | "0O") => (&digits[2..], 8),
        _ if digits.len() > 1 && digits.starts_with('0') => (&digits[1..], 8),
        _ => (digits.as_str(), 10),
    };
    i128::from_str_radix(digits, radix).ok()
}

/// Decodes an interpreted (`"..."`, `'...'`) or raw (`` `...` ``) literal.
pub(crate) fn unquote(literal: &str) -> Result<String, String> {
    let Some(first) = literal.chars().next() else {
        return Err("empty literal".to_string());
    };
    let inner = &literal[1..literal.len() - 1];
    if first == '`' {
        return Ok(inner.replace('\r', ""));
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('v') => '\u{b}',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.by_ref().take(width).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid escape \\{kind}{hex}"))?
            }
            Some(digit @ '0'..='7') => {
                let rest: String = chars.by_ref().take(2).collect();
                u32::from_str_radix(&format!("{digit}{rest}"), 8)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid octal escape \\{digit}{rest}"))?
            }
            other => return Err(format!("unknown escape \\{}", other.unwrap_or(' '))),
        };
        out.push(escaped);
    }
    Ok(out)
}

struct Parser<'a> {
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token<'a>> {
        self.lexemes.get(self.pos + offset).map(|lexeme| lexeme.token)
    }

    fn doc(&self) -> Option<String> {
        self.lexemes.get(self.pos).and_then(|lexeme| lexeme.doc.clone())
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: Token<'_>) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let line = self
            .lexemes
            .get(self.pos)
            .or_else(|| self.lexemes.last())
            .map_or(1, |lexeme| lexeme.line);
        ParseError {
            line,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => self.error(format!("expected {expected}, found {token:?}")),
            None => self.error(format!("expected {expected}, found end of file")),
        }
    }

    fn expect(&mut self, token: Token<'_>, expected: &str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn ident(&mut self) -> Result<&'a str, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(Token::Newline | Token::Semicolon)) {
            self.pos += 1;
        }
    }

    fn end_of_spec(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None | Some(Token::RParen | Token::RBrace) => Ok(()),
            Some(Token::Newline | Token::Semicolon) => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected("end of declaration")),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::String(literal) | Token::RawString(literal)) => {
                self.pos += 1;
                unquote(literal).map_err(|message| self.error(message))
            }
            _ => Err(self.unexpected("string literal")),
        }
    }

    fn file(&mut self, name: &str) -> Result<SyntaxFile, ParseError> {
        self.skip_newlines();
        self.expect(Token::Package, "package clause")?;
        let package = self.ident()?.to_string();
        self.end_of_spec()?;

        let mut file = SyntaxFile {
            name: name.to_string(),
            package,
            imports: Vec::new(),
            decls: Vec::new(),
        };
        loop {
            self.skip_newlines();
            match self.peek() {
                None => break,
                Some(Token::Import) => {
                    self.bump();
                    if self.eat(Token::LParen) {
                        loop {
                            self.skip_newlines();
                            if self.eat(Token::RParen) {
                                break;
                            }
                            file.imports.push(self.import_spec()?);
                            self.end_of_spec()?;
                        }
                    } else {
                        file.imports.push(self.import_spec()?);
                    }
                    self.end_of_spec()?;
                }
                Some(Token::Type | Token::Const | Token::Var) => {
                    let decl = self.gen_decl()?;
                    file.decls.push(Decl::Gen(decl));
                }
                Some(Token::Func) => {
                    let decl = self.func_decl()?;
                    file.decls.push(Decl::Func(decl));
                }
                Some(_) => return Err(self.unexpected("declaration")),
            }
        }
        Ok(file)
    }

    fn import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Some(name.to_string())
            }
            Some(Token::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        let path = self.string()?;
        Ok(ImportSpec { name, path })
    }

    fn gen_decl(&mut self) -> Result<GenDecl, ParseError> {
        let doc = self.doc();
        let keyword = self.bump();
        let mut specs = Vec::new();
        if self.eat(Token::LParen) {
            loop {
                self.skip_newlines();
                if self.eat(Token::RParen) {
                    break;
                }
                let doc = self.doc();
                specs.push(self.spec(keyword, doc)?);
                self.end_of_spec()?;
            }
        } else {
            specs.push(self.spec(keyword, None)?);
        }
        self.end_of_spec()?;
        Ok(GenDecl { doc, specs })
    }

    fn spec(&mut self, keyword: Option<Token<'a>>, doc: Option<String>) -> Result<Spec, ParseError> {
        if keyword == Some(Token::Type) {
            let name = self.ident()?.to_string();
            let assign = self.eat(Token::Eq);
            let ty = self.type_expr()?;
            return Ok(Spec::Type(TypeSpec {
                doc,
                name,
                assign,
                ty,
            }));
        }

        let mut names = vec![self.ident()?.to_string()];
        while self.eat(Token::Comma) {
            names.push(self.ident()?.to_string());
        }
        let ty = match self.peek() {
            Some(token) if token != Token::Eq && starts_type(token) => Some(self.type_expr()?),
            _ => None,
        };
        let mut values = Vec::new();
        if self.eat(Token::Eq) {
            values.push(self.expr()?);
            while self.eat(Token::Comma) {
                self.skip_newlines();
                values.push(self.expr()?);
            }
        }
        Ok(Spec::Value(ValueSpec {
            doc,
            names,
            constant: keyword == Some(Token::Const),
            ty,
            values,
        }))
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let doc = self.doc();
        self.expect(Token::Func, "func")?;

        let receiver = if self.eat(Token::LParen) {
            let names = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(name)), Some(next)) if next != Token::RParen && next != Token::Dot => {
                    self.pos += 1;
                    vec![name.to_string()]
                }
                _ => Vec::new(),
            };
            let ty = self.type_expr()?;
            self.expect(Token::RParen, "`)` after receiver")?;
            Some(FieldSyntax {
                doc: None,
                names,
                ty,
                tag: None,
            })
        } else {
            None
        };

        let name = self.ident()?.to_string();
        let signature = self.signature()?;
        if self.peek() == Some(Token::LBrace) {
            self.skip_block()?;
        }
        self.end_of_spec()?;
        Ok(FuncDecl {
            doc,
            receiver,
            name,
            signature,
        })
    }

    fn skip_block(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LBrace, "`{`")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some(Token::LBrace) => depth += 1,
                Some(Token::RBrace) => depth -= 1,
                Some(_) => {}
                None => return Err(self.error("unterminated block")),
            }
        }
        Ok(())
    }

    fn signature(&mut self) -> Result<FuncTypeExpr, ParseError> {
        let params = self.params()?;
        let results = match self.peek() {
            Some(Token::LParen) => self.params()?,
            Some(token) if starts_type(token) => vec![FieldSyntax {
                doc: None,
                names: Vec::new(),
                ty: self.type_expr()?,
                tag: None,
            }],
            _ => Vec::new(),
        };
        Ok(FuncTypeExpr { params, results })
    }

    fn param_type(&mut self) -> Result<TypeExpr, ParseError> {
        if self.eat(Token::Ellipsis) {
            Ok(TypeExpr::Ellipsis(Box::new(self.type_expr()?)))
        } else {
            self.type_expr()
        }
    }

    /// `(a, b int, c string)` and `(int, string)` alike.
    fn params(&mut self) -> Result<Vec<FieldSyntax>, ParseError> {
        self.expect(Token::LParen, "`(`")?;
        let mut entries: Vec<(Option<String>, TypeExpr)> = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(Token::RParen) {
                break;
            }
            let first = self.param_type()?;
            let named = self
                .peek()
                .is_some_and(|token| token == Token::Ellipsis || starts_type(token));
            if named {
                let TypeExpr::Ident(name) = first else {
                    return Err(self.error("expected parameter name"));
                };
                entries.push((Some(name), self.param_type()?));
            } else {
                entries.push((None, first));
            }
            self.skip_newlines();
            if !self.eat(Token::Comma) {
                self.expect(Token::RParen, "`)`")?;
                break;
            }
        }

        if entries.iter().all(|(name, _)| name.is_none()) {
            return Ok(entries
                .into_iter()
                .map(|(_, ty)| FieldSyntax {
                    doc: None,
                    names: Vec::new(),
                    ty,
                    tag: None,
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for (name, ty) in entries {
            match (name, ty) {
                (Some(name), ty) => {
                    pending.push(name);
                    fields.push(FieldSyntax {
                        doc: None,
                        names: std::mem::take(&mut pending),
                        ty,
                        tag: None,
                    });
                }
                (None, TypeExpr::Ident(name)) => pending.push(name),
                (None, _) => return Err(self.error("mixed named and unnamed parameters")),
            }
        }
        if !pending.is_empty() {
            return Err(self.error("mixed named and unnamed parameters"));
        }
        Ok(fields)
    }

    fn type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let Some(token) = self.bump() else {
            return Err(self.unexpected("type"));
        };
        let ty = match token {
            Token::Ident(name) => {
                if self.eat(Token::Dot) {
                    TypeExpr::Selector {
                        module: name.to_string(),
                        name: self.ident()?.to_string(),
                    }
                } else {
                    TypeExpr::Ident(name.to_string())
                }
            }
            Token::Star => TypeExpr::Star(Box::new(self.type_expr()?)),
            Token::LParen => {
                let inner = self.type_expr()?;
                self.expect(Token::RParen, "`)`")?;
                TypeExpr::Paren(Box::new(inner))
            }
            Token::LBrack => {
                let len = match self.bump() {
                    Some(Token::RBrack) => None,
                    Some(Token::Int(literal)) => {
                        let len = parse_int(literal)
                            .and_then(|len| u64::try_from(len).ok())
                            .ok_or_else(|| self.error(format!("invalid array length {literal}")))?;
                        Some(ArrayLen::Literal(len))
                    }
                    Some(Token::Ident(name)) => Some(ArrayLen::Ident(name.to_string())),
                    Some(Token::Ellipsis) => Some(ArrayLen::Ellipsis),
                    _ => return Err(self.error("expected array length")),
                };
                if len.is_some() {
                    self.expect(Token::RBrack, "`]`")?;
                }
                TypeExpr::Array {
                    len,
                    elem: Box::new(self.type_expr()?),
                }
            }
            Token::Map => {
                self.expect(Token::LBrack, "`[`")?;
                let key = self.type_expr()?;
                self.expect(Token::RBrack, "`]`")?;
                TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.type_expr()?),
                }
            }
            Token::Chan => {
                let dir = if self.eat(Token::Arrow) {
                    ChanFlags::SEND
                } else {
                    ChanFlags::BOTH
                };
                TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.type_expr()?),
                }
            }
            Token::Arrow => {
                self.expect(Token::Chan, "chan")?;
                TypeExpr::Chan {
                    dir: ChanFlags::RECV,
                    elem: Box::new(self.type_expr()?),
                }
            }
            Token::Func => TypeExpr::Func(self.signature()?),
            Token::Struct => TypeExpr::Struct(self.fields()?),
            Token::Interface => TypeExpr::Interface(self.interface_elems()?),
            other => {
                self.pos -= 1;
                return Err(self.error(format!("expected type, found {other:?}")));
            }
        };
        Ok(ty)
    }

    fn end_of_member(&mut self) -> Result<(), ParseError> {
        if self.peek() == Some(Token::RBrace) {
            return Ok(());
        }
        match self.bump() {
            Some(Token::Newline | Token::Semicolon) => Ok(()),
            _ => {
                self.pos -= 1;
                Err(self.unexpected("end of member"))
            }
        }
    }

    fn fields(&mut self) -> Result<Vec<FieldSyntax>, ParseError> {
        self.expect(Token::LBrace, "`{`")?;
        let mut fields = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(Token::RBrace) {
                break;
            }
            let doc = self.doc();
            let embedded = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Star), _) | (Some(Token::Ident(_)), Some(Token::Dot)) => true,
                (Some(Token::Ident(_)), next) => matches!(
                    next,
                    None | Some(
                        Token::Newline
                            | Token::Semicolon
                            | Token::RBrace
                            | Token::String(_)
                            | Token::RawString(_)
                    )
                ),
                _ => false,
            };
            let mut names = Vec::new();
            if !embedded {
                names.push(self.ident()?.to_string());
                while self.eat(Token::Comma) {
                    names.push(self.ident()?.to_string());
                }
            }
            let ty = self.type_expr()?;
            let tag = match self.peek() {
                Some(Token::String(_) | Token::RawString(_)) => Some(self.string()?),
                _ => None,
            };
            fields.push(FieldSyntax {
                doc,
                names,
                ty,
                tag,
            });
            self.end_of_member()?;
        }
        Ok(fields)
    }

    fn interface_elems(&mut self) -> Result<Vec<InterfaceElem>, ParseError> {
        self.expect(Token::LBrace, "`{`")?;
        let mut elems = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(Token::RBrace) {
                break;
            }
            let doc = self.doc();
            let elem = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(name)), Some(Token::LParen)) => {
                    self.pos += 1;
                    InterfaceElem::Method {
                        doc,
                        name: name.to_string(),
                        signature: self.signature()?,
                    }
                }
                _ => InterfaceElem::Embedded {
                    doc,
                    ty: self.type_expr()?,
                },
            };
            elems.push(elem);
            self.end_of_member()?;
        }
        Ok(elems)
    }

    fn expr(&mut self) -> Result<ValueExpr, ParseError> {
        self.binary(1)
    }

    fn binary(&mut self, min: u8) -> Result<ValueExpr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some((op, prec)) = self.peek().and_then(binary_op) {
            if prec < min {
                break;
            }
            self.pos += 1;
            self.skip_newlines();
            let rhs = self.binary(prec + 1)?;
            lhs = ValueExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<ValueExpr, ParseError> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Amp) => UnaryOp::Ref,
            Some(Token::Plus) => {
                self.pos += 1;
                return self.unary();
            }
            _ => return self.primary(),
        };
        self.pos += 1;
        Ok(ValueExpr::Unary {
            op,
            expr: Box::new(self.unary()?),
        })
    }

    fn primary(&mut self) -> Result<ValueExpr, ParseError> {
        let value = match self.peek() {
            Some(Token::Int(literal)) => {
                self.pos += 1;
                let value = parse_int(literal)
                    .ok_or_else(|| self.error(format!("invalid integer {literal}")))?;
                ValueExpr::Int(value)
            }
            Some(Token::Float(literal)) => {
                self.pos += 1;
                let value = literal
                    .parse()
                    .map_err(|_| self.error(format!("invalid float {literal}")))?;
                ValueExpr::Float(value)
            }
            Some(Token::String(_) | Token::RawString(_)) => ValueExpr::String(self.string()?),
            Some(Token::Char(literal)) => {
                self.pos += 1;
                let decoded = unquote(literal).map_err(|message| self.error(message))?;
                let mut chars = decoded.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => ValueExpr::Char(c),
                    _ => return Err(self.error(format!("invalid rune literal {literal}"))),
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                self.skip_newlines();
                let inner = self.expr()?;
                self.skip_newlines();
                self.expect(Token::RParen, "`)`")?;
                ValueExpr::Paren(Box::new(inner))
            }
            Some(Token::Ident(_)) => {
                let ty = self.type_expr()?;
                match self.peek() {
                    Some(Token::LParen | Token::LBrace) => self.operand_suffix(ty)?,
                    _ => match ty {
                        TypeExpr::Ident(name) => ValueExpr::Ident(name),
                        TypeExpr::Selector { module, name } => ValueExpr::Selector { module, name },
                        _ => return Err(self.error("expected operand")),
                    },
                }
            }
            Some(Token::LBrack | Token::Map | Token::Struct | Token::Func | Token::Chan) => {
                let ty = self.type_expr()?;
                self.operand_suffix(ty)?
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(value)
    }

    /// `T(args)` or `T{...}` after a type operand.
    fn operand_suffix(&mut self, callee: TypeExpr) -> Result<ValueExpr, ParseError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                let mut args = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.eat(Token::RParen) {
                        break;
                    }
                    args.push(self.expr()?);
                    self.skip_newlines();
                    if !self.eat(Token::Comma) {
                        self.expect(Token::RParen, "`)`")?;
                        break;
                    }
                }
                Ok(ValueExpr::Call { callee, args })
            }
            Some(Token::LBrace) => {
                self.skip_block()?;
                Ok(ValueExpr::Composite(callee))
            }
            _ => Err(self.unexpected("`(` or `{`")),
        }
    }
}
