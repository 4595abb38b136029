//! Parser for ad-hoc type expressions such as `map[string][]*pkg.Record`.
//!
//! Grammar:
//!
//! ```text
//! expr    := type literal?
//! type    := '*' type | '[' ']' type | '[' SIZE ']' type
//!          | 'map' '[' type ']' type
//!          | 'chan' type | 'chan' '<-' type | '<-' 'chan' type
//!          | NAME
//! NAME    := ident | qualifier '.' ident
//! literal := '(' zero ')' | '{' '}'
//! ```
//!
//! A qualifier is a module identifier or a full module path. A non-empty
//! literal is only accepted on an alias, and must spell the zero value of the
//! alias target, e.g. `Count(0)` or `Label("")`.

use std::sync::Arc;

use logos::Logos;

use crate::module::Module;
use crate::registry::Registry;
use crate::types::{ChanDir, TypeId};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token<'a> {
    #[token("*")]
    Star,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<-")]
    Arrow,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,
    #[regex("[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Size(usize),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*([./\-][A-Za-z0-9_][A-Za-z0-9_\-]*)*", |lex| lex.slice())]
    Name(&'a str),
}

struct TypeParser<'r, 'a> {
    registry: &'r Registry,
    context: Option<Arc<Module>>,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TypeParser<'_, 'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn expect(&mut self, expected: Token<'a>) -> Option<()> {
        (self.next()? == expected).then_some(())
    }

    fn parse_type(&mut self) -> Option<TypeId> {
        match self.next()? {
            Token::Star => Some(self.registry.pointer_to(self.parse_type()?)),
            Token::LBracket => match self.next()? {
                Token::RBracket => Some(self.registry.slice_of(self.parse_type()?)),
                Token::Size(size) => {
                    self.expect(Token::RBracket)?;
                    Some(self.registry.array_of(self.parse_type()?, size))
                }
                _ => None,
            },
            Token::Map => {
                self.expect(Token::LBracket)?;
                let key = self.parse_type()?;
                self.expect(Token::RBracket)?;
                let value = self.parse_type()?;
                Some(self.registry.map_of(key, value))
            }
            Token::Chan => {
                let dir = if self.peek() == Some(Token::Arrow) {
                    self.pos += 1;
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Some(self.registry.chan_of(self.parse_type()?, dir))
            }
            Token::Arrow => {
                self.expect(Token::Chan)?;
                Some(self.registry.chan_of(self.parse_type()?, ChanDir::Recv))
            }
            Token::Name(name) => self.lookup(name),
            Token::RBracket | Token::Size(_) => None,
        }
    }

    fn lookup(&self, name: &str) -> Option<TypeId> {
        let Some((qualifier, ident)) = name.rsplit_once('.') else {
            return self
                .context
                .as_ref()
                .and_then(|module| module.get_type(name))
                .or_else(|| self.registry.builtin()?.get_type(name));
        };
        self.qualified_module(qualifier)?.get_type(ident)
    }

    fn qualified_module(&self, qualifier: &str) -> Option<Arc<Module>> {
        if let Some(context) = &self.context {
            if context.path() == qualifier || context.identifier() == qualifier {
                return Some(Arc::clone(context));
            }
        }
        if qualifier.contains('/') {
            return self.registry.read(qualifier);
        }
        self.registry
            .module_by_identifier(qualifier)
            .or_else(|| self.registry.read(qualifier))
    }
}

impl Registry {
    /// Resolves a type expression, with unqualified names looked up in
    /// `context` (a module path) before the predeclared types.
    pub fn type_of(&self, expr: &str, context: Option<&str>) -> Option<TypeId> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }
        let (type_src, literal) = match expr.find(['(', '{']) {
            Some(pos) => (&expr[..pos], Some(&expr[pos..])),
            None => (expr, None),
        };

        let tokens = Token::lexer(type_src)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        let mut parser = TypeParser {
            registry: self,
            context: context.and_then(|path| self.read(path)),
            tokens,
            pos: 0,
        };
        let ty = parser.parse_type()?;
        if parser.pos != parser.tokens.len() {
            return None;
        }

        match literal {
            Some(literal) if !self.accepts_literal(ty, literal, context) => None,
            _ => Some(ty),
        }
    }

    fn accepts_literal(&self, ty: TypeId, literal: &str, context: Option<&str>) -> bool {
        let inner = match (literal.strip_prefix('('), literal.strip_prefix('{')) {
            (Some(rest), _) => rest.strip_suffix(')'),
            (_, Some(rest)) => rest.strip_suffix('}'),
            _ => None,
        };
        let Some(inner) = inner.map(str::trim) else {
            return false;
        };
        if inner.is_empty() {
            return true;
        }
        match self.alias(ty).and_then(|alias| alias.target) {
            Some(target) => self.zero(target, true, context) == inner,
            None => false,
        }
    }
}
