use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token<'a> {
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*")]
    LineComment(&'a str),
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment(&'a str),

    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("type")]
    Type,
    #[token("func")]
    Func,
    #[token("const")]
    Const,
    #[token("var")]
    Var,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'a str),

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    Float(&'a str),
    #[regex(r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*")]
    Int(&'a str),
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String(&'a str),
    #[regex(r"`[^`]*`")]
    RawString(&'a str),
    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char(&'a str),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("<-")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    // Only seen inside skipped function bodies.
    #[regex(r":=|==|!=|<=|>=|&&|\|\||\+\+|--|[-+*/%&|^]=|<<=|>>=|&\^|[<>:]")]
    Operator(&'a str),

    /// Anything the lexer does not recognize.
    Unknown,
}

/// A significant token with the doc comment written directly above it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub doc: Option<String>,
    pub line: usize,
}

fn comment_text(token: Token<'_>) -> Option<String> {
    match token {
        Token::LineComment(text) => {
            let text = &text[2..];
            Some(text.strip_prefix(' ').unwrap_or(text).trim_end().to_string())
        }
        Token::BlockComment(text) => Some(text[2..text.len() - 2].trim().to_string()),
        _ => None,
    }
}

/// Lexes `source`, folding comments into the doc of the next token.
///
/// A comment group is a doc when it ends on the line right above the token.
/// Comments following code on the same line are dropped.
pub fn tokenize(source: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut group: Vec<String> = Vec::new();
    let mut newlines_after_group = 0;
    let mut line_has_token = false;
    let mut line = 1;
    let mut offset = 0;

    for (token, span) in Token::lexer(source).spanned() {
        line += source[offset..span.start].matches('\n').count();
        offset = span.start;
        let token = token.unwrap_or(Token::Unknown);

        if let Some(text) = comment_text(token) {
            if !line_has_token {
                if newlines_after_group > 1 {
                    group.clear();
                }
                group.push(text);
                newlines_after_group = 0;
            }
            continue;
        }

        if token == Token::Newline {
            line_has_token = false;
            newlines_after_group += 1;
            lexemes.push(Lexeme {
                token,
                doc: None,
                line,
            });
            continue;
        }

        let doc = (!group.is_empty() && newlines_after_group <= 1).then(|| group.join("\n"));
        group.clear();
        line_has_token = true;
        lexemes.push(Lexeme { token, doc, line });
    }
    lexemes
}
