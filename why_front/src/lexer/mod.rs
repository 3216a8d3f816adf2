//! Lexical analysis.
//!
//! The tokenizer sits a layer below the parser, recovery engine and
//! optimizer, giving them something real to run against in tests and in
//! the `wfc` driver binary. The scanner is a plain longest-match,
//! byte/char scan -- no regex crate, no derive macro -- covering the
//! full keyword/punctuation/operator surface.

mod span;
mod token;

pub use span::{render_snippet, Position, Span};
pub use token::{contextual_follow_set, Token, TokenKind};

use std::{error::Error, fmt, rc::Rc};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LexError {
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

/// The contract the parser consumes: lazily yields tokens, keeps
/// returning EOF once exhausted, and exposes kind/text/position for
/// every token including trivia.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;
}

/// A `TokenSource` over an already-scanned token vector. `Lexer::lex`
/// always produces one of these; it is the only concrete `TokenSource`
/// this crate ships.
pub struct SliceTokenSource {
    tokens: Vec<Token>,
    index: usize,
    eof: Token,
}

impl SliceTokenSource {
    pub fn new(tokens: Vec<Token>, eof: Token) -> Self {
        SliceTokenSource {
            tokens,
            index: 0,
            eof,
        }
    }
}

impl TokenSource for SliceTokenSource {
    fn next_token(&mut self) -> Token {
        let tok = self
            .tokens
            .get(self.index)
            .cloned()
            .unwrap_or_else(|| self.eof.clone());
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        tok
    }
}

struct Scanner<'a> {
    file: Rc<str>,
    chars: Vec<char>,
    source: &'a str,
    pos: usize,
    byte_offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, file: impl Into<Rc<str>>) -> Self {
        Scanner {
            file: file.into(),
            chars: source.chars().collect(),
            source,
            pos: 0,
            byte_offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> Position {
        Position {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
            byte_offset: self.byte_offset,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.byte_offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut offset = 0;
        for expected in s.chars() {
            match self.peek_at(offset) {
                Some(c) if c == expected => offset += 1,
                _ => return false,
            }
        }
        true
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }
}

pub struct Lexer<'a> {
    scanner: Scanner<'a>,
}

/// Longest-to-shortest multi-character punctuation/operator table. Checked
/// in order so `**=` is tried before `**`, which is tried before `*`.
const SYMBOLS: &[(&str, TokenKind)] = &[
    ("..=", TokenKind::DotDotEq),
    ("**=", TokenKind::StarStarEq),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    ("::", TokenKind::ColonColon),
    ("->", TokenKind::Arrow),
    ("=>", TokenKind::FatArrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("**", TokenKind::StarStar),
    ("..", TokenKind::DotDot),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("::", TokenKind::ColonColon),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
    ("?", TokenKind::Question),
    ("#", TokenKind::Hash),
    ("@", TokenKind::At),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Assign),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
];

fn keyword_or_ident(ident: &str) -> TokenKind {
    use TokenKind::*;
    match ident {
        "func" => Func,
        "fn" => Fn,
        "let" => Let,
        "var" => Var,
        "const" => Const,
        "mut" => Mut,
        "pub" => Pub,
        "async" => Async,
        "await" => Await,
        "return" => Return,
        "if" => If,
        "else" => Else,
        "while" => While,
        "loop" => Loop,
        "for" => For,
        "in" => In,
        "match" => Match,
        "break" => Break,
        "continue" => Continue,
        "defer" => Defer,
        "struct" => Struct,
        "enum" => Enum,
        "trait" => Trait,
        "impl" => Impl,
        "where" => Where,
        "type" => Type,
        "newtype" => Newtype,
        "import" => Import,
        "export" => Export,
        "as" => As,
        "macro" => Macro,
        "effect" => Effect,
        "effects" => Effects,
        "true" => Bool(true),
        "false" => Bool(false),
        "null" => Null,
        "unsafe" => Unsafe,
        "error" => Error,
        "_" => Underscore,
        other => Ident(other.to_string()),
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_file(source, "<input>")
    }

    pub fn with_file(source: &'a str, file: impl Into<Rc<str>>) -> Self {
        Lexer {
            scanner: Scanner::new(source, file),
        }
    }

    /// Scans the whole input eagerly and returns every token including
    /// trivia.
    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = vec![];
        loop {
            let start = self.scanner.position();
            let Some(c) = self.scanner.peek() else {
                break;
            };

            if c == '\n' {
                self.scanner.bump();
                tokens.push(Token::new(TokenKind::Newline, "\n", self.span_from(start)));
                continue;
            }
            if c.is_whitespace() {
                let text = self.scanner.eat_while(|c| c.is_whitespace() && c != '\n');
                tokens.push(Token::new(TokenKind::Whitespace, text, self.span_from(start)));
                continue;
            }
            if self.scanner.starts_with("//") {
                let text = self.scanner.eat_while(|c| c != '\n');
                tokens.push(Token::new(TokenKind::LineComment, text, self.span_from(start)));
                continue;
            }
            if self.scanner.starts_with("/*") {
                self.lex_block_comment(&mut tokens, start)?;
                continue;
            }
            if c == '"' {
                self.lex_string(&mut tokens, start)?;
                continue;
            }
            if self.scanner.starts_with("r\"") {
                self.lex_raw_string(&mut tokens, start)?;
                continue;
            }
            if self.scanner.starts_with("f\"") {
                self.lex_template_string(&mut tokens, start)?;
                continue;
            }
            if c == '\'' {
                self.lex_char(&mut tokens, start)?;
                continue;
            }
            if c.is_ascii_digit() {
                self.lex_number(&mut tokens, start)?;
                continue;
            }
            if c.is_alphabetic() || c == '_' {
                let ident = self.scanner.eat_while(|c| c.is_alphanumeric() || c == '_');
                let kind = keyword_or_ident(&ident);
                tokens.push(Token::new(kind, ident, self.span_from(start)));
                continue;
            }

            if let Some((lexeme, kind)) = SYMBOLS
                .iter()
                .find(|(lexeme, _)| self.scanner.starts_with(lexeme))
            {
                self.scanner.bump_n(lexeme.chars().count());
                tokens.push(Token::new(kind.clone(), *lexeme, self.span_from(start)));
                continue;
            }

            return Err(LexError {
                message: format!(
                    "unexpected character {c:?} at {}",
                    self.scanner.position()
                ),
            });
        }

        let eof_pos = self.scanner.position();
        tokens.push(Token::new(
            TokenKind::Eof,
            "",
            Span::new(eof_pos.clone(), eof_pos),
        ));

        Ok(tokens)
    }

    /// Convenience for tests, the CLI, and the parser: scans and drops
    /// whitespace/comment trivia, but keeps `Newline` tokens. The cursor
    /// consumes this stream and folds each `Newline` into a per-token
    /// "preceded by a line break" flag (spec.md §4.2's "newlines are
    /// consulted only where the grammar treats them as statement
    /// terminators"), so callers downstream of the cursor never see a
    /// `Newline` token directly.
    pub fn lex_significant(self) -> LexResult<Vec<Token>> {
        Ok(self
            .lex()?
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment))
            .collect())
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.scanner.position())
    }

    fn lex_block_comment(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        self.scanner.bump_n(2);
        let mut depth = 1usize;
        let mut text = String::from("/*");
        while depth > 0 {
            if self.scanner.starts_with("*/") {
                self.scanner.bump_n(2);
                text.push_str("*/");
                depth -= 1;
                continue;
            }
            if self.scanner.starts_with("/*") {
                self.scanner.bump_n(2);
                text.push_str("/*");
                depth += 1;
                continue;
            }
            match self.scanner.bump() {
                Some(c) => text.push(c),
                None => {
                    return Err(LexError {
                        message: format!("unterminated block comment starting at {start}"),
                    })
                }
            }
        }
        tokens.push(Token::new(TokenKind::BlockComment, text, self.span_from(start)));
        Ok(())
    }

    fn lex_string(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        self.scanner.bump();
        let mut raw = String::new();
        loop {
            match self.scanner.bump() {
                Some('"') => break,
                Some('\\') => {
                    raw.push('\\');
                    if let Some(escaped) = self.scanner.bump() {
                        raw.push(escaped);
                    }
                }
                Some(c) => raw.push(c),
                None => {
                    return Err(LexError {
                        message: format!("unterminated string literal starting at {start}"),
                    })
                }
            }
        }
        let value = unescape::unescape(&raw).unwrap_or(raw);
        tokens.push(Token::new(TokenKind::Str(value), format!("\"{raw}\""), self.span_from(start)));
        Ok(())
    }

    fn lex_raw_string(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        self.scanner.bump_n(2);
        let mut raw = String::new();
        loop {
            match self.scanner.bump() {
                Some('"') => break,
                Some(c) => raw.push(c),
                None => {
                    return Err(LexError {
                        message: format!("unterminated raw string starting at {start}"),
                    })
                }
            }
        }
        tokens.push(Token::new(
            TokenKind::RawStr(raw.clone()),
            format!("r\"{raw}\""),
            self.span_from(start),
        ));
        Ok(())
    }

    /// Template strings are scanned as one opaque token holding the raw
    /// text between the quotes; splitting it into text/interpolation
    /// elements and recursively parsing each `${...}` fragment is the
    /// Pratt core's job, not the lexer's.
    fn lex_template_string(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        self.scanner.bump_n(2);
        let mut raw = String::new();
        let mut brace_depth = 0usize;
        loop {
            match self.scanner.peek() {
                Some('"') if brace_depth == 0 => {
                    self.scanner.bump();
                    break;
                }
                Some('$') if self.scanner.peek_at(1) == Some('{') => {
                    raw.push('$');
                    raw.push('{');
                    self.scanner.bump_n(2);
                    brace_depth += 1;
                }
                Some('{') if brace_depth > 0 => {
                    raw.push('{');
                    self.scanner.bump();
                    brace_depth += 1;
                }
                Some('}') if brace_depth > 0 => {
                    raw.push('}');
                    self.scanner.bump();
                    brace_depth -= 1;
                }
                Some(c) => {
                    raw.push(c);
                    self.scanner.bump();
                }
                None => {
                    return Err(LexError {
                        message: format!("unterminated template string starting at {start}"),
                    })
                }
            }
        }
        tokens.push(Token::new(
            TokenKind::TemplateStr(raw.clone()),
            format!("f\"{raw}\""),
            self.span_from(start),
        ));
        Ok(())
    }

    /// A leading `'` starts either a char literal (`'a'`) or a lifetime
    /// (`'a`). Disambiguated by one char of lookahead: a single
    /// ident-start char immediately followed by a closing `'` is a char
    /// literal; otherwise the whole ident run is a lifetime.
    fn lex_char(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        if self.scanner.peek_at(1).is_some_and(|c| c.is_alphabetic() || c == '_')
            && self.scanner.peek_at(2) != Some('\'')
        {
            self.scanner.bump();
            let name = self.scanner.eat_while(|c| c.is_alphanumeric() || c == '_');
            let text = format!("'{name}");
            tokens.push(Token::new(TokenKind::Lifetime(name), text, self.span_from(start)));
            return Ok(());
        }
        self.scanner.bump();
        let c = match self.scanner.bump() {
            Some('\\') => {
                let escaped = self.scanner.bump().ok_or_else(|| LexError {
                    message: format!("unterminated char literal starting at {start}"),
                })?;
                match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                }
            }
            Some(c) => c,
            None => {
                return Err(LexError {
                    message: format!("unterminated char literal starting at {start}"),
                })
            }
        };
        match self.scanner.bump() {
            Some('\'') => {}
            _ => {
                return Err(LexError {
                    message: format!("unterminated char literal starting at {start}"),
                })
            }
        }
        tokens.push(Token::new(TokenKind::Char(c), format!("'{c}'"), self.span_from(start)));
        Ok(())
    }

    fn lex_number(&mut self, tokens: &mut Vec<Token>, start: Position) -> LexResult<()> {
        // C-style base prefixes: 0x / 0o / 0b.
        if self.scanner.peek() == Some('0') {
            let base = match self.scanner.peek_at(1) {
                Some('x') | Some('X') => Some((16, |c: char| c.is_ascii_hexdigit())),
                Some('o') | Some('O') => Some((8, |c: char| ('0'..='7').contains(&c))),
                Some('b') | Some('B') => Some((2, |c: char| c == '0' || c == '1')),
                _ => None,
            };
            if let Some((radix, digit_pred)) = base {
                self.scanner.bump_n(2);
                let digits = self.scanner.eat_while(digit_pred);
                let value = i64::from_str_radix(&digits, radix).map_err(|e| LexError {
                    message: format!("invalid base-{radix} integer literal at {start}: {e}"),
                })?;
                tokens.push(Token::new(
                    TokenKind::Integer(value),
                    format!("0{}{digits}", if radix == 16 { "x" } else if radix == 8 { "o" } else { "b" }),
                    self.span_from(start),
                ));
                return Ok(());
            }
        }

        let int_part = self.scanner.eat_while(|c| c.is_ascii_digit());
        let is_float = self.scanner.peek() == Some('.')
            && self.scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit());

        if is_float {
            self.scanner.bump();
            let frac = self.scanner.eat_while(|c| c.is_ascii_digit());
            let text = format!("{int_part}.{frac}");
            let value: f64 = text.parse().map_err(|_| LexError {
                message: format!("invalid float literal '{text}' at {start}"),
            })?;
            tokens.push(Token::new(TokenKind::Float(value), text, self.span_from(start)));
        } else {
            let value: i64 = int_part.parse().map_err(|_| LexError {
                message: format!("invalid integer literal '{int_part}' at {start}"),
            })?;
            tokens.push(Token::new(TokenKind::Integer(value), int_part, self.span_from(start)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex_significant()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_let_binding() {
        assert_eq!(
            kinds("let x = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Integer(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_power_and_compound_assign() {
        assert_eq!(
            kinds("x **= 2;"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::StarStarEq,
                TokenKind::Integer(2),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_path_and_generics() {
        assert_eq!(
            kinds("a::b::<T>"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::ColonColon,
                TokenKind::Ident("b".into()),
                TokenKind::ColonColon,
                TokenKind::Lt,
                TokenKind::Ident("T".into()),
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_hex_octal_binary() {
        assert_eq!(kinds("0xFF;"), vec![TokenKind::Integer(255), TokenKind::Semicolon, TokenKind::Eof]);
        assert_eq!(kinds("0o17;"), vec![TokenKind::Integer(15), TokenKind::Semicolon, TokenKind::Eof]);
        assert_eq!(kinds("0b101;"), vec![TokenKind::Integer(5), TokenKind::Semicolon, TokenKind::Eof]);
    }

    #[test]
    fn keeps_trivia_when_requested() {
        let tokens = Lexer::new("let x\n").lex().unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Newline));
    }

    #[test]
    fn lexes_range_operators() {
        assert_eq!(
            kinds("0..5"),
            vec![TokenKind::Integer(0), TokenKind::DotDot, TokenKind::Integer(5), TokenKind::Eof]
        );
        assert_eq!(
            kinds("0..=5"),
            vec![TokenKind::Integer(0), TokenKind::DotDotEq, TokenKind::Integer(5), TokenKind::Eof]
        );
    }

    #[test]
    fn reports_unterminated_string() {
        assert!(Lexer::new("\"abc").lex().is_err());
    }
}
