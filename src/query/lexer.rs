use crate::query::error::{QueryErr, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // 정수 리터럴
    Numeric,
    // 예약어
    Keyword,
    // 구분자, 연산자
    Symbol,
    // 테이블, 컬럼 이름과 텍스트 값
    Identifier,
    // 컬럼 타입
    Type,
    // 테이블 엔진
    Engine,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Numeric => "number",
            TokenKind::Keyword => "keyword",
            TokenKind::Symbol => "symbol",
            TokenKind::Identifier => "identifier",
            TokenKind::Type => "type",
            TokenKind::Engine => "engine",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved words and symbols, grouped by the kind they classify as.
static RESERVED: LazyLock<HashMap<TokenKind, HashSet<&'static str>>> = LazyLock::new(|| {
    HashMap::from([
        (TokenKind::Type, HashSet::from(["int", "text"])),
        (
            TokenKind::Keyword,
            HashSet::from([
                "select", "from", "as", "table", "create", "insert", "into", "values", "show",
                "engine", "settings", "where", "order", "by", "and",
            ]),
        ),
        (
            TokenKind::Symbol,
            HashSet::from([";", "*", ",", "(", ")", "==", ">", "<"]),
        ),
        (TokenKind::Engine, HashSet::from(["linear", "column"])),
    ])
});

/// Returns true if `word` (already case-normalized) is reserved for `kind`.
pub fn is_reserved(kind: TokenKind, word: &str) -> bool {
    RESERVED.get(&kind).is_some_and(|words| words.contains(word))
}

/// Smallest classified unit of a request.
///
/// Equality only looks at the value and the kind; `position` is the byte
/// offset where the token starts in the request and is kept for error
/// reporting.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub position: usize,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.kind == other.kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
        Self::at(value, kind, 0)
    }

    pub fn at(value: impl Into<String>, kind: TokenKind, position: usize) -> Self {
        Token {
            value: value.into(),
            kind,
            position,
        }
    }

    pub fn ident(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::Identifier)
    }

    pub fn num(value: i64) -> Self {
        Self::new(value.to_string(), TokenKind::Numeric)
    }

    pub fn symbol(value: &str) -> Self {
        Self::new(value, TokenKind::Symbol)
    }

    pub fn keyword(value: &str) -> Self {
        Self::new(value, TokenKind::Keyword)
    }

    /// Classifies a raw fragment. Precedence: numeric, type, keyword, symbol,
    /// engine, and finally identifier which accepts anything non-empty.
    pub fn classify(fragment: &str, position: usize) -> Result<Token> {
        if fragment.is_empty() {
            return Err(QueryErr::UnsupportedToken {
                fragment: fragment.to_string(),
                position,
            });
        }
        if fragment.parse::<i64>().is_ok() {
            return Ok(Token::at(fragment, TokenKind::Numeric, position));
        }
        let lowered = fragment.to_lowercase();
        for kind in [TokenKind::Type, TokenKind::Keyword] {
            if is_reserved(kind, &lowered) {
                return Ok(Token::at(lowered, kind, position));
            }
        }
        if is_reserved(TokenKind::Symbol, fragment) {
            return Ok(Token::at(fragment, TokenKind::Symbol, position));
        }
        if is_reserved(TokenKind::Engine, &lowered) {
            return Ok(Token::at(lowered, TokenKind::Engine, position));
        }
        Ok(Token::at(fragment, TokenKind::Identifier, position))
    }
}

pub struct Lexer {
    // (byte offset, char)
    src: VecDeque<(usize, char)>,
    end: usize,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            src: src.char_indices().collect(),
            end: src.len(),
        }
    }

    fn finished(&self) -> bool {
        self.src.is_empty()
    }

    fn curr(&self) -> Option<char> {
        self.src.front().map(|&(_, ch)| ch)
    }

    fn peek(&self, step: usize) -> Option<char> {
        self.src.get(step).map(|&(_, ch)| ch)
    }

    fn offset(&self) -> usize {
        self.src.front().map_or(self.end, |&(pos, _)| pos)
    }

    fn walk(&mut self) -> Option<char> {
        self.src.pop_front().map(|(_, ch)| ch)
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.walk();
        }
    }

    fn at_separator(&self) -> bool {
        match self.curr() {
            Some(ch) if ch.is_whitespace() => true,
            Some(';' | '*' | ',' | '(' | ')' | '>' | '<') => true,
            Some('=') => self.peek(1) == Some('='),
            _ => false,
        }
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next(&mut self) -> Result<Option<Token>> {
        self.skip_ws();
        let start = self.offset();
        let Some(ch) = self.walk() else {
            return Ok(None);
        };
        let fragment = match ch {
            ';' | '*' | ',' | '(' | ')' | '>' | '<' => ch.to_string(),
            '=' if self.curr() == Some('=') => {
                self.walk();
                "==".to_string()
            }
            _ => {
                let mut out = String::from(ch);
                while !self.finished() && !self.at_separator() {
                    // ! `finished()`가 false이므로 안전함
                    if let Some(ch) = self.walk() {
                        out.push(ch);
                    }
                }
                out
            }
        };
        Token::classify(&fragment, start).map(Some)
    }
}

/// Splits `text` into classified tokens, dropping whitespace.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next()? {
        tokens.push(token);
    }
    Ok(tokens)
}
