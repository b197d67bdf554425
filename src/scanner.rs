use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use lazy_static::lazy_static;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::token::{Literal, Token, TokenType};

/// Stage tag attached to every diagnostic this module reports.
const STAGE: &str = "Scanner";

lazy_static! {
    /// Operator and punctuation lexemes, one or two characters each. Two
    /// character entries are tried first so `==` never lexes as `=` `=`.
    static ref OPERATORS: HashMap<&'static str, TokenType> = {
        let mut map = HashMap::new();
        map.insert("(", TokenType::LeftParen);
        map.insert(")", TokenType::RightParen);
        map.insert("{", TokenType::LeftBrace);
        map.insert("}", TokenType::RightBrace);
        map.insert(",", TokenType::Comma);
        map.insert(".", TokenType::Dot);
        map.insert("-", TokenType::Minus);
        map.insert("+", TokenType::Plus);
        map.insert(";", TokenType::Semicolon);
        map.insert("/", TokenType::Slash);
        map.insert("*", TokenType::Star);
        map.insert("!", TokenType::Bang);
        map.insert("=", TokenType::Equal);
        map.insert("<", TokenType::Less);
        map.insert(">", TokenType::Greater);
        map.insert("!=", TokenType::BangEqual);
        map.insert("==", TokenType::EqualEqual);
        map.insert("<=", TokenType::LessEqual);
        map.insert(">=", TokenType::GreaterEqual);
        map
    };

    /// Reserved words, matched against the full identifier lexeme only.
    static ref KEYWORDS: HashMap<&'static str, TokenType> = {
        let mut map = HashMap::new();
        map.insert("and", TokenType::And);
        map.insert("class", TokenType::Class);
        map.insert("else", TokenType::Else);
        map.insert("false", TokenType::False);
        map.insert("fun", TokenType::Fun);
        map.insert("for", TokenType::For);
        map.insert("if", TokenType::If);
        map.insert("nil", TokenType::Nil);
        map.insert("or", TokenType::Or);
        map.insert("print", TokenType::Print);
        map.insert("return", TokenType::Return);
        map.insert("super", TokenType::Super);
        map.insert("this", TokenType::This);
        map.insert("true", TokenType::True);
        map.insert("var", TokenType::Var);
        map.insert("while", TokenType::While);
        map
    };
}

/// public interface for tokenizing. One call scans one complete source
/// unit, end to end, and hands back everything it found: the full token
/// sequence (always ending in EOF) plus whatever diagnostics came up.
pub fn tokenize(source: &str) -> ScanOutcome {
    let mut scanner = Scanner::new(source);
    scanner.scan_tokens();
    ScanOutcome {
        tokens: scanner.tokens,
        diagnostics: scanner.diagnostics,
    }
}

#[derive(Debug, PartialEq)]
pub struct ScanOutcome {
    pub tokens: Vec<Token>,
    pub diagnostics: Diagnostics,
}

impl ScanOutcome {
    /// Callers should check this right after the scan: an erroring unit
    /// must not be handed to later stages.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("unexpected token: {character}")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("unterminated string literal")]
    UnterminatedString { line: usize },
    #[error("digit-group separator must be followed by a digit")]
    MisplacedSeparator { line: usize },
}

impl ScanError {
    fn line(&self) -> usize {
        match self {
            ScanError::UnexpectedCharacter { line, .. }
            | ScanError::UnterminatedString { line }
            | ScanError::MisplacedSeparator { line } => *line,
        }
    }
}

/// What the next piece of input is, decided from at most two characters
/// of lookahead. Each class maps to exactly one scanning rule.
enum CharClass {
    Comment,
    Whitespace,
    StringStart,
    Digit,
    IdentifierStart,
    // mapped type plus matched length in characters (maximal munch)
    Operator(TokenType, usize),
    Other,
}

struct Scanner<'a> {
    source: &'a str,
    char_iter: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    diagnostics: Diagnostics,

    // byte offset of the start of the lexeme being recognized
    start: usize,
    // byte offset of the next unconsumed character
    current: usize,
    line: usize,
    // line the current lexeme started on; differs from `line` only
    // inside multi-line strings
    start_line: usize,
}

impl Scanner<'_> {
    fn new(source: &str) -> Scanner {
        Scanner {
            source,
            char_iter: source.chars().peekable(),
            tokens: vec![],
            diagnostics: Diagnostics::new(),
            start: 0,
            current: 0,
            line: 1,
            start_line: 1,
        }
    }

    fn scan_tokens(&mut self) {
        loop {
            self.start = self.current;
            self.start_line = self.line;
            let Some(class) = self.classify() else { break };
            if let Err(error) = self.scan_token(class) {
                self.report(error);
            }
        }
        self.tokens.push(Token {
            r#type: TokenType::EOF,
            lexeme: "".to_string(),
            literal: None,
            line: self.line,
        });
    }

    /// One dispatch step. Every class consumes at least one character, so
    /// the outer loop always makes progress even on garbage input.
    fn scan_token(&mut self, class: CharClass) -> Result<(), ScanError> {
        match class {
            CharClass::Comment => self.skip_line_comment(),
            CharClass::Whitespace => {
                if self.advance() == '\n' {
                    self.line += 1;
                }
            }
            CharClass::Operator(token_type, length) => {
                for _ in 0..length {
                    self.advance();
                }
                self.add_token(token_type, None);
            }
            CharClass::StringStart => self.string(),
            CharClass::Digit => self.number(),
            CharClass::IdentifierStart => self.identifier(),
            CharClass::Other => {
                let character = self.advance();
                return Err(ScanError::UnexpectedCharacter {
                    line: self.line,
                    character,
                });
            }
        }
        Ok(())
    }

    /// Look at the cursor without consuming anything and decide which
    /// rule applies. None once the input is exhausted.
    fn classify(&mut self) -> Option<CharClass> {
        let &c = self.peek_one()?;
        let class = match c {
            '/' if self.peek_two() == Some('/') => CharClass::Comment,
            c if c.is_whitespace() => CharClass::Whitespace,
            '"' => CharClass::StringStart,
            c if is_digit(&c) => CharClass::Digit,
            c if is_alpha(&c) => CharClass::IdentifierStart,
            _ => match self.match_operator() {
                Some((token_type, length)) => CharClass::Operator(token_type, length),
                None => CharClass::Other,
            },
        };
        Some(class)
    }

    /// Maximal munch: the two-character lookahead is tried against the
    /// operator table before the one-character one.
    fn match_operator(&self) -> Option<(TokenType, usize)> {
        let rest = &self.source[self.current..];
        let mut chars = rest.chars();
        let first = chars.next()?;
        if let Some(second) = chars.next() {
            let pair = &rest[..first.len_utf8() + second.len_utf8()];
            if let Some(&token_type) = OPERATORS.get(pair) {
                return Some((token_type, 2));
            }
        }
        let single = &rest[..first.len_utf8()];
        OPERATORS.get(single).map(|&token_type| (token_type, 1))
    }

    fn advance(&mut self) -> char {
        // callers only advance after a successful peek
        let c = self
            .char_iter
            .next()
            .expect("advance called at end of input");
        self.current += c.len_utf8();
        c
    }

    /// 1 lookahead, without consuming.
    fn peek_one(&mut self) -> Option<&char> {
        self.char_iter.peek()
    }

    /// 2 lookahead. `current` always sits on a character boundary, so
    /// re-slicing the source here is safe.
    fn peek_two(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn add_token(&mut self, token_type: TokenType, literal: Option<Literal>) {
        let lexeme = self.source[self.start..self.current].to_string();
        self.tokens.push(Token {
            r#type: token_type,
            lexeme,
            literal,
            line: self.start_line,
        });
    }

    fn report(&mut self, error: ScanError) {
        self.diagnostics.error(error.line(), STAGE, error.to_string());
    }

    /// Skip to (but not past) the next newline, so the whitespace rule
    /// gets to count the line.
    fn skip_line_comment(&mut self) {
        while self.peek_one().is_some_and(|c| *c != '\n') {
            self.advance();
        }
    }

    /// Strings run to the closing quote and may span lines; there is no
    /// escape processing. End of input acts as an implicit closing quote:
    /// the error is reported where scanning stopped and a token is still
    /// emitted so consumers always see a complete sequence.
    fn string(&mut self) {
        self.advance(); // opening quote
        while let Some(&c) = self.peek_one() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        let value = match self.peek_one() {
            None => {
                self.report(ScanError::UnterminatedString { line: self.line });
                self.source[self.start + 1..self.current].to_string()
            }
            Some(_) => {
                self.advance(); // closing quote
                self.source[self.start + 1..self.current - 1].to_string()
            }
        };
        self.add_token(TokenType::String, Some(Literal::String(value)));
    }

    /// Integer part, then a fractional part only when the dot is followed
    /// by a digit, so `3.` leaves the dot for the next dispatch step. The
    /// decoded value is the lexeme with separators stripped, parsed as f64.
    fn number(&mut self) {
        self.advance(); // leading digit
        self.digit_run();

        if self.peek_one() == Some(&'.') && self.peek_two().is_some_and(|c| is_digit(&c)) {
            self.advance(); // the '.'
            self.digit_run();
        }

        let stripped: String = self.source[self.start..self.current]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let value: f64 = stripped.parse().expect("digit runs always parse");
        self.add_token(TokenType::Number, Some(Literal::Number(value)));
    }

    /// Maximal run of digits and digit-group separators. A separator must
    /// be followed by another digit; anything else is reported and the
    /// scan keeps going with whatever digits it has.
    fn digit_run(&mut self) {
        while let Some(&c) = self.peek_one() {
            match c {
                c if is_digit(&c) => {
                    self.advance();
                }
                '_' => {
                    if !self.peek_two().is_some_and(|next| is_digit(&next)) {
                        self.report(ScanError::MisplacedSeparator { line: self.line });
                    }
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn identifier(&mut self) {
        self.advance(); // leading alpha or underscore
        while self.peek_one().is_some_and(is_alphanumeric) {
            self.advance();
        }

        let lexeme = &self.source[self.start..self.current];
        // keywords only match the full lexeme, so `classify` stays an identifier
        let token_type = KEYWORDS
            .get(lexeme)
            .copied()
            .unwrap_or(TokenType::Identifier);
        self.add_token(token_type, None);
    }
}

fn is_digit(c: &char) -> bool {
    matches!(c, '0'..='9')
}

fn is_alpha(c: &char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_alphanumeric(c: &char) -> bool {
    is_digit(c) || is_alpha(c)
}
