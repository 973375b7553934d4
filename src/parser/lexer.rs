use std::{char, fmt, iter::Peekable, str::CharIndices};

use crate::parser::{SourcePosition, Spanning};

/// A single token in the input source
///
/// Value literals are resolved while scanning: numbers come out as numbers,
/// string literals with their escape sequences already applied. Punctuators
/// all share one variant since the grammar only ever asks "is the next token
/// this punctuator?".
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// A name or keyword, e.g. `query` or `hero`.
    Name(&'a str),
    /// An integer literal.
    Int(i32),
    /// A floating point literal.
    Float(f64),
    /// A string literal, unquoted and unescaped.
    String(String),
    /// One of the single-character punctuators `! $ ( ) [ ] { } : = @ |`.
    Punct(char),
    /// The `...` spread punctuator.
    Spread,
    /// The end of the input source.
    Eof,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Punct(c) => write!(f, "{c}"),
            Self::Spread => f.write_str("..."),
            Self::Eof => f.write_str("End of file"),
        }
    }
}

/// Error while tokenizing the input source
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LexerError {
    /// A character that cannot occur anywhere in a GraphQL document.
    UnknownCharacter(char),

    /// A character that exists in the language, but not at this position.
    UnexpectedCharacter(char),

    /// A string literal without a closing quote, or one interrupted by a line
    /// break.
    UnterminatedString,

    /// A control character inside a string literal.
    UnknownCharacterInString(char),

    /// An escape sequence other than `\" \\ \/ \b \f \n \r \t \uXXXX`.
    UnknownEscapeSequence(String),

    /// The source ended in the middle of a token.
    UnexpectedEndOfFile,

    /// A number literal that does not fit the numeric types, or carries a
    /// leading zero.
    InvalidNumber,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCharacter(c) => write!(f, "Unknown character \"{c}\""),
            Self::UnexpectedCharacter(c) => write!(f, "Unexpected character \"{c}\""),
            Self::UnterminatedString => write!(f, "Unterminated string literal"),
            Self::UnknownCharacterInString(c) => {
                write!(f, "Unknown character \"{c}\" in string literal")
            }
            Self::UnknownEscapeSequence(s) => {
                write!(f, "Unknown escape sequence \"{s}\" in string")
            }
            Self::UnexpectedEndOfFile => write!(f, "Unexpected end of input"),
            Self::InvalidNumber => write!(f, "Invalid number literal"),
        }
    }
}

impl std::error::Error for LexerError {}

pub type LexerResult<'a> = Result<Spanning<Token<'a>>, Spanning<LexerError>>;

/// An on-demand tokenizer over an input source
///
/// Tokens are produced one at a time through [`Lexer::next_token`]; nothing
/// is buffered. After the source is exhausted, [`Token::Eof`] is returned
/// indefinitely.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    position: SourcePosition,
}

const PUNCTUATORS: &str = "!$()[]{}:=@|";

impl<'a> Lexer<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            position: SourcePosition::new_origin(),
        }
    }

    /// Scans the next token, skipping over any ignored characters before it.
    pub fn next_token(&mut self) -> LexerResult<'a> {
        self.skip_ignored();

        let start = self.position;
        let Some(c) = self.peek_char() else {
            return Ok(Spanning::zero_width(&start, Token::Eof));
        };

        if PUNCTUATORS.contains(c) {
            self.bump();
            return Ok(Spanning::single_width(&start, Token::Punct(c)));
        }

        match c {
            '.' => self.scan_spread(start),
            '"' => self.scan_string(start),
            c if is_name_start(c) => Ok(self.scan_name(start)),
            c if c == '-' || c.is_ascii_digit() => self.scan_number(start),
            c => Err(Spanning::zero_width(&start, LexerError::UnknownCharacter(c))),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn byte_offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source.len(), |&(idx, _)| idx)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.position.advance_line();
        } else {
            self.position.advance_col();
        }
        Some(c)
    }

    // Whitespace, line terminators, commas, and comments up to the end of the
    // line are all insignificant between tokens.
    fn skip_ignored(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\r' | '\n' | ',' => {
                    self.bump();
                }
                '#' => {
                    while let Some(c) = self.peek_char() {
                        self.bump();
                        if c == '\n' || c == '\r' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_spread(&mut self, start: SourcePosition) -> LexerResult<'a> {
        for _ in 0..3 {
            match self.bump() {
                Some('.') => {}
                Some(_) => {
                    return Err(Spanning::zero_width(
                        &start,
                        LexerError::UnexpectedCharacter('.'),
                    ));
                }
                None => {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnexpectedEndOfFile,
                    ));
                }
            }
        }

        Ok(Spanning::start_end(&start, &self.position, Token::Spread))
    }

    fn scan_name(&mut self, start: SourcePosition) -> Spanning<Token<'a>> {
        let from = self.byte_offset();
        while self.peek_char().is_some_and(is_name_cont) {
            self.bump();
        }
        let name = &self.source[from..self.byte_offset()];

        Spanning::start_end(&start, &self.position, Token::Name(name))
    }

    fn scan_string(&mut self, start: SourcePosition) -> LexerResult<'a> {
        self.bump();

        let mut out = String::new();
        loop {
            let at = self.position;
            match self.bump() {
                Some('"') => {
                    return Ok(Spanning::start_end(
                        &start,
                        &self.position,
                        Token::String(out),
                    ));
                }
                Some('\\') => out.push(self.scan_escape(at)?),
                Some('\n') | Some('\r') => {
                    return Err(Spanning::zero_width(&at, LexerError::UnterminatedString));
                }
                Some(c) if c < ' ' && c != '\t' => {
                    return Err(Spanning::zero_width(
                        &at,
                        LexerError::UnknownCharacterInString(c),
                    ));
                }
                Some(c) => out.push(c),
                None => {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnterminatedString,
                    ));
                }
            }
        }
    }

    fn scan_escape(&mut self, at: SourcePosition) -> Result<char, Spanning<LexerError>> {
        let unterminated = |pos: &SourcePosition| {
            Spanning::zero_width(pos, LexerError::UnterminatedString)
        };

        match self.bump().ok_or_else(|| unterminated(&self.position))? {
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000c}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => {
                let mut escape = String::with_capacity(4);
                for _ in 0..4 {
                    escape.push(self.bump().ok_or_else(|| unterminated(&self.position))?);
                }

                u32::from_str_radix(&escape, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        Spanning::zero_width(
                            &at,
                            LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
                        )
                    })
            }
            c => Err(Spanning::zero_width(
                &at,
                LexerError::UnknownEscapeSequence(format!("\\{c}")),
            )),
        }
    }

    fn scan_number(&mut self, start: SourcePosition) -> LexerResult<'a> {
        let from = self.byte_offset();
        let mut is_float = false;

        if self.peek_char() == Some('-') {
            self.bump();
        }
        self.scan_digits()?;

        if self.peek_char() == Some('.') {
            is_float = true;
            self.bump();
            self.scan_digits()?;
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek_char(), Some('-') | Some('+')) {
                self.bump();
            }
            self.scan_digits()?;
        }

        let text = &self.source[from..self.byte_offset()];
        let int_part = text.strip_prefix('-').unwrap_or(text);
        if int_part.len() > 1 && int_part.starts_with('0') {
            return Err(Spanning::zero_width(&start, LexerError::InvalidNumber));
        }

        let token: Result<Token, ()> = if is_float {
            text.parse().map(Token::Float).map_err(|_| ())
        } else {
            text.parse().map(Token::Int).map_err(|_| ())
        };

        token
            .map(|t| Spanning::start_end(&start, &self.position, t))
            .map_err(|_| Spanning::zero_width(&start, LexerError::InvalidNumber))
    }

    // At least one digit, consumed greedily.
    fn scan_digits(&mut self) -> Result<(), Spanning<LexerError>> {
        match self.peek_char() {
            Some(c) if c.is_ascii_digit() => {
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                Ok(())
            }
            Some(c) => Err(Spanning::zero_width(
                &self.position,
                LexerError::UnexpectedCharacter(c),
            )),
            None => Err(Spanning::zero_width(
                &self.position,
                LexerError::UnexpectedEndOfFile,
            )),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_cont(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}
