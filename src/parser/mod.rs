//! Query parser and language utilities

mod document;
mod lexer;
mod utils;


pub use self::{
    document::{
        parse_document_source, parse_type, OptionParseResult, ParseError, ParseResult, Parser,
        UnlocatedParseResult,
    },
    lexer::{Lexer, LexerError, Token},
    utils::{SourcePosition, Span, Spanning},
};
