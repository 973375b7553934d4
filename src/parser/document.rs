use std::{borrow::Cow, error::Error, fmt, mem};

use crate::{
    ast::{
        Arguments, Definition, Directive, Field, Fragment, FragmentSpread, InlineFragment,
        InputValue, Operation, OperationType, OwnedDocument, Selection, Type, VariableDefinition,
        VariableDefinitions,
    },
    parser::{Lexer, LexerError, Spanning, Token},
};

/// Error while parsing a GraphQL query
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An unexpected token occurred in the source
    UnexpectedToken(String),

    /// The input source abruptly ended
    UnexpectedEndOfFile,

    /// An error during tokenization occurred
    LexerError(LexerError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken(token) => write!(f, "Unexpected \"{token}\""),
            Self::UnexpectedEndOfFile => write!(f, "Unexpected end of input"),
            Self::LexerError(e) => e.fmt(f),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LexerError(e) => Some(e),
            Self::UnexpectedToken(_) | Self::UnexpectedEndOfFile => None,
        }
    }
}

#[doc(hidden)]
pub type ParseResult<T> = Result<Spanning<T>, Spanning<ParseError>>;

#[doc(hidden)]
pub type UnlocatedParseResult<T> = Result<T, Spanning<ParseError>>;

#[doc(hidden)]
pub type OptionParseResult<T> = Result<Option<Spanning<T>>, Spanning<ParseError>>;

/// A single-token-lookahead wrapper around the [`Lexer`]
///
/// Holds the current token; [`Parser::advance`] hands it out and pulls the
/// next one from the lexer.
#[doc(hidden)]
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanning<Token<'a>>,
}

impl<'a> Parser<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Result<Parser<'a>, Spanning<ParseError>> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token().map_err(|e| e.map(ParseError::LexerError))?;

        Ok(Parser { lexer, current })
    }

    #[doc(hidden)]
    pub fn peek(&self) -> &Spanning<Token<'a>> {
        &self.current
    }

    #[doc(hidden)]
    pub fn advance(&mut self) -> ParseResult<Token<'a>> {
        if self.current.item == Token::Eof {
            return Err(Spanning::new(
                self.current.span,
                ParseError::UnexpectedEndOfFile,
            ));
        }

        let next = self
            .lexer
            .next_token()
            .map_err(|e| e.map(ParseError::LexerError))?;
        Ok(mem::replace(&mut self.current, next))
    }

    /// Builds an "unexpected token" error out of the current token without
    /// consuming it.
    fn unexpected(&self) -> Spanning<ParseError> {
        let error = match &self.current.item {
            Token::Eof => ParseError::UnexpectedEndOfFile,
            token => ParseError::UnexpectedToken(token.to_string()),
        };
        Spanning::new(self.current.span, error)
    }

    fn is_punct(&self, c: char) -> bool {
        self.current.item == Token::Punct(c)
    }

    fn expect_punct(&mut self, c: char) -> ParseResult<Token<'a>> {
        if self.is_punct(c) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_punct(&mut self, c: char) -> OptionParseResult<Token<'a>> {
        if self.is_punct(c) {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    fn expect_name(&mut self) -> ParseResult<&'a str> {
        match self.current.item {
            Token::Name(_) => self.advance().map(|t| {
                t.map(|t| match t {
                    Token::Name(name) => name,
                    _ => unreachable!("`expect_name` verified the token kind"),
                })
            }),
            _ => Err(self.unexpected()),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<&'a str> {
        match self.current.item {
            Token::Name(name) if name == keyword => self.expect_name(),
            _ => Err(self.unexpected()),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.current.item, Token::Name(name) if name == keyword)
    }
}

#[doc(hidden)]
pub fn parse_document_source(s: &str) -> UnlocatedParseResult<OwnedDocument<'_>> {
    let mut parser = Parser::new(s)?;
    let mut defs = Vec::new();

    loop {
        defs.push(parse_definition(&mut parser)?);

        if parser.peek().item == Token::Eof {
            return Ok(defs);
        }
    }
}

fn parse_definition<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<Definition<'a>> {
    if parser.is_punct('{')
        || parser.is_keyword("query")
        || parser.is_keyword("mutation")
        || parser.is_keyword("subscription")
    {
        Ok(Definition::Operation(parse_operation_definition(parser)?))
    } else if parser.is_keyword("fragment") {
        Ok(Definition::Fragment(parse_fragment_definition(parser)?))
    } else {
        Err(parser.unexpected())
    }
}

fn parse_operation_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<Operation<'a>> {
    // The `{ … }` shorthand for an anonymous query.
    if parser.is_punct('{') {
        let selection_set = parse_selection_set(parser)?;

        return Ok(Spanning::new(
            selection_set.span,
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: None,
                directives: None,
                selection_set: selection_set.item,
            },
        ));
    }

    let start_pos = parser.peek().start();
    let operation_type = parse_operation_type(parser)?;
    let name = match parser.peek().item {
        Token::Name(_) => Some(parser.expect_name()?),
        _ => None,
    };
    let variable_definitions = parse_variable_definitions(parser)?;
    let directives = parse_directives(parser)?;
    let selection_set = parse_selection_set(parser)?;

    Ok(Spanning::start_end(
        &start_pos,
        &selection_set.end(),
        Operation {
            operation_type: operation_type.item,
            name,
            variable_definitions,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.item,
        },
    ))
}

fn parse_operation_type(parser: &mut Parser<'_>) -> ParseResult<OperationType> {
    for (keyword, operation_type) in [
        ("query", OperationType::Query),
        ("mutation", OperationType::Mutation),
        ("subscription", OperationType::Subscription),
    ] {
        if parser.is_keyword(keyword) {
            return Ok(parser.expect_name()?.map(|_| operation_type));
        }
    }

    Err(parser.unexpected())
}

fn parse_fragment_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<Fragment<'a>> {
    let start_pos = parser.expect_keyword("fragment")?.start();

    let name = parser.expect_name()?;
    if name.item == "on" {
        return Err(Spanning::new(
            name.span,
            ParseError::UnexpectedToken("on".into()),
        ));
    }

    parser.expect_keyword("on")?;
    let type_condition = parser.expect_name()?;

    let directives = parse_directives(parser)?;
    let selection_set = parse_selection_set(parser)?;

    Ok(Spanning::start_end(
        &start_pos,
        &selection_set.end(),
        Fragment {
            name,
            type_condition,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.item,
        },
    ))
}

fn parse_selection_set<'a>(parser: &mut Parser<'a>) -> ParseResult<Vec<Selection<'a>>> {
    let start_pos = parser.expect_punct('{')?.start();
    let mut selections = Vec::new();

    loop {
        selections.push(parse_selection(parser)?);

        if let Some(end) = parser.skip_punct('}')? {
            return Ok(Spanning::start_end(&start_pos, &end.end(), selections));
        }
    }
}

fn parse_selection<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<Selection<'a>> {
    if parser.peek().item == Token::Spread {
        parse_fragment(parser)
    } else {
        parse_field(parser).map(Selection::Field)
    }
}

fn parse_fragment<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<Selection<'a>> {
    let start_pos = parser.advance()?.start();

    // `… on Type { }`, `… { }` and `… @dir { }` are inline fragments;
    // `…name` is a spread of a named fragment.
    if parser.is_keyword("on") {
        parser.expect_name()?;
        let type_condition = parser.expect_name()?;
        let directives = parse_directives(parser)?;
        let selection_set = parse_selection_set(parser)?;

        Ok(Selection::InlineFragment(Spanning::start_end(
            &start_pos,
            &selection_set.end(),
            InlineFragment {
                type_condition: Some(type_condition),
                directives: directives.map(|s| s.item),
                selection_set: selection_set.item,
            },
        )))
    } else if parser.is_punct('{') || parser.is_punct('@') {
        let directives = parse_directives(parser)?;
        let selection_set = parse_selection_set(parser)?;

        Ok(Selection::InlineFragment(Spanning::start_end(
            &start_pos,
            &selection_set.end(),
            InlineFragment {
                type_condition: None,
                directives: directives.map(|s| s.item),
                selection_set: selection_set.item,
            },
        )))
    } else if matches!(parser.peek().item, Token::Name(_)) {
        let name = parser.expect_name()?;
        let directives = parse_directives(parser)?;

        Ok(Selection::FragmentSpread(Spanning::start_end(
            &start_pos,
            &directives.as_ref().map_or(name.end(), |s| s.end()),
            FragmentSpread {
                name,
                directives: directives.map(|s| s.item),
            },
        )))
    } else {
        Err(parser.unexpected())
    }
}

fn parse_field<'a>(parser: &mut Parser<'a>) -> ParseResult<Field<'a>> {
    let mut alias = Some(parser.expect_name()?);

    let name = if parser.skip_punct(':')?.is_some() {
        parser.expect_name()?
    } else {
        alias.take().unwrap()
    };

    let arguments = parse_arguments(parser)?;
    let directives = parse_directives(parser)?;
    let selection_set = if parser.is_punct('{') {
        Some(parse_selection_set(parser)?)
    } else {
        None
    };

    Ok(Spanning::start_end(
        &alias.as_ref().unwrap_or(&name).start(),
        &selection_set
            .as_ref()
            .map(|s| s.end())
            .or_else(|| directives.as_ref().map(|s| s.end()))
            .or_else(|| arguments.as_ref().map(|s| s.end()))
            .unwrap_or_else(|| name.end()),
        Field {
            alias,
            name,
            arguments,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.map(|s| s.item),
        },
    ))
}

fn parse_arguments<'a>(parser: &mut Parser<'a>) -> OptionParseResult<Arguments<'a>> {
    if !parser.is_punct('(') {
        return Ok(None);
    }

    let start_pos = parser.expect_punct('(')?.start();
    let mut items = Vec::new();

    loop {
        let name = parser.expect_name()?;
        parser.expect_punct(':')?;
        let value = parse_value_literal(parser, false)?;
        items.push((name, value));

        if let Some(end) = parser.skip_punct(')')? {
            return Ok(Some(Spanning::start_end(
                &start_pos,
                &end.end(),
                Arguments { items },
            )));
        }
    }
}

fn parse_variable_definitions<'a>(
    parser: &mut Parser<'a>,
) -> OptionParseResult<VariableDefinitions<'a>> {
    if !parser.is_punct('(') {
        return Ok(None);
    }

    let start_pos = parser.expect_punct('(')?.start();
    let mut items = Vec::new();

    loop {
        items.push(parse_variable_definition(parser)?);

        if let Some(end) = parser.skip_punct(')')? {
            return Ok(Some(Spanning::start_end(
                &start_pos,
                &end.end(),
                VariableDefinitions { items },
            )));
        }
    }
}

// The variable name is spanned from the `$`, as that is what errors should
// point at.
fn parse_variable_definition<'a>(
    parser: &mut Parser<'a>,
) -> UnlocatedParseResult<(Spanning<&'a str>, VariableDefinition<'a>)> {
    let start_pos = parser.expect_punct('$')?.start();
    let var_name = parser.expect_name()?;
    parser.expect_punct(':')?;
    let var_type = parse_type(parser)?;

    let default_value = if parser.skip_punct('=')?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };

    Ok((
        Spanning::start_end(&start_pos, &var_name.end(), var_name.item),
        VariableDefinition {
            var_type,
            default_value,
        },
    ))
}

fn parse_directives<'a>(
    parser: &mut Parser<'a>,
) -> Result<Option<Spanning<Vec<Spanning<Directive<'a>>>>>, Spanning<ParseError>> {
    let mut items = Vec::new();
    while parser.is_punct('@') {
        let start_pos = parser.expect_punct('@')?.start();
        let name = parser.expect_name()?;
        let arguments = parse_arguments(parser)?;

        items.push(Spanning::start_end(
            &start_pos,
            &arguments.as_ref().map_or(name.end(), |s| s.end()),
            Directive { name, arguments },
        ));
    }

    Ok(Spanning::spanning(items))
}

#[doc(hidden)]
pub fn parse_type<'a>(parser: &mut Parser<'a>) -> ParseResult<Type<'a>> {
    let parsed_type = if let Some(open) = parser.skip_punct('[')? {
        let inner_type = parse_type(parser)?;
        let end_pos = parser.expect_punct(']')?.end();
        Spanning::start_end(
            &open.start(),
            &end_pos,
            Type::List(Box::new(inner_type.item)),
        )
    } else {
        parser.expect_name()?.map(|s| Type::Named(Cow::Borrowed(s)))
    };

    if parser.is_punct('!') {
        let start_pos = parsed_type.start();
        let end_pos = parser.expect_punct('!')?.end();
        let wrapped = match parsed_type.item {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            t => t,
        };
        Ok(Spanning::start_end(&start_pos, &end_pos, wrapped))
    } else {
        Ok(parsed_type)
    }
}

fn parse_value_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    if parser.is_punct('[') {
        return parse_list_literal(parser, is_const);
    }
    if parser.is_punct('{') {
        return parse_object_literal(parser, is_const);
    }
    if parser.is_punct('$') && !is_const {
        let start_pos = parser.expect_punct('$')?.start();
        let name = parser.expect_name()?;
        return Ok(Spanning::start_end(
            &start_pos,
            &name.end(),
            InputValue::variable(name.item),
        ));
    }
    if matches!(
        parser.peek().item,
        Token::Int(_) | Token::Float(_) | Token::String(_)
    ) {
        return Ok(parser.advance()?.map(|token| match token {
            Token::Int(i) => InputValue::Int(i),
            Token::Float(v) => InputValue::Float(v),
            Token::String(s) => InputValue::String(s),
            _ => unreachable!("the token kind was verified before advancing"),
        }));
    }
    if parser.is_keyword("true") {
        return Ok(parser.advance()?.map(|_| InputValue::Boolean(true)));
    }
    if parser.is_keyword("false") {
        return Ok(parser.advance()?.map(|_| InputValue::Boolean(false)));
    }
    if parser.is_keyword("null") {
        return Ok(parser.advance()?.map(|_| InputValue::Null));
    }
    if matches!(parser.peek().item, Token::Name(_)) {
        return Ok(parser.expect_name()?.map(InputValue::enum_value));
    }

    Err(parser.unexpected())
}

fn parse_list_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    let start_pos = parser.expect_punct('[')?.start();
    let mut items = Vec::new();

    loop {
        if let Some(end) = parser.skip_punct(']')? {
            return Ok(Spanning::start_end(
                &start_pos,
                &end.end(),
                InputValue::parsed_list(items),
            ));
        }

        items.push(parse_value_literal(parser, is_const)?);
    }
}

fn parse_object_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    let start_pos = parser.expect_punct('{')?.start();
    let mut fields = Vec::new();

    loop {
        if let Some(end) = parser.skip_punct('}')? {
            return Ok(Spanning::start_end(
                &start_pos,
                &end.end(),
                InputValue::parsed_object(fields),
            ));
        }

        let key = parser.expect_name()?;
        parser.expect_punct(':')?;
        let value = parse_value_literal(parser, is_const)?;
        fields.push((key.map(String::from), value));
    }
}
