use std::{
    borrow::Borrow,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A valid GraphQL name, matching `/^[_a-zA-Z][_a-zA-Z0-9]*$/`
///
/// Every named thing in a schema (types, fields, arguments, directives, enum
/// values) must parse into a `Name` before it is accepted into the registry.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(String);

impl Name {
    /// Tests a string for name validity without constructing a [`Name`].
    pub fn is_valid(input: &str) -> bool {
        for (i, c) in input.chars().enumerate() {
            let is_valid = c.is_ascii_alphabetic() || c == '_' || (i > 0 && c.is_ascii_digit());
            if !is_valid {
                return false;
            }
        }
        !input.is_empty()
    }

    /// Views this [`Name`] as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error of a string not matching `/^[_a-zA-Z][_a-zA-Z0-9]*$/`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameParseError(String);

impl Display for NameParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for NameParseError {}

impl FromStr for Name {
    type Err = NameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Name::is_valid(s) {
            Ok(Name(s.into()))
        } else {
            Err(NameParseError(format!(
                "Names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/ but \"{s}\" does not",
            )))
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<String> for Name {
    fn borrow(&self) -> &String {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}
