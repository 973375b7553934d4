//! The document syntax tree consumed by validation and execution

use std::{borrow::Cow, fmt, slice, vec};

use indexmap::IndexMap;

use crate::{executor::Variables, parser::Spanning};

/// Type literal in a syntax tree or a schema field definition.
///
/// Carries no semantic information and might refer to types that don't exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type<'a> {
    /// A nullable named type, e.g. `String`
    Named(Cow<'a, str>),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be
    /// non-null.
    List(Box<Type<'a>>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(Cow<'a, str>),
    /// A non-null list type, e.g. `[String]!`
    NonNullList(Box<Type<'a>>),
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// constant and might contain variables.
///
/// Lists and objects variants are _spanned_, i.e. they contain a reference to
/// their position in the source file, if available.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition<'a> {
    pub var_type: Spanning<Type<'a>>,
    pub default_value: Option<Spanning<InputValue>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments<'a> {
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue>)>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitions<'a> {
    pub items: Vec<(Spanning<&'a str>, VariableDefinition<'a>)>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Field<'a> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Option<Vec<Selection<'a>>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread<'a> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment<'a> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum Selection<'a> {
    Field(Spanning<Field<'a>>),
    FragmentSpread(Spanning<FragmentSpread<'a>>),
    InlineFragment(Spanning<InlineFragment<'a>>),
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Directive<'a> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Operation<'a> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment<'a> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[doc(hidden)]
#[derive(Clone, Debug, PartialEq)]
pub enum Definition<'a> {
    Operation(Spanning<Operation<'a>>),
    Fragment(Spanning<Fragment<'a>>),
}

#[doc(hidden)]
pub type Document<'a> = [Definition<'a>];
#[doc(hidden)]
pub type OwnedDocument<'a> = Vec<Definition<'a>>;

impl<'a> Type<'a> {
    /// Constructs a nullable named type.
    pub fn named(name: impl Into<Cow<'a, str>>) -> Self {
        Self::Named(name.into())
    }

    /// Wraps this type into a nullable list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Makes this type non-null.
    ///
    /// Only the outermost wrapper is affected; a `[String]` becomes
    /// `[String]!`, not `[String!]!`.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Self::NonNullNamed(n),
            Self::List(l) | Self::NonNullList(l) => Self::NonNullList(l),
        }
    }

    /// Returns the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n),
            Self::List(..) | Self::NonNullList(..) => None,
        }
    }

    /// Returns the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        match self {
            Self::NonNullList(..) | Self::NonNullNamed(..) => true,
            Self::List(..) | Self::Named(..) => false,
        }
    }

    /// Converts this type into one owning all its parts.
    pub fn into_owned(self) -> Type<'static> {
        match self {
            Self::Named(n) => Type::Named(Cow::Owned(n.into_owned())),
            Self::NonNullNamed(n) => Type::NonNullNamed(Cow::Owned(n.into_owned())),
            Self::List(l) => Type::List(Box::new(l.into_owned())),
            Self::NonNullList(l) => Type::NonNullList(Box::new(l.into_owned())),
        }
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

impl InputValue {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable value.
    pub fn variable<T: AsRef<str>>(v: T) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct an unlocated list.
    ///
    /// Convenience function to make each [`InputValue`] in the input vector
    /// not contain any location information.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Construct a located list.
    pub fn parsed_list(l: Vec<Spanning<Self>>) -> Self {
        Self::List(l)
    }

    /// Construct an unlocated object.
    ///
    /// Similarly to [`InputValue::list`] it makes each key and value in the
    /// given map not contain any location information.
    pub fn object(o: IndexMap<String, Self>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| (Spanning::unlocated(k), Spanning::unlocated(v)))
                .collect(),
        )
    }

    /// Construct a located object.
    pub fn parsed_object(o: Vec<(Spanning<String>, Spanning<Self>)>) -> Self {
        Self::Object(o)
    }

    /// Resolves all variables of this [`InputValue`] to their actual `values`.
    ///
    /// If a variable is not present in the `values`:
    /// - Returns [`None`] in case this is an [`InputValue::Variable`].
    /// - Skips the field in case of an [`InputValue::Object`] field.
    /// - Replaces with an [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    ///
    /// This is done, because for an [`InputValue::Variable`] (or an
    /// [`InputValue::Object`] field) a default value can be used later, if
    /// it's provided. While on contrary, a single [`InputValue::List`]
    /// element cannot have a default value.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Option<Self> {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|s| s.map(|v| v.into_const(values).unwrap_or_else(Self::null)))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(sk, sv)| sv.and_then(|v| v.into_const(values)).map(|sv| (sk, sv)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int_value(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// View the underlying float value, if present.
    pub fn as_float_value(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// View the underlying boolean value, if present.
    pub fn as_boolean_value(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to an unlocated object value.
    ///
    /// This constructs a new [`IndexMap`] containing references to the keys
    /// and values of `self`.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(sk, sv)| (sk.item.as_str(), &sv.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to an unlocated list value.
    ///
    /// This constructs a new [`Vec`] containing references to the values of
    /// `self`.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// Recursively finds all variables
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compares equality with another [`InputValue`] ignoring any source
    /// position information.
    pub fn unlocated_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::String(s1), Self::String(s2)) => s1 == s2,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            (Self::Enum(s1), Self::Enum(s2)) | (Self::Variable(s1), Self::Variable(s2)) => {
                s1 == s2
            }
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk1, sv1)| {
                        o2.iter().any(|(sk2, sv2)| {
                            sk1.item == sk2.item && sv1.item.unlocated_eq(&sv2.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl<'a> From<&'a str> for InputValue {
    fn from(s: &'a str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T> From<Option<T>> for InputValue
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl<'a> Arguments<'a> {
    /// Converts these arguments into an iterator over name-value pairs.
    #[expect(clippy::should_implement_trait, reason = "keeps the API symmetric")]
    pub fn into_iter(self) -> vec::IntoIter<(Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.into_iter()
    }

    /// Iterates over the name-value pairs in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.iter()
    }

    /// The number of provided arguments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no arguments were provided.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Gets the value of the argument with the provided name, if present.
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

impl<'a> VariableDefinitions<'a> {
    /// Iterates over the variable definitions in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, VariableDefinition<'a>)> {
        self.items.iter()
    }
}

impl<'a> Field<'a> {
    /// The response key of this field: its alias if present, else its name.
    pub fn response_key(&self) -> &'a str {
        self.alias.as_ref().unwrap_or(&self.name).item
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::InputValue;

    #[test]
    fn input_value_fmt() {
        assert_eq!(InputValue::null().to_string(), "null");
        assert_eq!(InputValue::Int(123).to_string(), "123");
        assert_eq!(InputValue::Float(12.3).to_string(), "12.3");
        assert_eq!(InputValue::from("FOO").to_string(), "\"FOO\"");
        assert_eq!(InputValue::from(true).to_string(), "true");
        assert_eq!(InputValue::enum_value("BAR").to_string(), "BAR");
        assert_eq!(InputValue::variable("baz").to_string(), "$baz");

        let list = InputValue::list(vec![InputValue::Int(1), InputValue::Int(2)]);
        assert_eq!(list.to_string(), "[1, 2]");

        let object = InputValue::object(
            vec![
                ("foo".into(), InputValue::Int(1)),
                ("bar".into(), InputValue::Int(2)),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(object.to_string(), "{foo: 1, bar: 2}");
    }
}
