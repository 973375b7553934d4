//! Types used to describe a GraphQL schema

use std::{fmt, sync::Arc};

use crate::{
    ast::{InputValue, Type},
    executor::{Context, FieldResult, ResolveParams},
    value::{Data, Value},
};

/// Resolver callback attached to a [`Field`].
///
/// Receives the parent value, coerced arguments, the request context and
/// resolution info, and produces the field's [`Data`] (possibly lazy or
/// deferred) or an error.
pub type ResolveFn = Arc<dyn for<'a> Fn(ResolveParams<'a>) -> FieldResult + Send + Sync>;

/// Callback deciding whether a value is an instance of an object type.
///
/// Used to disambiguate abstract types when no `resolve_type` callback is
/// present: the first implementer whose `is_type_of` accepts the value wins.
pub type IsTypeOfFn = Arc<dyn Fn(&Data, &Context) -> bool + Send + Sync>;

/// Callback resolving an abstract type to the name of a concrete object type.
pub type ResolveTypeFn = Arc<dyn Fn(&Data, &Context) -> Option<String> + Send + Sync>;

/// Serialization function of a scalar: internal value to wire form.
///
/// Returning [`None`] marks the value as invalid for this scalar.
pub type SerializeFn = fn(&Data) -> Option<Value>;

/// Parsing function of a scalar: wire or literal form to internal value.
///
/// Returning [`None`] marks the input as invalid for this scalar.
pub type ParseInputFn = fn(&InputValue) -> Option<Data>;

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,

    /// The field/variant is deprecated, with an optional reason
    Deprecated(Option<String>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Scalar type metadata
#[derive(Clone, Debug)]
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    pub(crate) serialize_fn: SerializeFn,
    pub(crate) parse_fn: ParseInputFn,
}

impl ScalarMeta {
    /// Builds a new [`ScalarMeta`] type with the specified `name` and
    /// conversion functions.
    pub fn new(name: impl Into<String>, serialize_fn: SerializeFn, parse_fn: ParseInputFn) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize_fn,
            parse_fn,
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wraps this [`ScalarMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

/// Object type metadata
#[derive(Clone)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<String>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

impl ObjectMeta {
    /// Builds a new [`ObjectMeta`] type with the specified `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            interface_names: Vec::new(),
            is_type_of: None,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a `field` to this [`ObjectMeta`] type.
    ///
    /// Declaration order is preserved and becomes meaningful to clients.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the names of the interfaces this [`ObjectMeta`] type implements.
    ///
    /// Overwrites any previously set list of interfaces.
    #[must_use]
    pub fn interfaces(mut self, interfaces: &[&str]) -> Self {
        self.interface_names = interfaces.iter().map(|s| (*s).into()).collect();
        self
    }

    /// Sets the `is_type_of` callback used for abstract type disambiguation.
    #[must_use]
    pub fn is_type_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&Data, &Context) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(f));
        self
    }

    /// Wraps this [`ObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

/// Enum type metadata
#[derive(Clone, Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

impl EnumMeta {
    /// Builds a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<String>, values: &[EnumValue]) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.to_vec(),
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Maps an internal payload to its label, if the payload is known.
    pub fn serialize(&self, payload: &Data) -> Option<&str> {
        self.values
            .iter()
            .find(|ev| &ev.value == payload)
            .map(|ev| ev.name.as_str())
    }

    /// Wraps this [`EnumMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }
}

/// Interface type metadata
#[derive(Clone)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceMeta {
    /// Builds a new [`InterfaceMeta`] type with the specified `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a `field` to this [`InterfaceMeta`] type.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the `resolve_type` callback used to pick the concrete object
    /// type for a value.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Data, &Context) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wraps this [`InterfaceMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

/// Union type metadata
#[derive(Clone)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub of_type_names: Vec<String>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl UnionMeta {
    /// Builds a new [`UnionMeta`] type with the specified `name` and member
    /// type names.
    pub fn new(name: impl Into<String>, of_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_type_names: of_types.iter().map(|s| (*s).into()).collect(),
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the `resolve_type` callback used to pick the concrete object
    /// type for a value.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Data, &Context) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wraps this [`UnionMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

/// Input object metadata
#[derive(Clone, Debug)]
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
}

impl InputObjectMeta {
    /// Builds a new [`InputObjectMeta`] type with the specified `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: Vec::new(),
        }
    }

    /// Sets the `description` of this [`InputObjectMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an input `field` to this [`InputObjectMeta`] type.
    #[must_use]
    pub fn field(mut self, field: Argument) -> Self {
        self.input_fields.push(field);
        self
    }

    /// Wraps this [`InputObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

/// Metadata for a field
#[derive(Clone)]
pub struct Field {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub arguments: Option<Vec<Argument>>,
    #[doc(hidden)]
    pub field_type: Type<'static>,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    pub(crate) resolver: Option<ResolveFn>,
}

impl Field {
    /// Builds a new [`Field`] with the provided `name` and declared type.
    pub fn new(name: impl Into<String>, field_type: Type<'static>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: None,
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
        }
    }

    /// Sets the `description` of this [`Field`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an `argument` to this [`Field`].
    ///
    /// Arguments are ordered and can't contain duplicates by name.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        match self.arguments {
            None => {
                self.arguments = Some(vec![argument]);
            }
            Some(ref mut args) => {
                args.push(argument);
            }
        }
        self
    }

    /// Sets the resolver callback of this [`Field`].
    ///
    /// Fields without a resolver use the default resolver: a response-key
    /// lookup on the parent [`Data::Map`] value.
    #[must_use]
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(ResolveParams<'a>) -> FieldResult + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(f));
        self
    }

    /// Sets this [`Field`] as deprecated with an optional `reason`.
    ///
    /// Overwrites any previously set deprecation reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("field_type", &self.field_type)
            .field("deprecation_status", &self.deprecation_status)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ObjectMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMeta")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("interface_names", &self.interface_names)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for InterfaceMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceMeta")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UnionMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionMeta")
            .field("name", &self.name)
            .field("of_type_names", &self.of_type_names)
            .finish_non_exhaustive()
    }
}

/// Metadata for an argument to a field, or a field of an input object
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub arg_type: Type<'static>,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// Builds a new [`Argument`] of the given type with the given `name`.
    pub fn new(name: impl Into<String>, arg_type: Type<'static>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Sets the `description` of this [`Argument`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value of this [`Argument`].
    ///
    /// Overwrites any previously set default value.
    #[must_use]
    pub fn default_value(mut self, val: InputValue) -> Self {
        self.default_value = Some(val);
        self
    }
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: String,

    /// The optional description of the enum value.
    ///
    /// Note: this is not the description of the enum itself; it's the
    /// description of this enum _value_.
    pub description: Option<String>,

    /// Whether the field is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,

    /// The internal payload this label maps to.
    ///
    /// Defaults to the label itself as a string.
    pub value: Data,
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            value: Data::String(name.clone()),
            name,
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the `description` of this [`EnumValue`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the internal payload of this [`EnumValue`].
    ///
    /// Overwrites the default payload (the label itself).
    #[must_use]
    pub fn value(mut self, value: Data) -> Self {
        self.value = value;
        self
    }

    /// Sets this [`EnumValue`] as deprecated with an optional `reason`.
    ///
    /// Overwrites any previously set deprecation reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

/// Generic type metadata
///
/// A tagged variant over every named kind of type a schema can contain. List
/// and non-null wrappers are not `MetaType`s; they only exist structurally
/// inside [`Type`] literals and resolved [`TypeType`] views.
///
/// [`TypeType`]: crate::schema::model::TypeType
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone)]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Enum(EnumMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    InputObject(InputObjectMeta),
}

impl MetaType {
    /// Returns the name of the represented type.
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(EnumMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Scalar(ScalarMeta { name, .. })
            | Self::Union(UnionMeta { name, .. }) => name,
        }
    }

    /// Returns the description of the represented type, if set.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Enum(EnumMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Scalar(ScalarMeta { description, .. })
            | Self::Union(UnionMeta { description, .. }) => description.as_deref(),
        }
    }

    /// Returns a [`Field`]'s metadata by its `name`.
    ///
    /// Only objects and interfaces have fields.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match self {
            Self::Interface(InterfaceMeta { fields, .. })
            | Self::Object(ObjectMeta { fields, .. }) => fields.iter().find(|f| f.name == name),
            Self::Enum(..) | Self::InputObject(..) | Self::Scalar(..) | Self::Union(..) => None,
        }
    }

    /// Returns an input field's metadata by its `name`.
    ///
    /// Only input objects have input fields.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            Self::Enum(..) | Self::Interface(..) | Self::Object(..) | Self::Scalar(..)
            | Self::Union(..) => None,
        }
    }

    /// Constructs a nullable [`Type`] literal referencing this [`MetaType`].
    pub fn as_type(&self) -> Type<'static> {
        Type::named(self.name().to_owned())
    }

    /// Indicates whether the represented type is a composite one.
    ///
    /// Objects, interfaces and unions are composite types.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Interface(..) | Self::Object(..) | Self::Union(..)
        )
    }

    /// Indicates whether the represented type can occur in leaf positions of
    /// queries.
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(..) | Self::Scalar(..))
    }

    /// Indicates whether the represented type is abstract.
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(..) | Self::Union(..))
    }

    /// Indicates whether the represented type can be used in input positions,
    /// e.g. arguments or variables.
    ///
    /// Only scalars, enums and input objects are input types.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Enum(..) | Self::InputObject(..) | Self::Scalar(..)
        )
    }

    /// Indicates whether the represented type is GraphQL built-in.
    pub fn is_builtin(&self) -> bool {
        let name = self.name();
        name.starts_with("__")
            || name == "Boolean"
            || name == "String"
            || name == "Int"
            || name == "Float"
            || name == "ID"
    }
}

impl fmt::Debug for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Scalar(..) => "Scalar",
            Self::Object(..) => "Object",
            Self::Enum(..) => "Enum",
            Self::Interface(..) => "Interface",
            Self::Union(..) => "Union",
            Self::InputObject(..) => "InputObject",
        };
        write!(f, "{kind}({:?})", self.name())
    }
}

// Built-in scalars.
//
// `Int` is strictly 32-bit on input; a whole-numbered `Float` is accepted on
// output. `ID` accepts strings and integers on input and always serializes as
// a string. The empty string is a regular `String` value.

pub(crate) fn int_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Int",
        |data| match data {
            Data::Int(i) => Some(Value::Int(*i)),
            Data::Float(f) if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 =>
            {
                Some(Value::Int(*f as i32))
            }
            _ => None,
        },
        |v| match v {
            InputValue::Int(i) => Some(Data::Int(*i)),
            _ => None,
        },
    )
}

pub(crate) fn float_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Float",
        |data| match data {
            Data::Float(f) if f.is_finite() => Some(Value::Float(*f)),
            Data::Int(i) => Some(Value::Float(f64::from(*i))),
            _ => None,
        },
        |v| match v {
            InputValue::Int(i) => Some(Data::Float(f64::from(*i))),
            InputValue::Float(f) => Some(Data::Float(*f)),
            _ => None,
        },
    )
}

pub(crate) fn string_meta() -> ScalarMeta {
    ScalarMeta::new(
        "String",
        |data| data.as_str().map(Value::string),
        |v| match v {
            InputValue::String(s) => Some(Data::String(s.clone())),
            _ => None,
        },
    )
}

pub(crate) fn boolean_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Boolean",
        |data| data.as_bool().map(Value::boolean),
        |v| match v {
            InputValue::Boolean(b) => Some(Data::Boolean(*b)),
            _ => None,
        },
    )
}

pub(crate) fn id_meta() -> ScalarMeta {
    ScalarMeta::new(
        "ID",
        |data| match data {
            Data::String(s) => Some(Value::string(s.clone())),
            Data::Int(i) => Some(Value::string(i.to_string())),
            _ => None,
        },
        |v| match v {
            InputValue::String(s) => Some(Data::String(s.clone())),
            InputValue::Int(i) => Some(Data::String(i.to_string())),
            _ => None,
        },
    )
}
