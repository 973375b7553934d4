use std::fmt;

use fnv::FnvHashMap;
use thiserror::Error;

use crate::{
    ast::Type,
    schema::{
        meta::{
            boolean_meta, float_meta, id_meta, int_meta, string_meta, Argument, InterfaceMeta,
            MetaType, ObjectMeta, UnionMeta,
        },
        name::Name,
    },
};

/// Error raised when a schema fails to assemble
///
/// A schema that constructs successfully is internally consistent: every
/// referenced type exists, every name is well-formed and unique, every
/// declared interface is honored, and every directive has somewhere to go.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    /// A type, field, argument, or enum value carries a malformed name.
    #[error("{0}")]
    InvalidName(String),

    /// Two named types share a name.
    #[error(r#"Duplicate type name "{0}"."#)]
    DuplicateTypeName(String),

    /// A directive was registered without a name.
    #[error("Directive must be named.")]
    UnnamedDirective,

    /// A directive was registered with an empty location set.
    #[error("Must provide locations for directive.")]
    MissingDirectiveLocations {
        /// Name of the offending directive.
        directive: String,
    },

    /// A field, argument, union member, or interface listing references a
    /// type name missing from the registry.
    #[error(r#"Unknown type "{name}" referenced by "{referenced_by}"."#)]
    UnknownType {
        /// The dangling type name.
        name: String,
        /// The type (or field) containing the reference.
        referenced_by: String,
    },

    /// A union lists a member that is not an object type.
    #[error(r#"Union "{union}" may only contain object types, it cannot contain "{member}"."#)]
    NonObjectUnionMember {
        /// Name of the union.
        union: String,
        /// Name of the non-object member.
        member: String,
    },

    /// An object declares it implements something that is not an interface.
    #[error(r#"Type "{object}" may only implement interface types, it cannot implement "{interface}"."#)]
    NotAnInterface {
        /// Name of the implementing object.
        object: String,
        /// Name of the non-interface type.
        interface: String,
    },

    /// An object does not provide a field required by one of its interfaces.
    #[error(r#"Interface field "{interface}.{field}" is not implemented by "{object}"."#)]
    MissingInterfaceField {
        /// Name of the interface.
        interface: String,
        /// Name of the missing field.
        field: String,
        /// Name of the implementing object.
        object: String,
    },

    /// An object implements an interface field at an incompatible type.
    #[error(
        r#"Interface field "{interface}.{field}" expects type "{expected}" but "{object}.{field}" is of type "{found}"."#
    )]
    ConflictingInterfaceField {
        /// Name of the interface.
        interface: String,
        /// Name of the conflicting field.
        field: String,
        /// Type declared by the interface.
        expected: String,
        /// Name of the implementing object.
        object: String,
        /// Type declared by the object.
        found: String,
    },
}

/// Configuration collected to build a [`Schema`]
///
/// The query root is mandatory. Named types that are only reachable through
/// abstract types or not reachable at all must be listed via
/// [`SchemaConfig::append_type`]; everything referenced anywhere must end up
/// registered before [`Schema::new`] succeeds.
pub struct SchemaConfig {
    query: ObjectMeta,
    mutation: Option<ObjectMeta>,
    subscription: Option<ObjectMeta>,
    types: Vec<MetaType>,
    directives: Vec<DirectiveType>,
}

impl SchemaConfig {
    /// Starts a new configuration with the given query root object.
    pub fn new(query: ObjectMeta) -> Self {
        Self {
            query,
            mutation: None,
            subscription: None,
            types: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Sets the mutation root object.
    #[must_use]
    pub fn mutation(mut self, mutation: ObjectMeta) -> Self {
        self.mutation = Some(mutation);
        self
    }

    /// Sets the subscription root object.
    #[must_use]
    pub fn subscription(mut self, subscription: ObjectMeta) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Registers an additional named type.
    #[must_use]
    pub fn append_type(mut self, meta: MetaType) -> Self {
        self.types.push(meta);
        self
    }

    /// Registers an additional directive beside the built-in `@skip` and
    /// `@include`.
    #[must_use]
    pub fn directive(mut self, directive: DirectiveType) -> Self {
        self.directives.push(directive);
        self
    }
}

/// A validated GraphQL schema
///
/// Built once via [`Schema::new`], immutable afterwards, and shareable across
/// concurrent requests.
pub struct Schema {
    pub(crate) types: FnvHashMap<Name, MetaType>,
    pub(crate) query_type_name: String,
    pub(crate) mutation_type_name: Option<String>,
    pub(crate) subscription_type_name: Option<String>,
    directives: FnvHashMap<String, DirectiveType>,
    implementers: FnvHashMap<String, Vec<String>>,
}

/// A resolved view of a [`Type`] literal against a [`Schema`]
///
/// Non-null and list wrappers stay structural; the innermost node borrows the
/// registered [`MetaType`].
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone)]
pub enum TypeType<'a> {
    Concrete(&'a MetaType),
    NonNull(Box<TypeType<'a>>),
    List(Box<TypeType<'a>>),
}

/// Metadata of a directive: its name, arguments, and allowed locations
#[derive(Clone, Debug)]
pub struct DirectiveType {
    /// Name of this directive, without the leading `@`.
    pub name: String,
    /// Optional description of this directive.
    pub description: Option<String>,
    /// Locations this directive may appear at. Must be non-empty.
    pub locations: Vec<DirectiveLocation>,
    /// Ordered argument definitions of this directive.
    pub arguments: Vec<Argument>,
}

/// Location a directive is allowed to appear at
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl Schema {
    /// Assembles and validates a schema out of the provided configuration.
    ///
    /// Built-in scalars (`Int`, `Float`, `String`, `Boolean`, `ID`) and the
    /// built-in `@skip`/`@include` directives are always registered.
    pub fn new(config: SchemaConfig) -> Result<Self, SchemaError> {
        let SchemaConfig {
            query,
            mutation,
            subscription,
            types,
            directives,
        } = config;

        let query_type_name = query.name.clone();
        let mutation_type_name = mutation.as_ref().map(|m| m.name.clone());
        let subscription_type_name = subscription.as_ref().map(|s| s.name.clone());

        let mut schema = Self {
            types: FnvHashMap::default(),
            query_type_name,
            mutation_type_name,
            subscription_type_name,
            directives: FnvHashMap::default(),
            implementers: FnvHashMap::default(),
        };

        for scalar in [
            int_meta(),
            float_meta(),
            string_meta(),
            boolean_meta(),
            id_meta(),
        ] {
            schema.insert_type(scalar.into_meta())?;
        }

        for meta in types {
            schema.insert_type(meta)?;
        }
        schema.insert_type(query.into_meta())?;
        if let Some(mutation) = mutation {
            schema.insert_type(mutation.into_meta())?;
        }
        if let Some(subscription) = subscription {
            schema.insert_type(subscription.into_meta())?;
        }

        schema.insert_directive(DirectiveType::new_skip())?;
        schema.insert_directive(DirectiveType::new_include())?;
        for directive in directives {
            schema.insert_directive(directive)?;
        }

        schema.check_references()?;
        schema.check_interfaces()?;
        schema.build_implementers_index();

        Ok(schema)
    }

    fn insert_type(&mut self, mut meta: MetaType) -> Result<(), SchemaError> {
        let name = parse_name(meta.name())?;

        // Objects and interfaces get the `__typename` meta field; the
        // executor answers it with the concrete type name.
        if let MetaType::Object(ObjectMeta { fields, .. })
        | MetaType::Interface(InterfaceMeta { fields, .. }) = &mut meta
        {
            if !fields.iter().any(|f| f.name == "__typename") {
                fields.push(crate::schema::meta::Field::new(
                    "__typename",
                    Type::named("String").non_null(),
                ));
            }
        }

        match &meta {
            MetaType::Object(ObjectMeta { fields, .. })
            | MetaType::Interface(InterfaceMeta { fields, .. }) => {
                for field in fields {
                    parse_name(&field.name)?;
                    for arg in field.arguments.iter().flatten() {
                        parse_name(&arg.name)?;
                    }
                }
            }
            MetaType::InputObject(iom) => {
                for field in &iom.input_fields {
                    parse_name(&field.name)?;
                }
            }
            MetaType::Enum(em) => {
                for value in &em.values {
                    parse_name(&value.name)?;
                }
            }
            MetaType::Scalar(..) | MetaType::Union(..) => {}
        }

        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateTypeName(name.to_string()));
        }
        self.types.insert(name, meta);
        Ok(())
    }

    fn insert_directive(&mut self, directive: DirectiveType) -> Result<(), SchemaError> {
        if directive.name.is_empty() {
            return Err(SchemaError::UnnamedDirective);
        }
        parse_name(&directive.name)?;
        if directive.locations.is_empty() {
            return Err(SchemaError::MissingDirectiveLocations {
                directive: directive.name,
            });
        }
        self.directives.insert(directive.name.clone(), directive);
        Ok(())
    }

    fn check_references(&self) -> Result<(), SchemaError> {
        let unknown = |name: &str, referenced_by: &str| SchemaError::UnknownType {
            name: name.into(),
            referenced_by: referenced_by.into(),
        };

        for meta in self.types.values() {
            match meta {
                MetaType::Object(ObjectMeta {
                    name,
                    fields,
                    interface_names,
                    ..
                }) => {
                    for field in fields {
                        self.check_field_references(name, field)?;
                    }
                    for iface in interface_names {
                        if self.concrete_type_by_name(iface).is_none() {
                            return Err(unknown(iface, name));
                        }
                    }
                }
                MetaType::Interface(InterfaceMeta { name, fields, .. }) => {
                    for field in fields {
                        self.check_field_references(name, field)?;
                    }
                }
                MetaType::Union(UnionMeta {
                    name,
                    of_type_names,
                    ..
                }) => {
                    for member in of_type_names {
                        match self.concrete_type_by_name(member) {
                            None => return Err(unknown(member, name)),
                            Some(MetaType::Object(..)) => {}
                            Some(..) => {
                                return Err(SchemaError::NonObjectUnionMember {
                                    union: name.clone(),
                                    member: member.clone(),
                                });
                            }
                        }
                    }
                }
                MetaType::InputObject(iom) => {
                    for field in &iom.input_fields {
                        if self
                            .concrete_type_by_name(field.arg_type.innermost_name())
                            .is_none()
                        {
                            return Err(unknown(
                                field.arg_type.innermost_name(),
                                &format!("{}.{}", iom.name, field.name),
                            ));
                        }
                    }
                }
                MetaType::Scalar(..) | MetaType::Enum(..) => {}
            }
        }

        for directive in self.directives.values() {
            for arg in &directive.arguments {
                if self
                    .concrete_type_by_name(arg.arg_type.innermost_name())
                    .is_none()
                {
                    return Err(unknown(
                        arg.arg_type.innermost_name(),
                        &format!("@{}", directive.name),
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_field_references(
        &self,
        parent: &str,
        field: &crate::schema::meta::Field,
    ) -> Result<(), SchemaError> {
        let referenced_by = format!("{parent}.{}", field.name);
        if self
            .concrete_type_by_name(field.field_type.innermost_name())
            .is_none()
        {
            return Err(SchemaError::UnknownType {
                name: field.field_type.innermost_name().into(),
                referenced_by,
            });
        }
        for arg in field.arguments.iter().flatten() {
            if self
                .concrete_type_by_name(arg.arg_type.innermost_name())
                .is_none()
            {
                return Err(SchemaError::UnknownType {
                    name: arg.arg_type.innermost_name().into(),
                    referenced_by: referenced_by.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_interfaces(&self) -> Result<(), SchemaError> {
        for meta in self.types.values() {
            let MetaType::Object(obj) = meta else {
                continue;
            };

            for iface_name in &obj.interface_names {
                let iface = match self.concrete_type_by_name(iface_name) {
                    Some(MetaType::Interface(i)) => i,
                    _ => {
                        return Err(SchemaError::NotAnInterface {
                            object: obj.name.clone(),
                            interface: iface_name.clone(),
                        });
                    }
                };

                for iface_field in &iface.fields {
                    let Some(obj_field) = obj.fields.iter().find(|f| f.name == iface_field.name)
                    else {
                        return Err(SchemaError::MissingInterfaceField {
                            interface: iface.name.clone(),
                            field: iface_field.name.clone(),
                            object: obj.name.clone(),
                        });
                    };

                    if !self.is_subtype(&obj_field.field_type, &iface_field.field_type) {
                        return Err(SchemaError::ConflictingInterfaceField {
                            interface: iface.name.clone(),
                            field: iface_field.name.clone(),
                            expected: iface_field.field_type.to_string(),
                            object: obj.name.clone(),
                            found: obj_field.field_type.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn build_implementers_index(&mut self) {
        let mut index: FnvHashMap<String, Vec<String>> = FnvHashMap::default();
        for meta in self.types.values() {
            if let MetaType::Object(obj) = meta {
                for iface in &obj.interface_names {
                    index.entry(iface.clone()).or_default().push(obj.name.clone());
                }
            }
        }
        for implementers in index.values_mut() {
            implementers.sort();
        }
        self.implementers = index;
    }

    /// Get a type by name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeType<'_>> {
        self.types.get(name).map(TypeType::Concrete)
    }

    /// Get a concrete type by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    pub(crate) fn lookup_type(&self, tpe: &Type<'_>) -> Option<&MetaType> {
        self.concrete_type_by_name(tpe.innermost_name())
    }

    /// Get the concrete query type from the schema.
    pub fn concrete_query_type(&self) -> &MetaType {
        self.types
            .get(&self.query_type_name)
            .expect("Query type does not exist in schema")
    }

    /// Get the concrete mutation type from the schema, if any.
    pub fn concrete_mutation_type(&self) -> Option<&MetaType> {
        self.mutation_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("Mutation type does not exist in schema")
        })
    }

    /// Get the concrete subscription type from the schema, if any.
    pub fn concrete_subscription_type(&self) -> Option<&MetaType> {
        self.subscription_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("Subscription type does not exist in schema")
        })
    }

    /// Get a list of concrete types.
    pub fn concrete_type_list(&self) -> Vec<&MetaType> {
        self.types.values().collect()
    }

    /// Resolve a [`Type`] literal into a [`TypeType`] view.
    ///
    /// # Panics
    ///
    /// If the referenced type does not exist; schema construction guarantees
    /// every reachable literal resolves.
    pub fn make_type(&self, t: &Type<'_>) -> TypeType<'_> {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(
                self.type_by_name(n).expect("Type not found in schema"),
            )),
            Type::NonNullList(inner) => {
                TypeType::NonNull(Box::new(TypeType::List(Box::new(self.make_type(inner)))))
            }
            Type::Named(n) => self.type_by_name(n).expect("Type not found in schema"),
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// Get a list of directives.
    pub fn directive_list(&self) -> Vec<&DirectiveType> {
        self.directives.values().collect()
    }

    /// Get directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Determine if there is an overlap between types.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if std::ptr::eq(t1, t2) {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// A list of possible concrete types for a given abstract type.
    ///
    /// # Panics
    ///
    /// If the provided type is not abstract.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        match t {
            MetaType::Union(UnionMeta { of_type_names, .. }) => of_type_names
                .iter()
                .flat_map(|t| self.concrete_type_by_name(t))
                .collect(),
            MetaType::Interface(InterfaceMeta { name, .. }) => self
                .implementers
                .get(name.as_str())
                .map(|names| {
                    names
                        .iter()
                        .flat_map(|n| self.concrete_type_by_name(n))
                        .collect()
                })
                .unwrap_or_default(),
            _ => panic!("Can't retrieve possible types from non-abstract meta type"),
        }
    }

    /// If the abstract type could resolve to the possible type.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .into_iter()
            .any(|t| std::ptr::eq(t, possible_type))
    }

    /// If the type is a subtype of another type.
    pub fn is_subtype(&self, sub_type: &Type<'_>, super_type: &Type<'_>) -> bool {
        use crate::ast::Type::*;

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    /// If the type is a named subtype.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
        } else {
            false
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query_type_name", &self.query_type_name)
            .field("mutation_type_name", &self.mutation_type_name)
            .field("subscription_type_name", &self.subscription_type_name)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn parse_name(s: &str) -> Result<Name, SchemaError> {
    s.parse()
        .map_err(|e: crate::schema::name::NameParseError| SchemaError::InvalidName(e.to_string()))
}

impl<'a> TypeType<'a> {
    #[inline]
    #[doc(hidden)]
    pub fn to_concrete(&self) -> Option<&'a MetaType> {
        match self {
            Self::Concrete(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    #[doc(hidden)]
    pub fn innermost_concrete(&self) -> &'a MetaType {
        match self {
            Self::Concrete(t) => t,
            Self::NonNull(n) | Self::List(n) => n.innermost_concrete(),
        }
    }

    #[inline]
    #[doc(hidden)]
    pub fn list_contents(&self) -> Option<&TypeType<'a>> {
        match self {
            Self::List(n) => Some(n),
            Self::NonNull(n) => n.list_contents(),
            Self::Concrete(..) => None,
        }
    }

    #[inline]
    #[doc(hidden)]
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(..))
    }
}

impl DirectiveType {
    /// Constructs a new [`DirectiveType`] with the given name, locations, and
    /// arguments.
    pub fn new(name: &str, locations: &[DirectiveLocation], arguments: &[Argument]) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments: arguments.to_vec(),
        }
    }

    fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            &[Argument::new("if", Type::named("Boolean").non_null())],
        )
    }

    fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            &[Argument::new("if", Type::named("Boolean").non_null())],
        )
    }

    /// Sets the `description` of this directive.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Field => "field",
            Self::FragmentDefinition => "fragment definition",
            Self::FragmentSpread => "fragment spread",
            Self::InlineFragment => "inline fragment",
            Self::Schema => "schema",
            Self::Scalar => "scalar",
            Self::Object => "object",
            Self::FieldDefinition => "field definition",
            Self::ArgumentDefinition => "argument definition",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::EnumValue => "enum value",
            Self::InputObject => "input object",
            Self::InputFieldDefinition => "input field definition",
        })
    }
}

impl fmt::Display for TypeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(t) => f.write_str(t.name()),
            Self::List(i) => write!(f, "[{i}]"),
            Self::NonNull(i) => write!(f, "{i}!"),
        }
    }
}
