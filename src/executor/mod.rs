//! Query execution engine

mod selection;

use std::{collections::HashMap, fmt, sync::Arc, sync::RwLock};

use futures::future::{self, BoxFuture};
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::{
    ast::{
        Definition, Document, Field as AstField, Fragment, InputValue, Operation, OperationType,
        Selection, Type,
    },
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{MetaType, ObjectMeta},
        model::{Schema, TypeType},
    },
    value::{coerce_argument_values, Data, Object, Value},
    GraphQLError,
};

pub(crate) use self::selection::collect_fields;

/// The map of variables used for substitution during query execution
pub type Variables = HashMap<String, InputValue>;

/// The result of resolving the value of a single field
pub type FieldResult = Result<Data, FieldError>;

/// Error produced by a resolver, or by forcing a deferred value
///
/// The executor records the message together with the failing field's source
/// location and response path, nulls the field, and lets sibling fields
/// continue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    message: String,
}

impl FieldError {
    /// Constructs a new [`FieldError`] with the provided message.
    pub fn new<T: fmt::Display>(message: T) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for FieldError {}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl<'a> From<&'a str> for FieldError {
    fn from(message: &'a str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One step in the response path of an execution error
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => name.fmt(f),
            Self::Index(idx) => idx.fmt(f),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.into())
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve, as well as the response path to that field.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    message: String,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: &[&str], message: &str) -> Self {
        Self {
            location,
            path: path.iter().map(|s| PathSegment::from(*s)).collect(),
            message: message.into(),
        }
    }

    #[doc(hidden)]
    pub fn at_path(location: SourcePosition, path: Vec<PathSegment>, message: &str) -> Self {
        Self {
            location,
            path,
            message: message.into(),
        }
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source location _in the query_ of the field that failed to resolve
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The response path of fields leading to the field that generated this
    /// error
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// Per-request context handed to every resolver
///
/// Carries an application-defined [`Data`] value (commonly a [`Data::Map`])
/// and the request's cancellation token. Once the token is cancelled,
/// in-flight field resolution winds down and the request produces an
/// error-only response without partial data.
#[derive(Clone, Debug, Default)]
pub struct Context {
    value: Data,
    token: CancellationToken,
}

impl Context {
    /// Constructs a new [`Context`] carrying the provided value.
    pub fn new(value: Data) -> Self {
        Self {
            value,
            token: CancellationToken::new(),
        }
    }

    /// The application-defined context value.
    pub fn value(&self) -> &Data {
        &self.value
    }

    /// Convenience lookup of a key on a [`Data::Map`] context value.
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.value.as_map().and_then(|m| m.get(key))
    }

    /// The cancellation token of the request this context belongs to.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Signals cancellation to every in-flight resolution of this request.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether this request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Field argument container with values coerced into their internal form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<String, Data>,
}

impl Arguments {
    pub(crate) fn new(args: IndexMap<String, Data>) -> Self {
        Self { args }
    }

    /// Gets the coerced value of the argument with the provided name.
    ///
    /// Arguments that were not provided and have no default are present as
    /// [`Data::Null`].
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.args.get(key)
    }

    /// Iterates over all arguments and their coerced values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Data)> {
        self.args.iter()
    }
}

/// Resolution metadata handed to resolvers beside the value and arguments
#[expect(missing_docs, reason = "self-explanatory")]
pub struct ResolveInfo<'a> {
    pub field_name: &'a str,
    pub field_asts: &'a [&'a Spanning<AstField<'a>>],
    pub return_type: &'a Type<'a>,
    pub parent_type_name: &'a str,
    pub path: &'a FieldPath<'a>,
    pub schema: &'a Schema,
    pub fragments: &'a HashMap<&'a str, &'a Fragment<'a>>,
    pub root_value: &'a Data,
    pub operation_type: OperationType,
    pub variable_values: &'a Variables,
}

/// Everything a resolver callback receives
pub struct ResolveParams<'a> {
    /// The parent value this field is resolved on.
    pub source: &'a Data,
    /// Coerced argument values, defaults substituted.
    pub args: &'a Arguments,
    /// The per-request context.
    pub context: &'a Context,
    /// Schema and document metadata of the resolution.
    pub info: ResolveInfo<'a>,
}

/// The response path to the field currently being resolved
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug)]
pub enum FieldPath<'a> {
    Root(SourcePosition),
    Field(&'a str, SourcePosition, Arc<FieldPath<'a>>),
    Index(usize, Arc<FieldPath<'a>>),
}

impl<'a> FieldPath<'a> {
    fn construct_path(&self, acc: &mut Vec<PathSegment>) {
        match self {
            Self::Root(..) => (),
            Self::Field(name, _, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Field((*name).into()));
            }
            Self::Index(idx, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Index(*idx));
            }
        }
    }

    /// The source position of the field this path points at.
    pub fn location(&self) -> &SourcePosition {
        match self {
            Self::Root(pos) | Self::Field(_, pos, _) => pos,
            Self::Index(_, parent) => parent.location(),
        }
    }
}

/// Marker signalling that a non-null constraint failed at or below the
/// current position; the null bubbles until a nullable position absorbs it.
pub(crate) struct Nulled;

/// Query execution engine
///
/// The executor helps drive the query execution in a schema. It keeps track
/// of the current field path, context, variables, and errors.
#[derive(Clone)]
pub struct Executor<'a> {
    fragments: &'a HashMap<&'a str, &'a Fragment<'a>>,
    variables: &'a Variables,
    schema: &'a Schema,
    context: &'a Context,
    root_value: &'a Data,
    operation_type: OperationType,
    errors: &'a RwLock<Vec<ExecutionError>>,
    field_path: Arc<FieldPath<'a>>,
}

/// Forces a possibly deferred value into a plain one.
///
/// Thunks are called and futures awaited, repeatedly, until a
/// non-deferred value or an error comes out.
pub(crate) async fn force(data: Data) -> FieldResult {
    let mut value = data;
    loop {
        value = match value {
            Data::Thunk(f) => f()?,
            Data::Deferred(f) => f().await?,
            other => return Ok(other),
        };
    }
}

fn default_resolve(source: &Data, response_key: &str) -> Data {
    match source {
        Data::Map(m) => m.get(response_key).cloned().unwrap_or(Data::Null),
        _ => Data::Null,
    }
}

impl<'a> Executor<'a> {
    /// The currently executing schema.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// The current context value.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    #[doc(hidden)]
    pub fn variables(&self) -> &'a Variables {
        self.variables
    }

    #[doc(hidden)]
    pub fn fragment_by_name(&self, name: &str) -> Option<&'a Fragment<'a>> {
        self.fragments.get(name).copied()
    }

    /// Add an error to the execution engine at the current field path.
    pub fn push_error(&self, message: String, location: SourcePosition) {
        let mut path = Vec::new();
        self.field_path.construct_path(&mut path);

        tracing::debug!(%message, ?path, "execution error");

        let mut errors = self.errors.write().unwrap();
        errors.push(ExecutionError {
            location,
            path,
            message,
        });
    }

    fn field_sub_executor(&self, response_key: &'a str, location: SourcePosition) -> Executor<'a> {
        Executor {
            field_path: Arc::new(FieldPath::Field(
                response_key,
                location,
                self.field_path.clone(),
            )),
            ..self.clone()
        }
    }

    fn index_sub_executor(&self, index: usize) -> Executor<'a> {
        Executor {
            field_path: Arc::new(FieldPath::Index(index, self.field_path.clone())),
            ..self.clone()
        }
    }

    /// Resolves the grouped fields of one selection set against a concrete
    /// object type.
    ///
    /// `serial` forces strict document-order execution (mutation roots);
    /// otherwise sibling fields resolve concurrently and only result
    /// assembly is ordered.
    pub(crate) fn resolve_selection_set<'s>(
        &'s self,
        object_type: &'a ObjectMeta,
        source: &'s Data,
        selection_sets: Vec<&'a [Selection<'a>]>,
        serial: bool,
    ) -> BoxFuture<'s, Result<Object, Nulled>> {
        Box::pin(async move {
            let grouped = collect_fields(
                self.schema,
                object_type,
                &selection_sets,
                self.fragments,
                self.variables,
            );

            let mut field_futures: Vec<BoxFuture<'s, (&'a str, Result<Option<Value>, Nulled>)>> =
                Vec::with_capacity(grouped.len());
            for (response_key, field_asts) in grouped {
                field_futures.push(Box::pin(async move {
                    (
                        response_key,
                        self.resolve_field(object_type, response_key, field_asts, source)
                            .await,
                    )
                }));
            }

            let results = if serial {
                let mut out = Vec::with_capacity(field_futures.len());
                for fut in field_futures {
                    if self.context.is_cancelled() {
                        break;
                    }
                    let (key, result) = fut.await;
                    let failed = result.is_err();
                    out.push((key, result));
                    if failed {
                        break;
                    }
                }
                out
            } else {
                future::join_all(field_futures).await
            };

            let mut object = Object::with_capacity(results.len());
            let mut nulled = false;
            for (response_key, result) in results {
                match result {
                    Ok(Some(value)) => {
                        object.add_field(response_key, value);
                    }
                    // Unknown field: validation flags it, execution omits it.
                    Ok(None) => {}
                    Err(Nulled) => nulled = true,
                }
            }

            if nulled {
                Err(Nulled)
            } else {
                Ok(object)
            }
        })
    }

    async fn resolve_field(
        &self,
        object_type: &'a ObjectMeta,
        response_key: &'a str,
        field_asts: Vec<&'a Spanning<AstField<'a>>>,
        source: &Data,
    ) -> Result<Option<Value>, Nulled> {
        let first = field_asts[0];
        let field_name = first.item.name.item;

        if field_name == "__typename" {
            return Ok(Some(Value::string(object_type.name.clone())));
        }

        let Some(field_def) = object_type.fields.iter().find(|f| f.name == field_name) else {
            return Ok(None);
        };

        let location = first.span.start;
        let non_null = field_def.field_type.is_non_null();
        let sub_exec = self.field_sub_executor(response_key, location);

        if self.context.is_cancelled() {
            return if non_null { Err(Nulled) } else { Ok(Some(Value::Null)) };
        }

        let args = match coerce_argument_values(
            self.schema,
            field_def.arguments.as_ref(),
            first.item.arguments.as_ref(),
            self.variables,
        ) {
            Ok(args) => Arguments::new(args),
            Err(e) => {
                sub_exec.push_error(e.message, location);
                return if non_null { Err(Nulled) } else { Ok(Some(Value::Null)) };
            }
        };

        let sub_selections: Vec<&'a [Selection<'a>]> = field_asts
            .iter()
            .filter_map(|f| f.item.selection_set.as_deref())
            .collect();

        let result = match &field_def.resolver {
            Some(resolver) => {
                let params = ResolveParams {
                    source,
                    args: &args,
                    context: self.context,
                    info: ResolveInfo {
                        field_name,
                        field_asts: &field_asts[..],
                        return_type: &field_def.field_type,
                        parent_type_name: &object_type.name,
                        path: &*sub_exec.field_path,
                        schema: self.schema,
                        fragments: self.fragments,
                        root_value: self.root_value,
                        operation_type: self.operation_type,
                        variable_values: self.variables,
                    },
                };
                resolver(params)
            }
            None => Ok(default_resolve(source, response_key)),
        };

        let forced = match result {
            Ok(data) => force(data).await,
            err => err,
        };

        match forced {
            Err(e) => {
                tracing::debug!(
                    field = field_name,
                    error = e.message(),
                    "field resolver failed"
                );
                sub_exec.push_error(e.message, location);
                if non_null {
                    Err(Nulled)
                } else {
                    Ok(Some(Value::Null))
                }
            }
            Ok(data) => {
                let return_type = self.schema.make_type(&field_def.field_type);
                match sub_exec
                    .complete_value(
                        &object_type.name,
                        field_name,
                        return_type,
                        data,
                        sub_selections,
                        location,
                    )
                    .await
                {
                    Ok(value) => Ok(Some(value)),
                    Err(Nulled) => {
                        if non_null {
                            Err(Nulled)
                        } else {
                            Ok(Some(Value::Null))
                        }
                    }
                }
            }
        }
    }

    /// Completes a resolved value against its declared return type.
    fn complete_value<'s>(
        &'s self,
        parent_type_name: &'a str,
        field_name: &'a str,
        return_type: TypeType<'a>,
        data: Data,
        selection_sets: Vec<&'a [Selection<'a>]>,
        location: SourcePosition,
    ) -> BoxFuture<'s, Result<Value, Nulled>> {
        Box::pin(async move {
            match return_type {
                // A `null` in a non-null position is recorded here; every
                // other failure below has already recorded its own error and
                // arrives as a bare propagation marker.
                TypeType::NonNull(inner) => {
                    if data.is_null() {
                        self.push_error(
                            format!(
                                "Cannot return null for non-nullable field \
                                 {parent_type_name}.{field_name}."
                            ),
                            location,
                        );
                        Err(Nulled)
                    } else {
                        self.complete_value(
                            parent_type_name,
                            field_name,
                            *inner,
                            data,
                            selection_sets,
                            location,
                        )
                        .await
                    }
                }

                TypeType::List(inner) => {
                    if data.is_null() {
                        return Ok(Value::Null);
                    }

                    let Some(items) = data.as_list() else {
                        self.push_error(
                            format!(
                                "Expected Iterable, but did not find one for field \
                                 {parent_type_name}.{field_name}."
                            ),
                            location,
                        );
                        return Err(Nulled);
                    };

                    let inner_non_null = inner.is_non_null();
                    let mut element_futures: Vec<BoxFuture<'_, Result<Value, Nulled>>> =
                        Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let element_executor = self.index_sub_executor(index);
                        let element_type = (*inner).clone();
                        let item = item.clone();
                        let sels = selection_sets.clone();
                        element_futures.push(Box::pin(async move {
                            match force(item).await {
                                Ok(data) => {
                                    element_executor
                                        .complete_value(
                                            parent_type_name,
                                            field_name,
                                            element_type,
                                            data,
                                            sels,
                                            location,
                                        )
                                        .await
                                }
                                Err(e) => {
                                    element_executor.push_error(e.message, location);
                                    Err(Nulled)
                                }
                            }
                        }));
                    }

                    let mut completed = Vec::with_capacity(items.len());
                    for result in future::join_all(element_futures).await {
                        match result {
                            Ok(value) => completed.push(value),
                            Err(Nulled) => {
                                if inner_non_null {
                                    return Err(Nulled);
                                }
                                completed.push(Value::Null);
                            }
                        }
                    }
                    Ok(Value::List(completed))
                }

                TypeType::Concrete(meta) => {
                    if data.is_null() {
                        return Ok(Value::Null);
                    }

                    match meta {
                        MetaType::Scalar(sm) => match (sm.serialize_fn)(&data) {
                            Some(value) => Ok(value),
                            None => {
                                self.push_error(
                                    format!(
                                        r#"Expected a value of type "{}" but received: {data:?}"#,
                                        sm.name
                                    ),
                                    location,
                                );
                                Err(Nulled)
                            }
                        },

                        MetaType::Enum(em) => match em.serialize(&data) {
                            Some(label) => Ok(Value::string(label)),
                            None => {
                                self.push_error(
                                    format!(
                                        r#"Expected a value of type "{}" but received: {data:?}"#,
                                        em.name
                                    ),
                                    location,
                                );
                                Err(Nulled)
                            }
                        },

                        MetaType::Object(obj) => self
                            .resolve_selection_set(obj, &data, selection_sets, false)
                            .await
                            .map(Value::Object),

                        MetaType::Interface(..) | MetaType::Union(..) => {
                            match self.resolve_abstract_type(meta, &data) {
                                Some(obj) => self
                                    .resolve_selection_set(obj, &data, selection_sets, false)
                                    .await
                                    .map(Value::Object),
                                None => {
                                    self.push_error(
                                        format!(
                                            "Abstract type \"{}\" must resolve to an object type \
                                             at runtime for field \
                                             \"{parent_type_name}.{field_name}\".",
                                            meta.name()
                                        ),
                                        location,
                                    );
                                    Err(Nulled)
                                }
                            }
                        }

                        MetaType::InputObject(..) => {
                            self.push_error(
                                format!(
                                    "Field \"{parent_type_name}.{field_name}\" must not use the \
                                     input type \"{}\" as its output type.",
                                    meta.name()
                                ),
                                location,
                            );
                            Err(Nulled)
                        }
                    }
                }
            }
        })
    }

    /// Picks the concrete object type for a value of an abstract type.
    ///
    /// A `resolve_type` callback on the abstract type wins; otherwise the
    /// first possible type whose `is_type_of` accepts the value is used.
    fn resolve_abstract_type(
        &self,
        abstract_meta: &'a MetaType,
        data: &Data,
    ) -> Option<&'a ObjectMeta> {
        let resolve_type = match abstract_meta {
            MetaType::Interface(im) => im.resolve_type.as_ref(),
            MetaType::Union(um) => um.resolve_type.as_ref(),
            _ => None,
        };

        if let Some(resolve_type) = resolve_type {
            let name = resolve_type(data, self.context)?;
            let meta = self.schema.concrete_type_by_name(&name)?;
            if !self.schema.is_possible_type(abstract_meta, meta) {
                return None;
            }
            match meta {
                MetaType::Object(obj) => Some(obj),
                _ => None,
            }
        } else {
            self.schema
                .possible_types(abstract_meta)
                .into_iter()
                .find_map(|t| match t {
                    MetaType::Object(obj) => match &obj.is_type_of {
                        Some(is_type_of) if is_type_of(data, self.context) => Some(obj),
                        _ => None,
                    },
                    _ => None,
                })
        }
    }
}

/// Finds the operation to execute in a parsed document.
pub(crate) fn get_operation<'a, 'd>(
    document: &'d Document<'a>,
    operation_name: Option<&str>,
) -> Result<&'d Spanning<Operation<'a>>, GraphQLError> {
    let mut operation = None;
    for def in document {
        if let Definition::Operation(op) = def {
            if operation_name.is_none() && operation.is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            let move_op =
                operation_name.is_none() || op.item.name.map(|s| s.item) == operation_name;

            if move_op {
                operation = Some(op);
            }
        }
    }

    match operation {
        Some(op) => Ok(op),
        None if operation_name.is_some() => Err(GraphQLError::UnknownOperationName),
        None => Err(GraphQLError::NoOperationProvided),
    }
}

/// Executes an already parsed and validated document.
pub(crate) async fn execute_validated_query<'a>(
    document: &'a Document<'a>,
    operation: &'a Spanning<Operation<'a>>,
    schema: &'a Schema,
    variables: &Variables,
    root_value: &Data,
    context: &Context,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let operation_type = operation.item.operation_type;

    let root_type = match operation_type {
        OperationType::Query => schema.concrete_query_type(),
        OperationType::Mutation => schema
            .concrete_mutation_type()
            .ok_or(GraphQLError::MutationNotConfigured)?,
        OperationType::Subscription => schema
            .concrete_subscription_type()
            .ok_or(GraphQLError::SubscriptionNotConfigured)?,
    };
    let MetaType::Object(root_object) = root_type else {
        // Roots are always objects; `Schema::new` only accepts `ObjectMeta`.
        unreachable!("root operation type is not an object");
    };

    let mut fragments_by_name = HashMap::new();
    for def in document {
        if let Definition::Fragment(f) = def {
            fragments_by_name.insert(f.item.name.item, &f.item);
        }
    }

    let default_variable_values = operation.item.variable_definitions.as_ref().map(|defs| {
        defs.item
            .items
            .iter()
            .filter_map(|(name, def)| {
                def.default_value
                    .as_ref()
                    .map(|i| (name.item.to_owned(), i.item.clone()))
            })
            .collect::<HashMap<String, InputValue>>()
    });

    let errors = RwLock::new(Vec::new());
    let value;

    {
        let mut all_vars;
        let mut final_vars = variables;

        if let Some(defaults) = default_variable_values {
            all_vars = variables.clone();

            for (name, value) in defaults {
                all_vars.entry(name).or_insert(value);
            }

            final_vars = &all_vars;
        }

        let executor = Executor {
            fragments: &fragments_by_name,
            variables: final_vars,
            schema,
            context,
            root_value,
            operation_type,
            errors: &errors,
            field_path: Arc::new(FieldPath::Root(operation.span.start)),
        };

        let serial = operation_type == OperationType::Mutation;
        value = match executor
            .resolve_selection_set(
                root_object,
                root_value,
                vec![&operation.item.selection_set[..]],
                serial,
            )
            .await
        {
            Ok(object) => Value::Object(object),
            Err(Nulled) => Value::Null,
        };
    }

    if context.is_cancelled() {
        return Ok((
            Value::Null,
            vec![ExecutionError::new(
                operation.span.start,
                &[],
                "Execution was cancelled",
            )],
        ));
    }

    let mut errors = errors.into_inner().unwrap();
    errors.sort();

    Ok((value, errors))
}
