/*!

# tamarack

`tamarack` is a GraphQL server library for Rust where schemas are defined at
runtime: types are registered as metadata values, fields carry plain closure
resolvers, and values flowing between resolvers are dynamically typed. This
is the natural shape for servers whose schema comes from configuration,
another IDL, or a database rather than from Rust types.

The crate contains the full query execution core:

* a type registry with construction-time schema validation,
* a query parser producing a located AST,
* a document validator running the standard validation rule set,
* bi-directional value coercion between wire values and internal values,
* an async executor with concurrent field resolution, serial mutations,
  abstract type resolution, and non-null propagation.

## Example

```rust
use tamarack::{
    execute, Context, Data, Field, ObjectMeta, Schema, SchemaConfig, Type, Variables,
};

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let schema = Schema::new(SchemaConfig::new(
    ObjectMeta::new("Query").field(
        Field::new("hello", Type::named("String"))
            .resolver(|_| Ok(Data::from("world"))),
    ),
))?;

let (result, errors) = execute(
    "{ hello }",
    None,
    &schema,
    &Variables::new(),
    &Data::Null,
    &Context::default(),
)
.await?;

assert!(errors.is_empty());
# Ok(())
# }
```

*/
#![warn(missing_docs)]

use std::fmt;

#[macro_use]
mod value;
pub mod ast;
mod executor;
pub mod http;
pub mod parser;
pub mod schema;
mod ser;
mod validation;

#[cfg(test)]
mod executor_tests;
#[cfg(test)]
mod tests;

use crate::{
    executor::{execute_validated_query, get_operation},
    parser::{parse_document_source, ParseError, Spanning},
    validation::{validate_input_values, visit_all_rules, ValidatorContext},
};

pub use crate::{
    ast::{InputValue, OperationType, Selection, Type},
    executor::{
        Arguments, Context, ExecutionError, Executor, FieldError, FieldPath, FieldResult,
        PathSegment, ResolveInfo, ResolveParams, Variables,
    },
    schema::{
        meta::{
            Argument, DeprecationStatus, EnumMeta, EnumValue, Field, InputObjectMeta,
            InterfaceMeta, MetaType, ObjectMeta, ScalarMeta, UnionMeta,
        },
        model::{DirectiveLocation, DirectiveType, Schema, SchemaConfig, SchemaError, TypeType},
        Name,
    },
    validation::RuleError,
    value::{Data, Deferred, Object, Thunk, Value},
};

/// An error that prevented query execution
#[derive(Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum GraphQLError {
    ParseError(Spanning<ParseError>),
    ValidationError(Vec<RuleError>),
    NoOperationProvided,
    MultipleOperationsProvided,
    UnknownOperationName,
    MutationNotConfigured,
    SubscriptionNotConfigured,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(error) => write!(f, "{error}"),
            Self::ValidationError(errors) => {
                for error in errors {
                    writeln!(f, "{error}")?;
                }
                Ok(())
            }
            Self::NoOperationProvided => write!(f, "Must provide an operation"),
            Self::MultipleOperationsProvided => write!(
                f,
                "Must provide operation name if query contains multiple operations"
            ),
            Self::UnknownOperationName => write!(f, "Unknown operation name"),
            Self::MutationNotConfigured => write!(f, "Schema is not configured for mutations"),
            Self::SubscriptionNotConfigured => {
                write!(f, "Schema is not configured for subscriptions")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl From<Spanning<ParseError>> for GraphQLError {
    fn from(f: Spanning<ParseError>) -> Self {
        Self::ParseError(f)
    }
}

/// Execute a query in a provided schema
///
/// Parses and validates `document_source` against `schema`, selects the
/// operation, validates the provided variable values, and drives execution.
/// Resolver errors do not surface here; they are reported in the returned
/// [`ExecutionError`] list alongside the (partial) result value.
pub async fn execute<'a>(
    document_source: &'a str,
    operation_name: Option<&str>,
    schema: &Schema,
    variables: &Variables,
    root_value: &Data,
    context: &Context,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    use tracing::Instrument as _;

    let span = tracing::debug_span!("execute", operation = operation_name.unwrap_or(""));
    let _enter = span.enter();

    let document = parse_document_source(document_source)?;

    {
        let mut ctx = ValidatorContext::new(schema, &document);
        visit_all_rules(&mut ctx, &document);

        let errors = ctx.into_errors();
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "document failed validation");
            return Err(GraphQLError::ValidationError(errors));
        }
    }

    let operation = get_operation(&document, operation_name)?;

    {
        let errors = validate_input_values(variables, operation, schema);

        if !errors.is_empty() {
            return Err(GraphQLError::ValidationError(errors));
        }
    }

    drop(_enter);
    execute_validated_query(&document, operation, schema, variables, root_value, context)
        .instrument(span)
        .await
}
