//! Wire-format request and response envelopes
//!
//! Serde representations of the standard GraphQL request and response
//! shapes, independent of any particular server library.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::{
    ast::InputValue,
    executor::{Context, ExecutionError, Variables},
    schema::model::Schema,
    value::{Data, Value},
    GraphQLError,
};

/// The expected structure of the decoded JSON document for POST requests
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphQLRequest {
    /// The query source.
    pub query: String,

    /// The name of the operation to run, for documents containing several.
    #[serde(rename = "operationName")]
    operation_name: Option<String>,

    /// The out-of-band variable values, as a JSON object.
    variables: Option<InputValue>,
}

impl GraphQLRequest {
    /// Constructs a new request from parts.
    pub fn new(
        query: String,
        operation_name: Option<String>,
        variables: Option<InputValue>,
    ) -> Self {
        Self {
            query,
            operation_name,
            variables,
        }
    }

    /// The name of the operation to run, if any.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// The provided variable values as a [`Variables`] map.
    pub fn variables(&self) -> Variables {
        self.variables
            .as_ref()
            .and_then(|iv| {
                iv.to_object_value()
                    .map(|o| o.into_iter().map(|(k, v)| (k.into(), v.clone())).collect())
            })
            .unwrap_or_default()
    }

    /// Executes this request against the provided schema.
    pub async fn execute(
        &self,
        schema: &Schema,
        root_value: &Data,
        context: &Context,
    ) -> GraphQLResponse {
        GraphQLResponse(
            crate::execute(
                &self.query,
                self.operation_name(),
                schema,
                &self.variables(),
                root_value,
                context,
            )
            .await,
        )
    }
}

/// Simple wrapper around the result of executing a GraphQL operation
///
/// Serializes to the standard `{data, errors}` shape; use it to convert
/// execution results into responses in whatever server this library is
/// embedded in.
#[derive(Debug)]
pub struct GraphQLResponse(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl GraphQLResponse {
    /// Constructs an error response outside of the normal execution flow.
    pub fn error(error: GraphQLError) -> Self {
        Self(Err(error))
    }

    /// Was the request successful or not?
    ///
    /// Note that a request with field errors and partial data is still
    /// considered successful.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }
}

impl From<Result<(Value, Vec<ExecutionError>), GraphQLError>> for GraphQLResponse {
    fn from(r: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(r)
    }
}

impl Serialize for GraphQLResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Ok((res, errors)) => {
                let mut map = serializer.serialize_map(None)?;

                map.serialize_entry("data", res)?;

                if !errors.is_empty() {
                    map.serialize_entry("errors", errors)?;
                }

                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("errors", err)?;
                map.end()
            }
        }
    }
}
