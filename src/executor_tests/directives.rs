use pretty_assertions::assert_eq;

use crate::{
    execute, graphql_value,
    schema::{
        meta::{Field, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, Type, Variables,
};

fn test_schema() -> Schema {
    Schema::new(SchemaConfig::new(
        ObjectMeta::new("TestType")
            .field(Field::new("a", Type::named("String")))
            .field(Field::new("b", Type::named("String"))),
    ))
    .expect("Failed to build schema")
}

fn test_data() -> Data {
    Data::map([
        ("a", Data::thunk(|| Ok(Data::from("a")))),
        ("b", Data::thunk(|| Ok(Data::from("b")))),
    ])
}

async fn run_query(query: &str) -> Value {
    let schema = test_schema();
    let (result, errors) = execute(
        query,
        None,
        &schema,
        &Variables::new(),
        &test_data(),
        &Context::default(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(errors, vec![]);

    result
}

#[tokio::test]
async fn without_directives() {
    assert_eq!(run_query("{ a, b }").await, graphql_value!({"a": "a", "b": "b"}));
}

#[tokio::test]
async fn include_true_includes_scalar() {
    assert_eq!(
        run_query("{ a, b @include(if: true) }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn include_false_omits_scalar() {
    assert_eq!(
        run_query("{ a, b @include(if: false) }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn skip_false_includes_scalar() {
    assert_eq!(
        run_query("{ a, b @skip(if: false) }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn skip_true_omits_scalar() {
    assert_eq!(
        run_query("{ a, b @skip(if: true) }").await,
        graphql_value!({"a": "a"}),
    );
}

// When `@include` and `@skip` disagree, a true `@skip` always wins.

#[tokio::test]
async fn include_true_skip_false() {
    assert_eq!(
        run_query("{ a, b @include(if: true) @skip(if: false) }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn include_true_skip_true() {
    assert_eq!(
        run_query("{ a, b @include(if: true) @skip(if: true) }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn include_false_skip_true() {
    assert_eq!(
        run_query("{ a, b @include(if: false) @skip(if: true) }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn include_false_skip_false() {
    assert_eq!(
        run_query("{ a, b @include(if: false) @skip(if: false) }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn fragment_spread_include_false() {
    assert_eq!(
        run_query("{ a, ...Frag @include(if: false) } fragment Frag on TestType { b }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn fragment_spread_include_true() {
    assert_eq!(
        run_query("{ a, ...Frag @include(if: true) } fragment Frag on TestType { b }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn fragment_spread_skip_true() {
    assert_eq!(
        run_query("{ a, ...Frag @skip(if: true) } fragment Frag on TestType { b }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn inline_fragment_include_false() {
    assert_eq!(
        run_query("{ a, ... on TestType @include(if: false) { b } }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn inline_fragment_skip_false() {
    assert_eq!(
        run_query("{ a, ... on TestType @skip(if: false) { b } }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn anonymous_inline_fragment_skip_true() {
    assert_eq!(
        run_query("{ a, ... @skip(if: true) { b } }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn directive_arguments_accept_variables() {
    let schema = test_schema();
    let vars = [("yes".to_owned(), crate::InputValue::Boolean(true))]
        .into_iter()
        .collect();

    let (result, errors) = execute(
        "query Q($yes: Boolean!) { a, b @skip(if: $yes) }",
        None,
        &schema,
        &vars,
        &test_data(),
        &Context::default(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(errors, vec![]);
    assert_eq!(result, graphql_value!({"a": "a"}));
}
