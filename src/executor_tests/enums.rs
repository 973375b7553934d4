use crate::{
    execute, graphql_value,
    ast::InputValue,
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, GraphQLError, Type, Variables,
};

// Labels map to integer payloads, like the episode numbering they stand for.
fn episode_enum() -> EnumMeta {
    EnumMeta::new(
        "Episode",
        &[
            EnumValue::new("NEW_HOPE").value(Data::Int(4)),
            EnumValue::new("EMPIRE").value(Data::Int(5)),
            EnumValue::new("JEDI").value(Data::Int(6)),
        ],
    )
}

fn test_schema() -> Schema {
    Schema::new(
        SchemaConfig::new(
            ObjectMeta::new("Query")
                .field(
                    Field::new("favorite", Type::named("Episode"))
                        .resolver(|_| Ok(Data::Int(5))),
                )
                .field(
                    Field::new("asNumber", Type::named("Int"))
                        .argument(Argument::new("episode", Type::named("Episode")))
                        .resolver(|p| Ok(p.args.get("episode").cloned().unwrap_or(Data::Null))),
                ),
        )
        .append_type(episode_enum().into_meta()),
    )
    .expect("Failed to build schema")
}

async fn run_query(query: &str, vars: Variables) -> Value {
    let schema = test_schema();
    let (result, errors) = execute(query, None, &schema, &vars, &Data::Null, &Context::default())
        .await
        .expect("Execution failed");

    assert_eq!(errors, vec![]);

    result
}

#[tokio::test]
async fn serializes_payload_to_label() {
    assert_eq!(
        run_query("{ favorite }", Variables::new()).await,
        graphql_value!({"favorite": "EMPIRE"}),
    );
}

#[tokio::test]
async fn accepts_enum_literals_as_input() {
    assert_eq!(
        run_query("{ asNumber(episode: JEDI) }", Variables::new()).await,
        graphql_value!({"asNumber": 6}),
    );
}

#[tokio::test]
async fn accepts_strings_as_variable_input() {
    let vars = [("ep".to_owned(), InputValue::String("NEW_HOPE".into()))]
        .into_iter()
        .collect();

    assert_eq!(
        run_query("query q($ep: Episode) { asNumber(episode: $ep) }", vars).await,
        graphql_value!({"asNumber": 4}),
    );
}

#[tokio::test]
async fn does_not_accept_string_literals() {
    let schema = test_schema();

    let result = execute(
        r#"{ asNumber(episode: "JEDI") }"#,
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await;

    assert!(matches!(result, Err(GraphQLError::ValidationError(..))));
}

#[tokio::test]
async fn does_not_accept_unknown_variable_labels() {
    let schema = test_schema();
    let vars: Variables = [("ep".to_owned(), InputValue::String("CLONES".into()))]
        .into_iter()
        .collect();

    let result = execute(
        "query q($ep: Episode) { asNumber(episode: $ep) }",
        None,
        &schema,
        &vars,
        &Data::Null,
        &Context::default(),
    )
    .await;

    let Err(GraphQLError::ValidationError(errors)) = result else {
        panic!("Expected a validation error, got: {result:#?}");
    };
    assert_eq!(
        errors[0].message(),
        r#"Variable "$ep" got invalid value. Invalid value for enum "Episode"."#,
    );
}
