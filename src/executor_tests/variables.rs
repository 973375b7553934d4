use crate::{
    execute, graphql_value,
    ast::InputValue,
    schema::{
        meta::{Argument, Field, InputObjectMeta, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, GraphQLError, Type, Variables,
};

fn test_schema() -> Schema {
    Schema::new(
        SchemaConfig::new(
            ObjectMeta::new("TestType")
                .field(
                    Field::new("fieldWithObjectInput", Type::named("String"))
                        .argument(Argument::new("input", Type::named("TestInputObject")))
                        .resolver(|p| {
                            let Some(input) = p.args.get("input").and_then(Data::as_map) else {
                                return Ok(Data::Null);
                            };
                            // Echo the `c` member so coercion results are
                            // observable.
                            Ok(input.get("c").cloned().unwrap_or(Data::Null))
                        }),
                )
                .field(
                    Field::new("fieldWithDefaultArgumentValue", Type::named("String"))
                        .argument(
                            Argument::new("input", Type::named("String"))
                                .default_value(InputValue::String("Hello World".into())),
                        )
                        .resolver(|p| Ok(p.args.get("input").cloned().unwrap_or(Data::Null))),
                )
                .field(
                    Field::new("fieldWithNonNullableStringInput", Type::named("String"))
                        .argument(Argument::new("input", Type::named("String").non_null()))
                        .resolver(|p| Ok(p.args.get("input").cloned().unwrap_or(Data::Null))),
                )
                .field(
                    Field::new("list", Type::named("String"))
                        .argument(Argument::new("input", Type::named("String").list()))
                        .resolver(|p| {
                            let joined = p
                                .args
                                .get("input")
                                .and_then(Data::as_list)
                                .map(|l| {
                                    l.iter()
                                        .map(|v| v.as_str().unwrap_or("null"))
                                        .collect::<Vec<_>>()
                                        .join(",")
                                });
                            Ok(joined.map(Data::from).unwrap_or(Data::Null))
                        }),
                ),
        )
        .append_type(
            InputObjectMeta::new("TestInputObject")
                .field(Argument::new("a", Type::named("String")))
                .field(Argument::new("b", Type::named("String").list()))
                .field(Argument::new("c", Type::named("String").non_null()))
                .field(
                    Argument::new("d", Type::named("String"))
                        .default_value(InputValue::String("DefaultD".into())),
                )
                .into_meta(),
        ),
    )
    .expect("Failed to build schema")
}

async fn run_variable_query(query: &str, vars: Variables) -> Value {
    let schema = test_schema();
    let (result, errors) = execute(query, None, &schema, &vars, &Data::Null, &Context::default())
        .await
        .expect("Execution failed");

    assert_eq!(errors, vec![]);

    result
}

async fn run_query(query: &str) -> Value {
    run_variable_query(query, Variables::new()).await
}

#[tokio::test]
async fn inline_complex_input() {
    assert_eq!(
        run_query(r#"{ fieldWithObjectInput(input: {a: "foo", b: ["bar"], c: "baz"}) }"#).await,
        graphql_value!({"fieldWithObjectInput": "baz"}),
    );
}

#[tokio::test]
async fn variable_complex_input() {
    let vars = [(
        "input".to_owned(),
        InputValue::object(
            [
                ("a".to_owned(), InputValue::String("foo".into())),
                ("b".to_owned(), InputValue::list(vec!["bar".into()])),
                ("c".to_owned(), InputValue::String("baz".into())),
            ]
            .into_iter()
            .collect(),
        ),
    )]
    .into_iter()
    .collect();

    assert_eq!(
        run_variable_query(
            "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
            vars,
        )
        .await,
        graphql_value!({"fieldWithObjectInput": "baz"}),
    );
}

#[tokio::test]
async fn missing_required_input_object_field_is_an_error() {
    let schema = test_schema();
    let vars: Variables = [(
        "input".to_owned(),
        InputValue::object(
            [("a".to_owned(), InputValue::String("foo".into()))]
                .into_iter()
                .collect(),
        ),
    )]
    .into_iter()
    .collect();

    let result = execute(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
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
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        r#"Variable "$input" got invalid value. In field "c": Expected "String!", found null."#,
    );
}

#[tokio::test]
async fn unknown_input_object_field_is_an_error() {
    let schema = test_schema();
    let vars: Variables = [(
        "input".to_owned(),
        InputValue::object(
            [
                ("c".to_owned(), InputValue::String("baz".into())),
                ("extra".to_owned(), InputValue::String("nope".into())),
            ]
            .into_iter()
            .collect(),
        ),
    )]
    .into_iter()
    .collect();

    let result = execute(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
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
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        r#"Variable "$input" got invalid value. In field "extra": Unknown field."#,
    );
}

#[tokio::test]
async fn required_variable_must_be_provided() {
    let schema = test_schema();

    let result = execute(
        "query q($value: String!) { fieldWithNonNullableStringInput(input: $value) }",
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await;

    let Err(GraphQLError::ValidationError(errors)) = result else {
        panic!("Expected a validation error, got: {result:#?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        r#"Variable "$value" of required type "String!" was not provided."#,
    );
}

#[tokio::test]
async fn wrongly_typed_variable_is_an_error() {
    let schema = test_schema();
    let vars: Variables = [("value".to_owned(), InputValue::Int(42))]
        .into_iter()
        .collect();

    let result = execute(
        "query q($value: String!) { fieldWithNonNullableStringInput(input: $value) }",
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
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        r#"Variable "$value" got invalid value. Expected input scalar `String`. Got: `42`."#,
    );
}

#[tokio::test]
async fn uses_argument_default_when_absent() {
    assert_eq!(
        run_query("{ fieldWithDefaultArgumentValue }").await,
        graphql_value!({"fieldWithDefaultArgumentValue": "Hello World"}),
    );
}

#[tokio::test]
async fn uses_variable_default_when_variable_absent() {
    assert_eq!(
        run_query(
            r#"query q($input: String = "Variable Default") {
              fieldWithDefaultArgumentValue(input: $input)
            }"#,
        )
        .await,
        graphql_value!({"fieldWithDefaultArgumentValue": "Variable Default"}),
    );
}

#[tokio::test]
async fn provided_variable_overrides_defaults() {
    let vars = [("input".to_owned(), InputValue::String("Provided".into()))]
        .into_iter()
        .collect();

    assert_eq!(
        run_variable_query(
            r#"query q($input: String = "Variable Default") {
              fieldWithDefaultArgumentValue(input: $input)
            }"#,
            vars,
        )
        .await,
        graphql_value!({"fieldWithDefaultArgumentValue": "Provided"}),
    );
}

#[tokio::test]
async fn input_object_field_defaults_are_applied() {
    let schema = Schema::new(
        SchemaConfig::new(ObjectMeta::new("TestType").field(
            Field::new("echoD", Type::named("String"))
                .argument(Argument::new("input", Type::named("TestInputObject")))
                .resolver(|p| {
                    Ok(p.args
                        .get("input")
                        .and_then(Data::as_map)
                        .and_then(|m| m.get("d"))
                        .cloned()
                        .unwrap_or(Data::Null))
                }),
        ))
        .append_type(
            InputObjectMeta::new("TestInputObject")
                .field(Argument::new("c", Type::named("String").non_null()))
                .field(
                    Argument::new("d", Type::named("String"))
                        .default_value(InputValue::String("DefaultD".into())),
                )
                .into_meta(),
        ),
    )
    .unwrap();

    let (result, errors) = execute(
        r#"{ echoD(input: {c: "x"}) }"#,
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(errors, vec![]);
    assert_eq!(result, graphql_value!({"echoD": "DefaultD"}));
}

#[tokio::test]
async fn single_value_is_coerced_into_a_list() {
    assert_eq!(
        run_query(r#"{ list(input: "single") }"#).await,
        graphql_value!({"list": "single"}),
    );
    assert_eq!(
        run_query(r#"{ list(input: ["a", "b"]) }"#).await,
        graphql_value!({"list": "a,b"}),
    );
}
