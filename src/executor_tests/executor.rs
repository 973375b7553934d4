use std::sync::{Arc, Mutex};

use crate::{
    execute, graphql_value,
    schema::{
        meta::{Argument, Field, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, GraphQLError, Type, Variables,
};

async fn run(schema: &Schema, query: &str, context: &Context) -> Value {
    let (result, errors) = execute(query, None, schema, &Variables::new(), &Data::Null, context)
        .await
        .expect("Execution failed");

    assert_eq!(errors, vec![]);

    result
}

#[tokio::test]
async fn hello_world() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("RootQueryType").field(
            Field::new("hello", Type::named("String"))
                .description("Returns `world`")
                .resolver(|_| Ok(Data::from("world"))),
        ),
    ))
    .unwrap();

    assert_eq!(
        run(&schema, "{ hello }", &Context::default()).await,
        graphql_value!({"hello": "world"}),
    );
}

#[tokio::test]
async fn threads_context_values_through() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query").field(
            Field::new("value", Type::named("String"))
                .argument(Argument::new("key", Type::named("String")))
                .resolver(|p| {
                    let key = p.args.get("key").and_then(Data::as_str).unwrap_or_default();
                    Ok(p.context.get(key).cloned().unwrap_or(Data::Null))
                }),
        ),
    ))
    .unwrap();

    let context = Context::new(Data::map([("a", Data::from("xyz"))]));

    assert_eq!(
        run(&schema, r#"{ value(key:"a") }"#, &context).await,
        graphql_value!({"value": "xyz"}),
    );
}

#[tokio::test]
async fn empty_string_is_not_null() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(
                Field::new("checkEmptyArg", Type::named("String"))
                    .argument(Argument::new("arg", Type::named("String")))
                    .resolver(|p| {
                        assert_eq!(p.args.get("arg").and_then(Data::as_str), Some(""));
                        Ok(Data::from("yay"))
                    }),
            )
            .field(
                Field::new("checkEmptyResult", Type::named("String"))
                    .resolver(|_| Ok(Data::from(""))),
            ),
    ))
    .unwrap();

    assert_eq!(
        run(
            &schema,
            r#"{ checkEmptyArg(arg:"") checkEmptyResult }"#,
            &Context::default(),
        )
        .await,
        graphql_value!({"checkEmptyArg": "yay", "checkEmptyResult": ""}),
    );
}

#[tokio::test]
async fn respects_aliases_and_response_key_order() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(Field::new("a", Type::named("String")).resolver(|_| Ok(Data::from("a"))))
            .field(Field::new("b", Type::named("String")).resolver(|_| Ok(Data::from("b")))),
    ))
    .unwrap();

    let result = run(&schema, "{ second: b, first: a, b }", &Context::default()).await;
    let object = result.as_object_value().unwrap();

    assert_eq!(
        object.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        vec!["second", "first", "b"],
    );
    assert_eq!(result, graphql_value!({"second": "b", "first": "a", "b": "b"}));
}

#[tokio::test]
async fn merges_selections_under_the_same_response_key() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query").field(
            Field::new("nested", Type::named("Nested")).resolver(|_| {
                Ok(Data::map([
                    ("a", Data::from("a")),
                    ("b", Data::from("b")),
                ]))
            }),
        ))
        .append_type(
            ObjectMeta::new("Nested")
                .field(Field::new("a", Type::named("String")))
                .field(Field::new("b", Type::named("String")))
                .into_meta(),
        ),
    )
    .unwrap();

    assert_eq!(
        run(
            &schema,
            "{ nested { a } nested { b } }",
            &Context::default(),
        )
        .await,
        graphql_value!({"nested": {"a": "a", "b": "b"}}),
    );
}

#[tokio::test]
async fn default_resolver_reads_response_keys_off_maps() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query").field(Field::new("inner", Type::named("Inner")).resolver(|_| {
            Ok(Data::map([
                ("scalar", Data::from(123)),
                ("lazy", Data::thunk(|| Ok(Data::from(true)))),
            ]))
        }))
    )
    .append_type(
        ObjectMeta::new("Inner")
            .field(Field::new("scalar", Type::named("Int")))
            .field(Field::new("lazy", Type::named("Boolean")))
            .into_meta(),
    ))
    .unwrap();

    assert_eq!(
        run(&schema, "{ inner { scalar lazy } }", &Context::default()).await,
        graphql_value!({"inner": {"scalar": 123, "lazy": true}}),
    );
}

#[tokio::test]
async fn lists_complete_each_element() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(
                Field::new("nullableList", Type::named("String").list())
                    .resolver(|_| Ok(Data::list([Data::from("a"), Data::Null, Data::from("c")]))),
            )
            .field(
                Field::new("deferredList", Type::named("Int").list()).resolver(|_| {
                    Ok(Data::list([
                        Data::deferred(|| async { Ok(Data::from(1)) }),
                        Data::deferred(|| async { Ok(Data::from(2)) }),
                    ]))
                }),
            ),
    ))
    .unwrap();

    assert_eq!(
        run(
            &schema,
            "{ nullableList deferredList }",
            &Context::default(),
        )
        .await,
        graphql_value!({
            "nullableList": ["a", null, "c"],
            "deferredList": [1, 2],
        }),
    );
}

#[tokio::test]
async fn null_element_in_non_null_list_nulls_the_list() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query").field(
            Field::new("items", Type::named("String").non_null().list())
                .resolver(|_| Ok(Data::list([Data::from("a"), Data::Null]))),
        ),
    ))
    .unwrap();

    let (result, errors) = execute(
        "{ items }",
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(result, graphql_value!({"items": null}));
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Cannot return null for non-nullable field Query.items.",
    );
}

#[tokio::test]
async fn mutations_run_in_document_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let field = |name: &str, log: Arc<Mutex<Vec<String>>>| {
        let tag = name.to_owned();
        Field::new(name, Type::named("Int")).resolver(move |_| {
            log.lock().unwrap().push(tag.clone());
            Ok(Data::from(1))
        })
    };

    let schema = Schema::new(
        SchemaConfig::new(
            ObjectMeta::new("Query")
                .field(Field::new("unused", Type::named("Int")).resolver(|_| Ok(Data::from(0)))),
        )
        .mutation(
            ObjectMeta::new("Mutation")
                .field(field("first", log.clone()))
                .field(field("second", log.clone()))
                .field(field("third", log.clone())),
        ),
    )
    .unwrap();

    let result = run(
        &schema,
        "mutation M { third: third, first, second }",
        &Context::default(),
    )
    .await;

    assert_eq!(
        result,
        graphql_value!({"third": 1, "first": 1, "second": 1}),
    );
    assert_eq!(
        *log.lock().unwrap(),
        vec!["third".to_owned(), "first".to_owned(), "second".to_owned()],
    );
}

#[tokio::test]
async fn mutation_without_mutation_root_is_an_error() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(Field::new("a", Type::named("String")).resolver(|_| Ok(Data::from("a")))),
    ))
    .unwrap();

    let result = execute(
        "mutation M { a }",
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await;

    assert_eq!(result, Err(GraphQLError::MutationNotConfigured));
}

#[tokio::test]
async fn multiple_operations_require_a_name() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(Field::new("a", Type::named("String")).resolver(|_| Ok(Data::from("a")))),
    ))
    .unwrap();

    let result = execute(
        "query A { a } query B { a }",
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await;

    assert_eq!(result, Err(GraphQLError::MultipleOperationsProvided));

    let (result, errors) = execute(
        "query A { a } query B { a }",
        Some("B"),
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(errors, vec![]);
    assert_eq!(result, graphql_value!({"a": "a"}));
}

#[tokio::test]
async fn cancelled_requests_return_no_partial_data() {
    let schema = Schema::new(SchemaConfig::new(
        ObjectMeta::new("Query")
            .field(Field::new("a", Type::named("String")).resolver(|_| Ok(Data::from("a")))),
    ))
    .unwrap();

    let context = Context::default();
    context.cancel();

    let (result, errors) = execute(
        "{ a }",
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &context,
    )
    .await
    .expect("Execution failed");

    assert_eq!(result, Value::Null);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Execution was cancelled");
}

#[tokio::test]
async fn resolver_source_is_the_parent_value() {
    let schema = Schema::new(
        SchemaConfig::new(ObjectMeta::new("Query").field(
            Field::new("counter", Type::named("Counter")).resolver(|_| Ok(Data::from(41))),
        ))
        .append_type(
            ObjectMeta::new("Counter")
                .field(
                    Field::new("next", Type::named("Int")).resolver(|p| {
                        Ok(Data::from(p.source.as_int().unwrap_or_default() + 1))
                    }),
                )
                .into_meta(),
        ),
    )
    .unwrap();

    assert_eq!(
        run(&schema, "{ counter { next } }", &Context::default()).await,
        graphql_value!({"counter": {"next": 42}}),
    );
}
