use pretty_assertions::assert_eq;

use crate::{
    execute, graphql_value,
    executor::ExecutionError,
    parser::SourcePosition,
    schema::{
        meta::{Field, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, Type, Variables,
};

fn test_schema() -> Schema {
    Schema::new(SchemaConfig::new(
        ObjectMeta::new("DataType")
            .field(Field::new("sync", Type::named("String")))
            .field(Field::new("nonNullSync", Type::named("String").non_null()))
            .field(Field::new("promise", Type::named("String")))
            .field(Field::new("nonNullPromise", Type::named("String").non_null()))
            .field(Field::new("nest", Type::named("DataType")))
            .field(Field::new("nonNullNest", Type::named("DataType").non_null()))
            .field(Field::new("promiseNest", Type::named("DataType")))
            .field(Field::new(
                "nonNullPromiseNest",
                Type::named("DataType").non_null(),
            )),
    ))
    .expect("Failed to build schema")
}

// Every leaf resolution fails; the nest fields recurse into the same data.
fn throwing_data() -> Data {
    Data::map([
        ("sync", Data::thunk(|| Err("sync".into()))),
        ("nonNullSync", Data::thunk(|| Err("nonNullSync".into()))),
        ("promise", Data::deferred(|| async { Err("promise".into()) })),
        (
            "nonNullPromise",
            Data::deferred(|| async { Err("nonNullPromise".into()) }),
        ),
        ("nest", Data::thunk(|| Ok(throwing_data()))),
        ("nonNullNest", Data::thunk(|| Ok(throwing_data()))),
        ("promiseNest", Data::deferred(|| async { Ok(throwing_data()) })),
        (
            "nonNullPromiseNest",
            Data::deferred(|| async { Ok(throwing_data()) }),
        ),
    ])
}

// Every leaf resolves to `null`; the nest fields recurse into the same data.
fn nulling_data() -> Data {
    Data::map([
        ("sync", Data::thunk(|| Ok(Data::Null))),
        ("nonNullSync", Data::thunk(|| Ok(Data::Null))),
        ("promise", Data::deferred(|| async { Ok(Data::Null) })),
        ("nonNullPromise", Data::deferred(|| async { Ok(Data::Null) })),
        ("nest", Data::thunk(|| Ok(nulling_data()))),
        ("nonNullNest", Data::thunk(|| Ok(nulling_data()))),
        ("promiseNest", Data::deferred(|| async { Ok(nulling_data()) })),
        (
            "nonNullPromiseNest",
            Data::deferred(|| async { Ok(nulling_data()) }),
        ),
    ])
}

async fn run_query(query: &str, root: Data) -> (Value, Vec<ExecutionError>) {
    let schema = test_schema();
    execute(
        query,
        None,
        &schema,
        &Variables::new(),
        &root,
        &Context::default(),
    )
    .await
    .expect("Execution failed")
}

#[tokio::test]
async fn nulls_a_nullable_field_that_throws_synchronously() {
    let doc = r#"
      query Q {
        sync
      }
    "#;

    let (data, errors) = run_query(doc, throwing_data()).await;

    assert_eq!(data, graphql_value!({"sync": null}));
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(25, 2, 8),
            &["sync"],
            "sync",
        )],
    );
}

#[tokio::test]
async fn nulls_a_nullable_field_that_throws_in_a_promise() {
    let doc = r#"
      query Q {
        promise
      }
    "#;

    let (data, errors) = run_query(doc, throwing_data()).await;

    assert_eq!(data, graphql_value!({"promise": null}));
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(25, 2, 8),
            &["promise"],
            "promise",
        )],
    );
}

#[tokio::test]
async fn nulls_a_nullable_field_that_returns_null() {
    let doc = r#"
      query Q {
        sync
      }
    "#;

    let (data, errors) = run_query(doc, nulling_data()).await;

    assert_eq!(data, graphql_value!({"sync": null}));
    assert_eq!(errors, vec![]);
}

#[tokio::test]
async fn nulls_a_nullable_parent_if_a_non_nullable_field_returns_null() {
    let doc = r#"
      query Q {
        nest {
          nonNullSync
        }
      }
    "#;

    let (data, errors) = run_query(doc, nulling_data()).await;

    assert_eq!(data, graphql_value!({"nest": null}));
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(42, 3, 10),
            &["nest", "nonNullSync"],
            "Cannot return null for non-nullable field DataType.nonNullSync.",
        )],
    );
}

#[tokio::test]
async fn nulls_a_nullable_parent_if_a_non_nullable_field_throws() {
    let doc = r#"
      query Q {
        nest {
          nonNullSync
        }
      }
    "#;

    let (data, errors) = run_query(doc, throwing_data()).await;

    assert_eq!(data, graphql_value!({"nest": null}));
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(42, 3, 10),
            &["nest", "nonNullSync"],
            "nonNullSync",
        )],
    );
}

#[tokio::test]
async fn null_bubbles_through_non_nullable_parents_to_the_nearest_nullable() {
    let doc = r#"
      query Q {
        nest {
          nonNullNest {
            nonNullPromise
          }
        }
      }
    "#;

    let (data, errors) = run_query(doc, nulling_data()).await;

    assert_eq!(data, graphql_value!({"nest": null}));
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(68, 4, 12),
            &["nest", "nonNullNest", "nonNullPromise"],
            "Cannot return null for non-nullable field DataType.nonNullPromise.",
        )],
    );
}

#[tokio::test]
async fn null_at_a_non_nullable_root_field_nulls_the_data() {
    let doc = r#"
      query Q {
        nonNullSync
      }
    "#;

    let (data, errors) = run_query(doc, nulling_data()).await;

    assert_eq!(data, Value::Null);
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(25, 2, 8),
            &["nonNullSync"],
            "Cannot return null for non-nullable field DataType.nonNullSync.",
        )],
    );
}

#[tokio::test]
async fn error_at_a_non_nullable_root_field_nulls_the_data() {
    let doc = r#"
      query Q {
        nonNullPromise
      }
    "#;

    let (data, errors) = run_query(doc, throwing_data()).await;

    assert_eq!(data, Value::Null);
    assert_eq!(
        errors,
        vec![ExecutionError::new(
            SourcePosition::new(25, 2, 8),
            &["nonNullPromise"],
            "nonNullPromise",
        )],
    );
}

#[tokio::test]
async fn sibling_fields_keep_resolving_when_one_throws() {
    let doc = r#"
      query Q {
        nest {
          sync
          promise
        }
      }
    "#;

    let (data, errors) = run_query(doc, throwing_data()).await;

    assert_eq!(data, graphql_value!({"nest": {"sync": null, "promise": null}}));
    assert_eq!(
        errors,
        vec![
            ExecutionError::new(SourcePosition::new(42, 3, 10), &["nest", "sync"], "sync"),
            ExecutionError::new(
                SourcePosition::new(57, 4, 10),
                &["nest", "promise"],
                "promise",
            ),
        ],
    );
}

#[tokio::test]
async fn deep_nullable_chains_null_only_the_failing_subtree() {
    let doc = r#"
      query Q {
        nest {
          nest {
            sync
          }
          promiseNest {
            sync
          }
        }
      }
    "#;

    let (data, errors) = run_query(doc, nulling_data()).await;

    assert_eq!(
        data,
        graphql_value!({
            "nest": {
                "nest": {"sync": null},
                "promiseNest": {"sync": null},
            },
        }),
    );
    assert_eq!(errors, vec![]);
}
