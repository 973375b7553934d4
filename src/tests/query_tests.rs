use pretty_assertions::assert_eq;

use crate::{
    execute, graphql_value,
    ast::InputValue,
    tests::schema::star_wars_schema,
    value::{Data, Value},
    Context, Variables,
};

async fn run_query(query: &str, vars: Variables) -> Value {
    let schema = star_wars_schema();
    let (result, errors) = execute(query, None, &schema, &vars, &Data::Null, &Context::default())
        .await
        .expect("Execution failed");

    assert_eq!(errors, vec![]);

    result
}

#[tokio::test]
async fn hero_name() {
    let doc = r#"
        query HeroNameQuery {
            hero {
                name
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({"hero": {"name": "R2-D2"}}),
    );
}

#[tokio::test]
async fn hero_name_and_friends() {
    let doc = r#"
        query HeroNameAndFriendsQuery {
            hero {
                id
                name
                friends {
                    name
                }
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({
            "hero": {
                "id": "2001",
                "name": "R2-D2",
                "friends": [
                    {"name": "Luke Skywalker"},
                    {"name": "Han Solo"},
                    {"name": "Leia Organa"},
                ],
            },
        }),
    );
}

#[tokio::test]
async fn hero_of_the_empire_episode() {
    let doc = r#"
        {
            hero(episode: EMPIRE) {
                name
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({"hero": {"name": "Luke Skywalker"}}),
    );
}

#[tokio::test]
async fn human_by_id_variable() {
    let doc = r#"
        query HumanByIdQuery($id: String!) {
            human(id: $id) {
                name
            }
        }
    "#;
    let vars = [("id".to_owned(), InputValue::String("1001".into()))]
        .into_iter()
        .collect();

    assert_eq!(
        run_query(doc, vars).await,
        graphql_value!({"human": {"name": "Darth Vader"}}),
    );
}

#[tokio::test]
async fn unknown_human_id_resolves_to_null() {
    let doc = r#"
        query HumanByIdQuery($id: String!) {
            human(id: $id) {
                name
            }
        }
    "#;
    let vars = [("id".to_owned(), InputValue::String("9999".into()))]
        .into_iter()
        .collect();

    assert_eq!(
        run_query(doc, vars).await,
        graphql_value!({"human": null}),
    );
}

#[tokio::test]
async fn typename_of_the_hero() {
    let doc = r#"
        {
            hero {
                __typename
                name
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({"hero": {"__typename": "Droid", "name": "R2-D2"}}),
    );
}

#[tokio::test]
async fn fragments_on_the_hero() {
    let doc = r#"
        {
            hero {
                ...CharacterFields
                ... on Droid {
                    primaryFunction
                }
            }
        }
        fragment CharacterFields on Character {
            name
            appearsIn
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({
            "hero": {
                "name": "R2-D2",
                "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                "primaryFunction": "Astromech",
            },
        }),
    );
}

#[tokio::test]
async fn aliased_heroes() {
    let doc = r#"
        {
            luke: hero(episode: EMPIRE) { name }
            r2: hero { name }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({
            "luke": {"name": "Luke Skywalker"},
            "r2": {"name": "R2-D2"},
        }),
    );
}

#[tokio::test]
async fn nested_friends_of_friends() {
    let doc = r#"
        {
            human(id: "1002") {
                name
                friends {
                    name
                    appearsIn
                    friends {
                        name
                    }
                }
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({
            "human": {
                "name": "Han Solo",
                "friends": [
                    {
                        "name": "Luke Skywalker",
                        "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                        "friends": [
                            {"name": "Han Solo"},
                            {"name": "Leia Organa"},
                            {"name": "C-3PO"},
                            {"name": "R2-D2"},
                        ],
                    },
                    {
                        "name": "Leia Organa",
                        "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                        "friends": [
                            {"name": "Luke Skywalker"},
                            {"name": "Han Solo"},
                            {"name": "C-3PO"},
                            {"name": "R2-D2"},
                        ],
                    },
                    {
                        "name": "R2-D2",
                        "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
                        "friends": [
                            {"name": "Luke Skywalker"},
                            {"name": "Han Solo"},
                            {"name": "Leia Organa"},
                        ],
                    },
                ],
            },
        }),
    );
}

#[tokio::test]
async fn droid_primary_function() {
    let doc = r#"
        {
            droid(id: "2000") {
                name
                primaryFunction
            }
        }
    "#;

    assert_eq!(
        run_query(doc, Variables::new()).await,
        graphql_value!({"droid": {"name": "C-3PO", "primaryFunction": "Protocol"}}),
    );
}

#[tokio::test]
async fn querying_a_human_as_droid_is_rejected() {
    let schema = star_wars_schema();

    let result = execute(
        r#"{ hero { homePlanet } }"#,
        None,
        &schema,
        &Variables::new(),
        &Data::Null,
        &Context::default(),
    )
    .await;

    // `homePlanet` only exists on `Human`, not on the `Character` interface.
    assert!(matches!(result, Err(crate::GraphQLError::ValidationError(..))));
}
