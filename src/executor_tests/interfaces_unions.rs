use crate::{
    execute, graphql_value,
    schema::{
        meta::{Field, InterfaceMeta, ObjectMeta, UnionMeta},
        model::{Schema, SchemaConfig},
    },
    value::{Data, Value},
    Context, Type, Variables,
};

mod interfaces {
    use super::*;

    // Concrete types are picked by `resolve_type` on the interface, keyed off
    // a discriminator entry in the value.
    fn test_schema() -> Schema {
        Schema::new(
            SchemaConfig::new(
                ObjectMeta::new("Query").field(
                    Field::new("pets", Type::named("Pet").list()).resolver(|_| {
                        Ok(Data::list([
                            Data::map([
                                ("kind", Data::from("dog")),
                                ("name", Data::from("Odie")),
                                ("woofs", Data::from(true)),
                            ]),
                            Data::map([
                                ("kind", Data::from("cat")),
                                ("name", Data::from("Garfield")),
                                ("meows", Data::from(false)),
                            ]),
                        ]))
                    }),
                ),
            )
            .append_type(
                InterfaceMeta::new("Pet")
                    .field(Field::new("name", Type::named("String")))
                    .resolve_type(|value, _| {
                        value.as_map().and_then(|m| m.get("kind")).and_then(Data::as_str).map(
                            |kind| {
                                if kind == "dog" {
                                    "Dog".into()
                                } else {
                                    "Cat".into()
                                }
                            },
                        )
                    })
                    .into_meta(),
            )
            .append_type(
                ObjectMeta::new("Dog")
                    .field(Field::new("name", Type::named("String")))
                    .field(Field::new("woofs", Type::named("Boolean")))
                    .interfaces(&["Pet"])
                    .into_meta(),
            )
            .append_type(
                ObjectMeta::new("Cat")
                    .field(Field::new("name", Type::named("String")))
                    .field(Field::new("meows", Type::named("Boolean")))
                    .interfaces(&["Pet"])
                    .into_meta(),
            ),
        )
        .expect("Failed to build schema")
    }

    #[tokio::test]
    async fn resolves_concrete_types_at_runtime() {
        let schema = test_schema();
        let doc = r#"
          {
            pets {
              __typename
              name
              ... on Dog { woofs }
              ... on Cat { meows }
            }
          }
        "#;

        let (result, errors) = execute(
            doc,
            None,
            &schema,
            &Variables::new(),
            &Data::Null,
            &Context::default(),
        )
        .await
        .expect("Execution failed");

        assert_eq!(errors, vec![]);
        assert_eq!(
            result,
            graphql_value!({
                "pets": [
                    {"__typename": "Dog", "name": "Odie", "woofs": true},
                    {"__typename": "Cat", "name": "Garfield", "meows": false},
                ],
            }),
        );
    }

    #[tokio::test]
    async fn interface_fields_resolve_without_fragments() {
        let schema = test_schema();

        let (result, errors) = execute(
            "{ pets { name } }",
            None,
            &schema,
            &Variables::new(),
            &Data::Null,
            &Context::default(),
        )
        .await
        .expect("Execution failed");

        assert_eq!(errors, vec![]);
        assert_eq!(
            result,
            graphql_value!({"pets": [{"name": "Odie"}, {"name": "Garfield"}]}),
        );
    }
}

mod unions {
    use super::*;

    struct Dog {
        name: &'static str,
        woofs: bool,
    }

    struct Cat {
        name: &'static str,
        meows: bool,
    }

    // Concrete types are picked by `is_type_of` probes over opaque values;
    // the union itself carries no `resolve_type` callback.
    fn test_schema() -> Schema {
        Schema::new(
            SchemaConfig::new(
                ObjectMeta::new("Query").field(
                    Field::new("pets", Type::named("DogOrCat").list()).resolver(|_| {
                        Ok(Data::list([
                            Data::any(Dog {
                                name: "Odie",
                                woofs: true,
                            }),
                            Data::any(Cat {
                                name: "Garfield",
                                meows: false,
                            }),
                        ]))
                    }),
                ),
            )
            .append_type(
                ObjectMeta::new("Dog")
                    .field(
                        Field::new("name", Type::named("String")).resolver(|p| {
                            Ok(p.source
                                .downcast_ref::<Dog>()
                                .map(|d| Data::from(d.name))
                                .unwrap_or(Data::Null))
                        }),
                    )
                    .field(
                        Field::new("woofs", Type::named("Boolean")).resolver(|p| {
                            Ok(p.source
                                .downcast_ref::<Dog>()
                                .map(|d| Data::from(d.woofs))
                                .unwrap_or(Data::Null))
                        }),
                    )
                    .is_type_of(|value, _| value.downcast_ref::<Dog>().is_some())
                    .into_meta(),
            )
            .append_type(
                ObjectMeta::new("Cat")
                    .field(
                        Field::new("name", Type::named("String")).resolver(|p| {
                            Ok(p.source
                                .downcast_ref::<Cat>()
                                .map(|c| Data::from(c.name))
                                .unwrap_or(Data::Null))
                        }),
                    )
                    .field(
                        Field::new("meows", Type::named("Boolean")).resolver(|p| {
                            Ok(p.source
                                .downcast_ref::<Cat>()
                                .map(|c| Data::from(c.meows))
                                .unwrap_or(Data::Null))
                        }),
                    )
                    .is_type_of(|value, _| value.downcast_ref::<Cat>().is_some())
                    .into_meta(),
            )
            .append_type(UnionMeta::new("DogOrCat", &["Dog", "Cat"]).into_meta()),
        )
        .expect("Failed to build schema")
    }

    #[tokio::test]
    async fn is_type_of_picks_the_concrete_type() {
        let schema = test_schema();
        let doc = r#"
          {
            pets {
              __typename
              ... on Dog { name woofs }
              ... on Cat { name meows }
            }
          }
        "#;

        let (result, errors) = execute(
            doc,
            None,
            &schema,
            &Variables::new(),
            &Data::Null,
            &Context::default(),
        )
        .await
        .expect("Execution failed");

        assert_eq!(errors, vec![]);
        assert_eq!(
            result,
            graphql_value!({
                "pets": [
                    {"__typename": "Dog", "name": "Odie", "woofs": true},
                    {"__typename": "Cat", "name": "Garfield", "meows": false},
                ],
            }),
        );
    }

    #[tokio::test]
    async fn typename_resolves_on_union_members() {
        let schema = test_schema();

        let (result, errors) = execute(
            "{ pets { __typename } }",
            None,
            &schema,
            &Variables::new(),
            &Data::Null,
            &Context::default(),
        )
        .await
        .expect("Execution failed");

        assert_eq!(errors, vec![]);
        assert_eq!(
            result,
            graphql_value!({"pets": [{"__typename": "Dog"}, {"__typename": "Cat"}]}),
        );
    }
}
