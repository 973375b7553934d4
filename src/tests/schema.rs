use std::sync::Arc;

use crate::{
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, InterfaceMeta, ObjectMeta},
        model::{Schema, SchemaConfig},
    },
    tests::model::{Character, CharacterKind, Database},
    value::Data,
    ResolveParams, Type,
};

fn episode_enum() -> EnumMeta {
    EnumMeta::new(
        "Episode",
        &[
            EnumValue::new("NEW_HOPE").value(Data::Int(4)),
            EnumValue::new("EMPIRE").value(Data::Int(5)),
            EnumValue::new("JEDI").value(Data::Int(6)),
        ],
    )
    .description("One of the films in the Star Wars Trilogy")
}

fn source_character<'a>(p: &'a ResolveParams<'_>) -> Option<&'a Character> {
    p.source.downcast_ref::<Character>()
}

fn character_fields(db: &Arc<Database>) -> Vec<Field> {
    let friends_db = db.clone();

    vec![
        Field::new("id", Type::named("String").non_null())
            .description("The id of the character")
            .resolver(|p| Ok(source_character(&p).map(|c| Data::from(c.id)).unwrap_or(Data::Null))),
        Field::new("name", Type::named("String"))
            .description("The name of the character")
            .resolver(|p| {
                Ok(source_character(&p)
                    .map(|c| Data::from(c.name))
                    .unwrap_or(Data::Null))
            }),
        Field::new("friends", Type::named("Character").list())
            .description("The friends of the character")
            .resolver(move |p| {
                let friends = source_character(&p)
                    .map(|c| friends_db.get_friends(c))
                    .unwrap_or_default();
                Ok(Data::list(friends.into_iter().map(|f| Data::any(f.clone()))))
            }),
        Field::new("appearsIn", Type::named("Episode").list())
            .description("Which movies they appear in")
            .resolver(|p| {
                Ok(source_character(&p)
                    .map(|c| Data::list(c.appears_in.iter().copied().map(Data::from)))
                    .unwrap_or(Data::Null))
            }),
    ]
}

fn character_interface() -> InterfaceMeta {
    let mut meta = InterfaceMeta::new("Character")
        .description("A character in the Star Wars Trilogy")
        .resolve_type(|value, _| {
            value.downcast_ref::<Character>().map(|c| {
                match c.kind {
                    CharacterKind::Human => "Human".into(),
                    CharacterKind::Droid => "Droid".into(),
                }
            })
        });

    for field in [
        Field::new("id", Type::named("String").non_null()),
        Field::new("name", Type::named("String")),
        Field::new("friends", Type::named("Character").list()),
        Field::new("appearsIn", Type::named("Episode").list()),
    ] {
        meta = meta.field(field);
    }

    meta
}

fn human(db: &Arc<Database>) -> ObjectMeta {
    let mut meta = ObjectMeta::new("Human")
        .description("A humanoid creature in the Star Wars universe.")
        .interfaces(&["Character"]);

    for field in character_fields(db) {
        meta = meta.field(field);
    }

    meta.field(
        Field::new("homePlanet", Type::named("String"))
            .description("The home planet of the human, or null if unknown")
            .resolver(|p| Ok(Data::from(source_character(&p).and_then(|c| c.home_planet)))),
    )
}

fn droid(db: &Arc<Database>) -> ObjectMeta {
    let mut meta = ObjectMeta::new("Droid")
        .description("A mechanical creature in the Star Wars universe.")
        .interfaces(&["Character"]);

    for field in character_fields(db) {
        meta = meta.field(field);
    }

    meta.field(
        Field::new("primaryFunction", Type::named("String"))
            .description("The primary function of the droid")
            .resolver(|p| {
                Ok(Data::from(
                    source_character(&p).and_then(|c| c.primary_function),
                ))
            }),
    )
}

fn query_root(db: &Arc<Database>) -> ObjectMeta {
    let hero_db = db.clone();
    let human_db = db.clone();
    let droid_db = db.clone();

    ObjectMeta::new("Query")
        .field(
            Field::new("hero", Type::named("Character"))
                .argument(
                    Argument::new("episode", Type::named("Episode")).description(
                        "If omitted, returns the hero of the whole saga. If provided, returns \
                         the hero of that particular episode",
                    ),
                )
                .resolver(move |p| {
                    let episode = p.args.get("episode").and_then(Data::as_int);
                    Ok(Data::any(hero_db.get_hero(episode).clone()))
                }),
        )
        .field(
            Field::new("human", Type::named("Human"))
                .argument(Argument::new("id", Type::named("String").non_null()))
                .resolver(move |p| {
                    let id = p.args.get("id").and_then(Data::as_str).unwrap_or_default();
                    Ok(human_db
                        .get_human(id)
                        .map(|h| Data::any(h.clone()))
                        .unwrap_or(Data::Null))
                }),
        )
        .field(
            Field::new("droid", Type::named("Droid"))
                .argument(Argument::new("id", Type::named("String").non_null()))
                .resolver(move |p| {
                    let id = p.args.get("id").and_then(Data::as_str).unwrap_or_default();
                    Ok(droid_db
                        .get_droid(id)
                        .map(|d| Data::any(d.clone()))
                        .unwrap_or(Data::Null))
                }),
        )
}

pub(crate) fn star_wars_schema() -> Schema {
    let db = Arc::new(Database::new());

    Schema::new(
        SchemaConfig::new(query_root(&db))
            .append_type(episode_enum().into_meta())
            .append_type(character_interface().into_meta())
            .append_type(human(&db).into_meta())
            .append_type(droid(&db).into_meta()),
    )
    .expect("Failed to build the Star Wars schema")
}
