use crate::{
    ast::{Document, InputValue, Type},
    parser::parse_document_source,
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, ObjectMeta, UnionMeta},
        model::{DirectiveLocation, DirectiveType, Schema, SchemaConfig},
    },
    validation::{visit, MultiVisitorNil, RuleError, ValidatorContext, Visitor},
};

fn named_field(name: &str) -> Field {
    Field::new(name, Type::named("String".to_owned()))
        .argument(Argument::new("surname", Type::named("Boolean".to_owned())))
}

fn being() -> InterfaceMeta {
    InterfaceMeta::new("Being").field(named_field("name"))
}

fn pet() -> InterfaceMeta {
    InterfaceMeta::new("Pet").field(named_field("name"))
}

fn canine() -> InterfaceMeta {
    InterfaceMeta::new("Canine").field(named_field("name"))
}

fn dog_command() -> EnumMeta {
    EnumMeta::new(
        "DogCommand",
        &[
            EnumValue::new("SIT"),
            EnumValue::new("HEEL"),
            EnumValue::new("DOWN"),
        ],
    )
}

fn dog() -> ObjectMeta {
    ObjectMeta::new("Dog")
        .field(named_field("name"))
        .field(Field::new("nickname", Type::named("String")))
        .field(Field::new("barkVolume", Type::named("Int")))
        .field(Field::new("barks", Type::named("Boolean")))
        .field(
            Field::new("doesKnowCommand", Type::named("Boolean"))
                .argument(Argument::new("dogCommand", Type::named("DogCommand"))),
        )
        .field(
            Field::new("isHousetrained", Type::named("Boolean")).argument(
                Argument::new("atOtherHomes", Type::named("Boolean"))
                    .default_value(InputValue::Boolean(true)),
            ),
        )
        .field(
            Field::new("isAtLocation", Type::named("Boolean"))
                .argument(Argument::new("x", Type::named("Int")))
                .argument(Argument::new("y", Type::named("Int"))),
        )
        .interfaces(&["Being", "Pet", "Canine"])
}

fn fur_color() -> EnumMeta {
    EnumMeta::new(
        "FurColor",
        &[
            EnumValue::new("BROWN"),
            EnumValue::new("BLACK"),
            EnumValue::new("TAN"),
            EnumValue::new("SPOTTED"),
        ],
    )
}

fn cat() -> ObjectMeta {
    ObjectMeta::new("Cat")
        .field(named_field("name"))
        .field(Field::new("nickname", Type::named("String")))
        .field(Field::new("meows", Type::named("Boolean")))
        .field(Field::new("meowVolume", Type::named("Int")))
        .field(Field::new("furColor", Type::named("FurColor")))
        .interfaces(&["Being", "Pet"])
}

fn intelligent() -> InterfaceMeta {
    InterfaceMeta::new("Intelligent").field(Field::new("iq", Type::named("Int")))
}

fn human() -> ObjectMeta {
    ObjectMeta::new("Human")
        .field(named_field("name"))
        .field(Field::new("pets", Type::named("Pet").list()))
        .field(Field::new("relatives", Type::named("Human").non_null().list()))
        .field(Field::new("iq", Type::named("Int")))
        .interfaces(&["Being", "Intelligent"])
}

fn alien() -> ObjectMeta {
    ObjectMeta::new("Alien")
        .field(named_field("name"))
        .field(Field::new("iq", Type::named("Int")))
        .field(Field::new("numEyes", Type::named("Int")))
        .interfaces(&["Being", "Intelligent"])
}

fn complex_input() -> InputObjectMeta {
    InputObjectMeta::new("ComplexInput")
        .field(Argument::new("requiredField", Type::named("Boolean").non_null()))
        .field(Argument::new("intField", Type::named("Int")))
        .field(Argument::new("stringField", Type::named("String")))
        .field(Argument::new("booleanField", Type::named("Boolean")))
        .field(Argument::new("stringListField", Type::named("String").list()))
}

fn complicated_args() -> ObjectMeta {
    let string_field = |name: &str, arg: Argument| {
        Field::new(name, Type::named("String".to_owned())).argument(arg)
    };

    ObjectMeta::new("ComplicatedArgs")
        .field(string_field(
            "intArgField",
            Argument::new("intArg", Type::named("Int")),
        ))
        .field(string_field(
            "nonNullIntArgField",
            Argument::new("nonNullIntArg", Type::named("Int").non_null()),
        ))
        .field(string_field(
            "stringArgField",
            Argument::new("stringArg", Type::named("String")),
        ))
        .field(string_field(
            "booleanArgField",
            Argument::new("booleanArg", Type::named("Boolean")),
        ))
        .field(string_field(
            "enumArgField",
            Argument::new("enumArg", Type::named("FurColor")),
        ))
        .field(string_field(
            "floatArgField",
            Argument::new("floatArg", Type::named("Float")),
        ))
        .field(string_field(
            "idArgField",
            Argument::new("idArg", Type::named("ID")),
        ))
        .field(string_field(
            "stringListArgField",
            Argument::new("stringListArg", Type::named("String").list()),
        ))
        .field(string_field(
            "nonNullStringListArgField",
            Argument::new(
                "nonNullStringListArg",
                Type::named("String").non_null().list().non_null(),
            ),
        ))
        .field(string_field(
            "complexArgField",
            Argument::new("complexArg", Type::named("ComplexInput")),
        ))
        .field(
            Field::new("multipleReqs", Type::named("String"))
                .argument(Argument::new("req1", Type::named("Int").non_null()))
                .argument(Argument::new("req2", Type::named("Int").non_null())),
        )
        .field(
            Field::new("multipleOpts", Type::named("String"))
                .argument(
                    Argument::new("opt1", Type::named("Int")).default_value(InputValue::Int(0)),
                )
                .argument(
                    Argument::new("opt2", Type::named("Int")).default_value(InputValue::Int(0)),
                ),
        )
        .field(
            Field::new("multipleOptAndReq", Type::named("String"))
                .argument(Argument::new("req1", Type::named("Int").non_null()))
                .argument(Argument::new("req2", Type::named("Int").non_null()))
                .argument(
                    Argument::new("opt1", Type::named("Int")).default_value(InputValue::Int(0)),
                )
                .argument(
                    Argument::new("opt2", Type::named("Int")).default_value(InputValue::Int(0)),
                ),
        )
}

fn query_root() -> ObjectMeta {
    ObjectMeta::new("QueryRoot")
        .field(
            Field::new("human", Type::named("Human"))
                .argument(Argument::new("id", Type::named("ID"))),
        )
        .field(Field::new("alien", Type::named("Alien")))
        .field(Field::new("dog", Type::named("Dog")))
        .field(Field::new("cat", Type::named("Cat")))
        .field(Field::new("pet", Type::named("Pet")))
        .field(Field::new("catOrDog", Type::named("CatOrDog")))
        .field(Field::new("dorOrHuman", Type::named("DogOrHuman")))
        .field(Field::new("humanOrAlien", Type::named("HumanOrAlien")))
        .field(Field::new("complicatedArgs", Type::named("ComplicatedArgs")))
}

pub(crate) fn test_schema() -> Schema {
    Schema::new(
        SchemaConfig::new(query_root())
            .append_type(being().into_meta())
            .append_type(pet().into_meta())
            .append_type(canine().into_meta())
            .append_type(dog_command().into_meta())
            .append_type(dog().into_meta())
            .append_type(fur_color().into_meta())
            .append_type(cat().into_meta())
            .append_type(UnionMeta::new("CatOrDog", &["Cat", "Dog"]).into_meta())
            .append_type(intelligent().into_meta())
            .append_type(human().into_meta())
            .append_type(alien().into_meta())
            .append_type(UnionMeta::new("DogOrHuman", &["Dog", "Human"]).into_meta())
            .append_type(UnionMeta::new("HumanOrAlien", &["Human", "Alien"]).into_meta())
            .append_type(complex_input().into_meta())
            .append_type(complicated_args().into_meta())
            .directive(DirectiveType::new(
                "onQuery",
                &[DirectiveLocation::Query],
                &[],
            ))
            .directive(DirectiveType::new(
                "onMutation",
                &[DirectiveLocation::Mutation],
                &[],
            ))
            .directive(DirectiveType::new(
                "onField",
                &[DirectiveLocation::Field],
                &[],
            ))
            .directive(DirectiveType::new(
                "onFragmentDefinition",
                &[DirectiveLocation::FragmentDefinition],
                &[],
            ))
            .directive(DirectiveType::new(
                "onFragmentSpread",
                &[DirectiveLocation::FragmentSpread],
                &[],
            ))
            .directive(DirectiveType::new(
                "onInlineFragment",
                &[DirectiveLocation::InlineFragment],
                &[],
            )),
    )
    .expect("Failed to build validation test schema")
}

fn validate<'a, V, F>(schema: Schema, q: &'a str, factory: F) -> Vec<RuleError>
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let doc =
        parse_document_source(q).unwrap_or_else(|e| panic!("Parse error on input {q:#?}: {e}"));
    let mut ctx = ValidatorContext::new(
        unsafe { std::mem::transmute::<&Schema, &'a Schema>(&schema) },
        &doc,
    );

    let mut mv = MultiVisitorNil.with(factory());
    visit(&mut mv, &mut ctx, unsafe {
        std::mem::transmute::<&Document<'a>, &'a Document<'a>>(doc.as_slice())
    });

    ctx.into_errors()
}

pub(crate) fn expect_passes_rule<'a, V, F>(factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    expect_passes_rule_with_schema(test_schema(), factory, q);
}

pub(crate) fn expect_passes_rule_with_schema<'a, V, F>(schema: Schema, factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let errs = validate(schema, q, factory);

    if !errs.is_empty() {
        print_errors(&errs);
        panic!("Expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule<'a, V, F>(factory: F, q: &'a str, expected_errors: &[RuleError])
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    expect_fails_rule_with_schema(test_schema(), factory, q, expected_errors);
}

pub(crate) fn expect_fails_rule_with_schema<'a, V, F>(
    schema: Schema,
    factory: F,
    q: &'a str,
    expected_errors: &[RuleError],
) where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let errs = validate(schema, q, factory);

    if errs.is_empty() {
        panic!("Expected rule to fail, but no errors were found");
    } else if errs != expected_errors {
        println!("==> Expected errors:");
        print_errors(expected_errors);

        println!("\n==> Actual errors:");
        print_errors(&errs);

        panic!("Unexpected set of errors found");
    }
}

pub(crate) fn expect_fails_fn<'a, F>(f: F, q: &'a str, expected_errors: &[RuleError])
where
    F: for<'b> Fn(&mut ValidatorContext<'b>, &'b Document<'b>),
{
    let schema = test_schema();
    let doc =
        parse_document_source(q).unwrap_or_else(|e| panic!("Parse error on input {q:#?}: {e}"));
    let mut ctx = ValidatorContext::new(&schema, &doc);

    f(&mut ctx, &doc);

    let errs = ctx.into_errors();

    if errs.is_empty() {
        panic!("Expected `fn` to fail, but no errors were found");
    } else if errs != expected_errors {
        println!("==> Expected errors:");
        print_errors(expected_errors);

        println!("\n==> Actual errors:");
        print_errors(&errs);

        panic!("Unexpected set of errors found");
    }
}

fn print_errors(errs: &[RuleError]) {
    for err in errs {
        for p in err.locations() {
            print!("[{:>3},{:>3},{:>3}]  ", p.index(), p.line(), p.column());
        }
        println!("{}", err.message());
    }
}
