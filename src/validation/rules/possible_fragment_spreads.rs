use std::collections::HashMap;

use crate::{
    ast::{Definition, Document, FragmentSpread, InlineFragment},
    parser::Spanning,
    schema::meta::MetaType,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads<'a> {
    fragment_types: HashMap<&'a str, &'a MetaType>,
}

pub fn factory<'a>() -> PossibleFragmentSpreads<'a> {
    PossibleFragmentSpreads {
        fragment_types: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads<'a> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        for def in defs {
            if let Definition::Fragment(Spanning { item, .. }) = def {
                if let Some(t) = ctx.schema.concrete_type_by_name(item.type_condition.item) {
                    self.fragment_types.insert(item.name.item, t);
                }
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &'a Spanning<InlineFragment<'a>>,
    ) {
        if let (Some(parent_type), Some(frag_type)) = (
            ctx.parent_type(),
            frag.item
                .type_condition
                .as_ref()
                .and_then(|s| ctx.schema.concrete_type_by_name(s.item)),
        ) {
            if !ctx.schema.type_overlap(parent_type, frag_type) {
                ctx.report_error(
                    &error_message(None, parent_type.name(), frag_type.name()),
                    &[frag.span.start],
                );
            }
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let (Some(parent_type), Some(frag_type)) = (
            ctx.parent_type(),
            self.fragment_types.get(spread.item.name.item),
        ) {
            if !ctx.schema.type_overlap(parent_type, frag_type) {
                ctx.report_error(
                    &error_message(
                        Some(spread.item.name.item),
                        parent_type.name(),
                        frag_type.name(),
                    ),
                    &[spread.span.start],
                );
            }
        }
    }
}

fn error_message(frag_name: Option<&str>, parent_type_name: &str, frag_type: &str) -> String {
    if let Some(frag_name) = frag_name {
        format!(
            "Fragment \"{frag_name}\" cannot be spread here as objects of type \
             \"{parent_type_name}\" can never be of type \"{frag_type}\"",
        )
    } else {
        format!(
            "Fragment cannot be spread here as objects of type \
             \"{parent_type_name}\" can never be of type \"{frag_type}\"",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{expect_fails_rule, expect_passes_rule, RuleError},
    };

    #[test]
    fn of_the_same_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinObject on Dog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn object_into_an_implemented_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinInterface on Pet { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn object_into_containing_union() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinUnion on CatOrDog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn union_into_contained_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment unionWithinObject on Dog { ...catOrDogFragment }
          fragment catOrDogFragment on CatOrDog { __typename }
        "#,
        );
    }

    #[test]
    fn union_into_overlapping_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment unionWithinInterface on Pet { ...catOrDogFragment }
          fragment catOrDogFragment on CatOrDog { __typename }
        "#,
        );
    }

    #[test]
    fn interface_into_implemented_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceWithinObject on Dog { ...petFragment }
          fragment petFragment on Pet { name }
        "#,
        );
    }

    #[test]
    fn interface_into_overlapping_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceWithinInterface on Pet { ...beingFragment }
          fragment beingFragment on Being { name }
        "#,
        );
    }

    #[test]
    fn different_object_into_object() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidObjectWithinObject on Cat { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
            &[RuleError::new(
                &error_message(Some("dogFragment"), "Cat", "Dog"),
                &[SourcePosition::new(55, 1, 54)],
            )],
        );
    }

    #[test]
    fn different_object_into_object_in_inline_fragment() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidObjectWithinObjectAnon on Cat {
            ... on Dog { barkVolume }
          }
        "#,
            &[RuleError::new(
                &error_message(None, "Cat", "Dog"),
                &[SourcePosition::new(71, 2, 12)],
            )],
        );
    }
}
