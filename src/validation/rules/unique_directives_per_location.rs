use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, Operation},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueDirectivesPerLocation;

pub fn factory() -> UniqueDirectivesPerLocation {
    UniqueDirectivesPerLocation
}

impl UniqueDirectivesPerLocation {
    fn check_directives<'a>(
        &self,
        ctx: &mut ValidatorContext<'a>,
        directives: &'a Option<Vec<Spanning<Directive<'a>>>>,
    ) {
        let mut known_names: HashMap<&str, SourcePosition> = HashMap::new();

        for directive in directives.iter().flatten() {
            match known_names.entry(directive.item.name.item) {
                Entry::Occupied(e) => {
                    ctx.report_error(
                        &error_message(directive.item.name.item),
                        &[*e.get(), directive.span.start],
                    );
                }
                Entry::Vacant(e) => {
                    e.insert(directive.span.start);
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueDirectivesPerLocation {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.check_directives(ctx, &op.item.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.check_directives(ctx, &f.item.directives);
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        self.check_directives(ctx, &field.item.directives);
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.check_directives(ctx, &spread.item.directives);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.check_directives(ctx, &fragment.item.directives);
    }
}

fn error_message(directive_name: &str) -> String {
    format!(r#"The directive "{directive_name}" can only be used once at this location"#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{expect_fails_rule, expect_passes_rule, RuleError},
    };

    #[test]
    fn no_directives() {
        expect_passes_rule(
            factory,
            r#"
          {
            field
          }
        "#,
        );
    }

    #[test]
    fn unique_directives_in_different_locations() {
        expect_passes_rule(
            factory,
            r#"
          fragment Test on Dog @onFragmentDefinition {
            field @onField
          }
        "#,
        );
    }

    #[test]
    fn same_directive_in_different_locations() {
        expect_passes_rule(
            factory,
            r#"
          {
            field @onField
            other: field @onField
          }
        "#,
        );
    }

    #[test]
    fn unknown_directives_must_still_be_unique() {
        expect_passes_rule(
            factory,
            r#"
          {
            field @unknown
          }
        "#,
        );
    }

    #[test]
    fn duplicate_directive_on_field() {
        expect_fails_rule(
            factory,
            r#"
          {
            field @onField @onField
          }
        "#,
            &[RuleError::new(
                &error_message("onField"),
                &[
                    SourcePosition::new(31, 2, 18),
                    SourcePosition::new(40, 2, 27),
                ],
            )],
        );
    }

    #[test]
    fn duplicate_directive_on_fragment_spread() {
        expect_fails_rule(
            factory,
            r#"
          {
            ...Frag @onFragmentSpread @onFragmentSpread
          }
        "#,
            &[RuleError::new(
                &error_message("onFragmentSpread"),
                &[
                    SourcePosition::new(33, 2, 20),
                    SourcePosition::new(51, 2, 38),
                ],
            )],
        );
    }
}
