use std::fmt;

use crate::{
    ast::{Directive, Field},
    parser::Spanning,
    schema::{meta::Field as FieldType, model::DirectiveType},
    validation::{ValidatorContext, Visitor},
};

pub struct ProvidedRequiredArguments;

pub fn factory() -> ProvidedRequiredArguments {
    ProvidedRequiredArguments
}

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let field_name = &field.item.name.item;

        if let Some(FieldType {
            arguments: Some(meta_args),
            ..
        }) = ctx.parent_type().and_then(|t| t.field_by_name(field_name))
        {
            for meta_arg in meta_args {
                if meta_arg.arg_type.is_non_null()
                    && meta_arg.default_value.is_none()
                    && field
                        .item
                        .arguments
                        .as_ref()
                        .and_then(|args| args.item.get(&meta_arg.name))
                        .is_none()
                {
                    ctx.report_error(
                        &field_error_message(field_name, &meta_arg.name, &meta_arg.arg_type),
                        &[field.span.start],
                    );
                }
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let directive_name = &directive.item.name.item;

        if let Some(DirectiveType {
            arguments: meta_args,
            ..
        }) = ctx.schema.directive_by_name(directive_name)
        {
            for meta_arg in meta_args {
                if meta_arg.arg_type.is_non_null()
                    && meta_arg.default_value.is_none()
                    && directive
                        .item
                        .arguments
                        .as_ref()
                        .and_then(|args| args.item.get(&meta_arg.name))
                        .is_none()
                {
                    ctx.report_error(
                        &directive_error_message(
                            directive_name,
                            &meta_arg.name,
                            &meta_arg.arg_type,
                        ),
                        &[directive.span.start],
                    );
                }
            }
        }
    }
}

fn field_error_message(
    field_name: impl fmt::Display,
    arg_name: impl fmt::Display,
    type_name: impl fmt::Display,
) -> String {
    format!(
        r#"Field "{field_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#,
    )
}

fn directive_error_message(
    directive_name: impl fmt::Display,
    arg_name: impl fmt::Display,
    type_name: impl fmt::Display,
) -> String {
    format!(
        r#"Directive "@{directive_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#,
    )
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{expect_fails_rule, expect_passes_rule, RuleError},
    };

    #[test]
    fn ignores_unknown_arguments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              isHousetrained(unknownArgument: true)
            }
          }
        "#,
        );
    }

    #[test]
    fn arg_on_optional_arg() {
        expect_passes_rule(
            factory,
            r#"
            {
              dog {
                isHousetrained(atOtherHomes: true)
              }
            }
        "#,
        );
    }

    #[test]
    fn no_arg_on_optional_arg() {
        expect_passes_rule(
            factory,
            r#"
            {
              dog {
                isHousetrained
              }
            }
        "#,
        );
    }

    #[test]
    fn multiple_args_reverse_order() {
        expect_passes_rule(
            factory,
            r#"
            {
              complicatedArgs {
                multipleReqs(req2: 2, req1: 1)
              }
            }
        "#,
        );
    }

    #[test]
    fn missing_one_non_nullable_argument() {
        expect_fails_rule(
            factory,
            r#"
            {
              complicatedArgs {
                multipleReqs(req2: 2)
              }
            }
        "#,
            &[RuleError::new(
                &field_error_message("multipleReqs", "req1", "Int!"),
                &[SourcePosition::new(63, 3, 16)],
            )],
        );
    }

    #[test]
    fn missing_multiple_non_nullable_arguments() {
        expect_fails_rule(
            factory,
            r#"
            {
              complicatedArgs {
                multipleReqs
              }
            }
        "#,
            &[
                RuleError::new(
                    &field_error_message("multipleReqs", "req1", "Int!"),
                    &[SourcePosition::new(63, 3, 16)],
                ),
                RuleError::new(
                    &field_error_message("multipleReqs", "req2", "Int!"),
                    &[SourcePosition::new(63, 3, 16)],
                ),
            ],
        );
    }

    #[test]
    fn skip_with_if() {
        expect_passes_rule(
            factory,
            r#"
            {
              dog @skip(if: true)
            }
        "#,
        );
    }

    #[test]
    fn skip_without_if() {
        expect_fails_rule(
            factory,
            r#"
            {
              dog @skip
            }
        "#,
            &[RuleError::new(
                &directive_error_message("skip", "if", "Boolean!"),
                &[SourcePosition::new(33, 2, 18)],
            )],
        );
    }
}
