use std::fmt;

use crate::{
    ast::{Directive, Field, InputValue, VariableDefinition},
    parser::Spanning,
    schema::meta::Argument,
    validation::{utils::validate_literal_value, ValidatorContext, Visitor},
};

pub struct ValuesOfCorrectType<'a> {
    current_args: Option<&'a Vec<Argument>>,
}

pub fn factory<'a>() -> ValuesOfCorrectType<'a> {
    ValuesOfCorrectType { current_args: None }
}

impl<'a> Visitor<'a> for ValuesOfCorrectType<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(directive.item.name.item)
            .map(|d| &d.arguments);
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| t.field_by_name(field.item.name.item))
            .and_then(|f| f.arguments.as_ref());
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, arg_value): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        if let Some(argument_meta) = self
            .current_args
            .and_then(|args| args.iter().find(|a| a.name == arg_name.item))
        {
            let meta_type = ctx.schema.make_type(&argument_meta.arg_type);

            if let Some(err) = validate_literal_value(ctx.schema, &meta_type, &arg_value.item) {
                ctx.report_error(&error_message(arg_name.item, err), &[arg_value.span.start]);
            }
        }
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        let Some(Spanning {
            item: var_value,
            span,
        }) = &var_def.default_value
        else {
            return;
        };

        if var_def.var_type.item.is_non_null() {
            ctx.report_error(
                &non_null_error_message(var_name.item, &var_def.var_type.item),
                &[span.start],
            )
        } else {
            let meta_type = ctx.schema.make_type(&var_def.var_type.item);

            if let Some(err) = validate_literal_value(ctx.schema, &meta_type, var_value) {
                ctx.report_error(
                    &default_error_message(var_name.item, &var_def.var_type.item, err),
                    &[span.start],
                );
            }
        }
    }
}

fn error_message(arg_name: impl fmt::Display, msg: impl fmt::Display) -> String {
    format!("Invalid value for argument \"{arg_name}\", reason: {msg}")
}

fn default_error_message(
    arg_name: impl fmt::Display,
    type_name: impl fmt::Display,
    reason: impl fmt::Display,
) -> String {
    format!(
        "Invalid default value for argument \"{arg_name}\", expected type \"{type_name}\".  Reason: {reason}",
    )
}

fn non_null_error_message(arg_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!(
        "Argument \"{arg_name}\" has type \"{type_name}\" and is not nullable, so it can't have a default value",
    )
}
