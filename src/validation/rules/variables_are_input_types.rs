use std::fmt;

use crate::{
    ast::VariableDefinition,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if let Some(var_type) = ctx
            .schema
            .concrete_type_by_name(var_def.var_type.item.innermost_name())
        {
            if !var_type.is_input() {
                ctx.report_error(
                    &error_message(var_name.item, &var_def.var_type.item),
                    &[var_def.var_type.span.start],
                );
            }
        }
    }
}

fn error_message(var_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!("Variable \"{var_name}\" cannot be of non-input type \"{type_name}\"")
}
