use std::fmt;

use crate::{
    ast::Field,
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let field_name = &field.item.name.item;

        let error = if let (Some(field_type), Some(field_type_literal)) =
            (ctx.current_type(), ctx.current_type_literal())
        {
            match (field_type.is_leaf(), &field.item.selection_set) {
                (true, &Some(_)) => Some(RuleError::new(
                    &no_allowed_error_message(field_name, field_type_literal),
                    &[field.span.start],
                )),
                (false, &None) => Some(RuleError::new(
                    &required_error_message(field_name, field_type_literal),
                    &[field.span.start],
                )),
                _ => None,
            }
        } else {
            None
        };

        if let Some(error) = error {
            ctx.append_errors(vec![error]);
        }
    }
}

fn no_allowed_error_message(field_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!(
        r#"Field "{field_name}" must not have a selection since type {type_name} has no subfields"#,
    )
}

fn required_error_message(field_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!(
        r#"Field "{field_name}" of type "{type_name}" must have a selection of subfields. Did you mean "{field_name} {{ ... }}"?"#,
    )
}
