use crate::{
    ast::{Fragment, InlineFragment},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        context: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        if let Some(current_type) = context.current_type() {
            if !current_type.is_composite() {
                let type_name = current_type.name();
                let type_cond = &f.item.type_condition;

                context.report_error(
                    &error_message(Some(f.item.name.item), type_name),
                    &[type_cond.span.start],
                );
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        context: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment<'a>>,
    ) {
        if let Some(type_cond) = &f.item.type_condition {
            let invalid_type_name = context
                .current_type()
                .iter()
                .filter(|t| !t.is_composite())
                .map(|t| t.name())
                .next();

            if let Some(name) = invalid_type_name {
                context.report_error(&error_message(None, name), &[type_cond.span.start]);
            }
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    if let Some(name) = fragment_name {
        format!(r#"Fragment "{name}" cannot condition non composite type "{on_type}"#)
    } else {
        format!(r#"Fragment cannot condition on non composite type "{on_type}""#)
    }
}
