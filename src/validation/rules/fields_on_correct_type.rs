use crate::{
    ast::{Field, Operation, OperationType, Selection},
    parser::Spanning,
    schema::meta::MetaType,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_operation_definition(
        &mut self,
        context: &mut ValidatorContext<'a>,
        operation: &'a Spanning<Operation<'a>>,
    ) {
        // https://spec.graphql.org/October2021/#note-bc213
        if let OperationType::Subscription = operation.item.operation_type {
            for selection in &operation.item.selection_set {
                if let Selection::Field(field) = selection {
                    if field.item.name.item == "__typename" {
                        context.report_error(
                            "`__typename` may not be included as a root \
                             field in a subscription operation",
                            &[field.item.name.span.start],
                        );
                    }
                }
            }
        }
    }

    fn enter_field(&mut self, context: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        if let Some(parent_type) = context.parent_type() {
            let field_name = &field.item.name;
            let type_name = parent_type.name();

            if parent_type.field_by_name(field_name.item).is_none() {
                if let MetaType::Union(..) = parent_type {
                    // You can query for `__typename` on a union, but it isn't
                    // a field on the union; it is instead on the resulting
                    // object returned.
                    if field_name.item == "__typename" {
                        return;
                    }
                }

                context.report_error(
                    &error_message(field_name.item, type_name),
                    &[field_name.span.start],
                );
            }
        }
    }
}

fn error_message(field: &str, type_name: &str) -> String {
    format!(r#"Unknown field "{field}" on type "{type_name}""#)
}
