use std::{collections::HashSet, fmt::Display};

use crate::{
    ast::InputValue,
    schema::{
        meta::{Argument, EnumMeta, InputObjectMeta, MetaType},
        model::{Schema, TypeType},
    },
};

pub(crate) fn non_null_error_message(arg_type: impl Display) -> String {
    format!("Type \"{arg_type}\" is not nullable")
}

pub(crate) fn enum_error_message(arg_value: impl Display, arg_type: impl Display) -> String {
    format!("Invalid value \"{arg_value}\" for enum \"{arg_type}\"")
}

pub(crate) fn type_error_message(arg_value: impl Display, arg_type: impl Display) -> String {
    format!("Invalid value \"{arg_value}\" for type \"{arg_type}\"")
}

pub(crate) fn input_object_error_message(arg_type: impl Display) -> String {
    format!("\"{arg_type}\" is not an input object")
}

pub(crate) fn field_error_message(
    arg_type: impl Display,
    field_name: impl Display,
    error_message: impl Display,
) -> String {
    format!("Error on \"{arg_type}\" field \"{field_name}\": {error_message}")
}

pub(crate) fn missing_field_error_message(
    arg_type: impl Display,
    missing_fields: impl Display,
) -> String {
    format!("\"{arg_type}\" is missing fields: {missing_fields}")
}

pub(crate) fn unknown_field_error_message(
    arg_type: impl Display,
    field_name: impl Display,
) -> String {
    format!("Field \"{field_name}\" does not exist on type \"{arg_type}\"")
}

fn validate_object_field(
    schema: &Schema,
    object_type: &TypeType<'_>,
    object_fields: &[Argument],
    field_value: &InputValue,
    field_key: &str,
) -> Option<String> {
    let field_type = object_fields
        .iter()
        .find(|f| f.name == field_key)
        .map(|f| schema.make_type(&f.arg_type));

    if let Some(field_arg_type) = field_type {
        validate_literal_value(schema, &field_arg_type, field_value)
            .map(|e| field_error_message(object_type, field_key, e))
    } else {
        Some(unknown_field_error_message(object_type, field_key))
    }
}

/// Returns an error string if the literal is not valid for the expected input
/// type.
///
/// Variable references validate trivially here; their values are unified with
/// the expected type separately, once provided.
pub(crate) fn validate_literal_value(
    schema: &Schema,
    arg_type: &TypeType<'_>,
    arg_value: &InputValue,
) -> Option<String> {
    match arg_type {
        TypeType::NonNull(inner) => {
            if arg_value.is_null() {
                Some(non_null_error_message(arg_type))
            } else {
                validate_literal_value(schema, inner, arg_value)
            }
        }
        TypeType::List(inner) => match arg_value {
            InputValue::Null | InputValue::Variable(_) => None,
            InputValue::List(items) => items
                .iter()
                .find_map(|i| validate_literal_value(schema, inner, &i.item)),
            // A non-list value is valid wherever its single-element list is.
            v => validate_literal_value(schema, inner, v),
        },
        TypeType::Concrete(t) => match arg_value {
            InputValue::Null | InputValue::Variable(_) => None,
            InputValue::Object(obj) => {
                if let MetaType::InputObject(InputObjectMeta { input_fields, .. }) = t {
                    let mut remaining_required_fields = input_fields
                        .iter()
                        .filter_map(|f| {
                            (f.arg_type.is_non_null() && f.default_value.is_none())
                                .then_some(&f.name)
                        })
                        .collect::<HashSet<_>>();

                    let error_message = obj.iter().find_map(|(key, value)| {
                        remaining_required_fields.remove(&key.item);
                        validate_object_field(schema, arg_type, input_fields, &value.item, &key.item)
                    });

                    if error_message.is_some() {
                        return error_message;
                    }

                    if remaining_required_fields.is_empty() {
                        None
                    } else {
                        let missing_fields = remaining_required_fields
                            .into_iter()
                            .map(|s| format!("\"{s}\""))
                            .collect::<Vec<_>>()
                            .join(", ");
                        Some(missing_field_error_message(arg_type, missing_fields))
                    }
                } else {
                    Some(input_object_error_message(arg_type))
                }
            }
            InputValue::List(_) => Some("Input lists are not literals".into()),
            v => match t {
                MetaType::Enum(EnumMeta { name, values, .. }) => match v {
                    // Even though a string can be coerced into an enum from a
                    // variable, it is not a valid enum *literal*.
                    InputValue::Enum(label) if values.iter().any(|ev| &ev.name == label) => None,
                    _ => Some(enum_error_message(v, name)),
                },
                MetaType::Scalar(sm) => {
                    if (sm.parse_fn)(v).is_some() {
                        None
                    } else {
                        Some(type_error_message(v, arg_type))
                    }
                }
                _ => Some(type_error_message(v, arg_type)),
            },
        },
    }
}
