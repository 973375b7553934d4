use std::fmt;

use indexmap::IndexMap;

use crate::{
    ast::InputValue,
    executor::Variables,
    parser::Spanning,
    schema::{
        meta::{Argument, EnumMeta, InputObjectMeta, MetaType, ScalarMeta},
        model::{Schema, TypeType},
    },
    value::Data,
};

/// Failure to convert an input value into its internal form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CoercionError {
    pub message: String,
}

impl CoercionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Coerces a wire or literal `value` into its internal form, directed by the
/// input type `tpe`.
///
/// Variable references must already be substituted (see
/// [`InputValue::into_const`]); only constant values reach this point.
pub(crate) fn coerce_input_value(
    schema: &Schema,
    tpe: &TypeType<'_>,
    value: &InputValue,
) -> Result<Data, CoercionError> {
    match tpe {
        TypeType::NonNull(inner) => {
            if value.is_null() {
                Err(CoercionError::new(format!(
                    r#"Expected "{tpe}", found null"#
                )))
            } else {
                coerce_input_value(schema, inner, value)
            }
        }

        TypeType::List(inner) => {
            if value.is_null() {
                return Ok(Data::Null);
            }

            match value.to_list_value() {
                Some(l) => Ok(Data::list(
                    l.iter()
                        .map(|v| coerce_input_value(schema, inner, v))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                // A non-list value is coerced into a single-element list.
                None => Ok(Data::list([coerce_input_value(schema, inner, value)?])),
            }
        }

        TypeType::Concrete(mt) => {
            if value.is_null() {
                return Ok(Data::Null);
            }

            match mt {
                MetaType::Scalar(sm) => coerce_scalar(sm, value),
                MetaType::Enum(em) => coerce_enum(em, value),
                MetaType::InputObject(iom) => coerce_input_object(schema, iom, value),
                _ => Err(CoercionError::new(format!(
                    r#"Type "{}" is not an input type"#,
                    tpe
                ))),
            }
        }
    }
}

fn coerce_scalar(meta: &ScalarMeta, value: &InputValue) -> Result<Data, CoercionError> {
    (meta.parse_fn)(value).ok_or_else(|| {
        CoercionError::new(format!(
            r#"Expected type "{}", found {value}."#,
            meta.name
        ))
    })
}

fn coerce_enum(meta: &EnumMeta, value: &InputValue) -> Result<Data, CoercionError> {
    let label = match value {
        InputValue::Enum(name) => Some(name.as_str()),
        InputValue::String(name) => Some(name.as_str()),
        _ => None,
    };

    label
        .and_then(|l| meta.values.iter().find(|ev| ev.name == l))
        .map(|ev| ev.value.clone())
        .ok_or_else(|| CoercionError::new(format!(r#"Invalid value for enum "{}""#, meta.name)))
}

fn coerce_input_object(
    schema: &Schema,
    meta: &InputObjectMeta,
    value: &InputValue,
) -> Result<Data, CoercionError> {
    let obj = value.to_object_value().ok_or_else(|| {
        CoercionError::new(format!(r#"Expected "{}", found not an object"#, meta.name))
    })?;

    for key in obj.keys() {
        if !meta.input_fields.iter().any(|f| f.name == **key) {
            return Err(CoercionError::new(format!(
                r#"Unknown field "{key}" on input object "{}""#,
                meta.name
            )));
        }
    }

    let mut out = IndexMap::with_capacity(meta.input_fields.len());
    for input_field in &meta.input_fields {
        let field_type = schema.make_type(&input_field.arg_type);
        let provided = obj.get(input_field.name.as_str()).copied();

        match provided {
            Some(v) if !v.is_null() => {
                out.insert(
                    input_field.name.clone(),
                    coerce_input_value(schema, &field_type, v)?,
                );
            }
            _ => {
                if let Some(default) = &input_field.default_value {
                    out.insert(
                        input_field.name.clone(),
                        coerce_input_value(schema, &field_type, default)?,
                    );
                } else if input_field.arg_type.is_non_null() {
                    return Err(CoercionError::new(format!(
                        r#"Expected "{}", found null"#,
                        input_field.arg_type
                    )));
                } else if provided.is_some() {
                    // An explicit `null` for a nullable field is kept.
                    out.insert(input_field.name.clone(), Data::Null);
                }
            }
        }
    }

    Ok(Data::from(out))
}

/// Assembles the coerced argument map for a field or directive from its
/// argument definitions, the AST-supplied arguments, and the variable values.
pub(crate) fn coerce_argument_values(
    schema: &Schema,
    arg_defs: Option<&Vec<Argument>>,
    args: Option<&Spanning<crate::ast::Arguments<'_>>>,
    variables: &Variables,
) -> Result<IndexMap<String, Data>, CoercionError> {
    let Some(arg_defs) = arg_defs else {
        return Ok(IndexMap::new());
    };

    let mut out = IndexMap::with_capacity(arg_defs.len());
    for def in arg_defs {
        let arg_type = schema.make_type(&def.arg_type);
        let provided = args
            .and_then(|a| a.item.get(&def.name))
            .and_then(|v| v.item.clone().into_const(variables));

        match provided {
            Some(v) if !v.is_null() => {
                out.insert(def.name.clone(), coerce_input_value(schema, &arg_type, &v)?);
            }
            _ => {
                if let Some(default) = &def.default_value {
                    out.insert(
                        def.name.clone(),
                        coerce_input_value(schema, &arg_type, default)?,
                    );
                } else if def.arg_type.is_non_null() {
                    return Err(CoercionError::new(format!(
                        r#"Argument "{}" of required type "{}" was not provided"#,
                        def.name, def.arg_type
                    )));
                } else {
                    out.insert(def.name.clone(), Data::Null);
                }
            }
        }
    }

    Ok(out)
}
