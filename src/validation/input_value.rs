use std::{collections::HashSet, fmt};

use crate::{
    ast::{InputValue, Operation, VariableDefinitions},
    executor::Variables,
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{EnumMeta, InputObjectMeta, MetaType, ScalarMeta},
        model::{Schema, TypeType},
    },
    validation::RuleError,
};

#[derive(Debug)]
enum Path<'a> {
    Root,
    ArrayElement(usize, &'a Path<'a>),
    ObjectField(&'a str, &'a Path<'a>),
}

/// Checks the provided variable `values` against the `operation`'s variable
/// definitions, without transforming them.
#[doc(hidden)]
pub fn validate_input_values(
    values: &Variables,
    operation: &Spanning<Operation<'_>>,
    schema: &Schema,
) -> Vec<RuleError> {
    let mut errs = vec![];

    if let Some(vars) = &operation.item.variable_definitions {
        validate_var_defs(values, &vars.item, schema, &mut errs);
    }

    errs.sort();
    errs
}

fn validate_var_defs(
    values: &Variables,
    var_defs: &VariableDefinitions<'_>,
    schema: &Schema,
    errors: &mut Vec<RuleError>,
) {
    for (name, def) in var_defs.iter() {
        let raw_type_name = def.var_type.item.innermost_name();
        match schema.concrete_type_by_name(raw_type_name) {
            Some(t) if t.is_input() => {
                let ct = schema.make_type(&def.var_type.item);

                if def.var_type.item.is_non_null()
                    && def.default_value.is_none()
                    && is_absent_or_null(values.get(name.item))
                {
                    errors.push(RuleError::new(
                        &format!(
                            r#"Variable "${}" of required type "{}" was not provided."#,
                            name.item, def.var_type.item,
                        ),
                        &[name.span.start],
                    ));
                } else if let Some(v) = values.get(name.item) {
                    errors.append(&mut unify_value(
                        name.item,
                        &name.span.start,
                        v,
                        &ct,
                        schema,
                        Path::Root,
                    ));
                }
            }
            // Non-input variable types are already rejected during document
            // validation.
            _ => {}
        }
    }
}

fn unify_value<'a>(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue,
    meta_type: &TypeType<'a>,
    schema: &Schema,
    path: Path<'a>,
) -> Vec<RuleError> {
    let mut errors: Vec<RuleError> = vec![];

    match meta_type {
        TypeType::NonNull(inner) => {
            if value.is_null() {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    &path,
                    format!(r#"Expected "{meta_type}", found null"#),
                ));
            } else {
                errors.append(&mut unify_value(
                    var_name, var_pos, value, inner, schema, path,
                ));
            }
        }

        TypeType::List(inner) => {
            if value.is_null() {
                return errors;
            }

            match value.to_list_value() {
                Some(l) => {
                    for (i, v) in l.iter().enumerate() {
                        errors.append(&mut unify_value(
                            var_name,
                            var_pos,
                            v,
                            inner,
                            schema,
                            Path::ArrayElement(i, &path),
                        ));
                    }
                }
                _ => errors.append(&mut unify_value(
                    var_name, var_pos, value, inner, schema, path,
                )),
            }
        }

        TypeType::Concrete(mt) => {
            if value.is_null() {
                return errors;
            }

            match mt {
                MetaType::Scalar(sm) => {
                    errors.append(&mut unify_scalar(var_name, var_pos, value, sm, &path))
                }
                MetaType::Enum(em) => {
                    errors.append(&mut unify_enum(var_name, var_pos, value, em, &path))
                }
                MetaType::InputObject(iom) => {
                    errors.append(&mut unify_input_object(
                        var_name, var_pos, value, iom, schema, &path,
                    ));
                }
                // Non-input variable types are already rejected during
                // document validation.
                _ => {}
            }
        }
    }
    errors
}

fn unify_scalar(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue,
    meta: &ScalarMeta,
    path: &Path<'_>,
) -> Vec<RuleError> {
    let mut errors: Vec<RuleError> = vec![];

    match value {
        InputValue::List(_) => errors.push(unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found list"#, meta.name),
        )),
        InputValue::Object(_) => errors.push(unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found object"#, meta.name),
        )),
        _ => {
            if (meta.parse_fn)(value).is_none() {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    path,
                    format!("Expected input scalar `{}`. Got: `{value}`", meta.name),
                ));
            }
        }
    }
    errors
}

fn unify_enum(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue,
    meta: &EnumMeta,
    path: &Path<'_>,
) -> Vec<RuleError> {
    let mut errors: Vec<RuleError> = vec![];

    match value {
        // Out-of-band enum values are provided as strings.
        InputValue::String(name) | InputValue::Enum(name) => {
            if !meta.values.iter().any(|ev| &ev.name == name) {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    path,
                    format!(r#"Invalid value for enum "{}""#, meta.name),
                ))
            }
        }
        _ => errors.push(unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found not a string or enum"#, meta.name),
        )),
    }
    errors
}

fn unify_input_object(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue,
    meta: &InputObjectMeta,
    schema: &Schema,
    path: &Path<'_>,
) -> Vec<RuleError> {
    let mut errors: Vec<RuleError> = vec![];

    if let Some(obj) = value.to_object_value() {
        let mut keys = obj.keys().collect::<HashSet<&&str>>();

        for input_field in &meta.input_fields {
            let mut has_value = false;
            keys.remove(&input_field.name.as_str());

            if let Some(value) = obj.get(input_field.name.as_str()) {
                if !value.is_null() {
                    has_value = true;

                    errors.append(&mut unify_value(
                        var_name,
                        var_pos,
                        value,
                        &schema.make_type(&input_field.arg_type),
                        schema,
                        Path::ObjectField(&input_field.name, path),
                    ));
                }
            }

            if !has_value
                && input_field.arg_type.is_non_null()
                && input_field.default_value.is_none()
            {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    &Path::ObjectField(&input_field.name, path),
                    format!(r#"Expected "{}", found null"#, input_field.arg_type),
                ));
            }
        }

        for key in keys {
            errors.push(unification_error(
                var_name,
                var_pos,
                &Path::ObjectField(key, path),
                "Unknown field",
            ));
        }
    } else {
        errors.push(unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found not an object"#, meta.name),
        ));
    }
    errors
}

fn is_absent_or_null(v: Option<&InputValue>) -> bool {
    v.map_or(true, InputValue::is_null)
}

fn unification_error(
    var_name: impl fmt::Display,
    var_pos: &SourcePosition,
    path: &Path<'_>,
    message: impl fmt::Display,
) -> RuleError {
    RuleError::new(
        &format!(r#"Variable "${var_name}" got invalid value. {path}{message}."#),
        &[*var_pos],
    )
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => write!(f, ""),
            Path::ArrayElement(idx, prev) => write!(f, "{prev}In element #{idx}: "),
            Path::ObjectField(name, prev) => write!(f, r#"{prev}In field "{name}": "#),
        }
    }
}
