use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::{
    ast::{Directive, Field, Fragment, Selection},
    executor::Variables,
    parser::Spanning,
    schema::{meta::ObjectMeta, model::Schema},
    value::coerce_argument_values,
};

/// The effective, ordered list of fields to execute for one runtime object
/// type: response key to the group of AST field nodes merged under it.
pub(crate) type GroupedFields<'a> = IndexMap<&'a str, Vec<&'a Spanning<Field<'a>>>>;

/// Flattens the provided selection sets against the runtime `object_type`
/// into the ordered field groups to execute.
///
/// Fragment spreads and inline fragments are expanded in place when their
/// type condition is compatible with `object_type`; `@skip`/`@include`
/// directives filter selections out; fields sharing a response key are merged
/// in order of first appearance. A spread visited once in this walk is never
/// expanded again.
pub(crate) fn collect_fields<'a>(
    schema: &'a Schema,
    object_type: &'a ObjectMeta,
    selection_sets: &[&'a [Selection<'a>]],
    fragments: &HashMap<&'a str, &'a Fragment<'a>>,
    variables: &Variables,
) -> GroupedFields<'a> {
    let mut grouped = GroupedFields::new();
    let mut visited_fragments = HashSet::new();

    for selection_set in selection_sets {
        collect_fields_inner(
            schema,
            object_type,
            selection_set,
            fragments,
            variables,
            &mut grouped,
            &mut visited_fragments,
        );
    }

    grouped
}

fn collect_fields_inner<'a>(
    schema: &'a Schema,
    object_type: &'a ObjectMeta,
    selection_set: &'a [Selection<'a>],
    fragments: &HashMap<&'a str, &'a Fragment<'a>>,
    variables: &Variables,
    grouped: &mut GroupedFields<'a>,
    visited_fragments: &mut HashSet<&'a str>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                if is_excluded(schema, &field.item.directives, variables) {
                    continue;
                }

                grouped
                    .entry(field.item.response_key())
                    .or_default()
                    .push(field);
            }
            Selection::InlineFragment(fragment) => {
                if is_excluded(schema, &fragment.item.directives, variables) {
                    continue;
                }

                if let Some(type_condition) = &fragment.item.type_condition {
                    if !type_condition_matches(schema, object_type, type_condition.item) {
                        continue;
                    }
                }

                collect_fields_inner(
                    schema,
                    object_type,
                    &fragment.item.selection_set,
                    fragments,
                    variables,
                    grouped,
                    visited_fragments,
                );
            }
            Selection::FragmentSpread(spread) => {
                if is_excluded(schema, &spread.item.directives, variables) {
                    continue;
                }

                let name = spread.item.name.item;
                if !visited_fragments.insert(name) {
                    continue;
                }

                let Some(fragment) = fragments.get(name) else {
                    continue;
                };

                if !type_condition_matches(schema, object_type, fragment.type_condition.item) {
                    continue;
                }

                collect_fields_inner(
                    schema,
                    object_type,
                    &fragment.selection_set,
                    fragments,
                    variables,
                    grouped,
                    visited_fragments,
                );
            }
        }
    }
}

/// Whether a fragment's type condition is compatible with the runtime
/// `object_type`: the object itself, an interface it implements, or a union
/// it belongs to.
pub(crate) fn type_condition_matches(
    schema: &Schema,
    object_type: &ObjectMeta,
    type_condition: &str,
) -> bool {
    schema.is_named_subtype(&object_type.name, type_condition)
}

/// Whether `@skip`/`@include` exclude a selection.
///
/// A selection is included iff it is not `@skip(if: true)` and not
/// `@include(if: false)`; a true `@skip` always wins over `@include`.
fn is_excluded(
    schema: &Schema,
    directives: &Option<Vec<Spanning<Directive<'_>>>>,
    variables: &Variables,
) -> bool {
    for directive in directives.iter().flatten() {
        let name = directive.item.name.item;
        if name != "skip" && name != "include" {
            continue;
        }

        let condition = schema
            .directive_by_name(name)
            .and_then(|d| {
                coerce_argument_values(
                    schema,
                    Some(&d.arguments),
                    directive.item.arguments.as_ref(),
                    variables,
                )
                .ok()
            })
            .and_then(|args| args.get("if").and_then(|v| v.as_bool()));

        match condition {
            Some(condition) if (name == "skip" && condition) || (name == "include" && !condition) =>
            {
                return true;
            }
            _ => {}
        }
    }
    false
}
