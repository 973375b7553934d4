use std::{cell::RefCell, collections::HashMap};

use indexmap::IndexMap;

use crate::{
    ast::{Arguments, Definition, Document, Field, Fragment, Selection, Type},
    parser::{SourcePosition, Spanning},
    schema::meta::{Field as FieldType, MetaType},
    validation::{ValidatorContext, Visitor},
};

/// One field occurrence under a response key: the parent type it was
/// collected on, its AST node, and its schema definition (if any).
struct FieldEntry<'a> {
    parent_type: Option<&'a str>,
    ast: &'a Spanning<Field<'a>>,
    def: Option<&'a FieldType>,
}

/// Response key to every field occurrence collected under it, in encounter
/// order.
type FieldMap<'a> = IndexMap<&'a str, Vec<FieldEntry<'a>>>;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct ConflictReason {
    response_name: String,
    cause: ConflictCause,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ConflictCause {
    Text(String),
    Nested(Vec<ConflictReason>),
}

#[derive(Debug)]
struct Conflict {
    reason: ConflictReason,
    first: Vec<SourcePosition>,
    second: Vec<SourcePosition>,
}

pub struct OverlappingFieldsCanBeMerged<'a> {
    named_fragments: HashMap<&'a str, &'a Fragment<'a>>,
    // Fragment pairs already compared, with the exclusivity they were
    // compared under. A pair compared as non-exclusive covers both kinds of
    // comparison; one compared as mutually exclusive only covers itself.
    compared_fragments: RefCell<HashMap<(&'a str, &'a str), bool>>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        named_fragments: HashMap::new(),
        compared_fragments: RefCell::new(HashMap::new()),
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn fragments_compared(&self, a: &'a str, b: &'a str, mutually_exclusive: bool) -> bool {
        match self.compared_fragments.borrow().get(&pair_key(a, b)) {
            Some(was_exclusive) => mutually_exclusive || !was_exclusive,
            None => false,
        }
    }

    fn mark_compared(&self, a: &'a str, b: &'a str, mutually_exclusive: bool) {
        self.compared_fragments
            .borrow_mut()
            .insert(pair_key(a, b), mutually_exclusive);
    }

    fn conflicts_in_selection_set(
        &self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let (field_map, fragment_names) =
            self.fields_and_fragments(parent_type, selection_set, ctx);

        self.conflicts_within(&mut conflicts, &field_map, ctx);

        for (i, frag_name1) in fragment_names.iter().enumerate() {
            self.compare_fields_with_fragment(&mut conflicts, &field_map, frag_name1, false, ctx);

            for frag_name2 in &fragment_names[i + 1..] {
                self.compare_fragments(&mut conflicts, frag_name1, frag_name2, false, ctx);
            }
        }

        conflicts
    }

    fn compare_fragments(
        &self,
        conflicts: &mut Vec<Conflict>,
        fragment_name1: &'a str,
        fragment_name2: &'a str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        if fragment_name1 == fragment_name2 {
            return;
        }

        let (Some(fragment1), Some(fragment2)) = (
            self.named_fragments.get(fragment_name1),
            self.named_fragments.get(fragment_name2),
        ) else {
            return;
        };

        if self.fragments_compared(fragment_name1, fragment_name2, mutually_exclusive) {
            return;
        }
        self.mark_compared(fragment_name1, fragment_name2, mutually_exclusive);

        let (field_map1, fragment_names1) = self.fragment_fields_and_fragments(fragment1, ctx);
        let (field_map2, fragment_names2) = self.fragment_fields_and_fragments(fragment2, ctx);

        self.compare_field_maps(conflicts, mutually_exclusive, &field_map1, &field_map2, ctx);

        for referenced in &fragment_names2 {
            self.compare_fragments(conflicts, fragment_name1, referenced, mutually_exclusive, ctx);
        }
        for referenced in &fragment_names1 {
            self.compare_fragments(conflicts, referenced, fragment_name2, mutually_exclusive, ctx);
        }
    }

    fn compare_fields_with_fragment(
        &self,
        conflicts: &mut Vec<Conflict>,
        field_map: &FieldMap<'a>,
        fragment_name: &str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        let Some(fragment) = self.named_fragments.get(fragment_name) else {
            return;
        };

        let (fragment_fields, referenced_fragments) =
            self.fragment_fields_and_fragments(fragment, ctx);

        self.compare_field_maps(conflicts, mutually_exclusive, field_map, &fragment_fields, ctx);

        for referenced in referenced_fragments {
            self.compare_fields_with_fragment(
                conflicts,
                field_map,
                referenced,
                mutually_exclusive,
                ctx,
            );
        }
    }

    fn compare_field_maps(
        &self,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        field_map1: &FieldMap<'a>,
        field_map2: &FieldMap<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, fields1) in field_map1 {
            let Some(fields2) = field_map2.get(response_name) else {
                continue;
            };

            for field1 in fields1 {
                for field2 in fields2 {
                    conflicts.extend(self.field_conflict(
                        response_name,
                        field1,
                        field2,
                        mutually_exclusive,
                        ctx,
                    ));
                }
            }
        }
    }

    fn conflicts_within(
        &self,
        conflicts: &mut Vec<Conflict>,
        field_map: &FieldMap<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, fields) in field_map {
            for (i, field1) in fields.iter().enumerate() {
                for field2 in &fields[i + 1..] {
                    conflicts.extend(self.field_conflict(response_name, field1, field2, false, ctx));
                }
            }
        }
    }

    fn field_conflict(
        &self,
        response_name: &str,
        field1: &FieldEntry<'a>,
        field2: &FieldEntry<'a>,
        parents_mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) -> Option<Conflict> {
        let conflict = |cause: String| {
            Some(Conflict {
                reason: ConflictReason {
                    response_name: response_name.into(),
                    cause: ConflictCause::Text(cause),
                },
                first: vec![field1.ast.span.start],
                second: vec![field2.ast.span.start],
            })
        };

        // Two occurrences on distinct object types can never both apply to
        // one runtime object, so their shape may differ freely.
        let mutually_exclusive = parents_mutually_exclusive
            || (field1.parent_type != field2.parent_type
                && self.is_object_type(ctx, field1.parent_type)
                && self.is_object_type(ctx, field2.parent_type));

        if !mutually_exclusive {
            let name1 = field1.ast.item.name.item;
            let name2 = field2.ast.item.name.item;

            if name1 != name2 {
                return conflict(format!("{name1} and {name2} are different fields"));
            }

            if !same_arguments(&field1.ast.item.arguments, &field2.ast.item.arguments) {
                return conflict("they have differing arguments".into());
            }
        }

        let t1 = field1.def.map(|def| &def.field_type);
        let t2 = field2.def.map(|def| &def.field_type);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            if self.returns_conflicting_types(ctx, t1, t2) {
                return conflict(format!("they return conflicting types {t1} and {t2}"));
            }
        }

        if let (Some(s1), Some(s2)) = (
            &field1.ast.item.selection_set,
            &field2.ast.item.selection_set,
        ) {
            let nested = self.subselection_conflicts(
                mutually_exclusive,
                t1.map(Type::innermost_name),
                s1,
                t2.map(Type::innermost_name),
                s2,
                ctx,
            );

            return nested_conflict(
                nested,
                response_name,
                field1.ast.span.start,
                field2.ast.span.start,
            );
        }

        None
    }

    #[allow(clippy::too_many_arguments)]
    fn subselection_conflicts(
        &self,
        mutually_exclusive: bool,
        parent_type1: Option<&str>,
        selection_set1: &'a [Selection<'a>],
        parent_type2: Option<&str>,
        selection_set2: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let parent_type1 = parent_type1.and_then(|t| ctx.schema.concrete_type_by_name(t));
        let parent_type2 = parent_type2.and_then(|t| ctx.schema.concrete_type_by_name(t));

        let (field_map1, fragment_names1) =
            self.fields_and_fragments(parent_type1, selection_set1, ctx);
        let (field_map2, fragment_names2) =
            self.fields_and_fragments(parent_type2, selection_set2, ctx);

        self.compare_field_maps(
            &mut conflicts,
            mutually_exclusive,
            &field_map1,
            &field_map2,
            ctx,
        );

        for fragment_name in &fragment_names2 {
            self.compare_fields_with_fragment(
                &mut conflicts,
                &field_map1,
                fragment_name,
                mutually_exclusive,
                ctx,
            );
        }
        for fragment_name in &fragment_names1 {
            self.compare_fields_with_fragment(
                &mut conflicts,
                &field_map2,
                fragment_name,
                mutually_exclusive,
                ctx,
            );
        }

        for fragment_name1 in &fragment_names1 {
            for fragment_name2 in &fragment_names2 {
                self.compare_fragments(
                    &mut conflicts,
                    fragment_name1,
                    fragment_name2,
                    mutually_exclusive,
                    ctx,
                );
            }
        }

        conflicts
    }

    fn returns_conflicting_types(
        &self,
        ctx: &ValidatorContext<'a>,
        t1: &Type<'_>,
        t2: &Type<'_>,
    ) -> bool {
        match (t1, t2) {
            (Type::List(inner1), Type::List(inner2))
            | (Type::NonNullList(inner1), Type::NonNullList(inner2)) => {
                self.returns_conflicting_types(ctx, inner1, inner2)
            }
            (Type::NonNullNamed(n1), Type::NonNullNamed(n2))
            | (Type::Named(n1), Type::Named(n2)) => {
                // Composite types may diverge here; only leaves must agree
                // exactly, as their serialized forms end up merged.
                let leaf = |n: &str| {
                    ctx.schema
                        .concrete_type_by_name(n)
                        .is_some_and(MetaType::is_leaf)
                };
                (leaf(n1) || leaf(n2)) && n1 != n2
            }
            _ => true,
        }
    }

    fn is_object_type(&self, ctx: &ValidatorContext<'a>, type_name: Option<&str>) -> bool {
        matches!(
            type_name.and_then(|n| ctx.schema.concrete_type_by_name(n)),
            Some(MetaType::Object(_))
        )
    }

    fn fragment_fields_and_fragments(
        &self,
        fragment: &'a Fragment<'a>,
        ctx: &ValidatorContext<'a>,
    ) -> (FieldMap<'a>, Vec<&'a str>) {
        let fragment_type = ctx
            .schema
            .concrete_type_by_name(fragment.type_condition.item);

        self.fields_and_fragments(fragment_type, &fragment.selection_set, ctx)
    }

    fn fields_and_fragments(
        &self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> (FieldMap<'a>, Vec<&'a str>) {
        let mut field_map = FieldMap::new();
        let mut fragment_names = Vec::new();

        self.collect_fields_and_fragments(
            parent_type,
            selection_set,
            ctx,
            &mut field_map,
            &mut fragment_names,
        );

        (field_map, fragment_names)
    }

    fn collect_fields_and_fragments(
        &self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
        field_map: &mut FieldMap<'a>,
        fragment_names: &mut Vec<&'a str>,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field(f) => {
                    let def = parent_type.and_then(|t| t.field_by_name(f.item.name.item));

                    field_map
                        .entry(f.item.response_key())
                        .or_default()
                        .push(FieldEntry {
                            parent_type: parent_type.map(MetaType::name),
                            ast: f,
                            def,
                        });
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.item.name.item;
                    if !fragment_names.contains(&name) {
                        fragment_names.push(name);
                    }
                }
                Selection::InlineFragment(inline) => {
                    let parent_type = inline
                        .item
                        .type_condition
                        .as_ref()
                        .and_then(|cond| ctx.schema.concrete_type_by_name(cond.item))
                        .or(parent_type);

                    self.collect_fields_and_fragments(
                        parent_type,
                        &inline.item.selection_set,
                        ctx,
                        field_map,
                        fragment_names,
                    );
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        for def in defs {
            if let Definition::Fragment(Spanning { item, .. }) = def {
                self.named_fragments.insert(item.name.item, item);
            }
        }
    }

    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a [Selection<'a>],
    ) {
        for Conflict {
            reason,
            mut first,
            mut second,
        } in self.conflicts_in_selection_set(ctx.parent_type(), selection_set, ctx)
        {
            first.append(&mut second);
            ctx.report_error(&error_message(&reason.response_name, &reason.cause), &first);
        }
    }
}

/// The positions of a nested conflict are the two outer fields followed by
/// every conflicting subfield position on the respective side.
fn nested_conflict(
    nested: Vec<Conflict>,
    response_name: &str,
    pos1: SourcePosition,
    pos2: SourcePosition,
) -> Option<Conflict> {
    if nested.is_empty() {
        return None;
    }

    let mut first = vec![pos1];
    let mut second = vec![pos2];
    let mut causes = Vec::with_capacity(nested.len());
    for conflict in nested {
        first.extend(conflict.first);
        second.extend(conflict.second);
        causes.push(conflict.reason);
    }

    Some(Conflict {
        reason: ConflictReason {
            response_name: response_name.into(),
            cause: ConflictCause::Nested(causes),
        },
        first,
        second,
    })
}

fn same_arguments(
    args1: &Option<Spanning<Arguments<'_>>>,
    args2: &Option<Spanning<Arguments<'_>>>,
) -> bool {
    match (args1, args2) {
        (None, None) => true,
        (Some(args1), Some(args2)) => {
            args1.item.len() == args2.item.len()
                && args1.item.iter().all(|(n1, v1)| {
                    args2
                        .item
                        .get(n1.item)
                        .is_some_and(|v2| v1.item.unlocated_eq(&v2.item))
                })
        }
        _ => false,
    }
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn error_message(reason_name: &str, cause: &ConflictCause) -> String {
    let suffix = "Use different aliases on the fields to fetch both if this was intentional";
    format!(
        r#"Fields "{reason_name}" conflict because {}. {suffix}"#,
        format_cause(cause),
    )
}

fn format_cause(cause: &ConflictCause) -> String {
    match cause {
        ConflictCause::Text(text) => text.clone(),
        ConflictCause::Nested(nested) => nested
            .iter()
            .map(|reason| {
                format!(
                    r#"subfields "{}" conflict because {}"#,
                    reason.response_name,
                    format_cause(&reason.cause),
                )
            })
            .collect::<Vec<_>>()
            .join(" and "),
    }
}
