//! Store-agnostic predicates and the selection → predicate builder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::PaginationRequest;
use crate::schema::{EntitySchema, FieldValue, DELETED_AT};

/// Filter tree understood by every [`crate::store::RecordStore`].
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Eq(&'static str, FieldValue),
    /// Case-insensitive substring match.
    Contains(&'static str, String),
    IsNull(&'static str),
    IsNotNull(&'static str),
}

/// Which rows a read may see with respect to soft deletion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only rows with `deleted_at IS NULL`.
    #[default]
    Active,
    IncludeDeleted,
    DeletedOnly,
}

/// One exact-match selector: schema field name and the value to match.
pub type Filter = (&'static str, FieldValue);

/// Read-side selection for one entity.
pub trait Selection {
    fn search(&self) -> Option<&str> { None }

    /// Value pinned on the schema's owner column, if any.
    fn owner(&self) -> Option<Uuid>;

    /// Present exact-match selectors. Absent ones must simply be left out.
    fn filters(&self) -> Vec<Filter>;

    fn visibility(&self) -> Visibility { Visibility::Active }
}

/// Selection used by list operations.
pub trait ListSelection: Selection {
    fn pagination(&self) -> &PaginationRequest;
}

/// Push `(name, value)` onto `filters` when `value` is present.
pub(crate) fn push_filter<T: Into<FieldValue>>(filters: &mut Vec<Filter>, name: &'static str, value: Option<T>) {
    if let Some(v) = value {
        filters.push((name, v.into()));
    }
}

/// Build the predicate for `selection` against `schema`.
///
/// The result is always a conjunction of:
/// - an `Any` group of case-insensitive matches over the searchable fields,
///   when the trimmed search term is non-empty
/// - the owner scope, when the selection carries one
/// - one exact match per present selector, coerced to the field kind
/// - the soft-delete clause implied by the selection's [`Visibility`]
pub fn build_predicate(schema: &EntitySchema, selection: &(impl Selection + ?Sized)) -> Result<Predicate, ServiceError> {
    let search = selection
        .search()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            Predicate::Any(
                schema
                    .search_fields()
                    .map(|field| Predicate::Contains(field, term.to_string()))
                    .collect(),
            )
        })
        .filter(|group| !matches!(group, Predicate::Any(parts) if parts.is_empty()));

    let owner = selection.owner().map(|id| (schema.owner, FieldValue::Uuid(id)));

    let exact = owner
        .into_iter()
        .chain(selection.filters())
        .map(|(name, value)| {
            let field = schema.filterable(name)?;
            let value = value
                .coerce(field.kind)
                .map_err(|e| ServiceError::Validation(format!("{}.{}: {}", schema.name, name, e)))?;
            Ok(Predicate::Eq(field.name, value))
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    let visibility = match selection.visibility() {
        Visibility::Active => Some(Predicate::IsNull(DELETED_AT)),
        Visibility::IncludeDeleted => None,
        Visibility::DeletedOnly => Some(Predicate::IsNotNull(DELETED_AT)),
    };

    Ok(Predicate::All(search.into_iter().chain(exact).chain(visibility).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, FieldSchema, DELETED_AT_FIELD, ID_FIELD};

    const KINDS: &[&str] = &["PIG", "BOVINE"];

    static HERD_FIELDS: [FieldSchema; 6] = [
        ID_FIELD,
        FieldSchema::new("organization_id", FieldKind::Uuid).writable(),
        FieldSchema::new("code", FieldKind::Text).writable().searchable().filterable(),
        FieldSchema::new("tag", FieldKind::Text).writable().searchable(),
        FieldSchema::new("kind", FieldKind::Enum(KINDS)).writable().filterable(),
        DELETED_AT_FIELD,
    ];

    static HERD: EntitySchema = EntitySchema { name: "herd", owner: "organization_id", fields: &HERD_FIELDS };

    #[derive(Default)]
    struct HerdSelection {
        search: Option<String>,
        organization_id: Option<Uuid>,
        code: Option<String>,
        kind: Option<&'static str>,
        visibility: Visibility,
    }

    impl Selection for HerdSelection {
        fn search(&self) -> Option<&str> { self.search.as_deref() }
        fn owner(&self) -> Option<Uuid> { self.organization_id }
        fn filters(&self) -> Vec<Filter> {
            let mut filters = Vec::new();
            push_filter(&mut filters, "code", self.code.clone());
            push_filter(&mut filters, "kind", self.kind);
            filters
        }
        fn visibility(&self) -> Visibility { self.visibility }
    }

    #[test]
    fn empty_selection_only_hides_deleted_rows() {
        let p = build_predicate(&HERD, &HerdSelection::default()).unwrap();
        assert_eq!(p, Predicate::All(vec![Predicate::IsNull(DELETED_AT)]));
    }

    #[test]
    fn blank_search_adds_no_constraint() {
        let sel = HerdSelection { search: Some("   ".into()), ..Default::default() };
        let p = build_predicate(&HERD, &sel).unwrap();
        assert_eq!(p, Predicate::All(vec![Predicate::IsNull(DELETED_AT)]));
    }

    #[test]
    fn search_terms_are_independent_or_clauses() {
        let org = Uuid::new_v4();
        let sel = HerdSelection { search: Some(" a1 ".into()), organization_id: Some(org), ..Default::default() };
        let p = build_predicate(&HERD, &sel).unwrap();
        assert_eq!(
            p,
            Predicate::All(vec![
                Predicate::Any(vec![
                    Predicate::Contains("code", "a1".into()),
                    Predicate::Contains("tag", "a1".into()),
                ]),
                Predicate::Eq("organization_id", FieldValue::Uuid(org)),
                Predicate::IsNull(DELETED_AT),
            ])
        );
    }

    #[test]
    fn present_selectors_become_exact_matches() {
        let sel = HerdSelection {
            code: Some("A2".into()),
            kind: Some("PIG"),
            visibility: Visibility::IncludeDeleted,
            ..Default::default()
        };
        let p = build_predicate(&HERD, &sel).unwrap();
        assert_eq!(
            p,
            Predicate::All(vec![
                Predicate::Eq("code", FieldValue::Text("A2".into())),
                Predicate::Eq("kind", FieldValue::Text("PIG".into())),
            ])
        );
    }

    #[test]
    fn enum_selectors_reject_partial_values() {
        let sel = HerdSelection { kind: Some("PI"), ..Default::default() };
        assert!(matches!(build_predicate(&HERD, &sel), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn deleted_only_inverts_the_visibility_clause() {
        let sel = HerdSelection { visibility: Visibility::DeletedOnly, ..Default::default() };
        let p = build_predicate(&HERD, &sel).unwrap();
        assert_eq!(p, Predicate::All(vec![Predicate::IsNotNull(DELETED_AT)]));
    }
}
