use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Identified, PaginationRequest};
use crate::query::{push_filter, Filter, ListSelection, Selection, Visibility};
use crate::resource::Resource;
use crate::schema::{
    EntitySchema, FieldKind, FieldSchema, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

static FIELDS: [FieldSchema; 11] = [
    ID_FIELD,
    FieldSchema::new("organization_id", FieldKind::Uuid).create_only(),
    FieldSchema::new("animal_id", FieldKind::Uuid).writable().filterable(),
    FieldSchema::new("date", FieldKind::Timestamp).writable().sortable(),
    FieldSchema::new("cause", FieldKind::Text).writable().searchable().sortable(),
    FieldSchema::new("method", FieldKind::Text).nullable().writable().searchable(),
    FieldSchema::new("note", FieldKind::Text).nullable().writable().searchable(),
    FieldSchema::new("user_created_id", FieldKind::Uuid).nullable().create_only(),
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    DELETED_AT_FIELD,
];

pub static SCHEMA: EntitySchema = EntitySchema { name: "death", owner: "organization_id", fields: &FIELDS };

/// A recorded death. Recording one leaves the animal's status untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Death {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub animal_id: Uuid,
    pub date: DateTime<Utc>,
    pub cause: String,
    pub method: Option<String>,
    pub note: Option<String>,
    pub user_created_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Death {
    fn id(&self) -> Uuid { self.id }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeathList {
    pub organization_id: Uuid,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub animal_id: Option<Uuid>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl DeathList {
    pub fn new(organization_id: Uuid) -> Self { Self { organization_id, ..Default::default() } }
}

impl Selection for DeathList {
    fn search(&self) -> Option<&str> { self.search.as_deref() }

    fn owner(&self) -> Option<Uuid> { Some(self.organization_id) }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "animal_id", self.animal_id);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

impl ListSelection for DeathList {
    fn pagination(&self) -> &PaginationRequest { &self.pagination }
}

#[derive(Clone, Debug, Default)]
pub struct DeathLookup {
    pub organization_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub animal_id: Option<Uuid>,
    pub visibility: Visibility,
}

impl Selection for DeathLookup {
    fn owner(&self) -> Option<Uuid> { self.organization_id }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "id", self.id);
        push_filter(&mut filters, "animal_id", self.animal_id);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateDeath {
    pub organization_id: Uuid,
    pub animal_id: Uuid,
    pub date: DateTime<Utc>,
    pub cause: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_created_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateDeath {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

pub struct Deaths;

impl Resource for Deaths {
    type Record = Death;
    type List = DeathList;
    type Lookup = DeathLookup;
    type Create = CreateDeath;
    type Update = UpdateDeath;

    fn schema() -> &'static EntitySchema { &SCHEMA }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::schema::Projection;

    #[test]
    fn search_covers_cause_method_and_note() {
        assert_eq!(SCHEMA.search_fields().collect::<Vec<_>>(), vec!["cause", "method", "note"]);
    }

    #[test]
    fn create_requires_a_cause() {
        let opts = serde_json::json!({
            "organization_id": Uuid::new_v4(),
            "animal_id": Uuid::new_v4(),
            "date": "2024-03-01T08:00:00Z",
            "method": "Euthanasia",
        });
        let err = SCHEMA.project(Projection::Create, &opts).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "death.cause is required"), "{err}");
    }

    #[test]
    fn cause_cannot_be_cleared() {
        let opts = serde_json::json!({ "cause": null });
        assert!(SCHEMA.project(Projection::Update, &opts).is_err());
    }
}
