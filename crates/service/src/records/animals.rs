use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AnimalStatus, AnimalType, Gender, ProductionPhase};
use crate::pagination::{Identified, PaginationRequest};
use crate::query::{push_filter, Filter, ListSelection, Selection, Visibility};
use crate::resource::Resource;
use crate::schema::{
    EntitySchema, FieldKind, FieldSchema, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

static FIELDS: [FieldSchema; 18] = [
    ID_FIELD,
    FieldSchema::new("organization_id", FieldKind::Uuid).create_only(),
    FieldSchema::new("code", FieldKind::Text).writable().searchable().filterable().sortable(),
    FieldSchema::new("code_father", FieldKind::Text).nullable().writable(),
    FieldSchema::new("code_mother", FieldKind::Text).nullable().writable(),
    FieldSchema::new("weight", FieldKind::Float).nullable().writable().sortable(),
    FieldSchema::new("birthday", FieldKind::Timestamp).writable().sortable(),
    FieldSchema::new("gender", FieldKind::Enum(Gender::VALUES)).writable().filterable(),
    FieldSchema::new("animal_type", FieldKind::Enum(AnimalType::VALUES)).writable().filterable(),
    FieldSchema::new("production_phase", FieldKind::Enum(ProductionPhase::VALUES)).writable().filterable(),
    FieldSchema::new("electronic_code", FieldKind::Text).nullable().writable().searchable().filterable(),
    FieldSchema::new("status", FieldKind::Enum(AnimalStatus::VALUES)).writable().filterable(),
    FieldSchema::new("location_id", FieldKind::Uuid).writable().filterable(),
    FieldSchema::new("breed_id", FieldKind::Uuid).nullable().writable().filterable(),
    FieldSchema::new("user_created_id", FieldKind::Uuid).nullable().create_only(),
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    DELETED_AT_FIELD,
];

pub static SCHEMA: EntitySchema = EntitySchema { name: "animal", owner: "organization_id", fields: &FIELDS };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub code_father: Option<String>,
    pub code_mother: Option<String>,
    pub weight: Option<f64>,
    pub birthday: DateTime<Utc>,
    pub gender: Gender,
    pub animal_type: AnimalType,
    pub production_phase: ProductionPhase,
    pub electronic_code: Option<String>,
    pub status: AnimalStatus,
    pub location_id: Uuid,
    pub breed_id: Option<Uuid>,
    pub user_created_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Animal {
    fn id(&self) -> Uuid { self.id }
}

/// List selection; the organization scope is mandatory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimalList {
    pub organization_id: Uuid,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<AnimalStatus>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub animal_type: Option<AnimalType>,
    #[serde(default)]
    pub production_phase: Option<ProductionPhase>,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub breed_id: Option<Uuid>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl AnimalList {
    pub fn new(organization_id: Uuid) -> Self { Self { organization_id, ..Default::default() } }
}

impl Selection for AnimalList {
    fn search(&self) -> Option<&str> { self.search.as_deref() }

    fn owner(&self) -> Option<Uuid> { Some(self.organization_id) }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "status", self.status);
        push_filter(&mut filters, "gender", self.gender);
        push_filter(&mut filters, "animal_type", self.animal_type);
        push_filter(&mut filters, "production_phase", self.production_phase);
        push_filter(&mut filters, "location_id", self.location_id);
        push_filter(&mut filters, "breed_id", self.breed_id);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

impl ListSelection for AnimalList {
    fn pagination(&self) -> &PaginationRequest { &self.pagination }
}

#[derive(Clone, Debug, Default)]
pub struct AnimalLookup {
    pub organization_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub code: Option<String>,
    pub gender: Option<Gender>,
    pub electronic_code: Option<String>,
    pub animal_type: Option<AnimalType>,
    pub status: Option<AnimalStatus>,
    pub production_phase: Option<ProductionPhase>,
    pub visibility: Visibility,
}

impl Selection for AnimalLookup {
    fn owner(&self) -> Option<Uuid> { self.organization_id }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "id", self.id);
        push_filter(&mut filters, "code", self.code.clone());
        push_filter(&mut filters, "gender", self.gender);
        push_filter(&mut filters, "electronic_code", self.electronic_code.clone());
        push_filter(&mut filters, "animal_type", self.animal_type);
        push_filter(&mut filters, "status", self.status);
        push_filter(&mut filters, "production_phase", self.production_phase);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateAnimal {
    pub organization_id: Uuid,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_father: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_mother: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub birthday: DateTime<Utc>,
    pub gender: Gender,
    pub animal_type: AnimalType,
    pub production_phase: ProductionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electronic_code: Option<String>,
    pub status: AnimalStatus,
    pub location_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_created_id: Option<Uuid>,
}

/// Sparse update; `Some(None)` clears a nullable column.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateAnimal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_father: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_mother: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<AnimalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_phase: Option<ProductionPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electronic_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AnimalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

pub struct Animals;

impl Resource for Animals {
    type Record = Animal;
    type List = AnimalList;
    type Lookup = AnimalLookup;
    type Create = CreateAnimal;
    type Update = UpdateAnimal;

    fn schema() -> &'static EntitySchema { &SCHEMA }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_predicate, Predicate};
    use crate::schema::{FieldValue, Projection, DELETED_AT};

    #[test]
    fn list_searches_codes_within_the_organization() {
        let org = Uuid::new_v4();
        let list = AnimalList { search: Some("A1".into()), status: Some(AnimalStatus::Active), ..AnimalList::new(org) };
        let p = build_predicate(&SCHEMA, &list).unwrap();
        assert_eq!(
            p,
            Predicate::All(vec![
                Predicate::Any(vec![
                    Predicate::Contains("code", "A1".into()),
                    Predicate::Contains("electronic_code", "A1".into()),
                ]),
                Predicate::Eq("organization_id", FieldValue::Uuid(org)),
                Predicate::Eq("status", FieldValue::Text("ACTIVE".into())),
                Predicate::IsNull(DELETED_AT),
            ])
        );
    }

    #[test]
    fn organization_is_fixed_after_creation() {
        let opts = serde_json::json!({ "organization_id": Uuid::new_v4(), "code": "B7" });
        let fields = SCHEMA.project(Projection::Update, &opts).unwrap();
        assert!(!fields.contains_key("organization_id"));
        assert!(fields.contains_key("code"));
    }
}
