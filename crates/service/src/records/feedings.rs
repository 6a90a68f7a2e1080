use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::ProductionPhase;
use crate::pagination::{Identified, PaginationRequest};
use crate::query::{push_filter, Filter, ListSelection, Selection, Visibility};
use crate::resource::Resource;
use crate::schema::{
    EntitySchema, FieldKind, FieldSchema, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

static FIELDS: [FieldSchema; 12] = [
    ID_FIELD,
    FieldSchema::new("organization_id", FieldKind::Uuid).create_only(),
    FieldSchema::new("animal_id", FieldKind::Uuid).writable().filterable(),
    FieldSchema::new("feed_type_id", FieldKind::Uuid).nullable().writable().filterable(),
    FieldSchema::new("quantity", FieldKind::Float).writable().sortable(),
    FieldSchema::new("date", FieldKind::Timestamp).writable().sortable(),
    FieldSchema::new("production_phase", FieldKind::Enum(ProductionPhase::VALUES))
        .writable()
        .searchable()
        .filterable(),
    FieldSchema::new("note", FieldKind::Text).nullable().writable().searchable(),
    FieldSchema::new("user_created_id", FieldKind::Uuid).nullable().create_only(),
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    DELETED_AT_FIELD,
];

pub static SCHEMA: EntitySchema = EntitySchema { name: "feeding", owner: "organization_id", fields: &FIELDS };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feeding {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub animal_id: Uuid,
    pub feed_type_id: Option<Uuid>,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    pub production_phase: ProductionPhase,
    pub note: Option<String>,
    pub user_created_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Feeding {
    fn id(&self) -> Uuid { self.id }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedingList {
    pub organization_id: Uuid,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub animal_id: Option<Uuid>,
    #[serde(default)]
    pub feed_type_id: Option<Uuid>,
    #[serde(default)]
    pub production_phase: Option<ProductionPhase>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl FeedingList {
    pub fn new(organization_id: Uuid) -> Self { Self { organization_id, ..Default::default() } }
}

impl Selection for FeedingList {
    fn search(&self) -> Option<&str> { self.search.as_deref() }

    fn owner(&self) -> Option<Uuid> { Some(self.organization_id) }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "animal_id", self.animal_id);
        push_filter(&mut filters, "feed_type_id", self.feed_type_id);
        push_filter(&mut filters, "production_phase", self.production_phase);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

impl ListSelection for FeedingList {
    fn pagination(&self) -> &PaginationRequest { &self.pagination }
}

#[derive(Clone, Debug, Default)]
pub struct FeedingLookup {
    pub organization_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub animal_id: Option<Uuid>,
    pub visibility: Visibility,
}

impl Selection for FeedingLookup {
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
pub struct CreateFeeding {
    pub organization_id: Uuid,
    pub animal_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_type_id: Option<Uuid>,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    pub production_phase: ProductionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_created_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateFeeding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_type_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_phase: Option<ProductionPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

pub struct Feedings;

impl Resource for Feedings {
    type Record = Feeding;
    type List = FeedingList;
    type Lookup = FeedingLookup;
    type Create = CreateFeeding;
    type Update = UpdateFeeding;

    fn schema() -> &'static EntitySchema { &SCHEMA }
}
