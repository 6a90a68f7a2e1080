use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AnimalType, ProductionPhase};
use crate::pagination::{Identified, PaginationRequest};
use crate::query::{push_filter, Filter, ListSelection, Selection, Visibility};
use crate::resource::Resource;
use crate::schema::{
    EntitySchema, FieldKind, FieldSchema, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

static FIELDS: [FieldSchema; 11] = [
    ID_FIELD,
    FieldSchema::new("organization_id", FieldKind::Uuid).create_only(),
    FieldSchema::new("number", FieldKind::Text).writable().searchable().filterable().sortable(),
    FieldSchema::new("location_type", FieldKind::Enum(AnimalType::VALUES))
        .writable()
        .searchable()
        .filterable(),
    FieldSchema::new("production_phase", FieldKind::Enum(ProductionPhase::VALUES))
        .writable()
        .searchable()
        .filterable(),
    FieldSchema::new("square_meter", FieldKind::Float).nullable().writable().sortable(),
    FieldSchema::new("manger", FieldKind::Int).nullable().writable(),
    FieldSchema::new("through", FieldKind::Int).nullable().writable(),
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    DELETED_AT_FIELD,
];

pub static SCHEMA: EntitySchema = EntitySchema { name: "location", owner: "organization_id", fields: &FIELDS };

/// A pen or building housing animals of one type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub number: String,
    pub location_type: AnimalType,
    pub production_phase: ProductionPhase,
    pub square_meter: Option<f64>,
    pub manger: Option<i32>,
    pub through: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Location {
    fn id(&self) -> Uuid { self.id }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LocationList {
    pub organization_id: Uuid,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location_type: Option<AnimalType>,
    #[serde(default)]
    pub production_phase: Option<ProductionPhase>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl LocationList {
    pub fn new(organization_id: Uuid) -> Self { Self { organization_id, ..Default::default() } }
}

impl Selection for LocationList {
    fn search(&self) -> Option<&str> { self.search.as_deref() }

    fn owner(&self) -> Option<Uuid> { Some(self.organization_id) }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "location_type", self.location_type);
        push_filter(&mut filters, "production_phase", self.production_phase);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

impl ListSelection for LocationList {
    fn pagination(&self) -> &PaginationRequest { &self.pagination }
}

#[derive(Clone, Debug, Default)]
pub struct LocationLookup {
    pub organization_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub location_type: Option<AnimalType>,
    pub number: Option<String>,
    pub production_phase: Option<ProductionPhase>,
    pub visibility: Visibility,
}

impl Selection for LocationLookup {
    fn owner(&self) -> Option<Uuid> { self.organization_id }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "id", self.id);
        push_filter(&mut filters, "location_type", self.location_type);
        push_filter(&mut filters, "number", self.number.clone());
        push_filter(&mut filters, "production_phase", self.production_phase);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateLocation {
    pub organization_id: Uuid,
    pub number: String,
    pub location_type: AnimalType,
    pub production_phase: ProductionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_meter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manger: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<i32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<AnimalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_phase: Option<ProductionPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_meter: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manger: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

pub struct Locations;

impl Resource for Locations {
    type Record = Location;
    type List = LocationList;
    type Lookup = LocationLookup;
    type Create = CreateLocation;
    type Update = UpdateLocation;

    fn schema() -> &'static EntitySchema { &SCHEMA }
}
