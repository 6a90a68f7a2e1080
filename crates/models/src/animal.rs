use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{location, organization};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub code_father: Option<String>,
    pub code_mother: Option<String>,
    pub weight: Option<f64>,
    pub birthday: DateTimeWithTimeZone,
    pub gender: String,
    pub animal_type: String,
    pub production_phase: String,
    pub electronic_code: Option<String>,
    pub status: String,
    pub location_id: Uuid,
    pub breed_id: Option<Uuid>,
    pub user_created_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organization,
    Location,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organization => Entity::belongs_to(organization::Entity)
                .from(Column::OrganizationId)
                .to(organization::Column::Id)
                .into(),
            Relation::Location => Entity::belongs_to(location::Entity)
                .from(Column::LocationId)
                .to(location::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
