use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{animal, organization};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feeding")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub animal_id: Uuid,
    pub feed_type_id: Option<Uuid>,
    pub quantity: f64,
    pub date: DateTimeWithTimeZone,
    pub production_phase: String,
    pub note: Option<String>,
    pub user_created_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organization,
    Animal,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organization => Entity::belongs_to(organization::Entity)
                .from(Column::OrganizationId)
                .to(organization::Column::Id)
                .into(),
            Relation::Animal => Entity::belongs_to(animal::Entity)
                .from(Column::AnimalId)
                .to(animal::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
