use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.chars().count() > 128 {
        return Err(errors::ModelError::Validation("name longer than 128 characters".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::validate_name;

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(129)).is_err());
        assert!(validate_name("Ferme du Lac").is_ok());
    }
}
