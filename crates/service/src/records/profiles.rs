use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Identified, PaginationRequest};
use crate::query::{push_filter, Filter, ListSelection, Selection, Visibility};
use crate::resource::Resource;
use crate::schema::{
    EntitySchema, FieldKind, FieldSchema, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

static FIELDS: [FieldSchema; 16] = [
    ID_FIELD,
    FieldSchema::new("user_id", FieldKind::Uuid).create_only(),
    FieldSchema::new("first_name", FieldKind::Text).writable().searchable().sortable(),
    FieldSchema::new("last_name", FieldKind::Text).writable().searchable().sortable(),
    FieldSchema::new("address", FieldKind::Text).nullable().writable(),
    FieldSchema::new("phone", FieldKind::Text).nullable().writable(),
    FieldSchema::new("photo", FieldKind::Text).nullable().writable(),
    FieldSchema::new("color", FieldKind::Text).nullable().writable(),
    FieldSchema::new("url", FieldKind::Text).nullable().writable(),
    FieldSchema::new("company_name", FieldKind::Text).nullable().writable(),
    FieldSchema::new("occupation", FieldKind::Text).nullable().writable(),
    FieldSchema::new("description", FieldKind::Text).nullable().writable(),
    FieldSchema::new("birthday", FieldKind::Timestamp).nullable().writable(),
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    DELETED_AT_FIELD,
];

pub static SCHEMA: EntitySchema = EntitySchema { name: "profile", owner: "user_id", fields: &FIELDS };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub color: Option<String>,
    pub url: Option<String>,
    pub company_name: Option<String>,
    pub occupation: Option<String>,
    pub description: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Profile {
    fn id(&self) -> Uuid { self.id }
}

/// Profiles are listed across users unless `user_id` pins one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileList {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl Selection for ProfileList {
    fn search(&self) -> Option<&str> { self.search.as_deref() }

    fn owner(&self) -> Option<Uuid> { self.user_id }

    fn filters(&self) -> Vec<Filter> { Vec::new() }

    fn visibility(&self) -> Visibility { self.visibility }
}

impl ListSelection for ProfileList {
    fn pagination(&self) -> &PaginationRequest { &self.pagination }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileLookup {
    pub user_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub visibility: Visibility,
}

impl Selection for ProfileLookup {
    fn owner(&self) -> Option<Uuid> { self.user_id }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        push_filter(&mut filters, "id", self.id);
        filters
    }

    fn visibility(&self) -> Visibility { self.visibility }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<DateTime<Utc>>,
}

impl CreateProfile {
    pub fn new(user_id: Uuid, first_name: &str, last_name: &str) -> Self {
        Self {
            user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: None,
            phone: None,
            photo: None,
            color: None,
            url: None,
            company_name: None,
            occupation: None,
            description: None,
            birthday: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

pub struct Profiles;

impl Resource for Profiles {
    type Record = Profile;
    type List = ProfileList;
    type Lookup = ProfileLookup;
    type Create = CreateProfile;
    type Update = UpdateProfile;

    fn schema() -> &'static EntitySchema { &SCHEMA }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_predicate, Predicate};
    use crate::schema::DELETED_AT;

    #[test]
    fn names_are_searched_independently() {
        let list = ProfileList { search: Some("dupont".into()), ..Default::default() };
        assert_eq!(
            build_predicate(&SCHEMA, &list).unwrap(),
            Predicate::All(vec![
                Predicate::Any(vec![
                    Predicate::Contains("first_name", "dupont".into()),
                    Predicate::Contains("last_name", "dupont".into()),
                ]),
                Predicate::IsNull(DELETED_AT),
            ])
        );
    }
}
