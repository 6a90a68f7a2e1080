use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::pagination::Identified;
use crate::query::{Filter, ListSelection, Selection, Visibility};
use crate::schema::{EntitySchema, ID};

/// Binds one entity's schema to its record and option types.
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Serialize + Identified + Clone + Debug + Send + Sync;
    type List: ListSelection + Send + Sync;
    type Lookup: Selection + Send + Sync;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    fn schema() -> &'static EntitySchema;
}

/// Identity of one record, optionally pinned to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordKey {
    pub id: Uuid,
    pub owner: Option<Uuid>,
}

impl RecordKey {
    pub fn new(id: Uuid) -> Self { Self { id, owner: None } }

    /// Restrict the key to records owned by `owner`.
    pub fn owned_by(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Mutations must reach soft-deleted rows too, so a restore can find them.
impl Selection for RecordKey {
    fn owner(&self) -> Option<Uuid> { self.owner }

    fn filters(&self) -> Vec<Filter> { vec![(ID, self.id.into())] }

    fn visibility(&self) -> Visibility { Visibility::IncludeDeleted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldValue;

    #[test]
    fn key_selects_by_id_across_visibility() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let key = RecordKey::new(id).owned_by(owner);
        assert_eq!(key.owner(), Some(owner));
        assert_eq!(key.filters(), vec![(ID, FieldValue::Uuid(id))]);
        assert_eq!(key.visibility(), Visibility::IncludeDeleted);
    }
}
