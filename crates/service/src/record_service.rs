use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::pagination::{paginate, Identified, PaginationResponse};
use crate::query::{build_predicate, ListSelection};
use crate::records::{Animals, Deaths, Feedings, Locations, Profiles};
use crate::resource::{RecordKey, Resource};
use crate::schema::{FieldValue, Fields, Projection, DELETED_AT};
use crate::store::RecordStore;

/// Generic list/lookup/create/update service for one entity.
pub struct RecordService<R: Resource> {
    store: Arc<dyn RecordStore>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for RecordService<R> {
    fn clone(&self) -> Self { Self { store: self.store.clone(), _resource: PhantomData } }
}

pub type AnimalService = RecordService<Animals>;
pub type DeathService = RecordService<Deaths>;
pub type FeedingService = RecordService<Feedings>;
pub type LocationService = RecordService<Locations>;
pub type ProfileService = RecordService<Profiles>;

impl<R: Resource> RecordService<R> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self { Self { store, _resource: PhantomData } }

    /// One page of records matching `selection`, with pagination metadata.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{records::AnimalList, AnimalService, MemoryStore};
    /// let svc = AnimalService::new(Arc::new(MemoryStore::new()));
    /// let page = tokio_test::block_on(svc.find_all(&AnimalList::new(uuid::Uuid::new_v4()))).unwrap();
    /// assert_eq!(page.row_count, 0);
    /// assert_eq!(page.current_page, Some(1));
    /// ```
    #[instrument(skip_all, fields(entity = R::schema().name))]
    pub async fn find_all(&self, selection: &R::List) -> Result<PaginationResponse<R::Record>, ServiceError> {
        let schema = R::schema();
        let predicate = build_predicate(schema, selection)?;
        let page = selection.pagination().normalize();
        schema.ensure_sortable(&page.order_by.field)?;

        let (rows, row_count) = tokio::try_join!(
            self.store.find_many(schema, &predicate, &page),
            self.store.count(schema, &predicate),
        )?;
        let items = rows
            .into_iter()
            .map(|row| schema.decode::<R::Record>(row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(row_count, returned = items.len(), take = page.take, skip = page.skip, "records_listed");
        Ok(paginate(&page, row_count, items))
    }

    /// First record matching `lookup`, if any.
    #[instrument(skip_all, fields(entity = R::schema().name))]
    pub async fn find_one_by(&self, lookup: &R::Lookup) -> Result<Option<R::Record>, ServiceError> {
        let schema = R::schema();
        let predicate = build_predicate(schema, lookup)?;
        self.store
            .find_first(schema, &predicate)
            .await?
            .map(|row| schema.decode(row))
            .transpose()
    }

    #[instrument(skip_all, fields(entity = R::schema().name))]
    pub async fn create_one(&self, options: &R::Create) -> Result<R::Record, ServiceError> {
        let schema = R::schema();
        let fields = schema.project(Projection::Create, options)?;
        let row = self.store.create(schema, fields).await?;
        let record: R::Record = schema.decode(row)?;
        info!(id = %record.id(), "record_created");
        Ok(record)
    }

    /// Apply `options` to the record identified by `key`.
    ///
    /// A key outside its owner scope is indistinguishable from a missing one.
    #[instrument(skip_all, fields(entity = R::schema().name, id = %key.id))]
    pub async fn update_one(&self, key: &RecordKey, options: &R::Update) -> Result<R::Record, ServiceError> {
        let fields = R::schema().project(Projection::Update, options)?;
        let record = self.apply(key, fields).await?;
        info!("record_updated");
        Ok(record)
    }

    /// Hide the record from default reads by stamping `deleted_at`.
    #[instrument(skip_all, fields(entity = R::schema().name, id = %key.id))]
    pub async fn soft_delete_one(&self, key: &RecordKey) -> Result<R::Record, ServiceError> {
        let fields = Fields::from([(DELETED_AT, FieldValue::Timestamp(Utc::now()))]);
        let record = self.apply(key, fields).await?;
        info!("record_soft_deleted");
        Ok(record)
    }

    #[instrument(skip_all, fields(entity = R::schema().name, id = %key.id))]
    pub async fn restore_one(&self, key: &RecordKey) -> Result<R::Record, ServiceError> {
        let fields = Fields::from([(DELETED_AT, FieldValue::Null)]);
        let record = self.apply(key, fields).await?;
        info!("record_restored");
        Ok(record)
    }

    async fn apply(&self, key: &RecordKey, fields: Fields) -> Result<R::Record, ServiceError> {
        let schema = R::schema();
        let predicate = build_predicate(schema, key)?;
        if self.store.find_first(schema, &predicate).await?.is_none() {
            return Err(ServiceError::not_found(schema.name));
        }
        let row = self.store.update(schema, key.id, fields).await?;
        schema.decode(row)
    }
}
