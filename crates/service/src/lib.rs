//! Service layer for farm records: generic paginated queries and mutations
//! over declarative entity schemas.
//! - `query` turns selections into store-agnostic predicates.
//! - `pagination` shapes every list response.
//! - `store` abstracts persistence (in-memory and SeaORM/PostgreSQL).
//! - `records` declares the animal, death, feeding, location and profile entities.

pub mod errors;
pub mod enums;
pub mod schema;
pub mod query;
pub mod pagination;
pub mod resource;
pub mod store;
pub mod records;
pub mod record_service;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use pagination::{OrderBy, PaginationRequest, PaginationResponse};
pub use query::Visibility;
pub use record_service::{AnimalService, DeathService, FeedingService, LocationService, ProfileService, RecordService};
pub use resource::{RecordKey, Resource};
pub use store::{MemoryStore, RecordStore, SeaOrmStore};
