//! SeaORM entities for the farm records schema.

pub mod errors;
pub mod db;
pub mod organization;
pub mod location;
pub mod animal;
pub mod death;
pub mod feeding;
pub mod profile;
