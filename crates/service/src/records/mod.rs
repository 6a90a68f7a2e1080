//! Per-entity schemas, records and option types.

pub mod animals;
pub mod deaths;
pub mod feedings;
pub mod locations;
pub mod profiles;

pub use animals::{Animal, AnimalList, AnimalLookup, Animals, CreateAnimal, UpdateAnimal};
pub use deaths::{CreateDeath, Death, DeathList, DeathLookup, Deaths, UpdateDeath};
pub use feedings::{CreateFeeding, Feeding, FeedingList, FeedingLookup, Feedings, UpdateFeeding};
pub use locations::{CreateLocation, Location, LocationList, LocationLookup, Locations, UpdateLocation};
pub use profiles::{CreateProfile, Profile, ProfileList, ProfileLookup, Profiles, UpdateProfile};
