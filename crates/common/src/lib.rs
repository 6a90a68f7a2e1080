//! Cross-crate helpers shared by the farm records binaries and services.

pub mod utils;
