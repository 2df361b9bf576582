//! Service layer providing the listing operations on top of models.
//! - Builds filter/sort/pagination queries for the ad catalogue.
//! - Enforces ownership scoping and the ad lifecycle rules.
//! - Provides clear error types for the HTTP layer to map.

pub mod errors;
pub mod pagination;
pub mod car_service;
#[cfg(test)]
pub mod test_support;
