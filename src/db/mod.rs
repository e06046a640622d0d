mod meters;
mod query;
mod reports;
mod service;
mod store;

pub use store::{Store, SCHEMA_VERSION};

#[cfg(test)]
pub(crate) mod testing;
