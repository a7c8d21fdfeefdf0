//! Persistence: the CSV store, plus optional DataFrame export.

#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod store;

pub use store::{LocalStore, StoreError};
