//! Concrete collaborators behind the sync traits

pub mod csv_source;
pub mod pipedrive_client;

#[cfg(test)]
pub mod tests;

pub use csv_source::*;
pub use pipedrive_client::*;
