//! # lorekeeper
//!
//! A REST API over books, characters, points of interest and species.
//!
//! Every collection implements [`CRUDResource`] and gets list, get, create,
//! update and delete endpoints from the generic handlers in [`routes`]. List
//! endpoints share one pipeline: query parameters are turned into a
//! [`filtering::FilterPredicate`], translated to a Sea-ORM condition and
//! fetched one page at a time ([`pagination`]).

pub mod config;
pub mod db;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod pagination;
pub mod resources;
pub mod response;
pub mod routes;
pub mod traits;
pub mod validation;

pub use config::Config;
pub use errors::ApiError;
pub use response::ApiResponse;
pub use routes::{AppState, app};
pub use traits::CRUDResource;
