//! Remote list fetch-and-select core.
//!
//! [`FetchGateway`] performs one catalog search and normalizes the response;
//! [`ListSelectionController`] drives the fetch lifecycle and tracks a single
//! selected record for whatever presentation layer subscribes to it.

pub mod controller;
pub mod gateway;

pub use controller::{
    ControllerError, ControllerSnapshot, FetchState, ListSelectionController, StartOutcome,
};
pub use gateway::{FetchGateway, HttpFetchGateway, RetryPolicy};
