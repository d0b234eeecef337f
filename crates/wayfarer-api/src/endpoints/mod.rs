//! Endpoint methods on [`crate::ApiClient`], one module per resource.
//!
//! These only shape parameters and pick the path; header handling and
//! error normalisation live in the client.

pub mod activities;
pub mod auth;
pub mod expenses;
pub mod itinerary;
pub mod places;
pub mod plans;
