//! REST API client module for the volunteer backend.
//!
//! This module provides the `ApiClient` for talking to the Express/MongoDB
//! volunteer service (`/api/v1/volunteers`, `/regions`, `/stats`). Every
//! response is wrapped in a `{ success, data, message }` envelope.
//!
//! The client doubles as a `CountrySource`, reading a country's volunteers
//! through `GET /volunteers?region={CODE}`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
