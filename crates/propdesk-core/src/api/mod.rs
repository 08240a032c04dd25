//! REST client module for the site's collection endpoints.
//!
//! This module provides the `ResourceClient` seam the collection stores
//! talk through, and `HttpResourceClient`, its implementation over the
//! site's `/api/<collection>` routes.
//!
//! Every route accepts `GET`, `POST`, `PUT` and `DELETE ?id=` and reports
//! failures as `{"error": "..."}` with a non-2xx status.

pub mod client;
pub mod error;

pub use client::{parse_list, DeleteReceipt, HttpResourceClient, ResourceClient};
pub use error::ApiError;
