//! Services for the Gridline controller core.
//!
//! This module contains the controller's collaborators:
//! - `compose` - request composition from query state
//! - `fetch` - request execution with cancellation support
//! - `normalize` - response payload classification and shaping
//! - `params` - URL query-parameter state and typed codecs

pub mod compose;
pub mod fetch;
pub mod normalize;
pub mod params;

pub use compose::{compose, safe_encode};
pub use fetch::{FetchService, Fetcher, HttpFetcher};
pub use normalize::classify;
pub use params::UrlState;
