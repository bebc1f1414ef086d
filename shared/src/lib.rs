//! Shared types for the Comanda POS backend
//!
//! Holds everything both the server and external consumers need to agree on:
//! entity models with their create/update payloads, response projections,
//! the uniform API envelope, and list-query types.

pub mod models;
pub mod query;
pub mod response;
pub mod util;

pub use query::{ListQuery, SortField, SortOrder};
pub use response::{ApiResponse, ListPayload, Pagination, PaginatedResponse};
