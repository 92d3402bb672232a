//! # Roster Shared
//!
//! Wire types shared by the HTTP server and its clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, PageMeta, PagedResponse};
