//! # Yatube Shared
//!
//! Request payloads and error bodies shared by the web handlers.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
