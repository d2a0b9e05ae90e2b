//! # Yatube Core
//!
//! The domain layer of Yatube.
//! This crate contains the blog's entities, the ports infrastructure must
//! implement, listing pagination and the post form. It has no knowledge of
//! HTTP or of any particular database.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
