//! # custodia-contracts
//!
//! Shared types and error taxonomy for the CUSTODIA audit trail.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod event;
pub mod financial;
pub mod store;
pub mod verify;
