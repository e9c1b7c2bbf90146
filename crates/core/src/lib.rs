//! Domain foundation for the outpost control plane.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API server, and any future CLI tooling without
//! dragging in the database or HTTP stacks.

pub mod dispatch;
pub mod error;
pub mod risk;
pub mod types;
