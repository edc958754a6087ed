//! Clearance workflow domain: catalog types, resolver, step guard, the
//! lifecycle state machine, notification routing, and the engine that ties
//! them to a [`store::ClearanceStore`].
//!
//! This crate has no database or HTTP dependencies so the API layer, the
//! PostgreSQL store, and the event sink can all share one set of rules.

pub mod clearance;
pub mod engine;
pub mod error;
pub mod form_type;
pub mod guard;
pub mod notification;
pub mod resolver;
pub mod roles;
pub mod status;
pub mod store;
pub mod transition;
pub mod types;
pub mod workflow;
