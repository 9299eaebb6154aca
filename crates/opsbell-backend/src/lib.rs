//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle: it keeps the persisted notification
//! list, listens on the realtime event channel, talks to the push API, and
//! routes bridge messages to the services doing that work.

mod app;
pub mod channel;
mod config;
mod endpoint;
pub mod push;
mod runtime;
mod services;
mod state;
pub mod store;

pub use crate::runtime::run;
