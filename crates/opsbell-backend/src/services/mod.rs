//! Backend service handlers for frontend-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (network, storage, the event channel),
//! and emit updates or toasts back to the frontend.

pub mod channel_service;
pub mod config_service;
pub mod notification_service;
pub mod push_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
