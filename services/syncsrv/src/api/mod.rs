//! API handlers for the Synchronization Service

pub mod csrf;
pub mod dto;
pub mod health_handlers;
pub mod record_handlers;
pub mod sync_handlers;
