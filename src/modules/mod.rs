//! Feature modules.
//!
//! Each module follows the same layout:
//!
//! - `service.rs`: business logic over the injected store
//! - `controller.rs`: HTTP handlers
//! - `router.rs`: axum router for the module's routes

pub mod auth;
pub mod roles;
pub mod teaching;
pub mod users;
