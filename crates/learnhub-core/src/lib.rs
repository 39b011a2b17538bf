//! # LearnHub Core
//!
//! Core types, errors, and utilities for the LearnHub API.
//!
//! This crate provides foundational types used throughout the LearnHub application:
//!
//! - [`errors`]: Application error taxonomy with HTTP response conversion
//! - [`password`]: Secure password hashing and verification
//! - [`permissions`]: Permission constants and the static role → permission table
//!
//! # Example
//!
//! ```ignore
//! use learnhub_core::errors::AppError;
//! use learnhub_core::password::{hash_password, verify_password};
//! use learnhub_core::permissions;
//!
//! // Create an error
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//!
//! // Compute permissions from role names
//! let granted = permissions::permissions_for_roles(&["teacher"]);
//! assert!(granted.contains(&permissions::CREATE_COURSE));
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_password};
