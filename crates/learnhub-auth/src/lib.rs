//! # LearnHub Auth
//!
//! Access token claims and the JWT codec for the LearnHub API.
//!
//! This crate provides:
//!
//! - [`claims`]: The canonical [`AccessClaims`] and the wire [`ClaimShape`] union
//! - [`jwt`]: [`JwtCodec`] for signing, verifying and peeking at access tokens
//! - [`refresh`]: Opaque refresh token generation
//!
//! # Example
//!
//! ```ignore
//! use learnhub_auth::{JwtCodec, generate_refresh_token};
//! use learnhub_config::JwtConfig;
//!
//! let codec = JwtCodec::new(&JwtConfig::from_env(environment)?);
//! let access = codec.sign(user_id, roles)?;
//! let refresh = generate_refresh_token();
//! ```

pub mod claims;
pub mod jwt;
pub mod refresh;

// Re-export commonly used types at crate root
pub use claims::{AccessClaims, ClaimShape, RawClaims};
pub use jwt::JwtCodec;
pub use refresh::generate_refresh_token;
