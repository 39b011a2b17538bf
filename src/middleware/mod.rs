//! Authentication and authorization middleware.
//!
//! - [`auth`]: token extraction and the verified [`auth::AuthUser`] extractor
//! - [`guard`]: role gates layered onto routers
//!
//! # Authentication Flow
//!
//! 1. The client sends the access token in the `auth_token` cookie or an
//!    `Authorization: Bearer <token>` header
//! 2. A role gate, when present, prechecks the claimed roles and then verifies
//!    the token
//! 3. `AuthUser` hands the verified claims to the handler
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn get_profile(auth_user: AuthUser) -> Result<impl IntoResponse, AppError> {
//!     let user_id = auth_user.user_id()?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod guard;
