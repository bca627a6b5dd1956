//! Core types for the resale catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod product;
pub mod user;
pub mod user_id;

pub use code::{ProductCode, ProductCodeError};
pub use product::{Product, ProductCollection, UNKNOWN_BRAND, UNSPECIFIED};
pub use user::{User, UserInfo, WishlistEntry};
pub use user_id::{UserId, UserIdError};
