//! User and wishlist record types.
//!
//! These types represent validated domain objects separate from the raw
//! remote-table rows the stores read and write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::code::ProductCode;
use crate::types::user_id::UserId;

/// One registered account.
///
/// Created once via registration; never updated or deleted by this system.
#[derive(Debug, Clone)]
pub struct User {
    /// Login identifier, unique across all users.
    pub user_id: UserId,
    /// Fixed-length hex digest of the password, one-way.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Shipping address.
    pub address: String,
    /// Postal code.
    pub zip_code: String,
    /// Optional messenger id.
    pub line_id: Option<String>,
    /// Server-assigned registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reduced user view returned by login and token resolution.
///
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
}

/// One (user, product) wishlist membership fact.
///
/// At most one live entry exists per pair: toggling removes the entry if
/// present, else inserts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistEntry {
    pub user_id: UserId,
    pub product_code: ProductCode,
    pub created_at: DateTime<Utc>,
}
