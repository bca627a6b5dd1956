//! Resale Core - Shared domain types.
//!
//! This crate provides the record types shared by every component of the
//! resale catalog:
//! - `catalog` - Record store, query engine, and voyage simulator
//! - `integration-tests` - Cross-component scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and derivation helpers - no I/O, no
//! HTTP clients, no backend access. Records are materialized here by the
//! loader's normalization step with explicit defaults for every optional
//! field, so consumers never do runtime presence checks.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes and the Product / User / WishlistEntry
//!   record types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
