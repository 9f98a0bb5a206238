//! Pepsa Core - Shared types library.
//!
//! This crate provides common types used across all Pepsa components:
//! - `storefront` - Public-facing shopping service
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and domain rules - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`catalog`] - The static product catalog (products and variations)
//! - [`cart`] - The shopping cart and its mutation rules
//! - [`order`] - Order snapshots and the fee breakdown
//! - [`profile`] - The per-user profile document with embedded order history

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod profile;
pub mod types;

pub use cart::{Cart, CartItem, CartMutation};
pub use catalog::{Catalog, Product, Variation};
pub use order::{FeeBreakdown, Order, OrderLine};
pub use profile::{ProfilePatch, UserProfile};
pub use types::*;
