//! Core business logic - framework-agnostic operations on menu items, carts,
//! orders, role groups and user accounts.
//!
//! Every function takes a database handle and returns [`crate::errors::Result`];
//! the HTTP layer only authenticates, checks roles and serializes.

/// User accounts, password hashing and API tokens
pub mod account;
/// Cart rows and their price snapshots
pub mod cart;
/// Role groups and membership
pub mod group;
/// Lenient parsing of flag and ID request fields
pub mod input;
/// Menu catalog
pub mod menu;
/// Checkout and order fulfillment
pub mod order;
