//! Core types and trait definitions for the taxdesk record keeper.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! The entity gateways here talk to storage only through the
//! [`store::TaxOfficeStore`] handle passed into each call.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod client;
pub mod display;
pub mod error;
pub mod id;
pub mod staff;
pub mod store;
pub mod tax_return;

pub use error::{Error, Result};
