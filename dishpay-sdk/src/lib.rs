//! Wire types and the webhook signature scheme shared by Dishpay crates.
//!
//! Nothing in this crate performs I/O.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod objects;
pub mod signature;
