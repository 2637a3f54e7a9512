#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Deadlock-avoiding resource allocation for banker
//!
//! This crate holds the shared resource ledger, the safety oracle that
//! decides whether a ledger state is safe, and the allocator that grants
//! or denies requests under a single exclusive lock.

pub mod allocator;
pub mod ledger;
pub mod safety;

pub use allocator::Allocator;
pub use ledger::{InvariantViolation, Ledger};
pub use safety::{is_safe, safe_sequence, safe_sequence_in_order};
