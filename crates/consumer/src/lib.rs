#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Consumer actors for banker
//!
//! Each consumer runs as an independent tokio task that repeatedly asks the
//! allocator for resources, holds a grant for a while, gives it back, and
//! pauses. The loop has no exit condition of its own; it stops only when
//! the pool signals shutdown.

pub mod actor;
pub mod pool;
pub mod strategy;

pub use actor::{ActorTiming, ConsumerActor, ConsumerReport, DenialCounts};
pub use pool::ConsumerPool;
pub use strategy::{RequestStrategy, ScriptedStrategy, UniformStrategy};
