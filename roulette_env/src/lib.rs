//! Coffee Roulette Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the group-formation
//! engine to run in both **Production** (system clock, OS entropy) and
//! **Simulation** (virtual clock, seeded RNG) environments.
//!
//! # Core Concept
//!
//! The engine itself performs no I/O. The only things it needs from the
//! outside world are:
//! - Time (`system_time()`) for stamping recorded contacts
//! - Randomness (`random_index()`) for shuffling the roster
//!
//! By deriving all entropy from a single 64-bit seed, any surprising round
//! becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use roulette_env::{RouletteContext, SystemContext};
//!
//! let ctx = SystemContext::shared();
//! let pick = ctx.random_index(10);
//! ```

mod context;
mod system_impl;

pub use context::RouletteContext;
pub use system_impl::SystemContext;
