//! Coffee Roulette Deterministic Simulation Testing (DST) Harness
//!
//! This crate provides a controlled environment where the round-formation
//! engine runs deterministically, round after round, under an independent
//! oracle.
//!
//! # Core Principle: Everything From One Seed
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: Virtual clock starting 2024-01-01, advanced one week per round
//! - **Randomness**: Shuffles and roster churn derived from a single 64-bit seed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        SimWorld                         │
//! │  ┌────────────────────┐      ┌───────────────────────┐  │
//! │  │ SimContext         │─────►│ Matchmaker<SimContext>│  │
//! │  │ (clock + ChaCha8)  │      │  (engine under test)  │  │
//! │  └────────────────────┘      └───────────┬───────────┘  │
//! │                                          │ RoundReport  │
//! │                              ┌───────────▼───────────┐  │
//! │                              │        Oracle         │  │
//! │                              │ (independent ledger)  │  │
//! │                              └───────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roulette_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::OddSitOut);
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;
mod session;
mod world;

pub use context::SimContext;
pub use error::{SimError, SimResult};
pub use exporter::{read_history, read_roster, write_history, RoundFrame, SimExport};
pub use oracle::{Oracle, RoundAudit, Violation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use scenarios::{ScenarioId, ScenarioSetup};
pub use session::CsvSession;
pub use world::{RoundOutcome, SimConfig, SimWorld, ROUND_INTERVAL};
