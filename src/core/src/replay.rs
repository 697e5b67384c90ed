//! Offline replay of persisted mirror logs.

pub mod replay_engine;

pub use replay_engine::{replay, ReplayReport, ReplayedFile};
