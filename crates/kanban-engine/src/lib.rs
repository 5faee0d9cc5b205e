//! Drag-and-drop ordering engine for a single board.
//!
//! [`BoardEngine`] takes gesture events from an input layer, renders
//! provisional views while a drag is open, and reconciles each drop with a
//! [`kanban_persistence::BoardStore`] through the [`ReconciliationGateway`].

pub mod config;
pub mod engine;
pub mod gateway;

pub use config::EngineConfig;
pub use engine::{BoardEngine, RenderEvent};
pub use gateway::{CommitOutcome, QueuedMove, ReconciliationGateway};
