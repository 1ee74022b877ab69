//! # vigil-ingest
//!
//! The reconciliation engine: turns canonical scan rows into finding
//! lifecycle transitions (NEW, OPEN, CLOSED, reopen) inside a single
//! transaction, plus the upload orchestrator that runs the full path
//! from raw file bytes to an [`vigil_core::IngestionSummary`].
//!
//! Reconciliation is synchronous and serialized per (product, plugin);
//! a concurrent upload against the same pair is rejected, never
//! interleaved.

pub mod engine;
pub mod guard;
pub mod orchestrator;
pub mod pipeline;
pub mod validation;

pub use engine::ReconcileEngine;
pub use guard::{ReconcileGuard, ReconcilePermit};
pub use orchestrator::{UploadOrchestrator, UploadRequest};
