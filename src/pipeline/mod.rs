// src/pipeline/mod.rs

//! The concurrent record pipeline.
//!
//! - [`queue`] is the bounded multi-consumer record queue between the input
//!   reader and the workers.
//! - [`worker`] owns the per-record path (format → execute → report) and the
//!   worker loop.
//! - [`orchestrator`] starts every task, drives the phase transitions and
//!   decides the final outcome of a run.

pub mod orchestrator;
pub mod queue;
pub mod worker;

pub use orchestrator::{Orchestrator, Phase, RunSummary};
pub use queue::{record_queue, RecordReceiver, RecordSender};
pub use worker::{RecordHandler, Worker};
