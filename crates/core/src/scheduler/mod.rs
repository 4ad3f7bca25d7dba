//! Cooperative multi-rate task scheduler
//!
//! This module provides a single-threaded, non-preemptive dispatcher for the
//! three periodic tasks of the line follower. Task bodies run to completion
//! on the caller's thread; the scheduler only decides which tasks are due and
//! records when they last ran.
//!
//! # Components
//!
//! - [`types`]: Task metadata and runtime statistics
//! - [`cooperative`]: Due-task evaluation and last-run bookkeeping
//!
//! # Example
//!
//! ```rust
//! use line_tracer_core::scheduler::{ScheduleConfig, Scheduler, TaskId, TaskSet};
//!
//! let mut scheduler = Scheduler::new(&ScheduleConfig::default());
//!
//! let due = scheduler.poll(11);
//! assert!(due.contains(TaskSet::LINE_SENSOR));
//! assert!(!due.contains(TaskSet::NAVIGATION));
//!
//! scheduler.complete(TaskId::LineSensor, 11, 2_900);
//! assert!(scheduler.poll(12).is_empty());
//! ```

pub mod cooperative;
pub mod types;

pub use cooperative::{ScheduleConfig, Scheduler, TaskId, TaskSet};
pub use types::{TaskMetadata, TaskStats};
