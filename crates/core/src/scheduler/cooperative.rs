//! Due-task evaluation for the cooperative control loop
//!
//! The control loop reads the clock once per pass, asks [`Scheduler::poll`]
//! which tasks are due, runs each due task body to completion in fixed order
//! and reports back with [`Scheduler::complete`]. A task that was due is
//! stamped with the post-completion time, so missed periods are never caught
//! up and a task runs at most once per pass.

use bitflags::bitflags;

use super::types::{TaskMetadata, TaskStats};

/// Number of periodic tasks
pub const TASK_COUNT: usize = 3;

/// Periodic tasks of the line follower, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Line sensor sampling
    LineSensor,
    /// Wheel speed estimation and speed control
    SpeedControl,
    /// Navigation state machine and motor output
    Navigation,
}

impl TaskId {
    /// All tasks in dispatch order
    pub const ALL: [TaskId; TASK_COUNT] =
        [TaskId::LineSensor, TaskId::SpeedControl, TaskId::Navigation];

    const fn index(self) -> usize {
        match self {
            TaskId::LineSensor => 0,
            TaskId::SpeedControl => 1,
            TaskId::Navigation => 2,
        }
    }

    /// Set containing only this task
    pub const fn as_set(self) -> TaskSet {
        match self {
            TaskId::LineSensor => TaskSet::LINE_SENSOR,
            TaskId::SpeedControl => TaskSet::SPEED_CONTROL,
            TaskId::Navigation => TaskSet::NAVIGATION,
        }
    }
}

bitflags! {
    /// Set of tasks due (or run) in one scheduler pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TaskSet: u8 {
        /// Line sensor sampling
        const LINE_SENSOR = 0b001;
        /// Wheel speed estimation and speed control
        const SPEED_CONTROL = 0b010;
        /// Navigation state machine
        const NAVIGATION = 0b100;
    }
}

/// Task periods and budgets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Line sensor sampling period (ms); at least ~8 ms, the sampling worst case
    pub line_sensor_period_ms: u32,
    /// Speed estimation and control period (ms)
    pub speed_period_ms: u32,
    /// Navigation and motor update period (ms)
    pub navigation_period_ms: u32,
    /// Line sensor execution budget (µs)
    pub line_sensor_budget_us: u32,
    /// Speed task execution budget (µs)
    pub speed_budget_us: u32,
    /// Navigation task execution budget (µs)
    pub navigation_budget_us: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            line_sensor_period_ms: 10,
            speed_period_ms: 20,
            navigation_period_ms: 30,
            line_sensor_budget_us: 3_200,
            speed_budget_us: 500,
            navigation_budget_us: 1_000,
        }
    }
}

impl ScheduleConfig {
    /// Build task metadata in dispatch order
    pub fn metadata(&self) -> [TaskMetadata; TASK_COUNT] {
        [
            TaskMetadata {
                name: "line_sensor",
                period_ms: self.line_sensor_period_ms,
                budget_us: self.line_sensor_budget_us,
            },
            TaskMetadata {
                name: "speed_control",
                period_ms: self.speed_period_ms,
                budget_us: self.speed_budget_us,
            },
            TaskMetadata {
                name: "navigation",
                period_ms: self.navigation_period_ms,
                budget_us: self.navigation_budget_us,
            },
        ]
    }
}

#[derive(Debug, Clone, Copy)]
struct TaskSlot {
    metadata: TaskMetadata,
    last_run_ms: u64,
    stats: TaskStats,
}

/// Fixed-period cooperative scheduler
#[derive(Debug, Clone)]
pub struct Scheduler {
    slots: [TaskSlot; TASK_COUNT],
}

impl Scheduler {
    /// Create a scheduler with every task last run at time 0
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            slots: config.metadata().map(|metadata| TaskSlot {
                metadata,
                last_run_ms: 0,
                stats: TaskStats::default(),
            }),
        }
    }

    /// Tasks due at `now_ms`
    ///
    /// Each task is checked independently against the same clock reading.
    pub fn poll(&self, now_ms: u64) -> TaskSet {
        let mut due = TaskSet::empty();
        for task in TaskId::ALL {
            let slot = &self.slots[task.index()];
            if slot.metadata.is_due(slot.last_run_ms, now_ms) {
                due |= task.as_set();
            }
        }
        due
    }

    /// Milliseconds since `task` last ran
    pub fn elapsed_ms(&self, task: TaskId, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.slots[task.index()].last_run_ms)
    }

    /// Record that `task` ran to completion
    ///
    /// # Arguments
    ///
    /// * `finished_ms` - Clock reading taken after the task body returned
    /// * `execution_us` - Measured duration of the task body
    pub fn complete(&mut self, task: TaskId, finished_ms: u64, execution_us: u32) {
        let slot = &mut self.slots[task.index()];
        let period_ms = finished_ms.saturating_sub(slot.last_run_ms);
        slot.stats.record(
            execution_us,
            period_ms.min(u64::from(u32::MAX)) as u32,
            &slot.metadata,
        );
        slot.last_run_ms = finished_ms;
    }

    /// Time of the last completed run of `task`
    pub fn last_run_ms(&self, task: TaskId) -> u64 {
        self.slots[task.index()].last_run_ms
    }

    /// Metadata of `task`
    pub fn metadata(&self, task: TaskId) -> &TaskMetadata {
        &self.slots[task.index()].metadata
    }

    /// Runtime statistics of `task`
    pub fn stats(&self, task: TaskId) -> &TaskStats {
        &self.slots[task.index()].stats
    }

    /// Deadline misses summed over all tasks
    pub fn total_deadline_misses(&self) -> u32 {
        self.slots.iter().map(|s| s.stats.deadline_misses).sum()
    }
}
