//! Task metadata and runtime statistics

/// Static description of a periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Name used in logs
    pub name: &'static str,

    /// Minimum spacing between runs in milliseconds
    ///
    /// A task becomes due once strictly more than this has elapsed since its
    /// last run.
    pub period_ms: u32,

    /// Execution time budget in microseconds
    ///
    /// Runs exceeding this budget are counted as deadline misses. Long
    /// maneuvers no longer block inside a task, so misses point at slow
    /// sensor timeouts or actuator I/O.
    pub budget_us: u32,
}

impl TaskMetadata {
    /// True if a run of `execution_us` stayed within the budget
    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }

    /// True once strictly more than one period has passed since `last_run_ms`
    #[inline]
    pub const fn is_due(&self, last_run_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(last_run_ms) > self.period_ms as u64
    }
}

/// Per-task runtime statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Duration of the latest run (µs)
    pub last_execution_us: u32,
    /// Smoothed run duration (µs), weighting each new run by 1/10
    pub avg_execution_us: u32,
    /// Longest run seen (µs)
    pub max_execution_us: u32,
    /// Runs that overran the budget
    pub deadline_misses: u32,
    /// Spacing between the latest two completions (ms)
    pub last_period_ms: u32,
    /// Completed runs
    pub execution_count: u64,
}

impl TaskStats {
    /// Fold one completed run into the statistics
    pub fn record(&mut self, execution_us: u32, period_ms: u32, metadata: &TaskMetadata) {
        self.avg_execution_us = if self.execution_count == 0 {
            execution_us
        } else {
            ((u64::from(execution_us) + 9 * u64::from(self.avg_execution_us)) / 10) as u32
        };
        self.last_execution_us = execution_us;
        self.max_execution_us = self.max_execution_us.max(execution_us);
        self.last_period_ms = period_ms;
        self.execution_count = self.execution_count.saturating_add(1);

        if !metadata.is_within_budget(execution_us) {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: TaskMetadata = TaskMetadata {
        name: "navigation",
        period_ms: 30,
        budget_us: 2_000,
    };

    #[test]
    fn test_task_metadata_budget_check() {
        assert!(NAV.is_within_budget(1500));
        assert!(NAV.is_within_budget(2000));
        assert!(!NAV.is_within_budget(2001));
    }

    #[test]
    fn test_task_metadata_due_is_strict() {
        assert!(!NAV.is_due(0, 30));
        assert!(NAV.is_due(0, 31));
        assert!(!NAV.is_due(100, 90)); // clock behind last run
    }

    #[test]
    fn test_first_run_seeds_average() {
        let mut stats = TaskStats::default();
        stats.record(0, 31, &NAV);
        stats.record(1_000, 31, &NAV);
        // A zero-length first run still counts as the seed
        assert_eq!(stats.avg_execution_us, 100);
        assert_eq!(stats.execution_count, 2);
    }

    #[test]
    fn test_record_tracks_max_and_misses() {
        let mut stats = TaskStats::default();
        for (execution_us, period_ms) in [(1_500, 31), (1_600, 31), (2_100, 32), (900, 31)] {
            stats.record(execution_us, period_ms, &NAV);
        }

        assert_eq!(stats.last_execution_us, 900);
        assert_eq!(stats.max_execution_us, 2_100);
        assert_eq!(stats.deadline_misses, 1);
        assert_eq!(stats.last_period_ms, 31);
        assert_eq!(stats.execution_count, 4);

        let expected = [1_600u64, 2_100, 900]
            .iter()
            .fold(1_500u64, |avg, run| (run + 9 * avg) / 10);
        assert_eq!(u64::from(stats.avg_execution_us), expected);
    }

    #[test]
    fn test_task_stats_reset() {
        let mut stats = TaskStats::default();
        stats.record(3_000, 11, &NAV);
        stats.reset();
        assert_eq!(stats, TaskStats::default());
    }
}
