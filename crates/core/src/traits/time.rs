//! Monotonic clock abstraction
//!
//! The scheduler works in milliseconds, the sensor array times capacitor
//! discharge in microseconds. Both read the same [`TimeSource`].

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

/// Monotonic time since boot
///
/// # Example
///
/// ```
/// use line_tracer_core::traits::{MockTime, TimeSource};
///
/// fn sensor_due<T: TimeSource>(time: &T, last_run_ms: u64) -> bool {
///     time.now_ms().saturating_sub(last_run_ms) > 10
/// }
///
/// let time = MockTime::new();
/// time.advance(11_000);
/// assert!(sensor_due(&time, 0));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;

    /// Microseconds since boot
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `reference_us`, zero if it lies ahead
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Shared references to a clock are clocks too, so that the sensor array,
/// the scheduler and simulated peripherals can all observe one time base.
impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Hand-driven clock for host tests
///
/// Time only moves when a test (or a simulated peripheral) calls
/// [`advance`](MockTime::advance) or [`set`](MockTime::set). Clones copy the
/// current reading and then run independently; share a `&MockTime` to give
/// several components the same clock.
///
/// ```
/// use line_tracer_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance(1_500);
/// assert_eq!(time.now_us(), 1_500);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    now_us: Cell<u64>,
}

// Only ever used from a single test thread
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Clock reading zero
    pub fn new() -> Self {
        Self::with_initial(0)
    }

    /// Clock starting at `us`
    pub fn with_initial(us: u64) -> Self {
        Self {
            now_us: Cell::new(us),
        }
    }

    /// Jump to an absolute reading
    pub fn set(&self, us: u64) {
        self.now_us.set(us);
    }

    /// Move forward by `us`
    pub fn advance(&self, us: u64) {
        self.now_us.set(self.now_us.get().saturating_add(us));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.now_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.now_us.get()
    }
}

/// Delaying on a mock clock simply moves it forward.
///
/// Sub-microsecond remainders are dropped.
impl DelayNs for &MockTime {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns / 1000));
    }
}
