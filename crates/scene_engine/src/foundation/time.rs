//! Platform time management
//!
//! The platform layer exposes an absolute clock measured in milliseconds
//! from the moment it was initialized. The clock is an owned value with
//! explicit `init`/`reset` entry points; callers that depend on time take
//! it (or a [`TimeSource`]) as a parameter so tests can drive it by hand.

use std::time::Instant;

/// Source of monotonic time in milliseconds
pub trait TimeSource {
    /// Milliseconds elapsed since an arbitrary fixed origin
    fn now_millis(&self) -> u64;
}

/// Monotonic wall-clock source backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Create a source whose origin is now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven source for tests and deterministic replays
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: std::cell::Cell<u64>,
}

impl ManualTimeSource {
    /// Create a manual source starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the source by `millis`
    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

/// Absolute platform clock
///
/// Reports time since [`PlatformClock::init`] and allows the absolute time
/// to be overridden, after which it keeps advancing from the new value.
pub struct PlatformClock<S: TimeSource = SystemTimeSource> {
    source: S,
    /// Source reading that corresponds to absolute time `base`
    start: u64,
    base: u64,
    initialized: bool,
}

impl PlatformClock<SystemTimeSource> {
    /// Create a clock backed by the system monotonic timer
    pub fn system() -> Self {
        Self::new(SystemTimeSource::new())
    }
}

impl<S: TimeSource> PlatformClock<S> {
    /// Create an uninitialized clock over the given source
    pub fn new(source: S) -> Self {
        Self {
            source,
            start: 0,
            base: 0,
            initialized: false,
        }
    }

    /// Start the clock; absolute time becomes zero
    pub fn init(&mut self) {
        self.start = self.source.now_millis();
        self.base = 0;
        self.initialized = true;
        log::debug!("Platform clock initialized");
    }

    /// Return the clock to its uninitialized state
    pub fn reset(&mut self) {
        self.start = 0;
        self.base = 0;
        self.initialized = false;
    }

    /// Whether [`init`](Self::init) has been called since the last reset
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Milliseconds since init (plus any override). Zero before init.
    pub fn absolute_time(&self) -> u64 {
        if !self.initialized {
            return 0;
        }
        self.base + self.source.now_millis().saturating_sub(self.start)
    }

    /// Override the absolute time
    ///
    /// Used when resuming from a pause so that elapsed-time consumers do not
    /// observe the suspended interval.
    pub fn set_absolute_time(&mut self, millis: u64) {
        self.start = self.source.now_millis();
        self.base = millis;
        self.initialized = true;
    }

    /// Access the underlying time source
    pub fn source(&self) -> &S {
        &self.source
    }
}
