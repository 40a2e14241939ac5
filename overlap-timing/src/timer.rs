use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic clock with frame bookkeeping.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn frame_stats(&self) -> FrameStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub samples: usize,
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl FrameStats {
    /// Mean, standard deviation and extremes over the given frame times.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a Duration>) -> Self {
        let times: Vec<f64> = samples
            .into_iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return Self::default();
        }
        let n = times.len() as f64;
        let avg = times.iter().sum::<f64>() / n;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        let (min, max) = times
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });
        Self {
            samples: times.len(),
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frame_times: VecDeque<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(d);
    }
    fn frame_stats(&self) -> FrameStats {
        FrameStats::from_samples(&self.frame_times)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame_times: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, EINTR, clock_nanosleep, timespec};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // clock_nanosleep returns the error number directly
        while unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) } == EINTR {
            req = rem;
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer whose clock only moves when told to. Sleeping advances it, so code
/// driven by a `FrameLimiter` runs headless at full speed.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    frame_times: Vec<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn record_frame(&mut self, d: Duration) {
        self.frame_times.push(d);
    }
    fn frame_stats(&self) -> FrameStats {
        FrameStats::from_samples(&self.frame_times)
    }
}

/// Holds the loop to a fixed frame rate.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    period_ns: u64,
    next_deadline: Option<u64>,
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        Self {
            period_ns: 1_000_000_000 / u64::from(fps.max(1)),
            next_deadline: None,
        }
    }

    /// Advances the schedule and returns how long to wait from `now_ns`.
    /// An overrun frame resynchronizes instead of bursting to catch up.
    pub fn plan(&mut self, now_ns: u64) -> Duration {
        match self.next_deadline {
            Some(deadline) if deadline > now_ns => {
                self.next_deadline = Some(deadline + self.period_ns);
                Duration::from_nanos(deadline - now_ns)
            }
            Some(deadline) => {
                log::trace!("frame overran by {} ns", now_ns - deadline);
                self.next_deadline = Some(now_ns + self.period_ns);
                Duration::ZERO
            }
            None => {
                self.next_deadline = Some(now_ns + self.period_ns);
                Duration::ZERO
            }
        }
    }

    /// Sleeps until the next frame boundary and returns the time waited.
    pub fn throttle<T: Timer<Timestamp = u64>>(&mut self, timer: &T) -> Duration {
        let wait = self.plan(timer.now());
        if !wait.is_zero() {
            timer.sleep(wait);
        }
        wait
    }
}
