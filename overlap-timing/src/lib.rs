mod timer;
pub use timer::{FrameLimiter, FrameStats, HighPrecisionTimer, ManualTimer, Timer};
