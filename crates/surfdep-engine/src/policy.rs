//! Time-scale policies: when to record a width and when to average.
//!
//! A policy is chosen once per run. Its only state is the last bucket it
//! saw, updated by [`on_step`](TimeScalePolicy::on_step) at the start of
//! every engine step from the pre-step time and average height. The
//! queries after the step compare the new values against that bucket.

/// Which definition of "time" a run uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeScale {
    /// Raw step count. Every step is measured; averages are due every
    /// `average_period` steps. The default.
    Linear {
        /// Steps between averages. At least 1.
        average_period: u64,
    },
    /// Average-height buckets. A width is recorded each time
    /// `floor(average height)` increases, so samples are spaced by
    /// height rather than by step count.
    HeightAveraged,
    /// Logarithmic buckets. Every step is measured; averages are due
    /// when `floor(ln t / scale_factor)` increases.
    Logarithmic {
        /// Bucket width on the `ln t` axis. Finite and positive.
        scale_factor: f64,
    },
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::Linear { average_period: 1 }
    }
}

impl TimeScale {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::HeightAveraged => "height-averaged",
            Self::Logarithmic { .. } => "logarithmic",
        }
    }
}

const NO_FLOOR: i64 = -1;
const NO_BUCKET: i64 = i64::MIN;

/// Per-run state of a [`TimeScale`].
#[derive(Clone, Debug, PartialEq)]
pub struct TimeScalePolicy {
    scale: TimeScale,
    last_floor: i64,
    last_bucket: i64,
}

impl TimeScalePolicy {
    /// Fresh policy with its sentinels below any valid bucket.
    pub fn new(scale: TimeScale) -> Self {
        Self {
            scale,
            last_floor: NO_FLOOR,
            last_bucket: NO_BUCKET,
        }
    }

    /// The configured scale.
    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Return to the sentinel state.
    pub fn reset(&mut self) {
        self.last_floor = NO_FLOOR;
        self.last_bucket = NO_BUCKET;
    }

    /// Remember the bucket of the state before a step: `time` is the
    /// pre-step time (`-1` before the first step) and `average_height`
    /// the pre-step average.
    pub fn on_step(&mut self, time: i64, average_height: f64) {
        match self.scale {
            TimeScale::Linear { .. } => {}
            TimeScale::HeightAveraged => self.last_floor = height_floor(average_height),
            TimeScale::Logarithmic { scale_factor } => {
                self.last_bucket = log_bucket(time, scale_factor)
            }
        }
    }

    /// Whether the post-step surface should be recorded.
    ///
    /// Pure: repeated calls without an intervening `on_step` agree.
    pub fn should_measure(&self, average_height: f64) -> bool {
        match self.scale {
            TimeScale::HeightAveraged => height_floor(average_height) > self.last_floor,
            TimeScale::Linear { .. } | TimeScale::Logarithmic { .. } => true,
        }
    }

    /// Whether running ensemble averages are due at post-step `time`.
    pub fn should_average(&self, time: i64, average_height: f64) -> bool {
        match self.scale {
            TimeScale::Linear { average_period } => {
                time >= 0 && (time as u64) % average_period.max(1) == 0
            }
            TimeScale::HeightAveraged => self.should_measure(average_height),
            TimeScale::Logarithmic { scale_factor } => {
                log_bucket(time, scale_factor) > self.last_bucket
            }
        }
    }

    /// Scaled time for a post-step `time`.
    ///
    /// Linear and logarithmic scales report `time` itself. The
    /// height-averaged scale reports the height bucket the step started
    /// in, which for a measuring step equals the index its width was
    /// recorded at.
    pub fn scaled_time(&self, time: i64) -> i64 {
        match self.scale {
            TimeScale::HeightAveraged => self.last_floor,
            TimeScale::Linear { .. } | TimeScale::Logarithmic { .. } => time,
        }
    }
}

fn height_floor(average_height: f64) -> i64 {
    average_height.floor() as i64
}

fn log_bucket(time: i64, scale_factor: f64) -> i64 {
    if time < 1 {
        return NO_BUCKET;
    }
    ((time as f64).ln() / scale_factor).floor() as i64
}
