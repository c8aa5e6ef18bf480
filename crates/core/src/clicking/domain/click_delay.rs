use std::time::Duration;

use rand::Rng;

use crate::shared::constants::DEFAULT_CLICK_DELAY_MS;

/// Pause inserted after every click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDelay {
    Fixed(Duration),
    /// Uniform in `[min, max]`.
    Jitter { min: Duration, max: Duration },
}

impl ClickDelay {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        if min_ms == max_ms {
            ClickDelay::Fixed(Duration::from_millis(min_ms))
        } else {
            ClickDelay::Jitter {
                min: Duration::from_millis(min_ms.min(max_ms)),
                max: Duration::from_millis(min_ms.max(max_ms)),
            }
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            ClickDelay::Fixed(delay) => delay,
            ClickDelay::Jitter { min, max } if max <= min => min,
            ClickDelay::Jitter { min, max } => {
                let span = (max - min).as_micros() as u64;
                min + Duration::from_micros(rng.gen_range(0..=span))
            }
        }
    }
}

impl Default for ClickDelay {
    fn default() -> Self {
        let (min_ms, max_ms) = DEFAULT_CLICK_DELAY_MS;
        Self::from_millis(min_ms, max_ms)
    }
}
