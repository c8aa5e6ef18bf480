use std::sync::{Arc, RwLock};

use crate::detection::domain::detector_config::DetectorConfig;

/// Shared, swappable detector configuration.
///
/// Readers take an `Arc` snapshot; [`replace`](Self::replace) swaps in a
/// whole new config, so a detection already running keeps the values it
/// started with.
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<DetectorConfig>>,
}

impl ConfigHandle {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn current(&self) -> Arc<DetectorConfig> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Installs `config` and returns the one it replaced.
    pub fn replace(&self, config: DetectorConfig) -> Arc<DetectorConfig> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(config))
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_returns_installed_config() {
        let handle = ConfigHandle::default();
        assert_eq!(*handle.current(), DetectorConfig::default());
    }

    #[test]
    fn test_snapshot_unaffected_by_replace() {
        let handle = ConfigHandle::default();
        let snapshot = handle.current();

        let previous = handle.replace(DetectorConfig {
            circularity_threshold: 0.2,
            ..DetectorConfig::default()
        });

        assert_eq!(snapshot.circularity_threshold, 0.7);
        assert_eq!(previous.circularity_threshold, 0.7);
        assert_eq!(handle.current().circularity_threshold, 0.2);
    }

    #[test]
    fn test_replace_visible_across_threads() {
        let handle = Arc::new(ConfigHandle::default());
        let writer = Arc::clone(&handle);
        std::thread::spawn(move || {
            writer.replace(DetectorConfig {
                overlap_sensitivity: 0.9,
                ..DetectorConfig::default()
            });
        })
        .join()
        .unwrap();
        assert_eq!(handle.current().overlap_sensitivity, 0.9);
    }
}
