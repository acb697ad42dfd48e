use crate::BufferError;

/// Configuration for [`BoundedRingBuffer`](crate::BoundedRingBuffer) and [`Channel`](crate::Channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of slots (default: 1024). Fixed for the buffer's lifetime.
    pub capacity: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, enable_metrics: bool) -> Self {
        Self {
            capacity,
            enable_metrics,
        }
    }

    /// Sets the number of slots.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enables or disables metrics collection.
    pub const fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Checks that the configuration can build a buffer.
    pub const fn validate(&self) -> Result<(), BufferError> {
        if self.capacity == 0 {
            return Err(BufferError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1024,
            enable_metrics: false,
        }
    }
}

/// Low latency configuration (64 slots, producers feel backpressure early)
pub const LOW_LATENCY_CONFIG: Config = Config::new(64, false);

/// High throughput configuration (64K slots)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(1 << 16, false);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capacity, 1024);
        assert!(!config.enable_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::default().with_capacity(8).with_metrics(true);
        assert_eq!(config, Config::new(8, true));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            Config::new(0, false).validate(),
            Err(BufferError::InvalidCapacity { capacity: 0 })
        );
    }

    #[test]
    fn test_presets_valid() {
        assert!(LOW_LATENCY_CONFIG.validate().is_ok());
        assert!(HIGH_THROUGHPUT_CONFIG.validate().is_ok());
        assert!(LOW_LATENCY_CONFIG.capacity < HIGH_THROUGHPUT_CONFIG.capacity);
    }
}
