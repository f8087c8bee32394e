//! Bridge configuration types.
//!
//! [`BridgeConfig`] holds every tunable the bridge reads at runtime.  It is a
//! plain struct: no global state and no environment reads.  Loading it from a
//! TOML file is the job of [`crate::infrastructure::config_file`].
//!
//! ```toml
//! max_frame_bytes = 1048576
//! sink_capacity = 256
//! log_frames = false
//! ```
//!
//! Every field has a serde default, so an empty file (or no file at all) gives
//! the same result as [`BridgeConfig::default`].

use msgbridge_core::DEFAULT_MAX_FRAME_BYTES;
use serde::{Deserialize, Serialize};

/// All runtime configuration for one bridge.
///
/// # Example
///
/// ```rust
/// use msgbridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.sink_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Longest inbound line the decoder accepts, in bytes.  Longer lines are
    /// reported as a decoder error and skipped.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// High-water mark of the channel-backed sink: once this many frames are
    /// accepted but not yet written, the sink reports itself not writable and
    /// new messages wait in the bridge's queue.  A flush already under way
    /// still hands over its whole backlog.
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,

    /// Log every inbound and outbound frame at `debug` level.
    #[serde(default)]
    pub log_frames: bool,
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}
fn default_sink_capacity() -> usize {
    256
}

impl Default for BridgeConfig {
    /// | Field           | Default   |
    /// |-----------------|-----------|
    /// | max_frame_bytes | 1 MiB     |
    /// | sink_capacity   | 256       |
    /// | log_frames      | `false`   |
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            sink_capacity: default_sink_capacity(),
            log_frames: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max_frame_bytes_is_one_mebibyte() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.max_frame_bytes, 1024 * 1024);
    }

    #[test]
    fn test_default_sink_capacity_is_256() {
        assert_eq!(BridgeConfig::default().sink_capacity, 256);
    }

    #[test]
    fn test_default_does_not_log_frames() {
        assert!(!BridgeConfig::default().log_frames);
    }

    #[test]
    fn test_config_can_be_cloned() {
        let cfg = BridgeConfig {
            max_frame_bytes: 64,
            sink_capacity: 4,
            log_frames: true,
        };
        assert_eq!(cfg.clone(), cfg);
    }
}
