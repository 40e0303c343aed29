use std::fmt;
use std::str::FromStr;

use crate::error::LeafError;

/// Represents the physical location a tensor is tagged with.
///
/// The tag is informational only: every computation in this crate runs on the
/// CPU through the ndarray backend, whatever the tag says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Main system memory. This is the default device.
    #[default]
    CPU,
    /// A CUDA device index.
    GPU(usize),
}

impl fmt::Display for StorageDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageDevice::CPU => write!(f, "cpu"),
            StorageDevice::GPU(index) => write!(f, "cuda:{}", index),
        }
    }
}

impl FromStr for StorageDevice {
    type Err = LeafError;

    /// Parses `"cpu"`, `"cuda"` (index 0) and `"cuda:N"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "cpu" => Ok(StorageDevice::CPU),
            "cuda" | "gpu" => Ok(StorageDevice::GPU(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|idx| idx.parse::<usize>().ok())
                .map(StorageDevice::GPU)
                .ok_or_else(|| LeafError::InvalidData(format!("unknown device tag '{}'", s))),
        }
    }
}
