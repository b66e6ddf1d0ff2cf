//! Configuration types for treecp
//!
//! Validated newtypes for the knobs of a copy run. Values are checked on construction
//! and, with the `serde` feature, on deserialization.

/// Buffer size used by the copy executor for one in-flight transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct BufferSize(usize);

impl BufferSize {
    /// Minimum buffer size (4KB)
    pub const MIN: usize = 4 * 1024;
    /// Maximum buffer size (64MB)
    pub const MAX: usize = 64 * 1024 * 1024;
    /// Default buffer size (128KB)
    pub const DEFAULT: usize = 128 * 1024;

    /// Create a new buffer size with validation
    pub fn new(size: usize) -> Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Buffer size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Buffer size {} exceeds maximum {}", size, Self::MAX))
        } else if !size.is_power_of_two() {
            Err(format!("Buffer size {} must be a power of two", size))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the buffer size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for BufferSize {
    type Error = String;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<BufferSize> for usize {
    fn from(size: BufferSize) -> Self {
        size.0
    }
}

/// Number of copy workers in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct ThreadCount(usize);

impl ThreadCount {
    /// Minimum thread count
    pub const MIN: usize = 1;
    /// Maximum thread count
    pub const MAX: usize = 256;

    /// Create a new thread count with validation
    pub fn new(count: usize) -> Result<Self, String> {
        if count < Self::MIN {
            Err(format!("Thread count {} is below minimum {}", count, Self::MIN))
        } else if count > Self::MAX {
            Err(format!("Thread count {} exceeds maximum {}", count, Self::MAX))
        } else {
            Ok(Self(count))
        }
    }

    /// Get the thread count value
    pub fn get(self) -> usize {
        self.0
    }

    /// Get the optimal thread count for the current system
    pub fn optimal() -> Self {
        Self(num_cpus::get().clamp(Self::MIN, Self::MAX))
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::optimal()
    }
}

impl TryFrom<usize> for ThreadCount {
    type Error = String;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<ThreadCount> for usize {
    fn from(count: ThreadCount) -> Self {
        count.0
    }
}

/// Depth below which directory listing fans out into concurrent traversals
///
/// Directories whose depth from the source root is smaller than this value hand each
/// subdirectory to a new traversal task. Deeper directories are listed inline by the
/// traversal that reached them. `0` disables fan-out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct ParallelDepth(usize);

impl ParallelDepth {
    /// Maximum fan-out depth
    pub const MAX: usize = 64;
    /// Default fan-out depth
    pub const DEFAULT: usize = 2;

    /// Create a new parallel depth with validation
    pub fn new(depth: usize) -> Result<Self, String> {
        if depth > Self::MAX {
            Err(format!("Parallel depth {} exceeds maximum {}", depth, Self::MAX))
        } else {
            Ok(Self(depth))
        }
    }

    /// Get the depth value
    pub fn get(self) -> usize {
        self.0
    }

    /// Whether a directory at `depth` fans its subdirectories out
    pub fn fans_out_at(self, depth: usize) -> bool {
        depth < self.0
    }
}

impl Default for ParallelDepth {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for ParallelDepth {
    type Error = String;

    fn try_from(depth: usize) -> Result<Self, Self::Error> {
        Self::new(depth)
    }
}

impl From<ParallelDepth> for usize {
    fn from(depth: ParallelDepth) -> Self {
        depth.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(256, true)]
    #[case(257, false)]
    fn test_thread_count_bounds(#[case] count: usize, #[case] valid: bool) {
        assert_eq!(ThreadCount::new(count).is_ok(), valid);
    }

    #[test]
    fn test_optimal_thread_count_in_range() {
        let count = ThreadCount::optimal().get();
        assert!((ThreadCount::MIN..=ThreadCount::MAX).contains(&count));
    }

    #[test]
    fn test_buffer_size_limits() {
        assert!(BufferSize::new(BufferSize::MAX).is_ok());
        assert!(BufferSize::new(BufferSize::MAX * 2).is_err());
        assert_eq!(BufferSize::default().get(), BufferSize::DEFAULT);
    }

    #[test]
    fn test_parallel_depth_fan_out() {
        let depth = ParallelDepth::new(2).unwrap();
        assert!(depth.fans_out_at(0));
        assert!(depth.fans_out_at(1));
        assert!(!depth.fans_out_at(2));

        let none = ParallelDepth::new(0).unwrap();
        assert!(!none.fans_out_at(0));
        assert!(ParallelDepth::new(65).is_err());
    }
}
