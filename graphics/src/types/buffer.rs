//! Buffer creation flags and configuration.

use bitflags::bitflags;

use super::version::SemanticVersion;

bitflags! {
    /// Creation flags passed to the subsystem with a new vertex buffer.
    ///
    /// Bit values match the subsystem's own flag constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferFlags: u32 {
        /// Buffer contents may be updated after creation.
        const DYNAMIC = 1 << 1;
        /// The subsystem copies the data block instead of aliasing caller memory.
        const DUP_BUFFER = 1 << 4;
    }
}

impl Default for BufferFlags {
    fn default() -> Self {
        Self::DYNAMIC | Self::DUP_BUFFER
    }
}

/// Subsystem version below which host-side vertex data must be released by
/// hand when a buffer cannot be destroyed normally.
pub const LEGACY_HOST_DATA_VERSION: SemanticVersion = SemanticVersion::new(26, 0, 0);

/// What to do with a GPU buffer when no graphics context can be acquired at
/// teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownPolicy {
    /// Release the subsystem's host-side data block if the subsystem reports a
    /// version older than the given one. Otherwise leak.
    ReleaseHostDataBelow(SemanticVersion),
    /// Always leak the buffer.
    Leak,
}

impl TeardownPolicy {
    /// Whether the fallback path should release host data for `version`.
    pub fn releases_host_data(&self, version: SemanticVersion) -> bool {
        match self {
            Self::ReleaseHostDataBelow(threshold) => version < *threshold,
            Self::Leak => false,
        }
    }
}

impl Default for TeardownPolicy {
    fn default() -> Self {
        Self::ReleaseHostDataBelow(LEGACY_HOST_DATA_VERSION)
    }
}

/// Configuration for a mirrored vertex buffer.
///
/// # Example
///
/// ```ignore
/// let config = BufferConfig::new()
///     .with_label("particles")
///     .with_teardown_policy(TeardownPolicy::Leak);
/// let vb = VertexBuffer::with_config(subsystem, 1024, 1, config)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferConfig {
    /// Debug label used in log output.
    pub label: Option<String>,
    /// Creation flags. [`BufferFlags::DUP_BUFFER`] is always set.
    pub flags: BufferFlags,
    /// Fallback behaviour when teardown cannot acquire a context.
    pub teardown: TeardownPolicy,
}

impl BufferConfig {
    /// Create a configuration with default flags and teardown policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the creation flags.
    ///
    /// The mirror owns its arrays and frees them independently of the GPU
    /// buffer, so [`BufferFlags::DUP_BUFFER`] is added back if missing.
    pub fn with_flags(mut self, flags: BufferFlags) -> Self {
        self.flags = flags | BufferFlags::DUP_BUFFER;
        self
    }

    /// Set the teardown fallback policy.
    pub fn with_teardown_policy(mut self, policy: TeardownPolicy) -> Self {
        self.teardown = policy;
        self
    }

    /// Label for log output.
    pub(crate) fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let config = BufferConfig::new();
        assert!(config.flags.contains(BufferFlags::DYNAMIC));
        assert!(config.flags.contains(BufferFlags::DUP_BUFFER));
        assert_eq!(config.flags.bits(), 0b1_0010);
    }

    #[test]
    fn test_dup_buffer_forced() {
        let config = BufferConfig::new().with_flags(BufferFlags::empty());
        assert_eq!(config.flags, BufferFlags::DUP_BUFFER);
    }

    #[test]
    fn test_teardown_policy() {
        let policy = TeardownPolicy::default();
        assert!(policy.releases_host_data(SemanticVersion::new(25, 0, 1)));
        assert!(!policy.releases_host_data(SemanticVersion::new(26, 0, 0)));
        assert!(!TeardownPolicy::Leak.releases_host_data(SemanticVersion::new(1, 0, 0)));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(BufferConfig::new().display_label(), "<unnamed>");
        assert_eq!(BufferConfig::new().with_label("quad").display_label(), "quad");
    }
}
