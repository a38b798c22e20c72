//! Subsystem version numbers.

use std::fmt;

/// A `major.minor.patch` version reported by the graphics subsystem.
///
/// Ordering compares major, then minor, then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    /// Create a new version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decode a version packed as `major << 24 | minor << 16 | patch`.
    pub const fn from_packed(packed: u32) -> Self {
        Self::new(packed >> 24, (packed >> 16) & 0xFF, packed & 0xFFFF)
    }

    /// Encode as `major << 24 | minor << 16 | patch`.
    pub const fn packed(self) -> u32 {
        (self.major << 24) | ((self.minor & 0xFF) << 16) | (self.patch & 0xFFFF)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(SemanticVersion::new(25, 9, 99) < SemanticVersion::new(26, 0, 0));
        assert!(SemanticVersion::new(26, 0, 1) > SemanticVersion::new(26, 0, 0));
        assert!(SemanticVersion::new(27, 0, 0) > SemanticVersion::new(26, 1, 0));
    }

    #[test]
    fn test_packed_roundtrip() {
        let v = SemanticVersion::new(30, 1, 2);
        assert_eq!(v.packed(), 0x1E01_0002);
        assert_eq!(SemanticVersion::from_packed(v.packed()), v);
    }

    #[test]
    fn test_display() {
        assert_eq!(SemanticVersion::new(26, 1, 0).to_string(), "26.1.0");
    }
}
