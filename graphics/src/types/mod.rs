//! Flags, configuration and version types shared by buffers and subsystems.

mod buffer;
mod version;

pub use buffer::{BufferConfig, BufferFlags, LEGACY_HOST_DATA_VERSION, TeardownPolicy};
pub use version::SemanticVersion;
