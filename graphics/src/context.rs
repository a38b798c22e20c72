//! Scoped graphics context.
//!
//! Subsystem buffer calls require an active graphics context. A
//! [`GraphicsContext`] enters it on construction and leaves on drop, so a
//! context is never held across calls by accident.

use crate::backend::GraphicsSubsystem;
use crate::error::GraphicsResult;

/// Guard holding the subsystem's graphics context.
///
/// Functions that need a context take `&GraphicsContext` so the requirement
/// is visible in their signature.
pub struct GraphicsContext<'a> {
    subsystem: &'a dyn GraphicsSubsystem,
}

impl<'a> GraphicsContext<'a> {
    /// Enter the context.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ContextUnavailable`](crate::GraphicsError::ContextUnavailable)
    /// (or whatever the subsystem reports) if the context cannot be entered.
    pub fn enter(subsystem: &'a dyn GraphicsSubsystem) -> GraphicsResult<Self> {
        subsystem.enter_context()?;
        Ok(Self { subsystem })
    }

    /// The subsystem this context belongs to.
    pub fn subsystem(&self) -> &'a dyn GraphicsSubsystem {
        self.subsystem
    }
}

impl Drop for GraphicsContext<'_> {
    fn drop(&mut self) {
        self.subsystem.leave_context();
    }
}

impl std::fmt::Debug for GraphicsContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("subsystem", &self.subsystem.name())
            .finish()
    }
}
