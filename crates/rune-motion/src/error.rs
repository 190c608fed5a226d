//! Error types for the motion engine.

use thiserror::Error;

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors that can occur while collecting or running a shared-element motion.
///
/// A missing snapshot is never an error: [`ElementRegistry::retrieve`] returns
/// `None` and the coordinator takes the "first of a pair" branch.
///
/// [`ElementRegistry::retrieve`]: crate::ElementRegistry::retrieve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// An effect needs a focal element but none was captured.
    #[error("{effect} on \"{name}\" needs a focal target; add one as a descendant of the motion target")]
    MissingFocalTarget { effect: &'static str, name: String },

    /// Duration was neither "dynamic" nor a non-negative number of milliseconds.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Timing function could not be parsed as a CSS easing descriptor.
    #[error("invalid timing function: {0}")]
    InvalidTimingFunction(String),

    /// Any other malformed effect option.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The owning instance was unmounted before the transition settled.
    #[error("motion \"{0}\" was unmounted before it settled")]
    Cancelled(String),
}

impl MotionError {
    /// Returns true for errors caused by how the motion was configured.
    ///
    /// These abort only the phase that raised them.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Cancelled(_))
    }
}
