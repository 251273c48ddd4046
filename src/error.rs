/*
 * Error types for the native window layer. Most backend operations follow a
 * "log and stay alive" policy and report failure through a boolean, so only
 * window creation, class registration and command execution surface these.
 */
use crate::types::WindowId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A native call reported failure. `code` is the native last-error value.
    #[error("native call {operation} failed with code {code}")]
    NativeCallFailed { operation: &'static str, code: u32 },

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("no window registered for {0:?}")]
    UnknownWindow(WindowId),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
