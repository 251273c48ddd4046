/*
 * Public entry point of the nativeframe crate: the native side of a UI
 * toolkit's window backend. It creates and destroys native top-level and
 * child windows, keeps the toolkit's view of geometry, state, visibility and
 * flags in sync with the native windowing system, and coordinates popup
 * stacks with keyboard/mouse grabs.
 *
 * Everything that reasons about window state is portable and talks to the
 * native side through the `NativePlatform` trait, so the state logic builds
 * and tests on every target. The Win32 implementation of that trait, with
 * the window procedure and message loop, only compiles on Windows.
 */
pub mod app_context;
pub mod command_executor;
pub(crate) mod creation;
pub mod creation_context;
pub mod error;
pub(crate) mod geometry_hint;
pub mod manager;
pub(crate) mod paint_router;
pub mod platform;
pub mod popup;
pub mod style;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
pub mod window;
#[cfg(target_os = "windows")]
pub mod window_common;

pub use app_context::{ApplicationContext, InputKind, ModalVerdict, MousePress};
pub use command_executor::execute_command;
pub use error::{PlatformError, Result as PlatformResult};
pub use manager::WindowManager;
pub use platform::{NativePlatform, WindowEventSink};
pub use popup::{PopupEnvironment, PopupStack};
pub use types::{
    BackendConfig, NativeHandle, Rect, Region, WidgetId, WindowCommand, WindowDescriptor,
    WindowEvent, WindowFlags, WindowId, WindowState, WindowType,
};
pub use window::Window;
#[cfg(target_os = "windows")]
pub use window_common::{Win32Platform, post_quit, run_event_loop};
