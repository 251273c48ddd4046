/*
 * This module is responsible for executing `WindowCommand`s issued by the
 * toolkit. Each command is resolved to its `Window` through the
 * `WindowManager` and forwarded to the matching window operation.
 *
 * Window operations follow a "log and stay alive" policy; the executor only
 * turns two outcomes into errors: a command for a window the manager does
 * not know (`UnknownWindow`) and a grab request the window refused
 * (`OperationFailed`).
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::manager::WindowManager;
use crate::types::{WindowCommand, WindowId};
use crate::window::Window;

fn with_window<T>(
    manager: &mut WindowManager,
    window_id: WindowId,
    f: impl FnOnce(&mut Window) -> PlatformResult<T>,
) -> PlatformResult<T> {
    match manager.window_mut(window_id) {
        Some(window) => f(window),
        None => {
            log::warn!("CommandExecutor: WinID {window_id:?} not found");
            Err(PlatformError::UnknownWindow(window_id))
        }
    }
}

pub fn execute_command(manager: &mut WindowManager, command: WindowCommand) -> PlatformResult<()> {
    log::debug!("CommandExecutor: executing {command:?}");
    let result = match command {
        WindowCommand::SetVisible { window, visible } => with_window(manager, window, |w| {
            w.set_visible(visible);
            Ok(())
        }),
        WindowCommand::SetGeometry { window, geometry } => with_window(manager, window, |w| {
            w.set_geometry(geometry);
            Ok(())
        }),
        WindowCommand::SetState { window, state } => with_window(manager, window, |w| {
            w.set_window_state(state);
            Ok(())
        }),
        WindowCommand::SetFlags { window, flags } => with_window(manager, window, |w| {
            w.set_window_flags(flags);
            Ok(())
        }),
        WindowCommand::SetTitle { window, title } => with_window(manager, window, |w| {
            w.set_window_title(&title);
            Ok(())
        }),
        WindowCommand::Raise { window } => with_window(manager, window, |w| {
            w.raise();
            Ok(())
        }),
        WindowCommand::Lower { window } => with_window(manager, window, |w| {
            w.lower();
            Ok(())
        }),
        WindowCommand::SetMask { window, region } => with_window(manager, window, |w| {
            w.set_mask(&region);
            Ok(())
        }),
        WindowCommand::SetCursor { window, cursor } => with_window(manager, window, |w| {
            w.set_cursor(cursor);
            Ok(())
        }),
        WindowCommand::SetKeyboardGrab { window, grab } => {
            execute_set_grab(manager, window, grab, Window::set_keyboard_grab_enabled, "keyboard")
        }
        WindowCommand::SetMouseGrab { window, grab } => {
            execute_set_grab(manager, window, grab, Window::set_mouse_grab_enabled, "mouse")
        }
        WindowCommand::SetParent { window, parent } => with_window(manager, window, |w| {
            w.set_parent(parent);
            Ok(())
        }),
        WindowCommand::SetOpacity { window, level } => with_window(manager, window, |w| {
            w.set_opacity(level);
            Ok(())
        }),
        WindowCommand::RequestActivate { window } => with_window(manager, window, |w| {
            w.request_activate();
            Ok(())
        }),
        WindowCommand::Destroy { window } => manager.destroy_window(window),
    };
    // Native calls made by the command may have parked notifications for
    // windows other than the target.
    manager.process_pending();
    result
}

/*
 * Executes the keyboard/mouse grab commands. A window without a native
 * handle refuses the grab, which is reported to the caller.
 */
fn execute_set_grab(
    manager: &mut WindowManager,
    window_id: WindowId,
    grab: bool,
    apply: fn(&mut Window, bool) -> bool,
    kind: &str,
) -> PlatformResult<()> {
    with_window(manager, window_id, |w| {
        if apply(w, grab) {
            Ok(())
        } else {
            Err(PlatformError::OperationFailed(format!(
                "{kind} grab {grab} refused for WinID {window_id:?}"
            )))
        }
    })
}
