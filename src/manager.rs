/*
 * Owns every `Window` of the application and routes inbound native
 * notifications to them by handle. The platform event loop talks to the
 * backend through this type only: it calls `dispatch` for each translated
 * native message, `answer_min_max_info` for size queries on existing
 * windows, and `process_pending` once the current message has been handled.
 */
use crate::app_context::ApplicationContext;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::platform::MinMaxInfo;
use crate::types::{NativeHandle, NativeNotification, WindowDescriptor, WindowId};
use crate::window::Window;

use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct WindowManager {
    context: Rc<ApplicationContext>,
    windows: HashMap<WindowId, Window>,
}

impl WindowManager {
    pub fn new(context: Rc<ApplicationContext>) -> Self {
        Self {
            context,
            windows: HashMap::new(),
        }
    }

    pub fn context(&self) -> &Rc<ApplicationContext> {
        &self.context
    }

    pub fn create_window(&mut self, descriptor: WindowDescriptor) -> PlatformResult<WindowId> {
        let window = Window::create(Rc::clone(&self.context), descriptor)?;
        let id = window.id();
        log::debug!(
            "WindowManager: registered {id:?} for handle {:?}",
            window.handle()
        );
        self.windows.insert(id, window);
        // Creation may already have produced echoes for the new handle.
        self.process_pending();
        Ok(id)
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn window_for_handle(&mut self, handle: NativeHandle) -> Option<&mut Window> {
        let id = self.context.window_for_handle(handle)?;
        self.windows.get_mut(&id)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.windows.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Routes a native notification to the window owning `handle`. Returns
    /// whether it was consumed; unknown handles are left to default handling.
    pub fn dispatch(&mut self, handle: NativeHandle, notification: NativeNotification) -> bool {
        if notification == NativeNotification::Destroyed {
            return self.handle_native_destroyed(handle);
        }
        match self.window_for_handle(handle) {
            Some(window) => window.handle_notification(notification),
            None => {
                log::trace!("WindowManager: {notification:?} for unknown handle {handle:?}");
                false
            }
        }
    }

    /// Answers a min/max-size query for an existing window from its cached hints.
    pub fn answer_min_max_info(&self, handle: NativeHandle, info: &mut MinMaxInfo) -> bool {
        self.context.answer_min_max_info(handle, info)
    }

    /// Replays notifications that were parked while their windows were busy.
    pub fn process_pending(&mut self) {
        while let Some((handle, notification)) = self.context.take_next_notification() {
            self.dispatch(handle, notification);
        }
    }

    pub fn destroy_window(&mut self, id: WindowId) -> PlatformResult<()> {
        let mut window = self
            .windows
            .remove(&id)
            .ok_or(PlatformError::UnknownWindow(id))?;
        window.destroy();
        self.process_pending();
        Ok(())
    }

    /// Handles a native destroy that was not requested through `destroy_window`.
    /// The window is dropped from the manager without touching its stale handle.
    pub fn handle_native_destroyed(&mut self, handle: NativeHandle) -> bool {
        let Some(id) = self.context.window_for_handle(handle) else {
            return false;
        };
        log::debug!("WindowManager: native window {handle:?} of {id:?} went away");
        match self.windows.remove(&id) {
            Some(mut window) => {
                window.handle_native_destroyed();
                true
            }
            None => {
                self.context.unregister_window(handle);
                false
            }
        }
    }

    pub fn destroy_all(&mut self) {
        for id in self.window_ids() {
            if let Some(mut window) = self.windows.remove(&id) {
                window.destroy();
            }
        }
    }
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        self.destroy_all();
    }
}
