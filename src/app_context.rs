/*
 * Process-wide state of the window backend, gathered in one object that is
 * created at application start and handed explicitly to the window manager,
 * every `Window`, and the popup coordinator.
 *
 * Holds the native platform and event sink, the configuration, the
 * handle -> window registry with each window's cached size constraints, the current keyboard/mouse grabbers, the window
 * under the mouse, the active window, the modal window stack, the last
 * mouse-press record, and the queue of native notifications that arrived
 * re-entrantly while their target window was busy.
 *
 * Everything runs on the thread owning the native event queue, so interior
 * mutability uses `Cell`/`RefCell` rather than locks.
 */
use crate::geometry_hint::GeometryHint;
use crate::platform::{MinMaxInfo, NativePlatform, WindowEventSink};
use crate::types::{
    BackendConfig, NativeHandle, NativeNotification, Point, WindowEvent, WindowId,
};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Position and timestamp of the last mouse press, used for popup replay
/// and double-click detection downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MousePress {
    pub position: Point,
    pub timestamp_ms: u64,
}

/// Input categories relevant to modal blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    MouseButtonPress,
    MouseButtonRelease,
    MouseMove,
    KeyPress,
    KeyRelease,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalVerdict {
    pub allowed: bool,
    /// Modal window to bring to front because input was blocked for it.
    pub raise: Option<WindowId>,
}

pub struct ApplicationContext {
    platform: Rc<dyn NativePlatform>,
    sink: Rc<dyn WindowEventSink>,
    config: BackendConfig,
    registry: RefCell<HashMap<NativeHandle, WindowId>>,
    size_hints: RefCell<HashMap<NativeHandle, GeometryHint>>,
    key_grabber: Cell<Option<WindowId>>,
    mouse_grabber: Cell<Option<WindowId>>,
    window_under_mouse: Cell<Option<WindowId>>,
    active_window: Cell<Option<WindowId>>,
    modal_windows: RefCell<Vec<WindowId>>,
    mouse_press: Cell<MousePress>,
    pending_notifications: RefCell<VecDeque<(NativeHandle, NativeNotification)>>,
    next_window_id: Cell<usize>,
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("config", &self.config)
            .field("registry", &self.registry.borrow())
            .field("key_grabber", &self.key_grabber.get())
            .field("mouse_grabber", &self.mouse_grabber.get())
            .field("active_window", &self.active_window.get())
            .finish_non_exhaustive()
    }
}

impl ApplicationContext {
    pub fn new(
        platform: Rc<dyn NativePlatform>,
        sink: Rc<dyn WindowEventSink>,
        config: BackendConfig,
    ) -> Rc<Self> {
        log::debug!(
            "ApplicationContext: initialised for application '{}'",
            config.application_name
        );
        Rc::new(Self {
            platform,
            sink,
            config,
            registry: RefCell::new(HashMap::new()),
            size_hints: RefCell::new(HashMap::new()),
            key_grabber: Cell::new(None),
            mouse_grabber: Cell::new(None),
            window_under_mouse: Cell::new(None),
            active_window: Cell::new(None),
            modal_windows: RefCell::new(Vec::new()),
            mouse_press: Cell::new(MousePress::default()),
            pending_notifications: RefCell::new(VecDeque::new()),
            next_window_id: Cell::new(1),
        })
    }

    pub fn platform(&self) -> &dyn NativePlatform {
        self.platform.as_ref()
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub(crate) fn emit(&self, window: WindowId, event: WindowEvent) {
        log::trace!("ApplicationContext: {window:?} <- {event:?}");
        self.sink.handle_window_event(window, event);
    }

    pub(crate) fn generate_window_id(&self) -> WindowId {
        let id = self.next_window_id.get();
        self.next_window_id.set(id + 1);
        WindowId(id)
    }

    pub(crate) fn register_window(&self, handle: NativeHandle, window: WindowId) {
        if handle.is_null() {
            return;
        }
        self.registry.borrow_mut().insert(handle, window);
    }

    pub(crate) fn unregister_window(&self, handle: NativeHandle) {
        self.registry.borrow_mut().remove(&handle);
        self.size_hints.borrow_mut().remove(&handle);
        self.pending_notifications
            .borrow_mut()
            .retain(|(pending_handle, _)| *pending_handle != handle);
    }

    pub fn window_for_handle(&self, handle: NativeHandle) -> Option<WindowId> {
        self.registry.borrow().get(&handle).copied()
    }

    pub fn registered_window_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub(crate) fn set_size_hint(&self, handle: NativeHandle, hint: GeometryHint) {
        if handle.is_null() {
            return;
        }
        self.size_hints.borrow_mut().insert(handle, hint);
    }

    /*
     * Answers a native min/max-size query for an existing window. The query
     * arrives synchronously from inside native calls, possibly while the
     * owning `Window` is mid-operation, so it is served from the cached hint
     * and the live native style rather than from the window itself.
     */
    pub fn answer_min_max_info(&self, handle: NativeHandle, info: &mut MinMaxInfo) -> bool {
        let Some(hint) = self.size_hints.borrow().get(&handle).copied() else {
            return false;
        };
        let platform = self.platform();
        hint.apply_to_min_max_info(
            platform,
            platform.style(handle),
            platform.ex_style(handle),
            self.config.enforce_title_bar_min_track_height,
            info,
        );
        true
    }

    pub fn key_grabber(&self) -> Option<WindowId> {
        self.key_grabber.get()
    }

    pub(crate) fn set_key_grabber(&self, window: Option<WindowId>) {
        self.key_grabber.set(window);
    }

    pub fn mouse_grabber(&self) -> Option<WindowId> {
        self.mouse_grabber.get()
    }

    pub(crate) fn set_mouse_grabber(&self, window: Option<WindowId>) {
        self.mouse_grabber.set(window);
    }

    pub fn window_under_mouse(&self) -> Option<WindowId> {
        self.window_under_mouse.get()
    }

    pub fn set_window_under_mouse(&self, window: Option<WindowId>) {
        self.window_under_mouse.set(window);
    }

    pub fn active_window(&self) -> Option<WindowId> {
        self.active_window.get()
    }

    pub fn set_active_window(&self, window: Option<WindowId>) {
        self.active_window.set(window);
    }

    pub fn enter_modal(&self, window: WindowId) {
        let mut modal = self.modal_windows.borrow_mut();
        modal.retain(|w| *w != window);
        modal.push(window);
        log::debug!("ApplicationContext: {window:?} is modal (depth {})", modal.len());
    }

    pub fn leave_modal(&self, window: WindowId) {
        self.modal_windows.borrow_mut().retain(|w| *w != window);
    }

    pub fn is_modal_state(&self) -> bool {
        !self.modal_windows.borrow().is_empty()
    }

    /// Whether `kind` input may reach `window` while modal windows are open.
    pub fn try_modal(&self, window: WindowId, kind: InputKind) -> ModalVerdict {
        let top = self.modal_windows.borrow().last().copied();
        let Some(top) = top else {
            return ModalVerdict {
                allowed: true,
                raise: None,
            };
        };
        if top == window {
            return ModalVerdict {
                allowed: true,
                raise: None,
            };
        }
        let blocks = matches!(
            kind,
            InputKind::MouseButtonPress
                | InputKind::MouseButtonRelease
                | InputKind::MouseMove
                | InputKind::KeyPress
                | InputKind::KeyRelease
        );
        ModalVerdict {
            allowed: !blocks,
            raise: blocks.then_some(top),
        }
    }

    pub fn record_mouse_press(&self, position: Point, timestamp_ms: u64) {
        self.mouse_press.set(MousePress {
            position,
            timestamp_ms,
        });
    }

    pub fn mouse_press(&self) -> MousePress {
        self.mouse_press.get()
    }

    pub(crate) fn rewind_mouse_press_time(&self, amount_ms: u64) {
        let mut press = self.mouse_press.get();
        press.timestamp_ms = press.timestamp_ms.saturating_sub(amount_ms);
        self.mouse_press.set(press);
    }

    /// Parks a notification that arrived while its window was busy.
    pub fn queue_notification(&self, handle: NativeHandle, notification: NativeNotification) {
        self.pending_notifications
            .borrow_mut()
            .push_back((handle, notification));
    }

    pub(crate) fn take_notifications_for(&self, handle: NativeHandle) -> Vec<NativeNotification> {
        let mut pending = self.pending_notifications.borrow_mut();
        let mut taken = Vec::new();
        pending.retain(|(pending_handle, notification)| {
            if *pending_handle == handle {
                taken.push(notification.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    pub(crate) fn take_next_notification(&self) -> Option<(NativeHandle, NativeNotification)> {
        self.pending_notifications.borrow_mut().pop_front()
    }
}
