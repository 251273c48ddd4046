/*
 * The native window object. A `Window` owns one native handle and keeps the
 * abstract window's view of it (geometry, flags, state, cursor, grabs,
 * opacity, mask) in sync with the native side in both directions:
 *
 *  - Outbound mutators (`set_geometry`, `set_window_state`, `set_window_flags`,
 *    `set_parent`, ...) translate requests into native calls.
 *  - Inbound handlers (`handle_resized`, `handle_moved`, `handle_paint`, ...)
 *    translate native notifications into `WindowEvent`s for the sink.
 *
 * Native mutators may make the native side send notifications back before
 * they return. Those echoes are parked in the `ApplicationContext` by the
 * platform layer and replayed by the window itself right after the call, via
 * `process_pending_notifications`, so geometry and state are never updated
 * from inside a half-finished operation.
 *
 * Geometry is always the content rectangle; frame margins are cached and
 * recomputed lazily when `FRAME_DIRTY` is set by a style or state change.
 */
use crate::app_context::ApplicationContext;
use crate::creation::{CreationDescriptor, CreationFlags, CreationOutcome, apply_window_opacity};
use crate::error::Result as PlatformResult;
use crate::geometry_hint::GeometryHint;
use crate::paint_router::{PaintRoute, covers_whole_window, resolve_paint_route};
use crate::platform::{MinMaxInfo, RegionCombine};
use crate::style::{PositionFlags, ShowCommand, WindowStyle, ZOrder, describe_style};
use crate::types::{
    Corner, CursorHandle, DeviceContext, Margins, NativeHandle, NativeNotification, NativeRegion,
    Rect, Region, SizeKind, SurfaceHandle, SurfaceKind, WindowDescriptor, WindowEvent,
    WindowFlags, WindowId, WindowState, WindowType,
};

use bitflags::bitflags;
use std::rc::Rc;

/// Timeout used for taskbar flashing when the system reports no caret blink time.
const DEFAULT_ALERT_TIMEOUT_MS: u32 = 250;
const DEFAULT_ALERT_FLASH_COUNT: u32 = 10;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowInternalFlags: u32 {
        const FRAME_DIRTY = 0x1;
        const FRAME_STRUT_EVENTS = 0x2;
        const WITHIN_SET_PARENT = 0x4;
        const DC_FROM_BEGIN_PAINT = 0x8;
        const SIZE_GRIP_OPERATION = 0x10;
        const BLOCKED_BY_MODAL = 0x20;
        const SYNCHRONOUS_GEOMETRY_CHANGE = 0x40;
        const ACCELERATED_SURFACE = 0x80;
        const ACCELERATED_DOUBLE_BUFFERED = 0x100;
    }
}

/// Native-side data of a window: everything creation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowData {
    pub handle: NativeHandle,
    pub flags: WindowFlags,
    /// Content rectangle, parent-relative for children and screen-relative for top levels.
    pub geometry: Rect,
    pub frame: Margins,
    pub embedded: bool,
}

/// Style and frame saved on fullscreen entry, restored on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenSnapshot {
    pub style: WindowStyle,
    pub frame_geometry: Rect,
}

pub struct Window {
    id: WindowId,
    context: Rc<ApplicationContext>,
    descriptor: WindowDescriptor,
    data: WindowData,
    hint: GeometryHint,
    state: WindowState,
    internal: WindowInternalFlags,
    opacity: f64,
    cursor: CursorHandle,
    mouse_grab: bool,
    fullscreen: Option<FullscreenSnapshot>,
    dc: DeviceContext,
    drop_site: bool,
    surface: SurfaceHandle,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("state", &self.state)
            .field("internal", &self.internal)
            .field("fullscreen", &self.fullscreen)
            .finish_non_exhaustive()
    }
}

fn show_command_for(target: WindowState, active: bool) -> ShowCommand {
    if target.contains(WindowState::MINIMIZED) {
        if active {
            ShowCommand::ShowMinimized
        } else {
            ShowCommand::Minimize
        }
    } else if target.contains(WindowState::MAXIMIZED) {
        if active {
            ShowCommand::ShowMaximized
        } else {
            ShowCommand::Maximize
        }
    } else if active {
        ShowCommand::ShowNormal
    } else {
        ShowCommand::ShowNoActivate
    }
}

impl Window {
    /*
     * Runs the full creation protocol for `descriptor` and wraps the result.
     * A failed native creation is terminal for this attempt; the error has
     * already been logged with the native error code.
     */
    pub fn create(
        context: Rc<ApplicationContext>,
        descriptor: WindowDescriptor,
    ) -> PlatformResult<Window> {
        let creation = CreationDescriptor::from_descriptor(
            &descriptor,
            descriptor.flags,
            CreationFlags::empty(),
        );
        let data = {
            let platform = context.platform();
            let data = match creation.begin_create(
                platform,
                context.config(),
                &descriptor,
                descriptor.geometry,
                &descriptor.title,
            )? {
                CreationOutcome::Desktop(data) => data,
                CreationOutcome::Pending(pending) => pending.finish(platform)?,
            };
            creation.post_creation_fixup(platform, data.handle, false, 1.0);
            data
        };
        let id = context.generate_window_id();
        Ok(Window::from_data(context, id, descriptor, data))
    }

    pub fn from_data(
        context: Rc<ApplicationContext>,
        id: WindowId,
        descriptor: WindowDescriptor,
        data: WindowData,
    ) -> Window {
        let mut internal = WindowInternalFlags::FRAME_DIRTY;
        if let SurfaceKind::Accelerated { double_buffered } = descriptor.surface {
            internal |= WindowInternalFlags::ACCELERATED_SURFACE;
            if double_buffered {
                internal |= WindowInternalFlags::ACCELERATED_DOUBLE_BUFFERED;
            }
        }
        let hint = GeometryHint::from_descriptor(&descriptor);
        context.register_window(data.handle, id);
        context.set_size_hint(data.handle, hint);

        let mut window = Window {
            id,
            context,
            descriptor,
            data,
            hint,
            state: WindowState::NORMAL,
            internal,
            opacity: 1.0,
            cursor: CursorHandle::NULL,
            mouse_grab: false,
            fullscreen: None,
            dc: DeviceContext::NULL,
            drop_site: false,
            surface: SurfaceHandle::NULL,
        };
        window.update_drop_site();
        log::debug!(
            "Window: {:?} created for handle {:?} at {:?}",
            window.id,
            window.data.handle,
            window.data.geometry
        );
        window
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn handle(&self) -> NativeHandle {
        self.data.handle
    }

    pub fn data(&self) -> &WindowData {
        &self.data
    }

    pub fn descriptor(&self) -> &WindowDescriptor {
        &self.descriptor
    }

    pub fn geometry(&self) -> Rect {
        self.data.geometry
    }

    pub fn window_flags(&self) -> WindowFlags {
        self.data.flags
    }

    pub fn window_state(&self) -> WindowState {
        self.state
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn cursor(&self) -> CursorHandle {
        self.cursor
    }

    pub fn has_mouse_grab(&self) -> bool {
        self.mouse_grab
    }

    pub fn fullscreen_snapshot(&self) -> Option<FullscreenSnapshot> {
        self.fullscreen
    }

    pub fn internal_flags(&self) -> WindowInternalFlags {
        self.internal
    }

    pub fn is_drop_site(&self) -> bool {
        self.drop_site
    }

    pub fn is_top_level(&self) -> bool {
        self.descriptor.is_top_level()
    }

    fn is_desktop(&self) -> bool {
        self.descriptor.window_type == WindowType::Desktop
    }

    fn emit(&self, event: WindowEvent) {
        self.context.emit(self.id, event);
    }

    fn has_handle(&self, operation: &str) -> bool {
        if self.data.handle.is_null() {
            log::warn!("Window: {operation} on {:?} which has no native handle", self.id);
            return false;
        }
        true
    }

    /// Cached frame margins, re-queried after style or state changes.
    pub fn frame_margins(&mut self) -> Margins {
        if self.internal.contains(WindowInternalFlags::FRAME_DIRTY) && !self.data.handle.is_null()
        {
            let platform = self.context.platform();
            self.data.frame = GeometryHint::frame(
                platform,
                platform.style(self.data.handle),
                platform.ex_style(self.data.handle),
            );
            self.internal.remove(WindowInternalFlags::FRAME_DIRTY);
        }
        self.data.frame
    }

    pub fn frame_geometry(&mut self) -> Rect {
        let margins = self.frame_margins();
        self.data.geometry.expanded_by(margins)
    }

    fn native_frame_relative_to_parent(&self) -> bool {
        !(self.is_top_level() && !self.data.embedded)
    }

    fn frame_geometry_sys(&self) -> Rect {
        self.context
            .platform()
            .frame_rect(self.data.handle, self.native_frame_relative_to_parent())
    }

    fn geometry_sys(&mut self) -> Rect {
        let frame = self.frame_geometry_sys();
        frame.shrunk_by(self.frame_margins())
    }

    fn is_full_screen_sys(&mut self) -> bool {
        if !self.is_top_level() {
            return false;
        }
        let screen = self.context.platform().screen_geometry(self.data.handle);
        self.geometry_sys() == screen
    }

    /// Replays native notifications that arrived for this window while it was
    /// inside a native call.
    pub fn process_pending_notifications(&mut self) {
        if self.data.handle.is_null() {
            return;
        }
        for notification in self.context.take_notifications_for(self.data.handle) {
            self.handle_notification(notification);
        }
    }

    /// Applies one inbound native notification. Returns whether it was consumed.
    pub fn handle_notification(&mut self, notification: NativeNotification) -> bool {
        log::trace!("Window: {:?} handling {notification:?}", self.id);
        match notification {
            NativeNotification::Moved => {
                self.handle_moved();
                true
            }
            NativeNotification::Resized(kind) => {
                self.handle_resized(kind);
                true
            }
            NativeNotification::Paint => self.handle_paint(),
            NativeNotification::ActivationChanged(active) => {
                self.handle_activation_changed(active);
                true
            }
            NativeNotification::StyleChanged => {
                self.internal.insert(WindowInternalFlags::FRAME_DIRTY);
                true
            }
            NativeNotification::Shown => {
                self.handle_shown();
                true
            }
            NativeNotification::Hidden => {
                self.handle_hidden();
                true
            }
            NativeNotification::CloseRequested => {
                self.emit(WindowEvent::CloseRequested);
                true
            }
            NativeNotification::SetCursor => {
                self.apply_cursor();
                true
            }
            NativeNotification::MouseEntered => {
                self.context.set_window_under_mouse(Some(self.id));
                self.apply_cursor();
                true
            }
            NativeNotification::MouseLeft => {
                if self.context.window_under_mouse() == Some(self.id) {
                    self.context.set_window_under_mouse(None);
                }
                true
            }
            NativeNotification::Destroyed => {
                self.handle_native_destroyed();
                true
            }
        }
    }

    // Visibility

    pub fn set_visible(&mut self, visible: bool) {
        if !self.has_handle("set_visible") {
            return;
        }
        log::debug!("Window: {:?} set_visible({visible})", self.id);
        if visible {
            self.show_sys();
            let full = Rect::new(0, 0, self.data.geometry.width, self.data.geometry.height);
            self.emit(WindowEvent::Expose {
                region: Region::from_rect(full),
                synchronous: true,
            });
        } else {
            self.hide_sys();
            self.emit(WindowEvent::Expose {
                region: Region::new(),
                synchronous: true,
            });
        }
        self.process_pending_notifications();
    }

    pub fn is_visible(&self) -> bool {
        !self.data.handle.is_null() && self.context.platform().is_visible(self.data.handle)
    }

    fn shows_without_activation(&self) -> bool {
        matches!(
            self.descriptor.window_type,
            WindowType::Popup | WindowType::ToolTip | WindowType::Tool
        )
    }

    fn show_sys(&mut self) {
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;
        let flags = self.data.flags;
        let mut faked_maximize = false;

        let mut command = ShowCommand::ShowNormal;
        if self.shows_without_activation() {
            command = ShowCommand::ShowNoActivate;
        } else if self.state.contains(WindowState::MINIMIZED) {
            command = if self.is_visible() {
                ShowCommand::ShowMinimized
            } else {
                ShowCommand::ShowMinNoActive
            };
        } else if self.state.contains(WindowState::MAXIMIZED) {
            command = ShowCommand::ShowMaximized;
            // The native side refuses to maximize titled windows that have
            // neither a minimize nor a maximize box.
            if flags.contains(WindowFlags::TITLE)
                && !flags.intersects(WindowFlags::MIN_MAX_BUTTONS | WindowFlags::FRAMELESS)
            {
                faked_maximize = true;
                platform.set_style(handle, platform.style(handle) | WindowStyle::MAXIMIZE_BOX);
            }
        }

        platform.show_window(handle, command);

        if faked_maximize {
            platform.set_style(handle, platform.style(handle) - WindowStyle::MAXIMIZE_BOX);
            platform.set_window_pos(
                handle,
                ZOrder::Unchanged,
                Rect::default(),
                PositionFlags::NO_SIZE
                    | PositionFlags::NO_MOVE
                    | PositionFlags::NO_ZORDER
                    | PositionFlags::NO_OWNER_ZORDER
                    | PositionFlags::FRAME_CHANGED,
            );
        }
    }

    fn hide_sys(&mut self) {
        if self.is_desktop() {
            return;
        }
        let platform = self.context.platform();
        if self.descriptor.window_type == WindowType::Popup {
            platform.show_window(self.data.handle, ShowCommand::Hide);
        } else {
            platform.set_window_pos(
                self.data.handle,
                ZOrder::Unchanged,
                Rect::default(),
                PositionFlags::HIDE_WINDOW
                    | PositionFlags::NO_SIZE
                    | PositionFlags::NO_MOVE
                    | PositionFlags::NO_ZORDER,
            );
        }
    }

    pub fn handle_shown(&mut self) {
        let full = Rect::new(0, 0, self.data.geometry.width, self.data.geometry.height);
        self.emit(WindowEvent::Expose {
            region: Region::from_rect(full),
            synchronous: false,
        });
        self.emit(WindowEvent::Shown);
    }

    pub fn handle_hidden(&mut self) {
        self.emit(WindowEvent::Expose {
            region: Region::new(),
            synchronous: false,
        });
        self.emit(WindowEvent::Hidden);
    }

    // Geometry

    pub fn set_geometry(&mut self, requested: Rect) {
        let mut rect = requested;
        if GeometryHint::position_includes_frame(&self.descriptor) {
            let margins = self.frame_margins();
            rect = rect.translated(margins.left, margins.top);
        }

        let previous = self.data.geometry;
        self.data.geometry = rect;
        if !self.hint.valid_size(rect.size()) {
            log::warn!(
                "Window: attempt to set a size ({}x{}) violating the constraints ({:?} - {:?}) on {:?}",
                rect.width,
                rect.height,
                self.hint.minimum_size,
                self.hint.maximum_size,
                self.id
            );
        }

        if self.data.handle.is_null() || previous == rect {
            return;
        }

        let margins = self.frame_margins();
        let frame = rect.expanded_by(margins);
        if !self.context.platform().move_window(self.data.handle, frame) {
            log::error!(
                "Window: move of {:?} to {frame:?} failed (error {})",
                self.id,
                self.context.platform().last_error()
            );
        }
        self.process_pending_notifications();

        if self.data.geometry != rect {
            log::warn!(
                "Window: unable to set geometry {rect:?} on {:?}; resulting geometry {:?} (frame {margins:?}, min {:?}, max {:?})",
                self.id,
                self.data.geometry,
                self.hint.minimum_size,
                self.hint.maximum_size
            );
        }
    }

    pub fn handle_moved(&mut self) {
        if self.data.handle.is_null() {
            return;
        }
        // Moves reported while iconic or while reparenting are spurious.
        if self.context.platform().is_iconic(self.data.handle)
            || self.internal.contains(WindowInternalFlags::WITHIN_SET_PARENT)
        {
            return;
        }
        self.handle_geometry_change();
    }

    pub fn handle_resized(&mut self, kind: SizeKind) {
        match kind {
            // Notifications about other windows being maximized.
            SizeKind::MaxHide | SizeKind::MaxShow => {}
            SizeKind::Minimized => {
                self.handle_window_state_change(WindowState::MINIMIZED);
            }
            SizeKind::Maximized => {
                self.handle_window_state_change(WindowState::MAXIMIZED);
                self.handle_geometry_change();
            }
            SizeKind::Restored => {
                let full_screen = self.is_full_screen_sys();
                if self.state.without_active() != WindowState::NORMAL || full_screen {
                    self.handle_window_state_change(if full_screen {
                        WindowState::FULL_SCREEN
                    } else {
                        WindowState::NORMAL
                    });
                }
                self.handle_geometry_change();
            }
        }
    }

    fn handle_geometry_change(&mut self) {
        if self.data.handle.is_null() {
            return;
        }
        let previous = self.data.geometry;
        self.data.geometry = self.geometry_sys();
        let synchronous = self
            .internal
            .contains(WindowInternalFlags::SYNCHRONOUS_GEOMETRY_CHANGE);
        log::trace!(
            "Window: {:?} geometry {previous:?} -> {:?} (synchronous: {synchronous})",
            self.id,
            self.data.geometry
        );
        self.emit(WindowEvent::GeometryChanged {
            geometry: self.data.geometry,
            synchronous,
        });
    }

    fn handle_window_state_change(&mut self, state: WindowState) {
        self.state = state.without_active() | (self.state & WindowState::ACTIVE);
        self.internal.insert(WindowInternalFlags::FRAME_DIRTY);
        log::debug!("Window: {:?} state changed to {state:?}", self.id);
        self.emit(WindowEvent::StateChanged(state.without_active()));
    }

    // State

    pub fn set_window_state(&mut self, target: WindowState) {
        let target = target.without_active();
        let new_state = target | (self.state & WindowState::ACTIVE);
        if new_state == self.state {
            return;
        }
        log::debug!(
            "Window: {:?} set_window_state {:?} -> {target:?}",
            self.id,
            self.state
        );
        if !self.data.handle.is_null() {
            self.set_window_state_sys(target);
            self.process_pending_notifications();
        }
        self.state = new_state;
    }

    fn set_window_state_sys(&mut self, new_state: WindowState) {
        let old_state = self.state.without_active();
        if old_state == new_state {
            return;
        }
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;
        let visible = self.is_visible();
        let active = self.state.contains(WindowState::ACTIVE);
        self.internal.insert(WindowInternalFlags::FRAME_DIRTY);

        if old_state.contains(WindowState::MAXIMIZED) != new_state.contains(WindowState::MAXIMIZED)
            && visible
            && !new_state.contains(WindowState::MINIMIZED)
        {
            platform.show_window(handle, show_command_for(new_state, active));
        }

        let was_full_screen = old_state.contains(WindowState::FULL_SCREEN);
        let is_full_screen = new_state.contains(WindowState::FULL_SCREEN);
        if was_full_screen != is_full_screen {
            if is_full_screen {
                self.enter_full_screen(visible);
            } else if !new_state.contains(WindowState::MINIMIZED) {
                self.leave_full_screen(new_state, visible, active);
            }
        }

        if old_state.contains(WindowState::MINIMIZED) != new_state.contains(WindowState::MINIMIZED)
            && visible
        {
            platform.show_window(handle, show_command_for(new_state, active));
        }
    }

    fn leave_full_screen(&mut self, new_state: WindowState, visible: bool, active: bool) {
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;

        let snapshot = self.fullscreen.take();
        let mut style = snapshot.map_or_else(|| platform.style(handle), |s| s.style);
        if visible {
            style |= WindowStyle::VISIBLE;
        }
        platform.set_style(handle, style);

        let frame = snapshot.map(|s| s.frame_geometry).unwrap_or_default();
        let mut position_flags =
            PositionFlags::FRAME_CHANGED | PositionFlags::NO_ZORDER | PositionFlags::NO_OWNER_ZORDER;
        if !frame.is_valid() {
            position_flags |= PositionFlags::NO_SIZE | PositionFlags::NO_MOVE;
        }
        if !visible {
            position_flags |= PositionFlags::NO_ACTIVATE;
        }
        platform.set_window_pos(handle, ZOrder::Unchanged, frame, position_flags);
        if visible {
            platform.show_window(handle, show_command_for(new_state, active));
        }
        log::debug!(
            "Window: {:?} left fullscreen, restored {} at {frame:?}",
            self.id,
            describe_style(style)
        );
    }

    fn enter_full_screen(&mut self, visible: bool) {
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;

        // Nested requests keep the first snapshot.
        if self.fullscreen.is_none() {
            let frame_geometry = if self.state.contains(WindowState::MINIMIZED) {
                platform
                    .normal_placement(handle)
                    .unwrap_or_else(|| self.frame_geometry_sys())
            } else {
                self.frame_geometry_sys()
            };
            self.fullscreen = Some(FullscreenSnapshot {
                style: platform.style(handle),
                frame_geometry,
            });
        }

        let mut style =
            WindowStyle::CLIP_CHILDREN | WindowStyle::CLIP_SIBLINGS | WindowStyle::POPUP;
        if self
            .fullscreen
            .is_some_and(|s| s.style.contains(WindowStyle::SYS_MENU))
        {
            style |= WindowStyle::SYS_MENU;
        }
        if visible {
            style |= WindowStyle::VISIBLE;
        }
        platform.set_style(handle, style);

        let screen = platform.screen_geometry(handle);
        let was_synchronous = self
            .internal
            .contains(WindowInternalFlags::SYNCHRONOUS_GEOMETRY_CHANGE);
        self.internal
            .insert(WindowInternalFlags::SYNCHRONOUS_GEOMETRY_CHANGE);
        platform.set_window_pos(
            handle,
            ZOrder::Top,
            screen,
            PositionFlags::FRAME_CHANGED
                | PositionFlags::NO_OWNER_ZORDER
                | PositionFlags::NO_ACTIVATE,
        );
        self.process_pending_notifications();
        if !was_synchronous {
            self.internal
                .remove(WindowInternalFlags::SYNCHRONOUS_GEOMETRY_CHANGE);
        }

        self.data.geometry = screen;
        log::debug!("Window: {:?} entered fullscreen on {screen:?}", self.id);
        self.emit(WindowEvent::GeometryChanged {
            geometry: screen,
            synchronous: true,
        });
    }

    pub fn is_active(&self) -> bool {
        if self.data.handle.is_null() {
            return false;
        }
        let platform = self.context.platform();
        let active = platform.active_window();
        active == self.data.handle || platform.is_child(self.data.handle, active)
    }

    pub fn handle_activation_changed(&mut self, active: bool) {
        self.state.set(WindowState::ACTIVE, active);
        if active {
            self.context.set_active_window(Some(self.id));
        } else if self.context.active_window() == Some(self.id) {
            self.context.set_active_window(None);
        }
        self.emit(WindowEvent::ActivationChanged(active));
    }

    pub fn request_activate(&self) {
        if !self.has_handle("request_activate") {
            return;
        }
        let platform = self.context.platform();
        platform.set_foreground(self.data.handle);
        platform.set_focus(self.data.handle);
    }

    // Flags, styles and parent

    pub fn set_window_flags(&mut self, flags: WindowFlags) {
        if !self.has_handle("set_window_flags") {
            self.data.flags = flags;
            return;
        }
        self.apply_window_flags(flags, CreationFlags::empty());
    }

    fn apply_window_flags(&mut self, flags: WindowFlags, creation_flags: CreationFlags) {
        let old_geometry = self.data.geometry;
        let creation = CreationDescriptor::from_descriptor(&self.descriptor, flags, creation_flags);
        {
            let platform = self.context.platform();
            creation.apply_style_change(platform, self.data.handle);
            creation.post_creation_fixup(platform, self.data.handle, true, self.opacity);
        }
        self.data.flags = creation.flags;
        self.data.embedded = creation.embedded;
        self.descriptor.flags = flags;
        self.internal.insert(WindowInternalFlags::FRAME_DIRTY);
        self.update_drop_site();

        // Dropping the frame may move the content without a move notification.
        let new_geometry = self.geometry_sys();
        if old_geometry != new_geometry {
            self.handle_geometry_change();
        }
    }

    pub fn set_parent(&mut self, parent: Option<NativeHandle>) {
        if self.data.handle.is_null() {
            self.descriptor.parent = parent;
            return;
        }
        let desktop = self.context.platform().desktop_window();
        let old_parent = self.descriptor.parent.filter(|p| *p != desktop);
        let new_parent = parent.filter(|p| *p != desktop);
        if old_parent == new_parent {
            return;
        }

        let was_top_level = old_parent.is_none();
        let is_top_level = new_parent.is_none();
        self.internal.insert(WindowInternalFlags::WITHIN_SET_PARENT);
        if !self.context.platform().set_parent(self.data.handle, new_parent) {
            log::error!(
                "Window: reparenting {:?} failed (error {})",
                self.id,
                self.context.platform().last_error()
            );
        }
        self.process_pending_notifications();
        self.internal.remove(WindowInternalFlags::WITHIN_SET_PARENT);
        self.descriptor.parent = new_parent;

        // Child/popup style bits do not follow the native parent by themselves.
        if was_top_level != is_top_level {
            let force = if is_top_level {
                CreationFlags::FORCE_TOP_LEVEL
            } else {
                CreationFlags::FORCE_CHILD
            };
            self.apply_window_flags(self.descriptor.flags, force);
        }
    }

    pub fn set_window_title(&mut self, title: &str) {
        self.descriptor.title = title.to_string();
        if self.has_handle("set_window_title") {
            self.context
                .platform()
                .set_window_text(self.data.handle, title);
        }
    }

    pub fn raise(&self) {
        self.restack(ZOrder::Top);
    }

    pub fn lower(&self) {
        self.restack(ZOrder::Bottom);
    }

    fn restack(&self, z_order: ZOrder) {
        if !self.has_handle("restack") {
            return;
        }
        self.context.platform().set_window_pos(
            self.data.handle,
            z_order,
            Rect::default(),
            PositionFlags::NO_MOVE | PositionFlags::NO_SIZE | PositionFlags::NO_OWNER_ZORDER,
        );
    }

    pub fn is_enabled(&self) -> bool {
        !self.data.handle.is_null()
            && !self
                .context
                .platform()
                .style(self.data.handle)
                .contains(WindowStyle::DISABLED)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.has_handle("set_enabled") {
            self.context.platform().set_enabled(self.data.handle, enabled);
        }
    }

    pub fn set_opacity(&mut self, level: f64) {
        let level = level.clamp(0.0, 1.0);
        if (self.opacity - level).abs() < f64::EPSILON {
            return;
        }
        self.opacity = level;
        if !self.data.handle.is_null() && self.is_top_level() {
            apply_window_opacity(
                self.context.platform(),
                self.data.handle,
                self.data.flags,
                level,
            );
        }
    }

    pub fn handle_modal_blocked(&mut self, blocked: bool) {
        self.set_enabled(!blocked);
        self.internal
            .set(WindowInternalFlags::BLOCKED_BY_MODAL, blocked);
    }

    pub fn is_blocked_by_modal(&self) -> bool {
        self.internal.contains(WindowInternalFlags::BLOCKED_BY_MODAL)
    }

    fn update_drop_site(&mut self) {
        let wanted = self.is_top_level()
            && matches!(
                self.descriptor.window_type,
                WindowType::Normal | WindowType::Dialog | WindowType::Popup | WindowType::Tool
            );
        if wanted == self.drop_site || self.data.handle.is_null() {
            return;
        }
        let platform = self.context.platform();
        if wanted {
            if platform.register_drop_target(self.data.handle) {
                self.drop_site = true;
            } else {
                log::warn!("Window: drop target registration failed for {:?}", self.id);
            }
        } else {
            platform.revoke_drop_target(self.data.handle);
            self.drop_site = false;
        }
    }

    // Painting and device contexts

    pub fn handle_paint(&mut self) -> bool {
        if self.data.handle.is_null() {
            return false;
        }
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;
        let route = resolve_paint_route(self.descriptor.surface, platform.has_update_rect(handle));

        match route {
            PaintRoute::Skip => false,
            PaintRoute::Accelerated { invalidate_first } => {
                if invalidate_first {
                    platform.invalidate(handle);
                }
                let session = platform.begin_paint(handle);
                self.emit(WindowEvent::Expose {
                    region: Region::from_rect(session.update_rect),
                    synchronous: true,
                });
                platform.end_paint(handle, session);
                true
            }
            PaintRoute::Raster => {
                let session = platform.begin_paint(handle);
                if covers_whole_window(session.update_rect, self.data.geometry) {
                    self.release_dc();
                    self.dc = session.dc;
                    self.internal.insert(WindowInternalFlags::DC_FROM_BEGIN_PAINT);
                }
                self.emit(WindowEvent::Expose {
                    region: Region::from_rect(session.update_rect),
                    synchronous: true,
                });
                // The adopted context belongs to the paint bracket.
                if self.internal.contains(WindowInternalFlags::DC_FROM_BEGIN_PAINT) {
                    self.dc = DeviceContext::NULL;
                    self.internal.remove(WindowInternalFlags::DC_FROM_BEGIN_PAINT);
                }
                platform.end_paint(handle, session);
                true
            }
        }
    }

    pub fn get_dc(&mut self) -> DeviceContext {
        if self.dc.is_null() && !self.data.handle.is_null() {
            self.dc = self.context.platform().get_dc(self.data.handle);
        }
        self.dc
    }

    pub fn release_dc(&mut self) {
        if self.internal.contains(WindowInternalFlags::DC_FROM_BEGIN_PAINT) {
            log::trace!("Window: {:?} keeps its paint device context", self.id);
            return;
        }
        if !self.dc.is_null() {
            self.context.platform().release_dc(self.data.handle, self.dc);
            self.dc = DeviceContext::NULL;
        }
    }

    /// Lazily acquires the accelerated surface handle; raster windows have none.
    pub fn ensure_surface_handle(&mut self) -> Option<SurfaceHandle> {
        if !self.internal.contains(WindowInternalFlags::ACCELERATED_SURFACE)
            || self.data.handle.is_null()
        {
            return None;
        }
        if self.surface.is_null() {
            self.surface = self.context.platform().create_surface(self.data.handle);
        }
        Some(self.surface)
    }

    // Mask

    pub fn set_mask(&mut self, region: &Region) {
        if !self.has_handle("set_mask") {
            return;
        }
        let context = Rc::clone(&self.context);
        let platform = context.platform();
        let handle = self.data.handle;

        if region.is_empty() {
            if !platform.set_window_region(handle, None) {
                log::error!(
                    "Window: clearing the mask of {:?} failed (error {})",
                    self.id,
                    platform.last_error()
                );
            }
            return;
        }

        let native_region = self.native_region_from(region);
        if self.is_top_level() {
            let margins = self.frame_margins();
            platform.offset_region(native_region, margins.left, margins.top);
        }
        if !platform.set_window_region(handle, Some(native_region)) {
            log::error!(
                "Window: setting the mask of {:?} failed (error {})",
                self.id,
                platform.last_error()
            );
            platform.delete_region(native_region);
        }
    }

    fn native_region_from(&self, region: &Region) -> NativeRegion {
        let platform = self.context.platform();
        let rects = region.rects();
        if rects.len() == 1 {
            return platform.create_rect_region(region.bounding_rect());
        }
        let mut result = platform.create_rect_region(rects[0]);
        for rect in &rects[1..] {
            let rect_region = platform.create_rect_region(*rect);
            let combined = platform.create_rect_region(Rect::default());
            if platform.combine_region(combined, result, rect_region, RegionCombine::Or) {
                platform.delete_region(result);
                result = combined;
            } else {
                log::warn!("Window: {:?} could not add {rect:?} to its mask", self.id);
                platform.delete_region(combined);
            }
            platform.delete_region(rect_region);
        }
        result
    }

    // Cursor and grabs

    pub fn apply_cursor(&self) {
        self.context.platform().set_cursor(self.cursor);
    }

    pub fn set_cursor(&mut self, cursor: CursorHandle) {
        if self.cursor == cursor {
            return;
        }
        self.cursor = cursor;
        // Applied on re-entry otherwise.
        if self.context.window_under_mouse() == Some(self.id) {
            self.apply_cursor();
        }
    }

    pub fn set_keyboard_grab_enabled(&mut self, grab: bool) -> bool {
        if !self.has_handle("set_keyboard_grab_enabled") {
            return false;
        }
        if grab {
            self.context.set_key_grabber(Some(self.id));
        } else if self.context.key_grabber() == Some(self.id) {
            self.context.set_key_grabber(None);
        }
        true
    }

    pub fn set_mouse_grab_enabled(&mut self, grab: bool) -> bool {
        if !self.has_handle("set_mouse_grab_enabled") {
            return false;
        }
        if grab {
            self.context.set_mouse_grabber(Some(self.id));
        } else if self.context.mouse_grabber() == Some(self.id) {
            self.context.set_mouse_grabber(None);
        }
        if self.mouse_grab == grab {
            return true;
        }
        self.mouse_grab = grab;
        if self.is_visible() {
            let platform = self.context.platform();
            if grab {
                platform.set_capture(self.data.handle);
            } else {
                platform.release_capture();
            }
        } else {
            log::debug!(
                "Window: {:?} is hidden; mouse grab {grab} recorded without native capture",
                self.id
            );
        }
        true
    }

    // Misc

    pub fn start_system_resize(&mut self, corner: Corner) -> bool {
        if !self.has_handle("start_system_resize") {
            return false;
        }
        let platform = self.context.platform();
        if !platform.has_system_menu(self.data.handle) {
            return false;
        }
        platform.release_capture();
        if !platform.start_system_resize(self.data.handle, corner) {
            return false;
        }
        self.internal.insert(WindowInternalFlags::SIZE_GRIP_OPERATION);
        true
    }

    /// Ends a size-grip resize; returns whether one was in progress.
    pub fn end_size_grip_operation(&mut self) -> bool {
        let active = self.internal.contains(WindowInternalFlags::SIZE_GRIP_OPERATION);
        self.internal.remove(WindowInternalFlags::SIZE_GRIP_OPERATION);
        active
    }

    pub fn set_frame_strut_events_enabled(&mut self, enabled: bool) {
        self.internal
            .set(WindowInternalFlags::FRAME_STRUT_EVENTS, enabled);
    }

    pub fn frame_strut_events_enabled(&self) -> bool {
        self.internal.contains(WindowInternalFlags::FRAME_STRUT_EVENTS)
    }

    pub fn alert(&self, duration_ms: u32) {
        if !self.has_handle("alert") {
            return;
        }
        let platform = self.context.platform();
        let mut timeout_ms = platform.caret_blink_time_ms();
        if timeout_ms == 0 || timeout_ms == u32::MAX {
            timeout_ms = DEFAULT_ALERT_TIMEOUT_MS;
        }
        let count = if duration_ms == 0 {
            DEFAULT_ALERT_FLASH_COUNT
        } else {
            duration_ms / timeout_ms
        };
        platform.flash_window(self.data.handle, count, timeout_ms);
    }

    pub fn stop_alert(&self) {
        if self.has_handle("stop_alert") {
            self.context.platform().flash_window(self.data.handle, 0, 0);
        }
    }

    pub fn get_size_hints(&self, info: &mut MinMaxInfo) {
        let platform = self.context.platform();
        self.hint.apply_to_min_max_info(
            platform,
            platform.style(self.data.handle),
            platform.ex_style(self.data.handle),
            self.context.config().enforce_title_bar_min_track_height,
            info,
        );
    }

    /*
     * Releases native resources in a fixed order: the drop target first, then
     * the registry entry so no further notification can reach this window,
     * then surfaces and device contexts, and finally the native handle.
     */
    pub fn destroy(&mut self) {
        self.tear_down(true);
    }

    /// Forgets a handle the native side already destroyed. No native call is
    /// made for it, as the handle value may since have been reused.
    pub fn handle_native_destroyed(&mut self) {
        self.tear_down(false);
    }

    fn tear_down(&mut self, native_alive: bool) {
        let handle = self.data.handle;
        if handle.is_null() {
            return;
        }
        let context = Rc::clone(&self.context);
        let platform = context.platform();

        if self.drop_site {
            if native_alive {
                platform.revoke_drop_target(handle);
            }
            self.drop_site = false;
        }
        context.unregister_window(handle);
        if !self.surface.is_null() {
            if native_alive {
                platform.release_surface(handle, self.surface);
            }
            self.surface = SurfaceHandle::NULL;
        }
        self.internal.remove(WindowInternalFlags::DC_FROM_BEGIN_PAINT);
        if native_alive {
            self.release_dc();
        } else {
            self.dc = DeviceContext::NULL;
        }

        if context.key_grabber() == Some(self.id) {
            context.set_key_grabber(None);
        }
        if context.mouse_grabber() == Some(self.id) {
            context.set_mouse_grabber(None);
        }
        if context.window_under_mouse() == Some(self.id) {
            context.set_window_under_mouse(None);
        }

        if native_alive && !self.is_desktop() {
            platform.destroy_window(handle);
        }
        self.data.handle = NativeHandle::NULL;
        log::debug!(
            "Window: {:?} destroyed (handle {handle:?}, by native side: {})",
            self.id,
            !native_alive
        );
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.destroy();
    }
}
