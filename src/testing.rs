/*
 * Test doubles for the capability interfaces: a `NativePlatform` that keeps
 * a small in-memory model of native windows (styles, frames, visibility,
 * iconic/maximized state, regions, device contexts, capture, z-order) and
 * records every mutating call, and a `WindowEventSink` that records events.
 *
 * The platform can be attached to an `ApplicationContext` to simulate the
 * notifications the native side sends re-entrantly while a move or resize
 * call is still running.
 */
use crate::app_context::ApplicationContext;
use crate::creation_context::CreationContext;
use crate::error::Result as PlatformResult;
use crate::platform::{
    MinMaxInfo, NativeCreateRequest, NativePlatform, PaintSession, RegionCombine, WindowClassKind,
    WindowEventSink,
};
use crate::style::{ExtendedStyle, PositionFlags, ShowCommand, WindowStyle, ZOrder};
use crate::types::{
    Corner, CursorHandle, DeviceContext, Margins, NativeHandle, NativeNotification, NativeRegion,
    Rect, Size, SizeKind, SurfaceHandle, WindowEvent, WindowId,
};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

pub(crate) const DESKTOP_HANDLE: NativeHandle = NativeHandle(0x10010);
pub(crate) const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
/// Native fallback frame for creations that request no geometry.
pub(crate) const DEFAULT_FRAME: Rect = Rect::new(40, 40, 640, 480);

pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlatformCall {
    CreateWindow { title: String, style: WindowStyle },
    DestroyWindow(NativeHandle),
    SetStyle(NativeHandle, WindowStyle),
    SetExStyle(NativeHandle, ExtendedStyle),
    MoveWindow(NativeHandle, Rect),
    SetWindowPos {
        handle: NativeHandle,
        z_order: ZOrder,
        frame: Rect,
        flags: PositionFlags,
    },
    ShowWindow(NativeHandle, ShowCommand),
    FrameRect(NativeHandle),
    Invalidate(NativeHandle),
    BeginPaint(NativeHandle),
    EndPaint(NativeHandle, DeviceContext),
    GetDc(NativeHandle),
    ReleaseDc(NativeHandle, DeviceContext),
    CreateRectRegion(Rect),
    CombineRegion(NativeRegion),
    OffsetRegion(NativeRegion, i32, i32),
    DeleteRegion(NativeRegion),
    SetWindowRegion(NativeHandle, Option<NativeRegion>),
    RegisterDropTarget(NativeHandle),
    RevokeDropTarget(NativeHandle),
    SetCursor(CursorHandle),
    SetCapture(NativeHandle),
    ReleaseCapture,
    SetForeground(NativeHandle),
    SetFocus(NativeHandle),
    SetParent(NativeHandle, Option<NativeHandle>),
    SetEnabled(NativeHandle, bool),
    SetLayeredOpacity(NativeHandle, Option<u8>),
    SetWindowText(NativeHandle, String),
    StartSystemResize(NativeHandle, Corner),
    FlashWindow {
        handle: NativeHandle,
        count: u32,
        timeout_ms: u32,
    },
    CreateSurface(NativeHandle),
    ReleaseSurface(NativeHandle, SurfaceHandle),
}

#[derive(Debug, Clone)]
struct MockWindow {
    style: WindowStyle,
    ex_style: ExtendedStyle,
    frame: Rect,
    normal_placement: Rect,
    parent: Option<NativeHandle>,
    iconic: bool,
    maximized: bool,
    update_pending: bool,
    z_order: ZOrder,
    close_menu_enabled: Option<bool>,
    layered_alpha: Option<u8>,
    region: Option<NativeRegion>,
    text: String,
    drop_target: bool,
}

impl MockWindow {
    fn new(style: WindowStyle, ex_style: ExtendedStyle, frame: Rect) -> Self {
        Self {
            style,
            ex_style,
            frame,
            normal_placement: frame,
            parent: None,
            iconic: false,
            maximized: false,
            update_pending: false,
            z_order: ZOrder::Unchanged,
            close_menu_enabled: None,
            layered_alpha: None,
            region: None,
            text: String::new(),
            drop_target: false,
        }
    }
}

#[derive(Debug)]
struct MockState {
    windows: HashMap<NativeHandle, MockWindow>,
    next_handle: isize,
    next_gdi_object: isize,
    live_regions: HashSet<NativeRegion>,
    calls: Vec<PlatformCall>,
    capture: Option<NativeHandle>,
    active: NativeHandle,
    fail_next_creation: Option<u32>,
    fail_window_region: bool,
    fail_region_combine: bool,
    last_error: u32,
    creation_snap: Option<Rect>,
    min_max_queries: usize,
    paint_update_rect: Option<Rect>,
    caret_blink_ms: u32,
}

pub(crate) struct RecordingPlatform {
    state: RefCell<MockState>,
    echo_target: RefCell<Weak<ApplicationContext>>,
}

impl RecordingPlatform {
    pub(crate) fn new() -> Self {
        init_test_logging();
        let mut windows = HashMap::new();
        windows.insert(
            DESKTOP_HANDLE,
            MockWindow::new(WindowStyle::VISIBLE, ExtendedStyle::empty(), SCREEN),
        );
        Self {
            state: RefCell::new(MockState {
                windows,
                next_handle: 0x100,
                next_gdi_object: 0x5000,
                live_regions: HashSet::new(),
                calls: Vec::new(),
                capture: None,
                active: NativeHandle::NULL,
                fail_next_creation: None,
                fail_window_region: false,
                fail_region_combine: false,
                last_error: 0,
                creation_snap: None,
                min_max_queries: 0,
                paint_update_rect: None,
                caret_blink_ms: 530,
            }),
            echo_target: RefCell::new(Weak::new()),
        }
    }

    /// Queues simulated re-entrant move/resize notifications into `context`.
    pub(crate) fn attach_echo_queue(&self, context: &Rc<ApplicationContext>) {
        *self.echo_target.borrow_mut() = Rc::downgrade(context);
    }

    pub(crate) fn add_native_window(&self, style: WindowStyle, frame: Rect) -> NativeHandle {
        let mut state = self.state.borrow_mut();
        let handle = NativeHandle(state.next_handle);
        state.next_handle += 1;
        state
            .windows
            .insert(handle, MockWindow::new(style, ExtendedStyle::empty(), frame));
        handle
    }

    pub(crate) fn calls(&self) -> Vec<PlatformCall> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn calls_matching(&self, pred: impl Fn(&PlatformCall) -> bool) -> Vec<PlatformCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| pred(call))
            .cloned()
            .collect()
    }

    pub(crate) fn count_calls(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| pred(call)).count()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub(crate) fn set_creation_snap(&self, frame: Option<Rect>) {
        self.state.borrow_mut().creation_snap = frame;
    }

    pub(crate) fn fail_next_creation(&self, code: u32) {
        self.state.borrow_mut().fail_next_creation = Some(code);
    }

    pub(crate) fn fail_window_region(&self, fail: bool) {
        self.state.borrow_mut().fail_window_region = fail;
    }

    /// Destroys a window behind the backend's back, as an owner teardown would.
    pub(crate) fn destroy_natively(&self, handle: NativeHandle) {
        self.state.borrow_mut().windows.remove(&handle);
        if let Some(context) = self.echo_target.borrow().upgrade() {
            context.queue_notification(handle, NativeNotification::Destroyed);
        }
    }

    pub(crate) fn fail_region_combine(&self, fail: bool) {
        self.state.borrow_mut().fail_region_combine = fail;
    }

    pub(crate) fn min_max_queries_during_creation(&self) -> usize {
        self.state.borrow().min_max_queries
    }

    pub(crate) fn set_paint_update_rect(&self, rect: Option<Rect>) {
        self.state.borrow_mut().paint_update_rect = rect;
    }

    pub(crate) fn set_caret_blink_time(&self, ms: u32) {
        self.state.borrow_mut().caret_blink_ms = ms;
    }

    pub(crate) fn set_active(&self, handle: NativeHandle) {
        self.state.borrow_mut().active = handle;
    }

    /// Changes the native frame behind the backend's back, as a user drag would.
    pub(crate) fn set_frame(&self, handle: NativeHandle, frame: Rect) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.frame = frame;
            window.normal_placement = frame;
        }
    }

    pub(crate) fn set_iconic(&self, handle: NativeHandle, iconic: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.iconic = iconic;
        }
    }

    pub(crate) fn exists(&self, handle: NativeHandle) -> bool {
        self.state.borrow().windows.contains_key(&handle)
    }

    pub(crate) fn close_menu_enabled(&self, handle: NativeHandle) -> Option<bool> {
        self.with_window(handle, |w| w.close_menu_enabled).flatten()
    }

    pub(crate) fn layered_alpha(&self, handle: NativeHandle) -> Option<u8> {
        self.with_window(handle, |w| w.layered_alpha).flatten()
    }

    pub(crate) fn window_region(&self, handle: NativeHandle) -> Option<NativeRegion> {
        self.with_window(handle, |w| w.region).flatten()
    }

    pub(crate) fn live_region_count(&self) -> usize {
        self.state.borrow().live_regions.len()
    }

    pub(crate) fn capture(&self) -> Option<NativeHandle> {
        self.state.borrow().capture
    }

    pub(crate) fn window_text(&self, handle: NativeHandle) -> Option<String> {
        self.with_window(handle, |w| w.text.clone())
    }

    pub(crate) fn z_order(&self, handle: NativeHandle) -> Option<ZOrder> {
        self.with_window(handle, |w| w.z_order)
    }

    pub(crate) fn drop_target_registered(&self, handle: NativeHandle) -> bool {
        self.with_window(handle, |w| w.drop_target).unwrap_or(false)
    }

    pub(crate) fn parent_of(&self, handle: NativeHandle) -> Option<NativeHandle> {
        self.with_window(handle, |w| w.parent).flatten()
    }

    fn with_window<R>(&self, handle: NativeHandle, f: impl FnOnce(&MockWindow) -> R) -> Option<R> {
        self.state.borrow().windows.get(&handle).map(f)
    }

    fn update_window(&self, handle: NativeHandle, f: impl FnOnce(&mut MockWindow)) -> bool {
        match self.state.borrow_mut().windows.get_mut(&handle) {
            Some(window) => {
                f(window);
                true
            }
            None => false,
        }
    }

    fn record(&self, call: PlatformCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn next_gdi_object(&self) -> isize {
        let mut state = self.state.borrow_mut();
        state.next_gdi_object += 1;
        state.next_gdi_object
    }

    fn echo_frame_change(&self, handle: NativeHandle, old: Rect, new: Rect) {
        let Some(context) = self.echo_target.borrow().upgrade() else {
            return;
        };
        if old.size() != new.size() {
            context.queue_notification(handle, NativeNotification::Resized(SizeKind::Restored));
        }
        if old.top_left() != new.top_left() {
            context.queue_notification(handle, NativeNotification::Moved);
        }
    }

    fn client_rect(&self, handle: NativeHandle) -> Rect {
        let Some((style, ex_style, frame)) =
            self.with_window(handle, |w| (w.style, w.ex_style, w.frame))
        else {
            return Rect::default();
        };
        let margins = self.frame_margins(style, ex_style).unwrap_or_default();
        Rect::new(0, 0, frame.width - margins.horizontal(), frame.height - margins.vertical())
    }
}

impl NativePlatform for RecordingPlatform {
    fn frame_margins(
        &self,
        style: WindowStyle,
        _ex_style: ExtendedStyle,
    ) -> PlatformResult<Margins> {
        let border = if style.contains(WindowStyle::THICK_FRAME) {
            8
        } else if style.contains(WindowStyle::DLG_FRAME) {
            3
        } else if style.contains(WindowStyle::BORDER) {
            1
        } else {
            0
        };
        let caption = if style.contains(WindowStyle::CAPTION) { 23 } else { 0 };
        Ok(Margins::new(border, border + caption, border, border))
    }

    fn register_window_class(&self, kind: WindowClassKind) -> PlatformResult<String> {
        Ok(format!("nativeframe_{kind:?}"))
    }

    fn create_window(
        &self,
        request: &NativeCreateRequest,
        context: &mut CreationContext,
    ) -> PlatformResult<NativeHandle> {
        self.record(PlatformCall::CreateWindow {
            title: request.title.clone(),
            style: request.style,
        });
        let failure = self.state.borrow_mut().fail_next_creation.take();
        if let Some(code) = failure {
            self.state.borrow_mut().last_error = code;
            return Ok(NativeHandle::NULL);
        }

        let mut frame = match (request.x, request.y, request.width, request.height) {
            (Some(x), Some(y), Some(width), Some(height)) => Rect::new(x, y, width, height),
            _ => DEFAULT_FRAME,
        };

        // The native side asks for size limits before the handle is returned.
        let mut info = MinMaxInfo {
            min_track_size: Size::new(1, 1),
            max_track_size: SCREEN.size(),
        };
        context.apply_to_min_max_info(self, &mut info);
        self.state.borrow_mut().min_max_queries += 1;

        let snap = self.state.borrow().creation_snap;
        if let Some(snap) = snap {
            frame = snap;
        }
        context.record_obtained_frame(frame);

        let mut state = self.state.borrow_mut();
        let handle = NativeHandle(state.next_handle);
        state.next_handle += 1;
        let mut window = MockWindow::new(request.style, request.ex_style, frame);
        window.parent = request.parent;
        window.text = request.title.clone();
        state.windows.insert(handle, window);
        Ok(handle)
    }

    fn destroy_window(&self, handle: NativeHandle) {
        self.record(PlatformCall::DestroyWindow(handle));
        let mut state = self.state.borrow_mut();
        state.windows.remove(&handle);
        if state.capture == Some(handle) {
            state.capture = None;
        }
    }

    fn desktop_window(&self) -> NativeHandle {
        DESKTOP_HANDLE
    }

    fn style(&self, handle: NativeHandle) -> WindowStyle {
        self.with_window(handle, |w| w.style).unwrap_or_default()
    }

    fn set_style(&self, handle: NativeHandle, style: WindowStyle) {
        self.record(PlatformCall::SetStyle(handle, style));
        self.update_window(handle, |w| w.style = style);
    }

    fn ex_style(&self, handle: NativeHandle) -> ExtendedStyle {
        self.with_window(handle, |w| w.ex_style).unwrap_or_default()
    }

    fn set_ex_style(&self, handle: NativeHandle, ex_style: ExtendedStyle) {
        self.record(PlatformCall::SetExStyle(handle, ex_style));
        self.update_window(handle, |w| w.ex_style = ex_style);
    }

    fn move_window(&self, handle: NativeHandle, frame: Rect) -> bool {
        self.record(PlatformCall::MoveWindow(handle, frame));
        let Some(old) = self.with_window(handle, |w| w.frame) else {
            return false;
        };
        self.update_window(handle, |w| {
            w.frame = frame;
            if !w.iconic && !w.maximized {
                w.normal_placement = frame;
            }
        });
        self.echo_frame_change(handle, old, frame);
        true
    }

    fn set_window_pos(
        &self,
        handle: NativeHandle,
        z_order: ZOrder,
        frame: Rect,
        flags: PositionFlags,
    ) -> bool {
        self.record(PlatformCall::SetWindowPos {
            handle,
            z_order,
            frame,
            flags,
        });
        let Some(old) = self.with_window(handle, |w| w.frame) else {
            return false;
        };
        let mut new = old;
        if !flags.contains(PositionFlags::NO_MOVE) {
            new.x = frame.x;
            new.y = frame.y;
        }
        if !flags.contains(PositionFlags::NO_SIZE) {
            new.width = frame.width;
            new.height = frame.height;
        }
        self.update_window(handle, |w| {
            w.frame = new;
            if !flags.contains(PositionFlags::NO_ZORDER) && z_order != ZOrder::Unchanged {
                w.z_order = z_order;
            }
            if flags.contains(PositionFlags::HIDE_WINDOW) {
                w.style.remove(WindowStyle::VISIBLE);
            }
        });
        true
    }

    fn show_window(&self, handle: NativeHandle, command: ShowCommand) {
        self.record(PlatformCall::ShowWindow(handle, command));
        let activates = matches!(
            command,
            ShowCommand::ShowNormal | ShowCommand::ShowMaximized | ShowCommand::ShowMinimized
        );
        self.update_window(handle, |w| match command {
            ShowCommand::Hide => w.style.remove(WindowStyle::VISIBLE),
            ShowCommand::ShowNormal | ShowCommand::ShowNoActivate => {
                w.style.insert(WindowStyle::VISIBLE);
                if w.iconic || w.maximized {
                    w.frame = w.normal_placement;
                }
                w.iconic = false;
                w.maximized = false;
            }
            ShowCommand::ShowMinimized | ShowCommand::ShowMinNoActive | ShowCommand::Minimize => {
                w.style.insert(WindowStyle::VISIBLE);
                w.iconic = true;
            }
            ShowCommand::ShowMaximized | ShowCommand::Maximize => {
                w.style.insert(WindowStyle::VISIBLE);
                if !w.maximized && !w.iconic {
                    w.normal_placement = w.frame;
                }
                w.iconic = false;
                w.maximized = true;
                w.frame = SCREEN;
            }
        });
        if activates {
            self.state.borrow_mut().active = handle;
        }
    }

    fn frame_rect(&self, handle: NativeHandle, relative_to_parent: bool) -> Rect {
        self.record(PlatformCall::FrameRect(handle));
        let Some((frame, parent)) = self.with_window(handle, |w| (w.frame, w.parent)) else {
            return Rect::default();
        };
        match parent.filter(|_| relative_to_parent) {
            Some(parent) => {
                let origin = self.with_window(parent, |w| w.frame).unwrap_or_default();
                frame.translated(-origin.x, -origin.y)
            }
            None => frame,
        }
    }

    fn normal_placement(&self, handle: NativeHandle) -> Option<Rect> {
        self.with_window(handle, |w| w.normal_placement)
    }

    fn screen_geometry(&self, _handle: NativeHandle) -> Rect {
        SCREEN
    }

    fn is_visible(&self, handle: NativeHandle) -> bool {
        self.with_window(handle, |w| w.style.contains(WindowStyle::VISIBLE))
            .unwrap_or(false)
    }

    fn is_iconic(&self, handle: NativeHandle) -> bool {
        self.with_window(handle, |w| w.iconic).unwrap_or(false)
    }

    fn active_window(&self) -> NativeHandle {
        self.state.borrow().active
    }

    fn is_child(&self, parent: NativeHandle, handle: NativeHandle) -> bool {
        let mut current = self.parent_of(handle);
        while let Some(ancestor) = current {
            if ancestor == parent {
                return true;
            }
            current = self.parent_of(ancestor);
        }
        false
    }

    fn has_update_rect(&self, handle: NativeHandle) -> bool {
        self.with_window(handle, |w| w.update_pending).unwrap_or(false)
    }

    fn invalidate(&self, handle: NativeHandle) {
        self.record(PlatformCall::Invalidate(handle));
        self.update_window(handle, |w| w.update_pending = true);
    }

    fn begin_paint(&self, handle: NativeHandle) -> PaintSession {
        self.record(PlatformCall::BeginPaint(handle));
        self.update_window(handle, |w| w.update_pending = false);
        let update_rect = self
            .state
            .borrow()
            .paint_update_rect
            .unwrap_or_else(|| self.client_rect(handle));
        PaintSession {
            dc: DeviceContext(self.next_gdi_object()),
            update_rect,
        }
    }

    fn end_paint(&self, handle: NativeHandle, session: PaintSession) {
        self.record(PlatformCall::EndPaint(handle, session.dc));
    }

    fn get_dc(&self, handle: NativeHandle) -> DeviceContext {
        self.record(PlatformCall::GetDc(handle));
        DeviceContext(self.next_gdi_object())
    }

    fn release_dc(&self, handle: NativeHandle, dc: DeviceContext) {
        self.record(PlatformCall::ReleaseDc(handle, dc));
    }

    fn create_rect_region(&self, rect: Rect) -> NativeRegion {
        self.record(PlatformCall::CreateRectRegion(rect));
        let region = NativeRegion(self.next_gdi_object());
        self.state.borrow_mut().live_regions.insert(region);
        region
    }

    fn combine_region(
        &self,
        dest: NativeRegion,
        _a: NativeRegion,
        _b: NativeRegion,
        _mode: RegionCombine,
    ) -> bool {
        self.record(PlatformCall::CombineRegion(dest));
        !self.state.borrow().fail_region_combine
    }

    fn offset_region(&self, region: NativeRegion, dx: i32, dy: i32) {
        self.record(PlatformCall::OffsetRegion(region, dx, dy));
    }

    fn delete_region(&self, region: NativeRegion) {
        self.record(PlatformCall::DeleteRegion(region));
        self.state.borrow_mut().live_regions.remove(&region);
    }

    fn set_window_region(&self, handle: NativeHandle, region: Option<NativeRegion>) -> bool {
        self.record(PlatformCall::SetWindowRegion(handle, region));
        if self.state.borrow().fail_window_region {
            return false;
        }
        let mut previous = None;
        let found = self.update_window(handle, |w| {
            previous = w.region;
            w.region = region;
        });
        // The native side owns and frees the region it replaced.
        if let Some(previous) = previous {
            self.state.borrow_mut().live_regions.remove(&previous);
        }
        found
    }

    fn register_drop_target(&self, handle: NativeHandle) -> bool {
        self.record(PlatformCall::RegisterDropTarget(handle));
        self.update_window(handle, |w| w.drop_target = true)
    }

    fn revoke_drop_target(&self, handle: NativeHandle) {
        self.record(PlatformCall::RevokeDropTarget(handle));
        self.update_window(handle, |w| w.drop_target = false);
    }

    fn set_cursor(&self, cursor: CursorHandle) {
        self.record(PlatformCall::SetCursor(cursor));
    }

    fn set_capture(&self, handle: NativeHandle) {
        self.record(PlatformCall::SetCapture(handle));
        self.state.borrow_mut().capture = Some(handle);
    }

    fn release_capture(&self) {
        self.record(PlatformCall::ReleaseCapture);
        self.state.borrow_mut().capture = None;
    }

    fn set_foreground(&self, handle: NativeHandle) {
        self.record(PlatformCall::SetForeground(handle));
        self.state.borrow_mut().active = handle;
    }

    fn set_focus(&self, handle: NativeHandle) {
        self.record(PlatformCall::SetFocus(handle));
    }

    fn set_parent(&self, handle: NativeHandle, parent: Option<NativeHandle>) -> bool {
        self.record(PlatformCall::SetParent(handle, parent));
        self.update_window(handle, |w| w.parent = parent)
    }

    fn set_enabled(&self, handle: NativeHandle, enabled: bool) {
        self.record(PlatformCall::SetEnabled(handle, enabled));
        self.update_window(handle, |w| w.style.set(WindowStyle::DISABLED, !enabled));
    }

    fn set_close_menu_item_enabled(&self, handle: NativeHandle, enabled: bool) {
        self.update_window(handle, |w| w.close_menu_enabled = Some(enabled));
    }

    fn has_system_menu(&self, handle: NativeHandle) -> bool {
        self.style(handle).contains(WindowStyle::SYS_MENU)
    }

    fn set_layered_opacity(&self, handle: NativeHandle, alpha: Option<u8>) {
        self.record(PlatformCall::SetLayeredOpacity(handle, alpha));
        self.update_window(handle, |w| {
            w.layered_alpha = alpha;
            w.ex_style.set(ExtendedStyle::LAYERED, alpha.is_some());
        });
    }

    fn set_window_text(&self, handle: NativeHandle, text: &str) {
        self.record(PlatformCall::SetWindowText(handle, text.to_string()));
        self.update_window(handle, |w| w.text = text.to_string());
    }

    fn start_system_resize(&self, handle: NativeHandle, corner: Corner) -> bool {
        self.record(PlatformCall::StartSystemResize(handle, corner));
        self.exists(handle)
    }

    fn flash_window(&self, handle: NativeHandle, count: u32, timeout_ms: u32) {
        self.record(PlatformCall::FlashWindow {
            handle,
            count,
            timeout_ms,
        });
    }

    fn caret_blink_time_ms(&self) -> u32 {
        self.state.borrow().caret_blink_ms
    }

    fn create_surface(&self, handle: NativeHandle) -> SurfaceHandle {
        self.record(PlatformCall::CreateSurface(handle));
        SurfaceHandle(self.next_gdi_object())
    }

    fn release_surface(&self, handle: NativeHandle, surface: SurfaceHandle) {
        self.record(PlatformCall::ReleaseSurface(handle, surface));
    }

    fn last_error(&self) -> u32 {
        self.state.borrow().last_error
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: RefCell<Vec<(WindowId, WindowEvent)>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<(WindowId, WindowEvent)> {
        self.events.borrow().clone()
    }

    pub(crate) fn events_for(&self, window: WindowId) -> Vec<WindowEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(id, _)| *id == window)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl WindowEventSink for RecordingSink {
    fn handle_window_event(&self, window: WindowId, event: WindowEvent) {
        self.events.borrow_mut().push((window, event));
    }
}
