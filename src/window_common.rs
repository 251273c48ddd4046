/*
 * Win32 implementation of `NativePlatform`, plus the window procedure that
 * turns native messages into `NativeNotification`s and the message loop that
 * drives a `WindowManager`.
 *
 * The window procedure never touches a `Window` directly. Messages for
 * registered windows are parked in the `ApplicationContext` and applied by
 * `WindowManager::process_pending` after `DispatchMessageW` returns, or by the
 * window itself right after the native call that caused them. Paint and
 * background-erase messages skip default processing so the update region
 * is still pending when the queued paint is applied. Two queries
 * must be answered synchronously and are served without the window:
 *
 *  - `WM_GETMINMAXINFO` for an existing window, from the size hints cached
 *    in the context.
 *  - Any message arriving while `CreateWindowExW` is still running, from the
 *    `CreationContext` of the in-flight creation.
 */
use crate::app_context::ApplicationContext;
use crate::creation_context::CreationContext;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::manager::WindowManager;
use crate::platform::{
    MinMaxInfo, NativeCreateRequest, NativePlatform, PaintSession, RegionCombine, WindowClassKind,
};
use crate::style::{ExtendedStyle, PositionFlags, ShowCommand, WindowStyle, ZOrder};
use crate::types::{
    Corner, CursorHandle, DeviceContext, Margins, NativeHandle, NativeNotification, NativeRegion,
    Point, Rect, Size, SizeKind, SurfaceHandle,
};

use windows::{
    Win32::{
        Foundation::{COLORREF, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, ClientToScreen, CombineRgn, CreateRectRgn, DeleteObject, EndPaint, GetDC,
            GetMonitorInfoW, GetUpdateRect, HBRUSH, HDC, HRGN, InvalidateRect,
            MONITOR_DEFAULTTONEAREST, MONITORINFO, MonitorFromWindow, OffsetRgn, PAINTSTRUCT,
            RGN_ERROR, RGN_OR, ReleaseDC, ScreenToClient, SetWindowRgn,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::Input::KeyboardAndMouse::{
            EnableWindow, ReleaseCapture, SetCapture, SetFocus, TME_LEAVE, TRACKMOUSEEVENT,
            TrackMouseEvent,
        },
        UI::Shell::DragAcceptFiles,
        UI::WindowsAndMessaging::*,
    },
    core::{HSTRING, PCWSTR},
};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::c_void;
use std::rc::{Rc, Weak};

const SC_SIZE_COMMAND: usize = 0xF000;
const HTCLIENT_CODE: usize = 1;

/*
 * The creation whose `CreateWindowExW` call is currently on the stack.
 * Only one creation can be in flight; nested creation from inside a
 * creation callback is not supported.
 */
#[derive(Clone, Copy)]
struct InFlightCreation {
    context: *mut CreationContext,
    platform: *const Win32Platform,
}

thread_local! {
    static IN_FLIGHT_CREATION: Cell<Option<InFlightCreation>> = const { Cell::new(None) };
    static NOTIFICATION_TARGET: RefCell<Weak<ApplicationContext>> = RefCell::new(Weak::new());
}

/*
 * RAII helper publishing an in-flight creation to the window procedure
 * until dropped, so an early return or error can never leave a dangling
 * context pointer behind.
 */
struct InFlightCreationGuard;

impl InFlightCreationGuard {
    fn new(context: &mut CreationContext, platform: &Win32Platform) -> Self {
        IN_FLIGHT_CREATION.with(|slot| {
            if slot.get().is_some() {
                log::warn!("Win32Platform: nested window creation; the outer creation loses its size queries");
            }
            slot.set(Some(InFlightCreation {
                context: context as *mut CreationContext,
                platform: platform as *const Win32Platform,
            }));
        });
        Self
    }
}

impl Drop for InFlightCreationGuard {
    fn drop(&mut self) {
        IN_FLIGHT_CREATION.with(|slot| slot.set(None));
    }
}

fn hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn native(hwnd: HWND) -> NativeHandle {
    NativeHandle(hwnd.0 as isize)
}

fn to_rect(rect: RECT) -> Rect {
    Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom)
}

fn hrgn(region: NativeRegion) -> HRGN {
    HRGN(region.0 as *mut c_void)
}

#[inline]
pub(crate) fn loword_from_wparam(wparam: WPARAM) -> u32 {
    (wparam.0 & 0xFFFF) as u32
}

/// Signed x coordinate packed into the low word.
#[inline]
pub(crate) fn x_from_lparam(lparam: LPARAM) -> i32 {
    (lparam.0 & 0xFFFF) as u16 as i16 as i32
}

/// Signed y coordinate packed into the high word.
#[inline]
pub(crate) fn y_from_lparam(lparam: LPARAM) -> i32 {
    ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32
}

pub(crate) fn size_kind_from_wparam(wparam: WPARAM) -> Option<SizeKind> {
    match wparam.0 as u32 {
        SIZE_RESTORED => Some(SizeKind::Restored),
        SIZE_MINIMIZED => Some(SizeKind::Minimized),
        SIZE_MAXIMIZED => Some(SizeKind::Maximized),
        SIZE_MAXSHOW => Some(SizeKind::MaxShow),
        SIZE_MAXHIDE => Some(SizeKind::MaxHide),
        _ => None,
    }
}

/// `WM_SYSCOMMAND` parameter starting a sizing loop from `corner`.
pub(crate) fn system_resize_command(corner: Corner) -> usize {
    let edge = match corner {
        Corner::TopLeft => WMSZ_TOPLEFT,
        Corner::TopRight => WMSZ_TOPRIGHT,
        Corner::BottomLeft => WMSZ_BOTTOMLEFT,
        Corner::BottomRight => WMSZ_BOTTOMRIGHT,
    };
    SC_SIZE_COMMAND | edge as usize
}

fn show_command(command: ShowCommand) -> SHOW_WINDOW_CMD {
    match command {
        ShowCommand::Hide => SW_HIDE,
        ShowCommand::ShowNormal => SW_SHOWNORMAL,
        ShowCommand::ShowNoActivate => SW_SHOWNOACTIVATE,
        ShowCommand::ShowMinimized => SW_SHOWMINIMIZED,
        ShowCommand::ShowMinNoActive => SW_SHOWMINNOACTIVE,
        ShowCommand::Minimize => SW_MINIMIZE,
        ShowCommand::ShowMaximized => SW_SHOWMAXIMIZED,
        ShowCommand::Maximize => SW_MAXIMIZE,
    }
}

fn insert_after(z_order: ZOrder) -> Option<HWND> {
    match z_order {
        ZOrder::Unchanged => None,
        ZOrder::Top => Some(HWND_TOP),
        ZOrder::Bottom => Some(HWND_BOTTOM),
        ZOrder::TopMost => Some(HWND_TOPMOST),
    }
}

pub struct Win32Platform {
    instance: HINSTANCE,
    application_name: String,
    classes: RefCell<HashMap<WindowClassKind, HSTRING>>,
    paint_structs: RefCell<HashMap<NativeHandle, PAINTSTRUCT>>,
    last_error: Cell<u32>,
}

impl Win32Platform {
    pub fn new(application_name: &str) -> PlatformResult<Self> {
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|e| {
            PlatformError::InitializationFailed(format!("GetModuleHandleW failed: {e:?}"))
        })?;
        Ok(Self {
            instance: module.into(),
            application_name: application_name.to_string(),
            classes: RefCell::new(HashMap::new()),
            paint_structs: RefCell::new(HashMap::new()),
            last_error: Cell::new(0),
        })
    }

    /// Routes notifications of this thread's windows into `context`.
    pub fn attach_context(context: &Rc<ApplicationContext>) {
        NOTIFICATION_TARGET.with(|target| *target.borrow_mut() = Rc::downgrade(context));
    }

    fn record_last_error(&self, operation: &str) -> u32 {
        let code = unsafe { GetLastError() }.0;
        self.last_error.set(code);
        log::error!("Win32Platform: {operation} failed with error {code}");
        code
    }

    fn window_long(&self, handle: NativeHandle, index: WINDOW_LONG_PTR_INDEX) -> u32 {
        unsafe { GetWindowLongPtrW(hwnd(handle), index) as u32 }
    }
}

impl NativePlatform for Win32Platform {
    fn frame_margins(&self, style: WindowStyle, ex_style: ExtendedStyle) -> PlatformResult<Margins> {
        let mut rect = RECT::default();
        unsafe {
            AdjustWindowRectEx(
                &mut rect,
                WINDOW_STYLE(style.bits()),
                false,
                WINDOW_EX_STYLE(ex_style.bits()),
            )
        }
        .map_err(|e| {
            let code = self.record_last_error("AdjustWindowRectEx");
            log::debug!("Win32Platform: AdjustWindowRectEx error detail {e:?}");
            PlatformError::NativeCallFailed {
                operation: "AdjustWindowRectEx",
                code,
            }
        })?;
        Ok(Margins::new(-rect.left, -rect.top, rect.right, rect.bottom))
    }

    /*
     * Registers one window class per flavor, all routed through
     * `window_proc_router`. Accelerated surfaces need a class-owned device
     * context; popups get a drop shadow and save the bits underneath.
     */
    fn register_window_class(&self, kind: WindowClassKind) -> PlatformResult<String> {
        if let Some(name) = self.classes.borrow().get(&kind) {
            return Ok(name.to_string());
        }
        let class_name = HSTRING::from(format!("{}_{kind:?}WindowClass", self.application_name));
        let class_name_pcwstr = PCWSTR(class_name.as_ptr());

        let mut class_style = CS_DBLCLKS;
        match kind {
            WindowClassKind::Raster => {}
            WindowClassKind::Accelerated => class_style |= CS_OWNDC,
            WindowClassKind::Popup => class_style |= CS_DROPSHADOW | CS_SAVEBITS,
        }

        unsafe {
            let mut existing = WNDCLASSEXW::default();
            if GetClassInfoExW(Some(self.instance), class_name_pcwstr, &mut existing).is_ok() {
                log::debug!("Win32Platform: window class '{class_name}' already registered");
            } else {
                let wc = WNDCLASSEXW {
                    cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                    style: class_style,
                    lpfnWndProc: Some(window_proc_router),
                    cbClsExtra: 0,
                    cbWndExtra: 0,
                    hInstance: self.instance,
                    hIcon: LoadIconW(None, IDI_APPLICATION).unwrap_or_default(),
                    hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                    hbrBackground: HBRUSH::default(),
                    lpszMenuName: PCWSTR::null(),
                    lpszClassName: class_name_pcwstr,
                    hIconSm: HICON::default(),
                };
                if RegisterClassExW(&wc) == 0 {
                    let code = self.record_last_error("RegisterClassExW");
                    return Err(PlatformError::InitializationFailed(format!(
                        "RegisterClassExW for '{class_name}' failed with error {code}"
                    )));
                }
                log::debug!("Win32Platform: window class '{class_name}' registered");
            }
        }

        let name = class_name.to_string();
        self.classes.borrow_mut().insert(kind, class_name);
        Ok(name)
    }

    fn create_window(
        &self,
        request: &NativeCreateRequest,
        context: &mut CreationContext,
    ) -> PlatformResult<NativeHandle> {
        let created = {
            let _guard = InFlightCreationGuard::new(context, self);
            unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE(request.ex_style.bits()),
                    &HSTRING::from(request.class_name.as_str()),
                    &HSTRING::from(request.title.as_str()),
                    WINDOW_STYLE(request.style.bits()),
                    request.x.unwrap_or(CW_USEDEFAULT),
                    request.y.unwrap_or(CW_USEDEFAULT),
                    request.width.unwrap_or(CW_USEDEFAULT),
                    request.height.unwrap_or(CW_USEDEFAULT),
                    request.parent.map(hwnd),
                    None,
                    Some(self.instance),
                    None,
                )
            }
        };
        match created {
            Ok(created) => {
                let handle = native(created);
                // Default placement is only known once the handle exists.
                let frame = self.frame_rect(handle, request.parent.is_some());
                context.record_obtained_frame(frame);
                Ok(handle)
            }
            Err(e) => {
                self.record_last_error("CreateWindowExW");
                log::debug!("Win32Platform: CreateWindowExW error detail {e:?}");
                Ok(NativeHandle::NULL)
            }
        }
    }

    fn destroy_window(&self, handle: NativeHandle) {
        if unsafe { DestroyWindow(hwnd(handle)) }.is_err() {
            self.record_last_error("DestroyWindow");
        }
        self.paint_structs.borrow_mut().remove(&handle);
    }

    fn desktop_window(&self) -> NativeHandle {
        native(unsafe { GetDesktopWindow() })
    }

    fn style(&self, handle: NativeHandle) -> WindowStyle {
        WindowStyle::from_bits_retain(self.window_long(handle, GWL_STYLE))
    }

    fn set_style(&self, handle: NativeHandle, style: WindowStyle) {
        unsafe { SetWindowLongPtrW(hwnd(handle), GWL_STYLE, style.bits() as isize) };
    }

    fn ex_style(&self, handle: NativeHandle) -> ExtendedStyle {
        ExtendedStyle::from_bits_retain(self.window_long(handle, GWL_EXSTYLE))
    }

    fn set_ex_style(&self, handle: NativeHandle, ex_style: ExtendedStyle) {
        unsafe { SetWindowLongPtrW(hwnd(handle), GWL_EXSTYLE, ex_style.bits() as isize) };
    }

    fn move_window(&self, handle: NativeHandle, frame: Rect) -> bool {
        let result =
            unsafe { MoveWindow(hwnd(handle), frame.x, frame.y, frame.width, frame.height, true) };
        if result.is_err() {
            self.record_last_error("MoveWindow");
            return false;
        }
        true
    }

    fn set_window_pos(
        &self,
        handle: NativeHandle,
        z_order: ZOrder,
        frame: Rect,
        flags: PositionFlags,
    ) -> bool {
        let result = unsafe {
            SetWindowPos(
                hwnd(handle),
                insert_after(z_order),
                frame.x,
                frame.y,
                frame.width,
                frame.height,
                SET_WINDOW_POS_FLAGS(flags.bits()),
            )
        };
        if result.is_err() {
            self.record_last_error("SetWindowPos");
            return false;
        }
        true
    }

    fn show_window(&self, handle: NativeHandle, command: ShowCommand) {
        unsafe {
            let _ = ShowWindow(hwnd(handle), show_command(command));
        }
    }

    fn frame_rect(&self, handle: NativeHandle, relative_to_parent: bool) -> Rect {
        let mut rect = RECT::default();
        if unsafe { GetWindowRect(hwnd(handle), &mut rect) }.is_err() {
            self.record_last_error("GetWindowRect");
            return Rect::default();
        }
        if relative_to_parent {
            let parent = unsafe { GetAncestor(hwnd(handle), GA_PARENT) };
            if !parent.is_invalid() && parent != unsafe { GetDesktopWindow() } {
                let mut origin = POINT {
                    x: rect.left,
                    y: rect.top,
                };
                let _ = unsafe { ScreenToClient(parent, &mut origin) };
                return Rect::new(
                    origin.x,
                    origin.y,
                    rect.right - rect.left,
                    rect.bottom - rect.top,
                );
            }
        }
        to_rect(rect)
    }

    fn normal_placement(&self, handle: NativeHandle) -> Option<Rect> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(hwnd(handle), &mut placement) }
            .ok()
            .map(|_| to_rect(placement.rcNormalPosition))
    }

    fn screen_geometry(&self, handle: NativeHandle) -> Rect {
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        let monitor = unsafe { MonitorFromWindow(hwnd(handle), MONITOR_DEFAULTTONEAREST) };
        if unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
            to_rect(info.rcMonitor)
        } else {
            self.record_last_error("GetMonitorInfoW");
            Rect::default()
        }
    }

    fn is_visible(&self, handle: NativeHandle) -> bool {
        unsafe { IsWindowVisible(hwnd(handle)) }.as_bool()
    }

    fn is_iconic(&self, handle: NativeHandle) -> bool {
        unsafe { IsIconic(hwnd(handle)) }.as_bool()
    }

    fn active_window(&self) -> NativeHandle {
        native(unsafe { GetForegroundWindow() })
    }

    fn is_child(&self, parent: NativeHandle, handle: NativeHandle) -> bool {
        unsafe { IsChild(hwnd(parent), hwnd(handle)) }.as_bool()
    }

    fn has_update_rect(&self, handle: NativeHandle) -> bool {
        unsafe { GetUpdateRect(hwnd(handle), None, false) }.as_bool()
    }

    fn invalidate(&self, handle: NativeHandle) {
        unsafe {
            let _ = InvalidateRect(Some(hwnd(handle)), None, false);
        }
    }

    fn begin_paint(&self, handle: NativeHandle) -> PaintSession {
        let mut ps = PAINTSTRUCT::default();
        let dc = unsafe { BeginPaint(hwnd(handle), &mut ps) };
        let session = PaintSession {
            dc: DeviceContext(dc.0 as isize),
            update_rect: to_rect(ps.rcPaint),
        };
        self.paint_structs.borrow_mut().insert(handle, ps);
        session
    }

    fn end_paint(&self, handle: NativeHandle, session: PaintSession) {
        let Some(ps) = self.paint_structs.borrow_mut().remove(&handle) else {
            log::warn!(
                "Win32Platform: paint end for {handle:?} without a paint begin (dc {:?})",
                session.dc
            );
            return;
        };
        unsafe {
            let _ = EndPaint(hwnd(handle), &ps);
        }
    }

    fn get_dc(&self, handle: NativeHandle) -> DeviceContext {
        let dc = unsafe { GetDC(Some(hwnd(handle))) };
        DeviceContext(dc.0 as isize)
    }

    fn release_dc(&self, handle: NativeHandle, dc: DeviceContext) {
        unsafe {
            ReleaseDC(Some(hwnd(handle)), HDC(dc.0 as *mut c_void));
        }
    }

    fn create_rect_region(&self, rect: Rect) -> NativeRegion {
        let region = unsafe { CreateRectRgn(rect.x, rect.y, rect.right(), rect.bottom()) };
        NativeRegion(region.0 as isize)
    }

    fn combine_region(
        &self,
        dest: NativeRegion,
        a: NativeRegion,
        b: NativeRegion,
        mode: RegionCombine,
    ) -> bool {
        let mode = match mode {
            RegionCombine::Or => RGN_OR,
        };
        let result = unsafe { CombineRgn(Some(hrgn(dest)), Some(hrgn(a)), Some(hrgn(b)), mode) };
        result != RGN_ERROR
    }

    fn offset_region(&self, region: NativeRegion, dx: i32, dy: i32) {
        unsafe {
            OffsetRgn(hrgn(region), dx, dy);
        }
    }

    fn delete_region(&self, region: NativeRegion) {
        unsafe {
            let _ = DeleteObject(hrgn(region).into());
        }
    }

    fn set_window_region(&self, handle: NativeHandle, region: Option<NativeRegion>) -> bool {
        let result = unsafe { SetWindowRgn(hwnd(handle), region.map(hrgn), true) };
        if result == 0 {
            self.record_last_error("SetWindowRgn");
            return false;
        }
        true
    }

    fn register_drop_target(&self, handle: NativeHandle) -> bool {
        unsafe { DragAcceptFiles(hwnd(handle), true) };
        true
    }

    fn revoke_drop_target(&self, handle: NativeHandle) {
        unsafe { DragAcceptFiles(hwnd(handle), false) };
    }

    fn set_cursor(&self, cursor: CursorHandle) {
        let cursor = (!cursor.is_null()).then(|| HCURSOR(cursor.0 as *mut c_void));
        unsafe {
            SetCursor(cursor);
        }
    }

    fn set_capture(&self, handle: NativeHandle) {
        unsafe {
            SetCapture(hwnd(handle));
        }
    }

    fn release_capture(&self) {
        if unsafe { ReleaseCapture() }.is_err() {
            self.record_last_error("ReleaseCapture");
        }
    }

    fn set_foreground(&self, handle: NativeHandle) {
        unsafe {
            let _ = SetForegroundWindow(hwnd(handle));
        }
    }

    fn set_focus(&self, handle: NativeHandle) {
        if unsafe { SetFocus(Some(hwnd(handle))) }.is_err() {
            self.record_last_error("SetFocus");
        }
    }

    fn set_parent(&self, handle: NativeHandle, parent: Option<NativeHandle>) -> bool {
        if unsafe { SetParent(hwnd(handle), parent.map(hwnd)) }.is_err() {
            self.record_last_error("SetParent");
            return false;
        }
        true
    }

    fn set_enabled(&self, handle: NativeHandle, enabled: bool) {
        unsafe {
            let _ = EnableWindow(hwnd(handle), enabled);
        }
    }

    fn set_close_menu_item_enabled(&self, handle: NativeHandle, enabled: bool) {
        let flags = if enabled {
            MF_BYCOMMAND | MF_ENABLED
        } else {
            MF_BYCOMMAND | MF_GRAYED
        };
        unsafe {
            let menu = GetSystemMenu(hwnd(handle), false);
            if !menu.is_invalid() {
                let _ = EnableMenuItem(menu, SC_CLOSE, flags);
            }
        }
    }

    fn has_system_menu(&self, handle: NativeHandle) -> bool {
        self.style(handle).contains(WindowStyle::SYS_MENU)
    }

    fn set_layered_opacity(&self, handle: NativeHandle, alpha: Option<u8>) {
        let ex_style = self.ex_style(handle);
        match alpha {
            Some(alpha) => {
                if !ex_style.contains(ExtendedStyle::LAYERED) {
                    self.set_ex_style(handle, ex_style | ExtendedStyle::LAYERED);
                }
                let result = unsafe {
                    SetLayeredWindowAttributes(hwnd(handle), COLORREF(0), alpha, LWA_ALPHA)
                };
                if result.is_err() {
                    self.record_last_error("SetLayeredWindowAttributes");
                }
            }
            None => {
                if ex_style.contains(ExtendedStyle::LAYERED) {
                    self.set_ex_style(handle, ex_style - ExtendedStyle::LAYERED);
                }
            }
        }
    }

    fn set_window_text(&self, handle: NativeHandle, text: &str) {
        if unsafe { SetWindowTextW(hwnd(handle), &HSTRING::from(text)) }.is_err() {
            self.record_last_error("SetWindowTextW");
        }
    }

    fn start_system_resize(&self, handle: NativeHandle, corner: Corner) -> bool {
        let result = unsafe {
            PostMessageW(
                Some(hwnd(handle)),
                WM_SYSCOMMAND,
                WPARAM(system_resize_command(corner)),
                LPARAM(0),
            )
        };
        if result.is_err() {
            self.record_last_error("PostMessageW(WM_SYSCOMMAND)");
            return false;
        }
        true
    }

    fn flash_window(&self, handle: NativeHandle, count: u32, timeout_ms: u32) {
        let info = FLASHWINFO {
            cbSize: std::mem::size_of::<FLASHWINFO>() as u32,
            hwnd: hwnd(handle),
            dwFlags: if count == 0 { FLASHW_STOP } else { FLASHW_TRAY },
            uCount: count,
            dwTimeout: timeout_ms,
        };
        unsafe {
            let _ = FlashWindowEx(&info);
        }
    }

    fn caret_blink_time_ms(&self) -> u32 {
        unsafe { GetCaretBlinkTime() }
    }

    fn create_surface(&self, handle: NativeHandle) -> SurfaceHandle {
        // Class-owned device context of an accelerated window.
        let dc = unsafe { GetDC(Some(hwnd(handle))) };
        SurfaceHandle(dc.0 as isize)
    }

    fn release_surface(&self, handle: NativeHandle, surface: SurfaceHandle) {
        unsafe {
            ReleaseDC(Some(hwnd(handle)), HDC(surface.0 as *mut c_void));
        }
    }

    fn last_error(&self) -> u32 {
        self.last_error.get()
    }
}

fn frame_of(hwnd_value: HWND) -> Option<Rect> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd_value, &mut rect) }
        .ok()
        .map(|_| to_rect(rect))
}

fn read_min_max_info(lparam: LPARAM) -> Option<(*mut MINMAXINFO, MinMaxInfo)> {
    let raw = lparam.0 as *mut MINMAXINFO;
    if raw.is_null() {
        return None;
    }
    let native_info = unsafe { &*raw };
    Some((
        raw,
        MinMaxInfo {
            min_track_size: Size::new(native_info.ptMinTrackSize.x, native_info.ptMinTrackSize.y),
            max_track_size: Size::new(native_info.ptMaxTrackSize.x, native_info.ptMaxTrackSize.y),
        },
    ))
}

fn write_min_max_info(raw: *mut MINMAXINFO, info: MinMaxInfo) {
    let native_info = unsafe { &mut *raw };
    native_info.ptMinTrackSize.x = info.min_track_size.width;
    native_info.ptMinTrackSize.y = info.min_track_size.height;
    native_info.ptMaxTrackSize.x = info.max_track_size.width;
    native_info.ptMaxTrackSize.y = info.max_track_size.height;
}

/*
 * Serves messages for a window whose `CreateWindowExW` has not returned yet.
 * Returns `None` to fall through to default processing.
 */
fn handle_creation_message(
    flight: InFlightCreation,
    hwnd_value: HWND,
    msg: u32,
    lparam: LPARAM,
) -> Option<LRESULT> {
    let context = unsafe { &mut *flight.context };
    let platform = unsafe { &*flight.platform };
    match msg {
        WM_GETMINMAXINFO => {
            let (raw, mut info) = read_min_max_info(lparam)?;
            context.apply_to_min_max_info(platform, &mut info);
            write_min_max_info(raw, info);
            Some(LRESULT(0))
        }
        WM_SIZE | WM_MOVE => {
            if let Some(frame) = frame_of(hwnd_value) {
                context.record_obtained_frame(frame);
            }
            None
        }
        _ => None,
    }
}

/*
 * Result for messages the backend consumes instead of default processing.
 * Default paint handling would validate the update region before the
 * queued paint reaches the window, so paint and background erasing are
 * left to `Window::handle_paint`.
 */
pub(crate) fn consumed_result(msg: u32) -> Option<LRESULT> {
    match msg {
        WM_PAINT | WM_CLOSE => Some(LRESULT(0)),
        WM_ERASEBKGND | WM_SETCURSOR => Some(LRESULT(1)),
        _ => None,
    }
}

fn translate_message(
    context: &ApplicationContext,
    handle: NativeHandle,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> Option<NativeNotification> {
    match msg {
        WM_MOVE => Some(NativeNotification::Moved),
        WM_SIZE => size_kind_from_wparam(wparam).map(NativeNotification::Resized),
        WM_PAINT => Some(NativeNotification::Paint),
        WM_ACTIVATE => Some(NativeNotification::ActivationChanged(
            loword_from_wparam(wparam) != WA_INACTIVE,
        )),
        WM_STYLECHANGED => Some(NativeNotification::StyleChanged),
        WM_SHOWWINDOW => Some(if wparam.0 != 0 {
            NativeNotification::Shown
        } else {
            NativeNotification::Hidden
        }),
        WM_CLOSE => Some(NativeNotification::CloseRequested),
        WM_SETCURSOR if loword_from_wparam(wparam) as usize == HTCLIENT_CODE => {
            Some(NativeNotification::SetCursor)
        }
        WM_MOUSEMOVE => {
            let id = context.window_for_handle(handle);
            if id.is_some() && context.window_under_mouse() != id {
                let mut track = TRACKMOUSEEVENT {
                    cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
                    dwFlags: TME_LEAVE,
                    hwndTrack: hwnd(handle),
                    dwHoverTime: 0,
                };
                let _ = unsafe { TrackMouseEvent(&mut track) };
                Some(NativeNotification::MouseEntered)
            } else {
                None
            }
        }
        WM_MOUSELEAVE => Some(NativeNotification::MouseLeft),
        WM_NCDESTROY => Some(NativeNotification::Destroyed),
        _ => None,
    }
}

/*
 * Window procedure shared by every class registered by `Win32Platform`.
 * Translated notifications are parked in the application context; the
 * native result mirrors what a window that handled the message returns.
 */
unsafe extern "system" fn window_proc_router(
    hwnd_value: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = native(hwnd_value);
    let context = NOTIFICATION_TARGET.with(|target| target.borrow().upgrade());
    let registered = context
        .as_ref()
        .is_some_and(|c| c.window_for_handle(handle).is_some());

    if !registered {
        if let Some(flight) = IN_FLIGHT_CREATION.with(|slot| slot.get()) {
            if let Some(result) = handle_creation_message(flight, hwnd_value, msg, lparam) {
                return result;
            }
        }
        return unsafe { DefWindowProcW(hwnd_value, msg, wparam, lparam) };
    }
    let Some(context) = context else {
        return unsafe { DefWindowProcW(hwnd_value, msg, wparam, lparam) };
    };

    match msg {
        WM_GETMINMAXINFO => {
            if let Some((raw, mut info)) = read_min_max_info(lparam) {
                if context.answer_min_max_info(handle, &mut info) {
                    write_min_max_info(raw, info);
                    return LRESULT(0);
                }
            }
        }
        WM_LBUTTONDOWN | WM_RBUTTONDOWN | WM_MBUTTONDOWN => {
            let mut point = POINT {
                x: x_from_lparam(lparam),
                y: y_from_lparam(lparam),
            };
            let _ = unsafe { ClientToScreen(hwnd_value, &mut point) };
            let timestamp = unsafe { GetMessageTime() } as u32 as u64;
            context.record_mouse_press(Point::new(point.x, point.y), timestamp);
        }
        WM_NCDESTROY => {
            log::debug!("Win32Platform: {handle:?} destroyed by the native side");
        }
        _ => {}
    }

    let queued = match translate_message(&context, handle, msg, wparam, lparam) {
        Some(notification) => {
            log::trace!("Win32Platform: {handle:?} msg 0x{msg:04x} -> {notification:?}");
            context.queue_notification(handle, notification);
            true
        }
        None => false,
    };
    if queued || msg == WM_ERASEBKGND {
        if let Some(result) = consumed_result(msg) {
            return result;
        }
    }
    unsafe { DefWindowProcW(hwnd_value, msg, wparam, lparam) }
}

/*
 * Runs the native message loop until `WM_QUIT`, applying parked
 * notifications after every dispatched message.
 */
pub fn run_event_loop(manager: &mut WindowManager) -> PlatformResult<()> {
    Win32Platform::attach_context(manager.context());
    let mut msg = MSG::default();
    loop {
        let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match status.0 {
            0 => break,
            -1 => {
                let code = unsafe { GetLastError() }.0;
                log::error!("Win32Platform: GetMessageW failed with error {code}");
                return Err(PlatformError::NativeCallFailed {
                    operation: "GetMessageW",
                    code,
                });
            }
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
        manager.process_pending();
    }
    log::debug!("Win32Platform: message loop finished (exit code {})", msg.wParam.0);
    Ok(())
}

/// Asks the message loop of the current thread to finish.
pub fn post_quit() {
    unsafe { PostQuitMessage(0) };
}
