/*
 * Capability interfaces at the seams of the window backend.
 *
 * `NativePlatform` is every outbound call the backend makes into the native
 * windowing system. Exactly one implementation is compiled per target
 * (`window_common::Win32Platform` on Windows); unit tests substitute a
 * recording double. All methods take `&self`: the backend runs on the single
 * thread that owns the native event queue, and implementations use interior
 * mutability where they need state.
 *
 * `WindowEventSink` is the opaque abstract event layer the backend reports to.
 */
use crate::creation_context::CreationContext;
use crate::error::Result as PlatformResult;
use crate::style::{ExtendedStyle, PositionFlags, ShowCommand, WindowStyle, ZOrder};
use crate::types::{
    Corner, CursorHandle, DeviceContext, Margins, NativeHandle, NativeRegion, Rect, Size,
    SurfaceHandle, WindowEvent, WindowId,
};

/// Window class flavors; accelerated surfaces need a class-owned device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowClassKind {
    Raster,
    Accelerated,
    Popup,
}

/// Parameters of a single native creation call. Geometry is frame-adjusted;
/// `None` for a coordinate means "let the native side choose".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCreateRequest {
    pub class_name: String,
    pub title: String,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub parent: Option<NativeHandle>,
}

/// Result of a paint-begin call: the paint-scoped device context and the
/// damaged rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintSession {
    pub dc: DeviceContext,
    pub update_rect: Rect,
}

/// Track-size limits answered to the native min/max-size query, in frame
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinMaxInfo {
    pub min_track_size: Size,
    pub max_track_size: Size,
}

/// Region combination modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCombine {
    Or,
}

pub trait NativePlatform {
    /// Frame insets the native side adds for `style`/`ex_style`.
    fn frame_margins(&self, style: WindowStyle, ex_style: ExtendedStyle)
    -> PlatformResult<Margins>;

    fn register_window_class(&self, kind: WindowClassKind) -> PlatformResult<String>;

    /// Creates the native window. Size queries dispatched synchronously before
    /// the call returns are answered from `context`.
    fn create_window(
        &self,
        request: &NativeCreateRequest,
        context: &mut CreationContext,
    ) -> PlatformResult<NativeHandle>;

    fn destroy_window(&self, handle: NativeHandle);

    fn desktop_window(&self) -> NativeHandle;

    fn style(&self, handle: NativeHandle) -> WindowStyle;
    fn set_style(&self, handle: NativeHandle, style: WindowStyle);
    fn ex_style(&self, handle: NativeHandle) -> ExtendedStyle;
    fn set_ex_style(&self, handle: NativeHandle, ex_style: ExtendedStyle);

    /// Moves/resizes using frame coordinates.
    fn move_window(&self, handle: NativeHandle, frame: Rect) -> bool;
    fn set_window_pos(
        &self,
        handle: NativeHandle,
        z_order: ZOrder,
        frame: Rect,
        flags: PositionFlags,
    ) -> bool;
    fn show_window(&self, handle: NativeHandle, command: ShowCommand);

    /// Frame rectangle in screen coordinates, or relative to the native parent
    /// when `relative_to_parent` is set and a parent exists.
    fn frame_rect(&self, handle: NativeHandle, relative_to_parent: bool) -> Rect;
    /// Restored ("normal") frame position, valid even while minimized.
    fn normal_placement(&self, handle: NativeHandle) -> Option<Rect>;
    /// Geometry of the screen the window lives on.
    fn screen_geometry(&self, handle: NativeHandle) -> Rect;

    fn is_visible(&self, handle: NativeHandle) -> bool;
    fn is_iconic(&self, handle: NativeHandle) -> bool;
    fn active_window(&self) -> NativeHandle;
    fn is_child(&self, parent: NativeHandle, handle: NativeHandle) -> bool;

    fn has_update_rect(&self, handle: NativeHandle) -> bool;
    fn invalidate(&self, handle: NativeHandle);
    fn begin_paint(&self, handle: NativeHandle) -> PaintSession;
    fn end_paint(&self, handle: NativeHandle, session: PaintSession);
    fn get_dc(&self, handle: NativeHandle) -> DeviceContext;
    fn release_dc(&self, handle: NativeHandle, dc: DeviceContext);

    fn create_rect_region(&self, rect: Rect) -> NativeRegion;
    fn combine_region(
        &self,
        dest: NativeRegion,
        a: NativeRegion,
        b: NativeRegion,
        mode: RegionCombine,
    ) -> bool;
    fn offset_region(&self, region: NativeRegion, dx: i32, dy: i32);
    fn delete_region(&self, region: NativeRegion);
    /// Takes ownership of `region` on success.
    fn set_window_region(&self, handle: NativeHandle, region: Option<NativeRegion>) -> bool;

    fn register_drop_target(&self, handle: NativeHandle) -> bool;
    fn revoke_drop_target(&self, handle: NativeHandle);

    fn set_cursor(&self, cursor: CursorHandle);
    fn set_capture(&self, handle: NativeHandle);
    fn release_capture(&self);
    fn set_foreground(&self, handle: NativeHandle);
    fn set_focus(&self, handle: NativeHandle);
    fn set_parent(&self, handle: NativeHandle, parent: Option<NativeHandle>) -> bool;
    fn set_enabled(&self, handle: NativeHandle, enabled: bool);

    fn set_close_menu_item_enabled(&self, handle: NativeHandle, enabled: bool);
    fn has_system_menu(&self, handle: NativeHandle) -> bool;
    /// Applies a layered-window alpha; `None` removes layering.
    fn set_layered_opacity(&self, handle: NativeHandle, alpha: Option<u8>);
    fn set_window_text(&self, handle: NativeHandle, text: &str);
    fn start_system_resize(&self, handle: NativeHandle, corner: Corner) -> bool;
    /// Flashes the taskbar entry; `count == 0` stops flashing.
    fn flash_window(&self, handle: NativeHandle, count: u32, timeout_ms: u32);
    fn caret_blink_time_ms(&self) -> u32;

    fn create_surface(&self, handle: NativeHandle) -> SurfaceHandle;
    fn release_surface(&self, handle: NativeHandle, surface: SurfaceHandle);

    fn last_error(&self) -> u32;
}

/// The abstract event layer. Delivery is synchronous; `synchronous` flags on
/// events tell the consumer whether it may defer processing.
pub trait WindowEventSink {
    fn handle_window_event(&self, window: WindowId, event: WindowEvent);
}
