/*
 * Platform-agnostic types shared by the window backend and the popup
 * coordinator: geometry primitives, identifiers, opaque native handles,
 * window flags and states, the per-window descriptor, and the event
 * vocabulary exchanged with the native layer and the abstract event sink.
 *
 * Nothing here touches the native API, so this module is available on every
 * target and carries most of the unit-testable logic's inputs.
 */
use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Rectangle stored as origin plus extent. A rectangle with a non-positive
/// width or height is "invalid" and means "no geometry requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Grows the rectangle outward by `margins` (content rect -> frame rect).
    pub fn expanded_by(&self, margins: Margins) -> Rect {
        Rect::new(
            self.x - margins.left,
            self.y - margins.top,
            self.width + margins.left + margins.right,
            self.height + margins.top + margins.bottom,
        )
    }

    /// Shrinks the rectangle inward by `margins` (frame rect -> content rect).
    pub fn shrunk_by(&self, margins: Margins) -> Rect {
        Rect::new(
            self.x + margins.left,
            self.y + margins.top,
            self.width - margins.left - margins.right,
            self.height - margins.top - margins.bottom,
        )
    }

    pub fn united(&self, other: &Rect) -> Rect {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

/// Native decoration insets around a window's content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// A set of rectangles in content coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.add_rect(rect);
        region
    }

    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_valid() {
            self.rects.push(rect);
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn bounding_rect(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::default(), |acc, rect| acc.united(rect))
    }
}

/// Logical identifier of a window, independent of its native handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub usize);

/// Identifier of a widget in the abstract widget layer (popups, focus widgets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub usize);

macro_rules! native_handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub isize);

        impl $name {
            pub const NULL: $name = $name(0);

            pub fn is_null(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

native_handle_type!(
    /// Opaque native window handle. Zero means "none" or "destroyed".
    NativeHandle
);
native_handle_type!(
    /// Opaque native device-context handle.
    DeviceContext
);
native_handle_type!(
    /// Opaque native region handle.
    NativeRegion
);
native_handle_type!(
    /// Opaque native cursor handle.
    CursorHandle
);
native_handle_type!(
    /// Opaque accelerated-surface handle handed to the GL side channel.
    SurfaceHandle
);

/// Kind of window requested by the abstract layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    Popup,
    Tool,
    Desktop,
    ToolTip,
    SplashScreen,
    SubWindow,
}

bitflags! {
    /// Decoration and behavior hints requested for a window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        const FRAMELESS = 1 << 0;
        const TITLE = 1 << 1;
        const SYSTEM_MENU = 1 << 2;
        const MINIMIZE_BUTTON = 1 << 3;
        const MAXIMIZE_BUTTON = 1 << 4;
        const CLOSE_BUTTON = 1 << 5;
        const CONTEXT_HELP = 1 << 6;
        const STAYS_ON_TOP = 1 << 7;
        const STAYS_ON_BOTTOM = 1 << 8;
        const TRANSPARENT_FOR_INPUT = 1 << 9;
        const FIXED_SIZE_DIALOG = 1 << 10;
        const CUSTOMIZE = 1 << 11;

        const MIN_MAX_BUTTONS = Self::MINIMIZE_BUTTON.bits() | Self::MAXIMIZE_BUTTON.bits();
        const DEFAULT_DECORATIONS = Self::TITLE.bits()
            | Self::SYSTEM_MENU.bits()
            | Self::MINIMIZE_BUTTON.bits()
            | Self::MAXIMIZE_BUTTON.bits()
            | Self::CLOSE_BUTTON.bits();
    }
}

bitflags! {
    /// Window state bit-set. `ACTIVE` is overlaid on the other states and is
    /// derived from the native foreground window, never set by clients.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowState: u8 {
        const MINIMIZED = 1 << 0;
        const MAXIMIZED = 1 << 1;
        const FULL_SCREEN = 1 << 2;
        const ACTIVE = 1 << 3;
    }
}

impl WindowState {
    pub const NORMAL: WindowState = WindowState::empty();

    /// The state without the overlaid `ACTIVE` bit.
    pub fn without_active(self) -> WindowState {
        self - WindowState::ACTIVE
    }
}

/// Whether client-supplied positions refer to the content or the frame origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionPolicy {
    #[default]
    ContentOrigin,
    FrameInclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Raster,
    Accelerated { double_buffered: bool },
}

impl SurfaceKind {
    pub fn is_accelerated(&self) -> bool {
        matches!(self, SurfaceKind::Accelerated { .. })
    }
}

/// Maximum native window extent; sizes at or above this are "unbounded".
pub const WINDOW_SIZE_MAX: i32 = (1 << 24) - 1;

/// Abstract description of a window requested by the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub window_type: WindowType,
    pub flags: WindowFlags,
    pub geometry: Rect,
    pub minimum_size: Size,
    pub maximum_size: Size,
    pub position_policy: PositionPolicy,
    pub surface: SurfaceKind,
    /// Structural parent. `None` makes the window a top level.
    pub parent: Option<NativeHandle>,
    pub transient_parent: Option<NativeHandle>,
    /// Foreign native parent for windows embedded into another process's UI.
    pub embedded_parent: Option<NativeHandle>,
    pub object_name: String,
    pub title: String,
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self {
            window_type: WindowType::Normal,
            flags: WindowFlags::DEFAULT_DECORATIONS,
            geometry: Rect::default(),
            minimum_size: Size::new(0, 0),
            maximum_size: Size::new(WINDOW_SIZE_MAX, WINDOW_SIZE_MAX),
            position_policy: PositionPolicy::ContentOrigin,
            surface: SurfaceKind::Raster,
            parent: None,
            transient_parent: None,
            embedded_parent: None,
            object_name: String::new(),
            title: String::new(),
        }
    }
}

impl WindowDescriptor {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// Discriminator carried by native resize notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
    MaxShow,
    MaxHide,
}

/// Inbound notifications from the native event layer, keyed by handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeNotification {
    Moved,
    Resized(SizeKind),
    Paint,
    ActivationChanged(bool),
    StyleChanged,
    Shown,
    Hidden,
    CloseRequested,
    SetCursor,
    MouseEntered,
    MouseLeft,
    /// The native window went away without a destroy request from this side.
    Destroyed,
}

/// Outbound events delivered to the abstract event layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Expose { region: Region, synchronous: bool },
    GeometryChanged { geometry: Rect, synchronous: bool },
    StateChanged(WindowState),
    ActivationChanged(bool),
    Shown,
    Hidden,
    CloseRequested,
}

/// Requests from the toolkit to a window, executed by `command_executor`.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    SetVisible { window: WindowId, visible: bool },
    SetGeometry { window: WindowId, geometry: Rect },
    SetState { window: WindowId, state: WindowState },
    SetFlags { window: WindowId, flags: WindowFlags },
    SetTitle { window: WindowId, title: String },
    Raise { window: WindowId },
    Lower { window: WindowId },
    SetMask { window: WindowId, region: Region },
    SetCursor { window: WindowId, cursor: CursorHandle },
    SetKeyboardGrab { window: WindowId, grab: bool },
    SetMouseGrab { window: WindowId, grab: bool },
    SetParent { window: WindowId, parent: Option<NativeHandle> },
    SetOpacity { window: WindowId, level: f64 },
    RequestActivate { window: WindowId },
    Destroy { window: WindowId },
}

/// Corner grabbed when starting a native resize loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Backend-wide configuration, fixed at application start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Default title for titled top levels and prefix for window class names.
    pub application_name: String,
    /// Amount the recorded press timestamp is rewound when a popup close
    /// schedules the press for replay, so it is not read as a double click.
    pub double_click_debounce_ms: u64,
    /// Treat a requested origin of (0,0) on a top level as "use default placement".
    pub default_placement_for_origin: bool,
    /// Enforce the native 112 px floor on the maximum track height of titled windows.
    pub enforce_title_bar_min_track_height: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            application_name: "nativeframe".to_string(),
            double_click_debounce_ms: 10_000,
            default_placement_for_origin: true,
            enforce_title_bar_min_track_height: true,
        }
    }
}
