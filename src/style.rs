/*
 * Native style vocabulary. The bit values match the Win32 `WS_*`/`WS_EX_*`
 * constants so the backend can pass them through unchanged, while the
 * portable state-synchronization logic can reason about them on any target.
 * Also defines the show commands and window-position flags used by the
 * native mutators.
 */
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        const POPUP = 0x8000_0000;
        const CHILD = 0x4000_0000;
        const MINIMIZE = 0x2000_0000;
        const VISIBLE = 0x1000_0000;
        const DISABLED = 0x0800_0000;
        const CLIP_SIBLINGS = 0x0400_0000;
        const CLIP_CHILDREN = 0x0200_0000;
        const MAXIMIZE = 0x0100_0000;
        const BORDER = 0x0080_0000;
        const DLG_FRAME = 0x0040_0000;
        const CAPTION = Self::BORDER.bits() | Self::DLG_FRAME.bits();
        const SYS_MENU = 0x0008_0000;
        const THICK_FRAME = 0x0004_0000;
        const MINIMIZE_BOX = 0x0002_0000;
        const MAXIMIZE_BOX = 0x0001_0000;

        const _ = !0;
    }
}

impl WindowStyle {
    /// The overlapped style has no bits of its own; the frame query rejects
    /// it, so it is masked out before the query anyway.
    pub const OVERLAPPED: WindowStyle = WindowStyle::empty();

    /// Bits owned by the native side that a restyle must carry over.
    pub const PRESERVED_ON_RESTYLE: WindowStyle =
        WindowStyle::DISABLED.union(WindowStyle::VISIBLE);
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExtendedStyle: u32 {
        const DLG_MODAL_FRAME = 0x0000_0001;
        const TOPMOST = 0x0000_0008;
        const TRANSPARENT = 0x0000_0020;
        const TOOL_WINDOW = 0x0000_0080;
        const WINDOW_EDGE = 0x0000_0100;
        const CLIENT_EDGE = 0x0000_0200;
        const CONTEXT_HELP = 0x0000_0400;
        const APP_WINDOW = 0x0004_0000;
        const LAYERED = 0x0008_0000;
        const NO_ACTIVATE = 0x0800_0000;

        const _ = !0;
    }
}

/// Native show commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Hide,
    ShowNormal,
    ShowNoActivate,
    ShowMinimized,
    ShowMinNoActive,
    Minimize,
    ShowMaximized,
    Maximize,
}

/// Z-order placement for `set_window_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Unchanged,
    Top,
    Bottom,
    TopMost,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PositionFlags: u32 {
        const NO_SIZE = 0x0001;
        const NO_MOVE = 0x0002;
        const NO_ZORDER = 0x0004;
        const NO_ACTIVATE = 0x0010;
        const FRAME_CHANGED = 0x0020;
        const HIDE_WINDOW = 0x0080;
        const NO_OWNER_ZORDER = 0x0200;
    }
}

/// Renders a style for log output, naming the decoration bits.
pub(crate) fn describe_style(style: WindowStyle) -> String {
    let parts: Vec<&str> = style.iter_names().map(|(name, _)| name).collect();
    format!("0x{:08x} [{}]", style.bits(), parts.join("|"))
}
