use crate::types::{Rect, SurfaceKind};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaintRoute {
    /// Nothing to repaint; the notification is declined.
    Skip,
    Accelerated { invalidate_first: bool },
    Raster,
}

pub(crate) fn resolve_paint_route(surface: SurfaceKind, has_update_rect: bool) -> PaintRoute {
    if !has_update_rect {
        trace!("[Paint] empty update region; skipping");
        return PaintRoute::Skip;
    }
    match surface {
        // Double-buffered accelerated windows leave stale decorations behind
        // unless the whole client area is invalidated first.
        SurfaceKind::Accelerated { double_buffered } => PaintRoute::Accelerated {
            invalidate_first: double_buffered,
        },
        SurfaceKind::Raster => PaintRoute::Raster,
    }
}

/// Whether a raster paint pass covers the whole window, so its device
/// context can stand in for the window's own for the duration of the pass.
pub(crate) fn covers_whole_window(update_rect: Rect, geometry: Rect) -> bool {
    update_rect.size() == geometry.size()
}
