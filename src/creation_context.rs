/*
 * State that only exists while one native creation call is in flight.
 *
 * The native side dispatches size queries before the creation call returns
 * the handle, i.e. before any `Window` exists to answer them. The context
 * carries the precomputed, frame-adjusted geometry those queries need and
 * collects the geometry the native side actually settled on. It is owned by
 * a `PendingCreation` token and lent to the platform for exactly one call.
 */
use crate::geometry_hint::GeometryHint;
use crate::platform::{MinMaxInfo, NativePlatform};
use crate::style::{ExtendedStyle, WindowStyle};
use crate::types::{Margins, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationContext {
    pub geometry_hint: GeometryHint,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
    pub requested_geometry: Rect,
    pub obtained_geometry: Rect,
    pub margins: Margins,
    /// Frame-adjusted creation geometry; `None` lets the native side choose.
    pub frame_x: Option<i32>,
    pub frame_y: Option<i32>,
    pub frame_width: Option<i32>,
    pub frame_height: Option<i32>,
    enforce_title_bar_floor: bool,
}

/// Inputs of the frame adjustment that come from the window descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    pub top_level: bool,
    pub position_includes_frame: bool,
    pub origin_means_default: bool,
    pub enforce_title_bar_floor: bool,
}

impl CreationContext {
    pub fn new(
        platform: &dyn NativePlatform,
        geometry_hint: GeometryHint,
        placement: PlacementPolicy,
        geometry: Rect,
        style: WindowStyle,
        ex_style: ExtendedStyle,
    ) -> Self {
        let margins = GeometryHint::frame(platform, style, ex_style);
        let mut context = Self {
            geometry_hint,
            style,
            ex_style,
            requested_geometry: geometry,
            obtained_geometry: geometry,
            margins,
            frame_x: None,
            frame_y: None,
            frame_width: None,
            frame_height: None,
            enforce_title_bar_floor: placement.enforce_title_bar_floor,
        };

        // Geometry of top levels excludes the frame; (0,0) on a top level
        // stands for "no position requested".
        if geometry.is_valid() {
            let mut x = geometry.x;
            let mut y = geometry.y;
            let is_default_position =
                placement.origin_means_default && x == 0 && y == 0 && placement.top_level;
            if !placement.position_includes_frame && !is_default_position {
                x -= margins.left;
                y -= margins.top;
            }
            context.frame_x = Some(x);
            context.frame_y = Some(y);
            context.frame_width = Some(margins.left + geometry.width + margins.right);
            context.frame_height = Some(margins.top + geometry.height + margins.bottom);
        }

        log::debug!(
            "CreationContext: requested {geometry:?} margins {margins:?} -> frame {:?}x{:?}+{:?}+{:?} (pos incl. frame: {})",
            context.frame_width,
            context.frame_height,
            context.frame_x,
            context.frame_y,
            placement.position_includes_frame
        );
        context
    }

    /// Answers the native min/max-size query issued during creation.
    pub fn apply_to_min_max_info(&self, platform: &dyn NativePlatform, info: &mut MinMaxInfo) {
        self.geometry_hint.apply_to_min_max_info(
            platform,
            self.style,
            self.ex_style,
            self.enforce_title_bar_floor,
            info,
        );
    }

    /// Records the content geometry reported by an early native size notification.
    pub fn record_obtained_geometry(&mut self, geometry: Rect) {
        log::trace!(
            "CreationContext: obtained geometry {geometry:?} (requested {:?})",
            self.requested_geometry
        );
        self.obtained_geometry = geometry;
    }

    /// Records a frame rectangle reported during creation, converting it to content coordinates.
    pub fn record_obtained_frame(&mut self, frame: Rect) {
        self.record_obtained_geometry(frame.shrunk_by(self.margins));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPlatform;
    use crate::types::Size;

    fn hint() -> GeometryHint {
        GeometryHint {
            minimum_size: Size::new(0, 0),
            maximum_size: Size::new(crate::types::WINDOW_SIZE_MAX, crate::types::WINDOW_SIZE_MAX),
        }
    }

    fn placement(top_level: bool, includes_frame: bool) -> PlacementPolicy {
        PlacementPolicy {
            top_level,
            position_includes_frame: includes_frame,
            origin_means_default: true,
            enforce_title_bar_floor: true,
        }
    }

    fn framed_style() -> WindowStyle {
        WindowStyle::POPUP | WindowStyle::CAPTION | WindowStyle::THICK_FRAME
    }

    #[test]
    fn content_position_is_shifted_outward_by_frame() {
        let platform = RecordingPlatform::new();
        let ctx = CreationContext::new(
            &platform,
            hint(),
            placement(true, false),
            Rect::new(100, 200, 640, 480),
            framed_style(),
            ExtendedStyle::empty(),
        );
        let m = ctx.margins;
        assert!(m.top > 0);
        assert_eq!(ctx.frame_x, Some(100 - m.left));
        assert_eq!(ctx.frame_y, Some(200 - m.top));
        assert_eq!(ctx.frame_width, Some(640 + m.horizontal()));
        assert_eq!(ctx.frame_height, Some(480 + m.vertical()));
        assert_eq!(ctx.obtained_geometry, Rect::new(100, 200, 640, 480));
    }

    #[test]
    fn frame_inclusive_position_is_not_shifted() {
        let platform = RecordingPlatform::new();
        let ctx = CreationContext::new(
            &platform,
            hint(),
            placement(true, true),
            Rect::new(100, 200, 640, 480),
            framed_style(),
            ExtendedStyle::empty(),
        );
        assert_eq!(ctx.frame_x, Some(100));
        assert_eq!(ctx.frame_y, Some(200));
    }

    #[test]
    fn origin_on_top_level_means_default_placement() {
        let platform = RecordingPlatform::new();
        let ctx = CreationContext::new(
            &platform,
            hint(),
            placement(true, false),
            Rect::new(0, 0, 640, 480),
            framed_style(),
            ExtendedStyle::empty(),
        );
        assert_eq!(ctx.frame_x, Some(0));
        assert_eq!(ctx.frame_y, Some(0));

        let child = CreationContext::new(
            &platform,
            hint(),
            placement(false, false),
            Rect::new(0, 0, 640, 480),
            framed_style(),
            ExtendedStyle::empty(),
        );
        assert_eq!(child.frame_x, Some(-child.margins.left));
    }

    #[test]
    fn invalid_geometry_leaves_native_defaults() {
        let platform = RecordingPlatform::new();
        let ctx = CreationContext::new(
            &platform,
            hint(),
            placement(true, false),
            Rect::default(),
            framed_style(),
            ExtendedStyle::empty(),
        );
        assert_eq!(ctx.frame_x, None);
        assert_eq!(ctx.frame_width, None);
    }

    #[test]
    fn recorded_frame_is_converted_to_content() {
        let platform = RecordingPlatform::new();
        let mut ctx = CreationContext::new(
            &platform,
            hint(),
            placement(true, false),
            Rect::new(10, 10, 100, 100),
            framed_style(),
            ExtendedStyle::empty(),
        );
        let frame = Rect::new(50, 60, 300, 200);
        ctx.record_obtained_frame(frame);
        assert_eq!(ctx.obtained_geometry, frame.shrunk_by(ctx.margins));
    }
}
