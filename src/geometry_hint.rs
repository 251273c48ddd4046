/*
 * Geometry constraints for a window: min/max content sizes, validation of a
 * candidate size, and translation into the native min/max track-size answer.
 * Also hosts the frame-margin query used by creation and by the cached frame
 * recomputation in `Window`.
 */
use crate::platform::{MinMaxInfo, NativePlatform};
use crate::style::{ExtendedStyle, WindowStyle};
use crate::types::{Margins, PositionPolicy, Size, WINDOW_SIZE_MAX, WindowDescriptor};

/// Native lower bound on the maximum track height of titled windows.
const TITLE_BAR_MIN_TRACK_HEIGHT: i32 = 112;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryHint {
    pub minimum_size: Size,
    pub maximum_size: Size,
}

impl GeometryHint {
    pub fn from_descriptor(descriptor: &WindowDescriptor) -> Self {
        Self {
            minimum_size: descriptor.minimum_size,
            maximum_size: descriptor.maximum_size,
        }
    }

    pub fn valid_size(&self, size: Size) -> bool {
        size.width >= self.minimum_size.width
            && size.width <= self.maximum_size.width
            && size.height >= self.minimum_size.height
            && size.height <= self.maximum_size.height
    }

    /*
     * Queries the frame insets for a style combination. A failed query is
     * logged and yields empty margins so geometry math degrades to
     * "content == frame" instead of aborting.
     */
    pub fn frame(
        platform: &dyn NativePlatform,
        style: WindowStyle,
        ex_style: ExtendedStyle,
    ) -> Margins {
        let style = style.difference(WindowStyle::OVERLAPPED);
        match platform.frame_margins(style, ex_style) {
            Ok(margins) => {
                log::trace!(
                    "GeometryHint: frame for style={} ex=0x{:08x} -> {margins:?}",
                    crate::style::describe_style(style),
                    ex_style.bits()
                );
                margins
            }
            Err(err) => {
                log::error!("GeometryHint: frame margin query failed: {err}");
                Margins::default()
            }
        }
    }

    /// Fills the track-size limits of `info`, adding the frame for the given styles.
    pub fn apply_to_min_max_info(
        &self,
        platform: &dyn NativePlatform,
        style: WindowStyle,
        ex_style: ExtendedStyle,
        enforce_title_bar_floor: bool,
        info: &mut MinMaxInfo,
    ) {
        let margins = Self::frame(platform, style, ex_style);
        let frame_width = margins.horizontal();
        let frame_height = margins.vertical();
        if self.minimum_size.width > 0 {
            info.min_track_size.width = self.minimum_size.width + frame_width;
        }
        if self.minimum_size.height > 0 {
            info.min_track_size.height = self.minimum_size.height + frame_height;
        }

        let maximum_width = self.maximum_size.width.max(self.minimum_size.width);
        let maximum_height = self.maximum_size.height.max(self.minimum_size.height);
        if maximum_width < WINDOW_SIZE_MAX {
            info.max_track_size.width = maximum_width + frame_width;
        }
        if maximum_height < WINDOW_SIZE_MAX {
            let height = maximum_height + frame_height;
            info.max_track_size.height = if enforce_title_bar_floor {
                height.max(TITLE_BAR_MIN_TRACK_HEIGHT)
            } else {
                height
            };
        }
        log::trace!(
            "GeometryHint: min={:?} max={:?} frame={margins:?} -> {info:?}",
            self.minimum_size,
            self.maximum_size
        );
    }

    pub fn position_includes_frame(descriptor: &WindowDescriptor) -> bool {
        descriptor.position_policy == PositionPolicy::FrameInclusive
    }
}
