/*
 * Derivation of native styles from an abstract window description, and the
 * two-phase native creation protocol.
 *
 * Creation runs in three steps:
 *  - `CreationDescriptor::from_descriptor` classifies the window and resolves
 *    style bits and the native parent.
 *  - `begin_create` computes the frame-adjusted geometry into a
 *    `PendingCreation` token; `PendingCreation::finish` performs the native
 *    call, lending the token's `CreationContext` to the platform so that size
 *    queries arriving before the handle exists can be answered.
 *  - `post_creation_fixup` applies z-order, close-menu state and opacity.
 *
 * Restyling an existing window reuses the first and last step with
 * `apply_style_change` in between.
 */
use crate::creation_context::{CreationContext, PlacementPolicy};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::geometry_hint::GeometryHint;
use crate::platform::{NativeCreateRequest, NativePlatform, WindowClassKind};
use crate::style::{ExtendedStyle, PositionFlags, WindowStyle, ZOrder, describe_style};
use crate::types::{BackendConfig, NativeHandle, Rect, WindowDescriptor, WindowFlags, WindowType};
use crate::window::WindowData;

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CreationFlags: u32 {
        /// Derive child styles even if the window has no structural parent.
        const FORCE_CHILD = 0x1;
        /// Derive top-level styles even if a structural parent is recorded.
        const FORCE_TOP_LEVEL = 0x2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationDescriptor {
    pub flags: WindowFlags,
    pub window_type: WindowType,
    pub parent_handle: Option<NativeHandle>,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
    pub accelerated: bool,
    pub top_level: bool,
    pub popup: bool,
    pub dialog: bool,
    pub desktop: bool,
    pub tool: bool,
    pub embedded: bool,
}

/// Outcome of the first creation phase.
#[derive(Debug)]
pub enum CreationOutcome {
    /// The desktop pseudo-window wraps the existing system handle; nothing to create.
    Desktop(WindowData),
    Pending(PendingCreation),
}

/// A native creation that has been prepared but not performed.
#[derive(Debug)]
pub struct PendingCreation {
    request: NativeCreateRequest,
    context: CreationContext,
    flags: WindowFlags,
    embedded: bool,
}

fn should_show_maximize_button(flags: WindowFlags) -> bool {
    if flags.contains(WindowFlags::FIXED_SIZE_DIALOG) {
        return false;
    }
    // An explicit request wins even for windows that look fixed-size.
    if flags.contains(WindowFlags::CUSTOMIZE | WindowFlags::MAXIMIZE_BUTTON) {
        return true;
    }
    flags.contains(WindowFlags::MAXIMIZE_BUTTON)
}

impl CreationDescriptor {
    pub fn from_descriptor(
        descriptor: &WindowDescriptor,
        flags_in: WindowFlags,
        creation_flags: CreationFlags,
    ) -> Self {
        let mut result = Self {
            flags: flags_in,
            window_type: descriptor.window_type,
            parent_handle: None,
            style: WindowStyle::empty(),
            ex_style: ExtendedStyle::empty(),
            accelerated: descriptor.surface.is_accelerated(),
            top_level: false,
            popup: false,
            dialog: false,
            desktop: false,
            tool: false,
            embedded: false,
        };

        // A foreign native parent makes the window a child even without a
        // structural parent.
        if let Some(embedded_parent) = descriptor.embedded_parent {
            result.embedded = true;
            result.parent_handle = Some(embedded_parent);
        }

        result.top_level = if creation_flags.contains(CreationFlags::FORCE_CHILD) || result.embedded
        {
            false
        } else {
            creation_flags.contains(CreationFlags::FORCE_TOP_LEVEL) || descriptor.is_top_level()
        };

        if result.top_level
            && result.window_type == WindowType::Normal
            && result.flags.is_empty()
        {
            log::debug!(
                "CreationDescriptor: top level '{}' requested no decorations, using defaults",
                descriptor.object_name
            );
            result.flags |= WindowFlags::DEFAULT_DECORATIONS;
        }

        match result.window_type {
            WindowType::Dialog => result.dialog = true,
            WindowType::Tool => result.tool = true,
            WindowType::Popup => result.popup = true,
            WindowType::Desktop => result.desktop = true,
            _ => {}
        }
        if result.flags.contains(WindowFlags::FIXED_SIZE_DIALOG) {
            result.dialog = true;
        }

        if result.popup {
            // Popups have no native parent and float above everything.
            result.flags |= WindowFlags::STAYS_ON_TOP;
        } else if !result.embedded {
            result.parent_handle = if result.top_level {
                descriptor.transient_parent
            } else {
                descriptor.parent
            };
        }

        result.resolve_styles(flags_in);
        log::debug!(
            "CreationDescriptor: {:?} flags={:?} top_level={} popup={} dialog={} tool={} desktop={} embedded={} style={} ex=0x{:08x} parent={:?}",
            result.window_type,
            result.flags,
            result.top_level,
            result.popup,
            result.dialog,
            result.tool,
            result.desktop,
            result.embedded,
            describe_style(result.style),
            result.ex_style.bits(),
            result.parent_handle
        );
        result
    }

    fn resolve_styles(&mut self, flags_in: WindowFlags) {
        let flags = self.flags;
        if self.desktop {
            self.style = WindowStyle::empty();
            self.ex_style = ExtendedStyle::empty();
            return;
        }

        self.style = if self.popup
            || matches!(
                self.window_type,
                WindowType::ToolTip | WindowType::SplashScreen
            ) {
            WindowStyle::POPUP
        } else if self.top_level {
            if flags.contains(WindowFlags::FRAMELESS) {
                WindowStyle::POPUP
            } else {
                // Titled windows start overlapped (no bits); untitled ones bare.
                WindowStyle::OVERLAPPED
            }
        } else {
            WindowStyle::CHILD
        };

        self.style |= WindowStyle::CLIP_SIBLINGS | WindowStyle::CLIP_CHILDREN;
        if !self.top_level {
            return;
        }

        if self.window_type == WindowType::Normal || self.dialog || self.tool {
            if !flags.contains(WindowFlags::FRAMELESS) {
                self.style |= WindowStyle::POPUP;
                if flags.contains(WindowFlags::FIXED_SIZE_DIALOG) {
                    self.style |= WindowStyle::DLG_FRAME;
                } else {
                    self.style |= WindowStyle::THICK_FRAME;
                }
                if flags.contains(WindowFlags::TITLE) {
                    self.style |= WindowStyle::CAPTION;
                }
            }
            if flags.contains(WindowFlags::SYSTEM_MENU) {
                self.style |= WindowStyle::SYS_MENU;
            }
            if flags.contains(WindowFlags::MINIMIZE_BUTTON) {
                self.style |= WindowStyle::MINIMIZE_BOX;
            }
            if should_show_maximize_button(flags) {
                self.style |= WindowStyle::MAXIMIZE_BOX;
            }
            if self.tool {
                self.ex_style |= ExtendedStyle::TOOL_WINDOW;
            }
            if flags.contains(WindowFlags::CONTEXT_HELP) {
                self.ex_style |= ExtendedStyle::CONTEXT_HELP;
            }
        } else {
            self.ex_style |= ExtendedStyle::TOOL_WINDOW;
        }

        // Mouse input falls through layered + transparent windows.
        if flags_in.contains(WindowFlags::TRANSPARENT_FOR_INPUT) {
            self.ex_style |= ExtendedStyle::LAYERED | ExtendedStyle::TRANSPARENT;
        }
    }

    fn class_kind(&self) -> WindowClassKind {
        if self.accelerated {
            WindowClassKind::Accelerated
        } else if self.popup || self.window_type == WindowType::ToolTip {
            WindowClassKind::Popup
        } else {
            WindowClassKind::Raster
        }
    }

    /*
     * First creation phase. Resolves the window class and the default title,
     * and precomputes the frame-adjusted geometry. The desktop pseudo-window
     * is answered immediately with the existing system handle.
     */
    pub fn begin_create(
        &self,
        platform: &dyn NativePlatform,
        config: &BackendConfig,
        descriptor: &WindowDescriptor,
        geometry: Rect,
        title: &str,
    ) -> PlatformResult<CreationOutcome> {
        if self.desktop {
            let handle = platform.desktop_window();
            log::debug!("CreationDescriptor: wrapping desktop window {handle:?}");
            return Ok(CreationOutcome::Desktop(WindowData {
                handle,
                flags: self.flags,
                geometry: platform.frame_rect(handle, false),
                frame: Default::default(),
                embedded: false,
            }));
        }

        let class_name = platform.register_window_class(self.class_kind())?;

        let title = if title.is_empty() && self.flags.contains(WindowFlags::TITLE) {
            if self.top_level {
                config.application_name.clone()
            } else {
                descriptor.object_name.clone()
            }
        } else {
            title.to_string()
        };

        let context = CreationContext::new(
            platform,
            GeometryHint::from_descriptor(descriptor),
            PlacementPolicy {
                top_level: descriptor.is_top_level(),
                position_includes_frame: GeometryHint::position_includes_frame(descriptor),
                origin_means_default: config.default_placement_for_origin,
                enforce_title_bar_floor: config.enforce_title_bar_min_track_height,
            },
            geometry,
            self.style,
            self.ex_style,
        );

        let request = NativeCreateRequest {
            class_name,
            title,
            style: self.style,
            ex_style: self.ex_style,
            x: context.frame_x,
            y: context.frame_y,
            width: context.frame_width,
            height: context.frame_height,
            parent: self.parent_handle,
        };

        Ok(CreationOutcome::Pending(PendingCreation {
            request,
            context,
            flags: self.flags,
            embedded: self.embedded,
        }))
    }

    /// Replaces style bits on an existing handle, keeping its enabled/visible bits.
    pub fn apply_style_change(&self, platform: &dyn NativePlatform, handle: NativeHandle) {
        let old_style = platform.style(handle);
        let old_ex_style = platform.ex_style(handle);

        let new_style = self.style | (old_style & WindowStyle::PRESERVED_ON_RESTYLE);
        if old_style != new_style {
            platform.set_style(handle, new_style);
        }
        if old_ex_style != self.ex_style {
            platform.set_ex_style(handle, self.ex_style);
        }
        log::debug!(
            "CreationDescriptor: restyled {handle:?} from {} to {}, ex 0x{:08x} -> 0x{:08x}",
            describe_style(old_style),
            describe_style(new_style),
            old_ex_style.bits(),
            self.ex_style.bits()
        );
    }

    /*
     * Post-creation decoration fixups. Top levels get their topmost/bottom
     * placement, close-menu state and opacity; children are raised among
     * their siblings. Z-order changes never activate the window.
     */
    pub fn post_creation_fixup(
        &self,
        platform: &dyn NativePlatform,
        handle: NativeHandle,
        frame_change: bool,
        opacity: f64,
    ) {
        if self.desktop || handle.is_null() {
            return;
        }
        let mut position_flags =
            PositionFlags::NO_MOVE | PositionFlags::NO_SIZE | PositionFlags::NO_ACTIVATE;
        if frame_change {
            position_flags |= PositionFlags::FRAME_CHANGED;
        }

        if !self.top_level {
            platform.set_window_pos(handle, ZOrder::Top, Rect::default(), position_flags);
            return;
        }

        if self.flags.contains(WindowFlags::STAYS_ON_TOP) || self.window_type == WindowType::ToolTip
        {
            platform.set_window_pos(handle, ZOrder::TopMost, Rect::default(), position_flags);
            if self.flags.contains(WindowFlags::STAYS_ON_BOTTOM) {
                log::warn!(
                    "CreationDescriptor: incompatible flags on {handle:?}: a window cannot stay on top and on bottom; staying on top"
                );
            }
        } else if self.flags.contains(WindowFlags::STAYS_ON_BOTTOM) {
            platform.set_window_pos(handle, ZOrder::Bottom, Rect::default(), position_flags);
        } else if frame_change {
            // Forces the native side to recompute the non-client area.
            platform.set_window_pos(
                handle,
                ZOrder::Unchanged,
                Rect::default(),
                position_flags | PositionFlags::NO_ZORDER,
            );
        }

        if self.flags.intersects(WindowFlags::CUSTOMIZE | WindowFlags::TITLE) {
            platform.set_close_menu_item_enabled(
                handle,
                self.flags.contains(WindowFlags::CLOSE_BUTTON),
            );
        }

        apply_window_opacity(platform, handle, self.flags, opacity);
    }
}

impl PendingCreation {
    pub fn request(&self) -> &NativeCreateRequest {
        &self.request
    }

    pub fn context(&self) -> &CreationContext {
        &self.context
    }

    /// Second creation phase. A failure is terminal for this attempt.
    pub fn finish(mut self, platform: &dyn NativePlatform) -> PlatformResult<WindowData> {
        log::debug!(
            "PendingCreation: creating '{}' class={} style={} frame {:?}x{:?}+{:?}+{:?}",
            self.request.title,
            self.request.class_name,
            describe_style(self.request.style),
            self.request.width,
            self.request.height,
            self.request.x,
            self.request.y
        );

        let handle = match platform.create_window(&self.request, &mut self.context) {
            Ok(handle) if !handle.is_null() => handle,
            Ok(_) => {
                let code = platform.last_error();
                log::error!(
                    "PendingCreation: native creation of '{}' returned no handle (error {code})",
                    self.request.title
                );
                return Err(PlatformError::NativeCallFailed {
                    operation: "CreateWindowEx",
                    code,
                });
            }
            Err(err) => {
                log::error!(
                    "PendingCreation: native creation of '{}' failed: {err}",
                    self.request.title
                );
                return Err(err);
            }
        };

        log::debug!(
            "PendingCreation: created {handle:?}, obtained geometry {:?} margins {:?}",
            self.context.obtained_geometry,
            self.context.margins
        );
        Ok(WindowData {
            handle,
            flags: self.flags,
            geometry: self.context.obtained_geometry,
            frame: self.context.margins,
            embedded: self.embedded,
        })
    }
}

/// Applies `level` in [0, 1] as layered-window alpha; fully opaque windows
/// drop layering unless they must stay transparent for input.
pub(crate) fn apply_window_opacity(
    platform: &dyn NativePlatform,
    handle: NativeHandle,
    flags: WindowFlags,
    level: f64,
) {
    let level = level.clamp(0.0, 1.0);
    let is_opaque = level >= 1.0 && !flags.contains(WindowFlags::TRANSPARENT_FOR_INPUT);
    if is_opaque {
        platform.set_layered_opacity(handle, None);
    } else {
        platform.set_layered_opacity(handle, Some((255.0 * level).round() as u8));
    }
}
