/*
 * Popup stack and grab coordination.
 *
 * Popups (menus, combo drop-downs, tooltips with focus) are tracked in open
 * order. The first popup takes the keyboard and mouse grab on behalf of the
 * whole stack; closing the last one hands the grab back to whoever held it
 * before and decides whether the mouse press that dismissed the popup should
 * be replayed to the window underneath.
 *
 * The widget layer is reached through `PopupEnvironment`, which exposes the
 * grab primitives (`steal_*_grab`, acting on the native window of a widget
 * without touching the explicit grabber) and the focus bookkeeping.
 */
use crate::app_context::ApplicationContext;
use crate::types::WidgetId;

use std::rc::Rc;

/// The widget-layer operations the popup coordinator drives.
pub trait PopupEnvironment {
    /// Grabs or releases the keyboard on the native window of `widget`.
    fn steal_keyboard_grab(&self, widget: WidgetId, grab: bool) -> bool;
    /// Grabs or releases the mouse on the native window of `widget`.
    fn steal_mouse_grab(&self, widget: WidgetId, grab: bool) -> bool;

    /// Widget holding an explicit keyboard grab, independent of popups.
    fn keyboard_grabber(&self) -> Option<WidgetId>;
    /// Widget holding an explicit mouse grab, independent of popups.
    fn mouse_grabber(&self) -> Option<WidgetId>;

    /// Screen geometry of a popup.
    fn popup_geometry(&self, popup: WidgetId) -> crate::types::Rect;
    /// Whether the popup asked for dismissing presses never to be replayed.
    fn suppresses_mouse_replay(&self, popup: WidgetId) -> bool;
    /// Top-level window containing `widget`.
    fn window_of(&self, widget: WidgetId) -> WidgetId;

    /// Focused descendant of `widget`, if any.
    fn focus_widget_of(&self, widget: WidgetId) -> Option<WidgetId>;
    fn application_focus_widget(&self) -> Option<WidgetId>;
    /// Focused descendant of the active window.
    fn active_window_focus_widget(&self) -> Option<WidgetId>;
    fn set_focus(&self, widget: WidgetId);
    fn send_focus_in(&self, widget: WidgetId);
    fn send_focus_out(&self, widget: WidgetId);
    fn set_active_window(&self, window: Option<WidgetId>);
}

#[derive(Debug)]
pub struct PopupStack {
    context: Rc<ApplicationContext>,
    popups: Vec<WidgetId>,
    popup_grab_ok: bool,
    auto_grabber: Option<WidgetId>,
    button_down: Option<WidgetId>,
    popup_down: Option<WidgetId>,
    replay_mouse_press: bool,
    open_popup_count: usize,
}

impl PopupStack {
    pub fn new(context: Rc<ApplicationContext>) -> Self {
        Self {
            context,
            popups: Vec::new(),
            popup_grab_ok: false,
            auto_grabber: None,
            button_down: None,
            popup_down: None,
            replay_mouse_press: false,
            open_popup_count: 0,
        }
    }

    pub fn in_popup_mode(&self) -> bool {
        !self.popups.is_empty()
    }

    /// The topmost popup.
    pub fn active_popup(&self) -> Option<WidgetId> {
        self.popups.last().copied()
    }

    pub fn popups(&self) -> &[WidgetId] {
        &self.popups
    }

    pub fn has_popup_grab(&self) -> bool {
        self.popup_grab_ok
    }

    pub fn auto_grabber(&self) -> Option<WidgetId> {
        self.auto_grabber
    }

    /// Number of popups opened over the lifetime of the stack.
    pub fn open_popup_count(&self) -> usize {
        self.open_popup_count
    }

    /// Records the widget a button went down on and, if it happened inside a
    /// popup, that popup.
    pub fn set_button_down(&mut self, widget: Option<WidgetId>, popup: Option<WidgetId>) {
        self.button_down = widget;
        self.popup_down = popup;
    }

    pub fn button_down(&self) -> Option<WidgetId> {
        self.button_down
    }

    /// Whether the press that closed the last popup must be replayed. Reading
    /// the request clears it.
    pub fn take_replay_request(&mut self) -> bool {
        std::mem::take(&mut self.replay_mouse_press)
    }

    pub fn open(&mut self, env: &dyn PopupEnvironment, popup: WidgetId) {
        self.open_popup_count += 1;
        self.popups.push(popup);
        log::debug!("[Popup] opened {popup:?}, depth {}", self.popups.len());

        if self.popups.len() == 1 {
            self.grab_for_popup(env, popup);
        }

        // The first popup grabbed the keyboard, so focus moves by hand.
        if let Some(focus) = env.focus_widget_of(popup) {
            env.set_focus(focus);
        } else if self.popups.len() == 1 {
            if let Some(focus) = env.application_focus_widget() {
                env.send_focus_out(focus);
            }
        }
    }

    pub fn close(&mut self, env: &dyn PopupEnvironment, popup: WidgetId) {
        if self.popups.is_empty() {
            return;
        }
        self.popups.retain(|p| *p != popup);
        log::debug!("[Popup] closed {popup:?}, depth {}", self.popups.len());

        if self.popup_down == Some(popup) {
            self.button_down = None;
            self.popup_down = None;
        }

        if let Some(&top) = self.popups.last() {
            if let Some(focus) = env.focus_widget_of(top) {
                env.set_focus(focus);
            }
            if self.popups.len() == 1 {
                self.grab_for_popup(env, top);
            }
            return;
        }

        if self.popup_grab_ok {
            self.popup_grab_ok = false;
            self.decide_replay(env, popup);
            self.ungrab_mouse_for_popup(env, popup);
            self.ungrab_keyboard_for_popup(env, popup);
        }

        if let Some(focus) = env.active_window_focus_widget() {
            if env.application_focus_widget() != Some(focus) {
                env.set_focus(focus);
            } else {
                env.send_focus_in(focus);
            }
        }
    }

    fn decide_replay(&mut self, env: &dyn PopupEnvironment, popup: WidgetId) {
        let press = self.context.mouse_press();
        if env.popup_geometry(popup).contains(press.position) || env.suppresses_mouse_replay(popup)
        {
            // A release, or a press inside the popup itself.
            self.replay_mouse_press = false;
        } else {
            let debounce = self.context.config().double_click_debounce_ms;
            self.context.rewind_mouse_press_time(debounce);
            self.replay_mouse_press = true;
            log::trace!(
                "[Popup] press at {:?} outside {popup:?} scheduled for replay",
                press.position
            );
        }
    }

    /*
     * Both grabs or neither: a popup that could only take the keyboard hands
     * it back and counts as ungrabbed. Any automatic mouse grab is cancelled
     * before the popup takes the mouse.
     */
    fn grab_for_popup(&mut self, env: &dyn PopupEnvironment, popup: WidgetId) {
        self.popup_grab_ok = env.steal_keyboard_grab(popup, true);
        if !self.popup_grab_ok {
            log::warn!("[Popup] keyboard grab failed for {popup:?}");
            return;
        }
        if let Some(auto) = self.auto_grabber.take() {
            env.steal_mouse_grab(auto, false);
        }
        self.popup_grab_ok = env.steal_mouse_grab(popup, true);
        if !self.popup_grab_ok {
            log::warn!("[Popup] mouse grab failed for {popup:?}; releasing keyboard grab");
            self.ungrab_keyboard_for_popup(env, popup);
        }
    }

    fn ungrab_keyboard_for_popup(&self, env: &dyn PopupEnvironment, popup: WidgetId) {
        match env.keyboard_grabber() {
            Some(grabber) => {
                env.steal_keyboard_grab(grabber, true);
            }
            None => {
                env.steal_keyboard_grab(popup, false);
            }
        }
    }

    fn ungrab_mouse_for_popup(&self, env: &dyn PopupEnvironment, popup: WidgetId) {
        match env.mouse_grabber() {
            Some(grabber) => {
                env.steal_mouse_grab(grabber, true);
            }
            None => {
                env.steal_mouse_grab(popup, false);
            }
        }
    }

    /*
     * Grabs the mouse for the pressed window while any button is held, unless
     * someone else already grabs it. Call for button presses and releases
     * only; `buttons_down` is the button state after the event.
     */
    pub fn handle_automatic_mouse_grab(
        &mut self,
        env: &dyn PopupEnvironment,
        widget: WidgetId,
        buttons_down: bool,
    ) {
        if !buttons_down {
            if let Some(auto) = self.auto_grabber.take() {
                if env.mouse_grabber().is_none() && !self.popup_grab_ok {
                    env.steal_mouse_grab(auto, false);
                }
            }
        } else if self.auto_grabber.is_none()
            && env.mouse_grabber().is_none()
            && !self.popup_grab_ok
        {
            let window = env.window_of(widget);
            self.auto_grabber = Some(window);
            env.steal_mouse_grab(window, true);
        }
    }

    /// Activation echoes arriving while popups are open are stale focus
    /// events and are dropped. Returns whether the change was applied.
    pub fn notify_active_window_change(
        &self,
        env: &dyn PopupEnvironment,
        window: Option<WidgetId>,
    ) -> bool {
        if self.in_popup_mode() {
            log::trace!("[Popup] ignoring activation of {window:?} in popup mode");
            return false;
        }
        env.set_active_window(window);
        true
    }
}
