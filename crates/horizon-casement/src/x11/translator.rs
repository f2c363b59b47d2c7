//! Native event to canonical event translation.
//!
//! [`EventTranslator`] holds the interaction state a window needs to turn
//! native events into [`Event`]s: the last client size and pointer
//! position (to drop duplicates), double-click tracking, the space-bar
//! flag used to detect keyboard auto-repeat and the time of the last tablet
//! event (the server repeats it as a core pointer event).

use std::time::Duration;

use tracing::trace;

use horizon_casement_core::logging::targets;
use horizon_casement_core::{Event, EventKind, KeyModifiers, MouseButton, Point, PointerType, Rect, Size};

use super::atoms::Atoms;
use super::display::{
    ButtonEvent, CrossingEvent, CrossingMode, DisplayServer, InputContextId, KeyEvent, MotionEvent, NativeEvent,
    StylusAction, StylusEvent, StylusTool, Timestamp,
};
use super::keys::{self, keysym};
use super::protocol::WmClient;

/// Everything outside the translator that translation may consult.
pub struct TranslateContext<'a> {
    pub display: &'a dyn DisplayServer,
    pub atoms: &'a Atoms,
    pub input_context: Option<InputContextId>,
    /// Window scale factor, at least 1.
    pub scale: i32,
}

/// Wheel delta for the native wheel buttons, `None` for ordinary buttons.
pub fn wheel_delta(button: u8) -> Option<Point> {
    match button {
        4 => Some(Point::new(0, -1)),
        5 => Some(Point::new(0, 1)),
        6 => Some(Point::new(-1, 0)),
        7 => Some(Point::new(1, 0)),
        _ => None,
    }
}

/// Canonical button for a native button number.
pub fn mouse_button(button: u8) -> MouseButton {
    match button {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        8 => MouseButton::X1,
        9 => MouseButton::X2,
        _ => MouseButton::None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastPress {
    button: MouseButton,
    time: Timestamp,
}

/// Per-window translation state.
#[derive(Debug)]
pub struct EventTranslator {
    double_click_timeout: Duration,
    last_client_size: Size,
    last_mouse_position: Option<Point>,
    last_press: Option<LastPress>,
    space_bar_pressed: bool,
    last_stylus_time: Option<Timestamp>,
}

impl EventTranslator {
    pub fn new(double_click_timeout: Duration) -> Self {
        Self {
            double_click_timeout,
            last_client_size: Size::ZERO,
            last_mouse_position: None,
            last_press: None,
            space_bar_pressed: false,
            last_stylus_time: None,
        }
    }

    /// Last client size reported through a resize event, in device pixels.
    pub fn last_client_size(&self) -> Size {
        self.last_client_size
    }

    pub fn space_bar_pressed(&self) -> bool {
        self.space_bar_pressed
    }

    /// Translate one native event. Returns `None` when the event produces
    /// no canonical event.
    ///
    /// Map, unmap and property notifications are window state changes and
    /// never translate to events.
    pub fn translate(&mut self, ctx: &TranslateContext<'_>, event: &NativeEvent) -> Option<Event> {
        let translated = match event {
            NativeEvent::Configure { rect, .. } => self.configure(*rect, ctx.scale),
            NativeEvent::Expose { rect, .. } => Some(Event::paint(*rect)),
            NativeEvent::Key(key) => self.key(ctx, key),
            NativeEvent::Button(button) => self.button(button, ctx.scale),
            NativeEvent::Motion(motion) => self.motion(motion, ctx.scale),
            NativeEvent::Crossing(crossing) => self.crossing(crossing, ctx.scale),
            NativeEvent::Stylus(stylus) => Some(self.stylus(stylus, ctx.scale)),
            NativeEvent::ClientMessage(message) => {
                WmClient::new(ctx.display, ctx.atoms)
                    .is_close_request(message)
                    .then(|| Event::new(EventKind::CloseWindow))
            }
            NativeEvent::Property { .. } | NativeEvent::Map { .. } | NativeEvent::Unmap { .. } => None,
        };
        if let Some(ev) = &translated {
            trace!(target: targets::EVENTS, kind = ?ev.kind, window = event.window(), "translated");
        }
        translated
    }

    fn configure(&mut self, rect: Rect, scale: i32) -> Option<Event> {
        let size = rect.size();
        if size.is_empty() || size == self.last_client_size {
            return None;
        }
        self.last_client_size = size;
        Some(Event::resize(size.to_logical(scale)))
    }

    fn key(&mut self, ctx: &TranslateContext<'_>, key: &KeyEvent) -> Option<Event> {
        let sym = ctx.display.keysym(key.keycode);

        // Intermediate input-method step (dead key, candidate selection).
        if ctx.display.filter_key_event(ctx.input_context, key) {
            trace!(target: targets::EVENTS, keycode = key.keycode, "key consumed by input method");
            return None;
        }

        let kind = if key.pressed { EventKind::KeyDown } else { EventKind::KeyUp };
        let mut ev = Event::key(kind, keys::scancode_from_keysym(sym));
        if key.pressed {
            let ch = ctx
                .display
                .lookup_text(ctx.input_context, key)
                .and_then(|text| text.chars().next());
            ev.unicode_char = ch;
        }

        if sym == keysym::XK_space {
            self.space_bar_pressed = key.pressed || self.is_repeat_release(ctx.display, key);
        }

        let mut modifiers = keys::modifiers_from_state(key.state) | keys::modifier_for_keysym(sym);
        if self.space_bar_pressed {
            modifiers |= KeyModifiers::SPACE;
        }
        trace!(
            target: targets::EVENTS,
            pressed = key.pressed,
            state = key.state,
            keycode = key.keycode,
            keysym = sym,
            "key"
        );
        Some(ev.with_modifiers(modifiers))
    }

    /// An auto-repeat shows up as a release immediately followed by a press
    /// of the same key with the same timestamp.
    fn is_repeat_release(&self, display: &dyn DisplayServer, release: &KeyEvent) -> bool {
        match display.peek_event() {
            Some(NativeEvent::Key(next)) => {
                next.pressed && next.time == release.time && next.keycode == release.keycode
            }
            _ => false,
        }
    }

    /// Core pointer events the server generated for a tablet event that
    /// was already translated.
    fn is_stylus_echo(&self, time: Timestamp) -> bool {
        self.last_stylus_time == Some(time)
    }

    fn button(&mut self, button: &ButtonEvent, scale: i32) -> Option<Event> {
        if self.is_stylus_echo(button.time) {
            return None;
        }
        let position = button.position.to_logical(scale);
        let modifiers = keys::modifiers_from_state(button.state);

        if let Some(delta) = wheel_delta(button.button) {
            // Wheel releases would apply the delta twice.
            if !button.pressed {
                return None;
            }
            return Some(
                Event::mouse(EventKind::MouseWheel, position)
                    .with_wheel_delta(delta)
                    .with_modifiers(modifiers),
            );
        }

        let which = mouse_button(button.button);
        let kind = if !button.pressed {
            EventKind::MouseUp
        } else if self.is_double_click(which, button.time) {
            self.last_press = None;
            EventKind::MouseDoubleClick
        } else {
            self.last_press = Some(LastPress {
                button: which,
                time: button.time,
            });
            EventKind::MouseDown
        };

        Some(
            Event::mouse(kind, position)
                .with_button(which)
                .with_modifiers(modifiers),
        )
    }

    fn is_double_click(&self, button: MouseButton, time: Timestamp) -> bool {
        self.last_press.is_some_and(|last| {
            last.button == button
                && u128::from(time.wrapping_sub(last.time)) < self.double_click_timeout.as_millis()
        })
    }

    fn motion(&mut self, motion: &MotionEvent, scale: i32) -> Option<Event> {
        if self.is_stylus_echo(motion.time) {
            return None;
        }
        // Any motion breaks a click sequence.
        self.last_press = None;

        let position = motion.position.to_logical(scale);
        if self.last_mouse_position == Some(position) {
            return None;
        }
        self.last_mouse_position = Some(position);

        Some(
            Event::mouse(EventKind::MouseMove, position)
                .with_modifiers(keys::modifiers_from_state(motion.state)),
        )
    }

    fn stylus(&mut self, stylus: &StylusEvent, scale: i32) -> Event {
        self.last_stylus_time = Some(stylus.time);

        let (kind, button) = match stylus.action {
            StylusAction::Motion => (EventKind::MouseMove, MouseButton::None),
            StylusAction::Press(button) => (EventKind::MouseDown, mouse_button(button)),
            StylusAction::Release(button) => (EventKind::MouseUp, mouse_button(button)),
        };
        let pointer_type = match stylus.tool {
            StylusTool::Pen => PointerType::Pen,
            StylusTool::Eraser => PointerType::Eraser,
        };
        Event::mouse(kind, stylus.position.to_logical(scale))
            .with_button(button)
            .with_modifiers(keys::modifiers_from_state(stylus.state))
            .with_pointer(pointer_type, stylus.pressure.clamp(0.0, 1.0))
    }

    fn crossing(&mut self, crossing: &CrossingEvent, scale: i32) -> Option<Event> {
        self.space_bar_pressed = false;

        // Grab/ungrab crossings come from middle-button drags, not from the
        // pointer actually crossing the window border.
        if crossing.mode != CrossingMode::Normal {
            return None;
        }
        let kind = if crossing.entered {
            EventKind::MouseEnter
        } else {
            EventKind::MouseLeave
        };
        Some(
            Event::mouse(kind, crossing.position.to_logical(scale))
                .with_modifiers(keys::modifiers_from_state(crossing.state)),
        )
    }
}

#[cfg(test)]
mod tests {
    use horizon_casement_core::KeyScancode;

    use super::super::display::ClientMessage;
    use super::super::testing::FakeDisplay;
    use super::*;

    const WIN: u32 = 0x40_0001;
    const SPACE_KEYCODE: u8 = 65;
    const A_KEYCODE: u8 = 38;

    struct Harness {
        display: FakeDisplay,
        atoms: Atoms,
        translator: EventTranslator,
        scale: i32,
        ic: Option<InputContextId>,
    }

    impl Harness {
        fn new() -> Self {
            let display = FakeDisplay::new();
            display.map_key(SPACE_KEYCODE, keysym::XK_space, Some(" "));
            display.map_key(A_KEYCODE, 0x61, Some("a"));
            display.map_key(50, keysym::XK_Shift_L, None);
            let atoms = Atoms::intern(&display);
            Self {
                display,
                atoms,
                translator: EventTranslator::new(Duration::from_millis(250)),
                scale: 1,
                ic: None,
            }
        }

        fn feed(&mut self, event: NativeEvent) -> Option<Event> {
            let ctx = TranslateContext {
                display: &self.display,
                atoms: &self.atoms,
                input_context: self.ic,
                scale: self.scale,
            };
            self.translator.translate(&ctx, &event)
        }
    }

    fn press(button: u8, x: i32, y: i32, time: Timestamp) -> NativeEvent {
        NativeEvent::Button(ButtonEvent {
            window: WIN,
            pressed: true,
            button,
            position: Point::new(x, y),
            state: 0,
            time,
        })
    }

    fn release(button: u8, time: Timestamp) -> NativeEvent {
        NativeEvent::Button(ButtonEvent {
            window: WIN,
            pressed: false,
            button,
            position: Point::ZERO,
            state: 0,
            time,
        })
    }

    fn motion(x: i32, y: i32) -> NativeEvent {
        NativeEvent::Motion(MotionEvent {
            window: WIN,
            position: Point::new(x, y),
            state: 0,
            time: 0,
        })
    }

    fn key(keycode: u8, pressed: bool, time: Timestamp) -> NativeEvent {
        NativeEvent::Key(KeyEvent {
            window: WIN,
            pressed,
            keycode,
            state: 0,
            time,
        })
    }

    fn kinds(events: &[Option<Event>]) -> Vec<Option<EventKind>> {
        events.iter().map(|ev| ev.as_ref().map(|e| e.kind)).collect()
    }

    #[test]
    fn test_double_click_within_timeout() {
        let mut h = Harness::new();
        let events = [
            h.feed(press(1, 5, 5, 1000)),
            h.feed(release(1, 1050)),
            h.feed(press(1, 5, 5, 1200)),
        ];
        assert_eq!(
            kinds(&events),
            vec![
                Some(EventKind::MouseDown),
                Some(EventKind::MouseUp),
                Some(EventKind::MouseDoubleClick)
            ]
        );
        // Tracking was reset: a third quick press is a plain press.
        assert_eq!(h.feed(press(1, 5, 5, 1300)).map(|e| e.kind), Some(EventKind::MouseDown));
    }

    #[test]
    fn test_presses_at_timeout_are_separate() {
        let mut h = Harness::new();
        let first = h.feed(press(1, 0, 0, 1000));
        let second = h.feed(press(1, 0, 0, 1250));
        assert_eq!(kinds(&[first, second]), vec![Some(EventKind::MouseDown); 2]);
    }

    #[test]
    fn test_different_button_does_not_double_click() {
        let mut h = Harness::new();
        h.feed(press(1, 0, 0, 1000));
        let ev = h.feed(press(3, 0, 0, 1010)).unwrap();
        assert_eq!(ev.kind, EventKind::MouseDown);
        assert_eq!(ev.button, MouseButton::Right);
    }

    #[test]
    fn test_motion_resets_double_click() {
        let mut h = Harness::new();
        h.feed(press(1, 0, 0, 1000));
        h.feed(motion(3, 3));
        assert_eq!(h.feed(press(1, 3, 3, 1100)).map(|e| e.kind), Some(EventKind::MouseDown));
    }

    #[test]
    fn test_timestamp_wraparound() {
        let mut h = Harness::new();
        h.feed(press(1, 0, 0, u32::MAX - 10));
        assert_eq!(h.feed(press(1, 0, 0, 20)).map(|e| e.kind), Some(EventKind::MouseDoubleClick));
    }

    #[test]
    fn test_positions_are_floored_by_scale() {
        let mut h = Harness::new();
        h.scale = 3;
        assert_eq!(h.feed(press(1, 7, 8, 0)).unwrap().position, Point::new(2, 2));
        assert_eq!(h.feed(motion(11, 2)).unwrap().position, Point::new(3, 0));
    }

    #[test]
    fn test_motion_suppressed_when_logical_position_unchanged() {
        let mut h = Harness::new();
        h.scale = 2;
        assert!(h.feed(motion(4, 4)).is_some());
        assert!(h.feed(motion(5, 5)).is_none());
        assert!(h.feed(motion(6, 5)).is_some());
    }

    #[test]
    fn test_wheel_press_reported_release_ignored() {
        let mut h = Harness::new();
        let up = h.feed(press(4, 0, 0, 0)).unwrap();
        assert_eq!(up.kind, EventKind::MouseWheel);
        assert_eq!(up.wheel_delta, Point::new(0, -1));
        assert_eq!(h.feed(press(7, 0, 0, 0)).unwrap().wheel_delta, Point::new(1, 0));
        assert!(h.feed(release(4, 0)).is_none());
        assert!(h.feed(release(6, 0)).is_none());
    }

    #[test]
    fn test_crossing_modes() {
        let mut h = Harness::new();
        let crossing = |entered, mode| {
            NativeEvent::Crossing(CrossingEvent {
                window: WIN,
                entered,
                mode,
                position: Point::new(4, 4),
                state: 0,
            })
        };

        h.feed(key(SPACE_KEYCODE, true, 10));
        assert!(h.translator.space_bar_pressed());
        assert!(h.feed(crossing(false, CrossingMode::Grab)).is_none());
        assert!(!h.translator.space_bar_pressed());
        assert!(h.feed(crossing(true, CrossingMode::Ungrab)).is_none());

        assert_eq!(h.feed(crossing(true, CrossingMode::Normal)).map(|e| e.kind), Some(EventKind::MouseEnter));
        assert_eq!(h.feed(crossing(false, CrossingMode::Normal)).map(|e| e.kind), Some(EventKind::MouseLeave));
    }

    #[test]
    fn test_key_event_fields() {
        let mut h = Harness::new();
        let down = h.feed(key(A_KEYCODE, true, 1)).unwrap();
        assert_eq!(down.kind, EventKind::KeyDown);
        assert_eq!(down.scancode, KeyScancode::A);
        assert_eq!(down.unicode_char, Some('a'));

        let up = h.feed(key(A_KEYCODE, false, 2)).unwrap();
        assert_eq!(up.kind, EventKind::KeyUp);
        assert_eq!(up.unicode_char, None);
    }

    #[test]
    fn test_modifier_key_reports_itself() {
        let mut h = Harness::new();
        let shift = h.feed(key(50, true, 1)).unwrap();
        assert_eq!(shift.scancode, KeyScancode::LShift);
        assert!(shift.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn test_input_method_consumes_key() {
        let mut h = Harness::new();
        h.display.filter_keycode(A_KEYCODE);
        // Without an input context nothing is filtered.
        assert!(h.feed(key(A_KEYCODE, true, 1)).is_some());

        h.ic = Some(1);
        assert!(h.feed(key(A_KEYCODE, true, 2)).is_none());
    }

    #[test]
    fn test_dead_key_composes_following_key() {
        const DEAD_ACUTE_KEYCODE: u8 = 21;
        const E_KEYCODE: u8 = 26;
        let mut h = Harness::new();
        h.display.map_key(E_KEYCODE, 0x65, Some("e"));
        h.display.compose(DEAD_ACUTE_KEYCODE, E_KEYCODE, "é");
        h.ic = Some(1);

        assert!(h.feed(key(DEAD_ACUTE_KEYCODE, true, 1)).is_none());
        assert!(h.feed(key(DEAD_ACUTE_KEYCODE, false, 2)).is_none());

        let composed = h.feed(key(E_KEYCODE, true, 3)).unwrap();
        assert_eq!(composed.kind, EventKind::KeyDown);
        assert_eq!(composed.scancode, KeyScancode::E);
        assert_eq!(composed.unicode_char, Some('é'));

        // The composition is used up.
        assert_eq!(h.feed(key(E_KEYCODE, true, 4)).unwrap().unicode_char, Some('e'));
    }

    fn stylus(tool: StylusTool, action: StylusAction, x: i32, y: i32, pressure: f32, time: Timestamp) -> NativeEvent {
        NativeEvent::Stylus(StylusEvent {
            window: WIN,
            tool,
            action,
            position: Point::new(x, y),
            state: 0,
            pressure,
            time,
        })
    }

    #[test]
    fn test_stylus_events_carry_tool_and_pressure() {
        let mut h = Harness::new();
        h.scale = 2;

        let down = h.feed(stylus(StylusTool::Pen, StylusAction::Press(1), 20, 30, 0.25, 500)).unwrap();
        assert_eq!(down.kind, EventKind::MouseDown);
        assert_eq!(down.button, MouseButton::Left);
        assert_eq!(down.position, Point::new(10, 15));
        assert_eq!(down.pointer_type, PointerType::Pen);
        assert_eq!(down.pressure, 0.25);

        let rub = h.feed(stylus(StylusTool::Eraser, StylusAction::Motion, 22, 30, 1.5, 510)).unwrap();
        assert_eq!(rub.kind, EventKind::MouseMove);
        assert_eq!(rub.pointer_type, PointerType::Eraser);
        assert_eq!(rub.pressure, 1.0);

        let up = h.feed(stylus(StylusTool::Pen, StylusAction::Release(1), 22, 30, 0.0, 520)).unwrap();
        assert_eq!(up.kind, EventKind::MouseUp);
    }

    #[test]
    fn test_core_echo_of_stylus_event_dropped() {
        let mut h = Harness::new();
        h.feed(stylus(StylusTool::Pen, StylusAction::Press(1), 5, 5, 0.5, 700));

        assert!(h.feed(press(1, 5, 5, 700)).is_none());
        assert!(h
            .feed(NativeEvent::Motion(MotionEvent {
                window: WIN,
                position: Point::new(6, 6),
                state: 0,
                time: 700,
            }))
            .is_none());

        // A mouse event at another time is a real one.
        let mouse = h.feed(press(1, 5, 5, 900)).unwrap();
        assert_eq!(mouse.kind, EventKind::MouseDown);
        assert_eq!(mouse.pointer_type, PointerType::Unknown);
    }

    #[test]
    fn test_space_auto_repeat_detected_by_peeking() {
        let mut h = Harness::new();
        let down = h.feed(key(SPACE_KEYCODE, true, 100)).unwrap();
        assert!(down.modifiers.contains(KeyModifiers::SPACE));

        // Auto-repeat: the matching press is already queued.
        h.display.push_event(key(SPACE_KEYCODE, true, 150));
        let up = h.feed(key(SPACE_KEYCODE, false, 150)).unwrap();
        assert_eq!(up.kind, EventKind::KeyUp);
        assert!(h.translator.space_bar_pressed());

        // Genuine release: the next press has another timestamp.
        h.display.state.borrow_mut().queue.clear();
        h.display.push_event(key(SPACE_KEYCODE, true, 400));
        h.feed(key(SPACE_KEYCODE, false, 300));
        assert!(!h.translator.space_bar_pressed());
    }

    #[test]
    fn test_close_request() {
        let mut h = Harness::new();
        let delete = h.display.atom("WM_DELETE_WINDOW");
        let protocols = h.display.atom("WM_PROTOCOLS");
        let ev = h.feed(NativeEvent::ClientMessage(ClientMessage {
            window: WIN,
            message_type: protocols,
            data: [delete, 0, 0, 0, 0],
        }));
        assert_eq!(ev.map(|e| e.kind), Some(EventKind::CloseWindow));

        let other = h.feed(NativeEvent::ClientMessage(ClientMessage {
            window: WIN,
            message_type: protocols,
            data: [0, 0, 0, 0, 0],
        }));
        assert!(other.is_none());
    }

    #[test]
    fn test_duplicate_resize_suppressed() {
        let mut h = Harness::new();
        h.scale = 2;
        let configure = |w, hgt| NativeEvent::Configure {
            window: WIN,
            rect: Rect::new(0, 0, w, hgt),
        };

        let first = h.feed(configure(200, 100)).unwrap();
        assert_eq!(first.size, Size::new(100, 50));
        assert!(h.feed(configure(200, 100)).is_none());
        assert!(h.feed(configure(0, 100)).is_none());
        assert_eq!(h.translator.last_client_size(), Size::new(200, 100));
        assert!(h.feed(configure(202, 100)).is_some());
    }

    #[test]
    fn test_expose_becomes_paint() {
        let mut h = Harness::new();
        let ev = h
            .feed(NativeEvent::Expose {
                window: WIN,
                rect: Rect::new(1, 2, 3, 4),
            })
            .unwrap();
        assert_eq!(ev.kind, EventKind::PaintInvalidate);
        assert_eq!(ev.rect, Rect::new(1, 2, 3, 4));
    }
}
