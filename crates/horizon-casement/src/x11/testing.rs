//! Recording in-memory display server for tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use horizon_casement_core::{Point, Rect, Size};

use super::display::{
    Atom, ClientMessage, CursorHandle, CursorImage, DisplayError, DisplayResult, DisplayServer,
    GcHandle, InputContextId, KeyEvent, Keysym, NativeEvent, PropertyMode, Xid,
};

pub const ROOT: Xid = 1;

#[derive(Debug, Default)]
pub struct FakeWindow {
    pub rect: Rect,
    pub mapped: bool,
    pub props32: HashMap<Atom, (Atom, Vec<u32>)>,
    pub props8: HashMap<Atom, (Atom, Vec<u8>)>,
    pub cursor: Option<CursorHandle>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub next_id: u32,
    pub windows: HashMap<Xid, FakeWindow>,
    pub atoms: HashMap<String, Atom>,
    pub messages: Vec<ClientMessage>,
    pub live_cursors: HashSet<CursorHandle>,
    pub font_cursors: Vec<u16>,
    pub argb_images: Vec<CursorImage>,
    pub live_gcs: HashSet<GcHandle>,
    pub live_ics: HashSet<InputContextId>,
    pub grabbed: bool,
    pub ungrab_count: usize,
    pub warps: Vec<(Xid, Point)>,
    pub resizes: Vec<(Xid, Size)>,
    pub queue: VecDeque<NativeEvent>,
    pub keysyms: HashMap<u8, Keysym>,
    pub texts: HashMap<u8, String>,
    pub filtered_keycodes: HashSet<u8>,
    /// Text produced by a key following a filtered dead key.
    pub compositions: HashMap<(u8, u8), String>,
    pub pending_dead_key: Option<u8>,
    pub stylus_windows: Vec<Xid>,
    pub flushes: usize,
}

/// Display server double that records every request.
#[derive(Debug)]
pub struct FakeDisplay {
    pub state: RefCell<FakeState>,
    pub argb_cursors: bool,
    pub input_method: bool,
    pub tablet: bool,
    pub refuse_windows: bool,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(FakeState {
                next_id: 0x0040_0000,
                ..Default::default()
            }),
            argb_cursors: true,
            input_method: false,
            tablet: false,
            refuse_windows: false,
        }
    }

    fn alloc(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }

    pub fn atom(&self, name: &str) -> Atom {
        self.intern_atom(name).unwrap_or(0)
    }

    pub fn messages(&self) -> Vec<ClientMessage> {
        self.state.borrow().messages.clone()
    }

    pub fn messages_of(&self, name: &str) -> Vec<ClientMessage> {
        let atom = self.atom(name);
        self.messages()
            .into_iter()
            .filter(|m| m.message_type == atom)
            .collect()
    }

    pub fn live_cursor_count(&self) -> usize {
        self.state.borrow().live_cursors.len()
    }

    pub fn property32(&self, window: Xid, name: &str) -> Option<Vec<u32>> {
        let atom = self.atom(name);
        self.state
            .borrow()
            .windows
            .get(&window)
            .and_then(|w| w.props32.get(&atom))
            .map(|(_, data)| data.clone())
    }

    pub fn property8(&self, window: Xid, property: Atom) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .and_then(|w| w.props8.get(&property))
            .map(|(_, data)| data.clone())
    }

    /// Simulate the window manager writing a 32-bit property.
    pub fn set_property32(&self, window: Xid, name: &str, type_: Atom, data: &[u32]) {
        let atom = self.atom(name);
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.props32.insert(atom, (type_, data.to_vec()));
        }
    }

    /// Simulate the window manager moving or resizing the window.
    pub fn set_geometry(&self, window: Xid, rect: Rect) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.rect = rect;
        }
    }

    pub fn push_event(&self, event: NativeEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    pub fn map_key(&self, keycode: u8, keysym: Keysym, text: Option<&str>) {
        let mut state = self.state.borrow_mut();
        state.keysyms.insert(keycode, keysym);
        if let Some(text) = text {
            state.texts.insert(keycode, text.to_string());
        }
    }

    pub fn filter_keycode(&self, keycode: u8) {
        self.state.borrow_mut().filtered_keycodes.insert(keycode);
    }

    /// Make `dead` a dead key that turns `key` into `text`.
    pub fn compose(&self, dead: u8, key: u8, text: &str) {
        let mut state = self.state.borrow_mut();
        state.filtered_keycodes.insert(dead);
        state.compositions.insert((dead, key), text.to_string());
    }

    pub fn window_exists(&self, window: Xid) -> bool {
        self.state.borrow().windows.contains_key(&window)
    }
}

impl DisplayServer for FakeDisplay {
    fn root_window(&self) -> Xid {
        ROOT
    }

    fn default_screen(&self) -> usize {
        0
    }

    fn screen_size(&self) -> Size {
        Size::new(1920, 1080)
    }

    fn create_window(&self, rect: Rect) -> DisplayResult<Xid> {
        if self.refuse_windows {
            return Err(DisplayError::Reply("BadAlloc".into()));
        }
        let id = self.alloc();
        self.state.borrow_mut().windows.insert(
            id,
            FakeWindow {
                rect,
                ..Default::default()
            },
        );
        Ok(id)
    }

    fn destroy_window(&self, window: Xid) -> DisplayResult<()> {
        self.state.borrow_mut().windows.remove(&window);
        Ok(())
    }

    fn map_window(&self, window: Xid) -> DisplayResult<()> {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.mapped = true;
        }
        Ok(())
    }

    fn unmap_window(&self, window: Xid) -> DisplayResult<()> {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.mapped = false;
        }
        Ok(())
    }

    fn resize_window(&self, window: Xid, size: Size) -> DisplayResult<()> {
        let mut state = self.state.borrow_mut();
        state.resizes.push((window, size));
        if let Some(w) = state.windows.get_mut(&window) {
            w.rect.width = size.width;
            w.rect.height = size.height;
        }
        Ok(())
    }

    fn geometry(&self, window: Xid) -> DisplayResult<Rect> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|w| w.rect)
            .ok_or_else(|| DisplayError::Reply("BadWindow".into()))
    }

    fn translate_coordinates(&self, src: Xid, dst: Xid, point: Point) -> DisplayResult<Point> {
        let origin = |w: Xid| -> DisplayResult<Point> {
            if w == ROOT {
                Ok(Point::ZERO)
            } else {
                self.geometry(w).map(|r| r.origin())
            }
        };
        Ok(point + origin(src)? - origin(dst)?)
    }

    fn intern_atom(&self, name: &str) -> DisplayResult<Atom> {
        let mut state = self.state.borrow_mut();
        let next = 100 + state.atoms.len() as u32;
        Ok(*state.atoms.entry(name.to_string()).or_insert(next))
    }

    fn change_property32(
        &self,
        window: Xid,
        property: Atom,
        type_: Atom,
        mode: PropertyMode,
        data: &[u32],
    ) -> DisplayResult<()> {
        let mut state = self.state.borrow_mut();
        if let Some(w) = state.windows.get_mut(&window) {
            let entry = w.props32.entry(property).or_insert((type_, Vec::new()));
            if mode == PropertyMode::Replace {
                entry.1.clear();
            }
            entry.0 = type_;
            entry.1.extend_from_slice(data);
        }
        Ok(())
    }

    fn change_property8(&self, window: Xid, property: Atom, type_: Atom, data: &[u8]) -> DisplayResult<()> {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.props8.insert(property, (type_, data.to_vec()));
        }
        Ok(())
    }

    fn get_property32(&self, window: Xid, property: Atom, type_: Atom, max_len: u32) -> DisplayResult<Option<Vec<u32>>> {
        Ok(self
            .state
            .borrow()
            .windows
            .get(&window)
            .and_then(|w| w.props32.get(&property))
            .filter(|(t, _)| *t == type_)
            .map(|(_, data)| data.iter().copied().take(max_len as usize).collect()))
    }

    fn get_property8(&self, window: Xid, property: Atom) -> DisplayResult<Option<Vec<u8>>> {
        Ok(self.property8(window, property))
    }

    fn send_client_message(&self, message: ClientMessage) -> DisplayResult<()> {
        self.state.borrow_mut().messages.push(message);
        Ok(())
    }

    fn grab_pointer(&self, _window: Xid) -> DisplayResult<()> {
        self.state.borrow_mut().grabbed = true;
        Ok(())
    }

    fn ungrab_pointer(&self) -> DisplayResult<()> {
        let mut state = self.state.borrow_mut();
        state.grabbed = false;
        state.ungrab_count += 1;
        Ok(())
    }

    fn warp_pointer(&self, window: Xid, position: Point) -> DisplayResult<()> {
        self.state.borrow_mut().warps.push((window, position));
        Ok(())
    }

    fn create_font_cursor(&self, shape: u16) -> DisplayResult<CursorHandle> {
        let id = self.alloc();
        let mut state = self.state.borrow_mut();
        state.font_cursors.push(shape);
        state.live_cursors.insert(id);
        Ok(id)
    }

    fn create_empty_cursor(&self, _window: Xid) -> DisplayResult<CursorHandle> {
        let id = self.alloc();
        self.state.borrow_mut().live_cursors.insert(id);
        Ok(id)
    }

    fn supports_argb_cursors(&self) -> bool {
        self.argb_cursors
    }

    fn create_argb_cursor(&self, image: &CursorImage) -> DisplayResult<CursorHandle> {
        let id = self.alloc();
        let mut state = self.state.borrow_mut();
        state.argb_images.push(image.clone());
        state.live_cursors.insert(id);
        Ok(id)
    }

    fn free_cursor(&self, cursor: CursorHandle) -> DisplayResult<()> {
        let removed = self.state.borrow_mut().live_cursors.remove(&cursor);
        if removed {
            Ok(())
        } else {
            Err(DisplayError::Reply(format!("BadCursor {cursor}")))
        }
    }

    fn define_cursor(&self, window: Xid, cursor: CursorHandle) -> DisplayResult<()> {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.cursor = Some(cursor);
        }
        Ok(())
    }

    fn create_gc(&self, _window: Xid) -> DisplayResult<GcHandle> {
        let id = self.alloc();
        self.state.borrow_mut().live_gcs.insert(id);
        Ok(id)
    }

    fn free_gc(&self, gc: GcHandle) -> DisplayResult<()> {
        self.state.borrow_mut().live_gcs.remove(&gc);
        Ok(())
    }

    fn select_stylus_events(&self, window: Xid) -> bool {
        if self.tablet {
            self.state.borrow_mut().stylus_windows.push(window);
        }
        self.tablet
    }

    fn create_input_context(&self, _window: Xid) -> Option<InputContextId> {
        if !self.input_method {
            return None;
        }
        let id = self.alloc();
        self.state.borrow_mut().live_ics.insert(id);
        Some(id)
    }

    fn destroy_input_context(&self, ic: InputContextId) {
        self.state.borrow_mut().live_ics.remove(&ic);
    }

    fn filter_key_event(&self, ic: Option<InputContextId>, event: &KeyEvent) -> bool {
        let mut state = self.state.borrow_mut();
        if ic.is_none() || !state.filtered_keycodes.contains(&event.keycode) {
            return false;
        }
        if event.pressed {
            state.pending_dead_key = Some(event.keycode);
        }
        true
    }

    fn lookup_text(&self, ic: Option<InputContextId>, event: &KeyEvent) -> Option<String> {
        let mut state = self.state.borrow_mut();
        if let Some(dead) = ic.and(state.pending_dead_key.take()) {
            if let Some(text) = state.compositions.get(&(dead, event.keycode)) {
                return Some(text.clone());
            }
        }
        state.texts.get(&event.keycode).cloned()
    }

    fn keysym(&self, keycode: u8) -> Keysym {
        self.state.borrow().keysyms.get(&keycode).copied().unwrap_or(0)
    }

    fn peek_event(&self) -> Option<NativeEvent> {
        self.state.borrow().queue.front().copied()
    }

    fn poll_event(&self) -> DisplayResult<Option<NativeEvent>> {
        Ok(self.state.borrow_mut().queue.pop_front())
    }

    fn wait_event(&self) -> DisplayResult<NativeEvent> {
        self.state
            .borrow_mut()
            .queue
            .pop_front()
            .ok_or_else(|| DisplayError::Connection("no more events".into()))
    }

    fn flush(&self) -> DisplayResult<()> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }
}
