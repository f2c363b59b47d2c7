//! [`DisplayServer`] over an `x11rb` connection.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::{debug, trace, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::render::{self, ConnectionExt as _, PictType};
use x11rb::protocol::xinput::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent, ConfigureWindowAux,
    ConnectionExt as _, CreateGCAux, CreateWindowAux, EventMask, GrabMode, ImageFormat, ImageOrder,
    NotifyMode, PropMode, Rectangle, WindowClass, CLIENT_MESSAGE_EVENT,
};
use x11rb::protocol::Event as XEvent;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use horizon_casement_core::logging::targets;
use horizon_casement_core::{Point, Rect, Size};

use super::compose::{ComposeInputMethod, ComposeOutcome};
use super::display::{
    Atom, ButtonEvent, ClientMessage, CrossingEvent, CrossingMode, CursorHandle, CursorImage, DisplayError,
    DisplayResult, DisplayServer, GcHandle, InputContextId, KeyEvent, Keysym, MotionEvent, NativeEvent,
    PropertyMode, StylusAction, StylusEvent, StylusTool, Xid,
};
use super::keys::{self, mask};

impl From<ConnectError> for DisplayError {
    fn from(err: ConnectError) -> Self {
        DisplayError::Connection(err.to_string())
    }
}

impl From<ConnectionError> for DisplayError {
    fn from(err: ConnectionError) -> Self {
        DisplayError::Connection(err.to_string())
    }
}

impl From<ReplyError> for DisplayError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::ConnectionError(err) => err.into(),
            ReplyError::X11Error(err) => DisplayError::Reply(format!("{err:?}")),
        }
    }
}

impl From<ReplyOrIdError> for DisplayError {
    fn from(err: ReplyOrIdError) -> Self {
        match err {
            ReplyOrIdError::IdsExhausted => DisplayError::IdAllocation("ids exhausted".into()),
            ReplyOrIdError::ConnectionError(err) => err.into(),
            ReplyOrIdError::X11Error(err) => DisplayError::Reply(format!("{err:?}")),
        }
    }
}

/// `LOCK` bit of the state mask (caps lock).
const LOCK_MASK: u16 = 1 << 1;

/// Cached core keyboard mapping.
#[derive(Debug, Default)]
struct KeyboardMap {
    min_keycode: u8,
    per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl KeyboardMap {
    fn load(conn: &RustConnection) -> DisplayResult<Self> {
        let setup = conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let reply = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;
        Ok(Self {
            min_keycode: min,
            per_keycode: usize::from(reply.keysyms_per_keycode),
            keysyms: reply.keysyms,
        })
    }

    fn keysym(&self, keycode: u8, level: usize) -> Keysym {
        if keycode < self.min_keycode || level >= self.per_keycode {
            return 0;
        }
        let index = usize::from(keycode - self.min_keycode) * self.per_keycode + level;
        self.keysyms.get(index).copied().unwrap_or(0)
    }
}

/// Depth-32 ARGB picture format, if the render extension provides one.
fn find_argb_format(conn: &RustConnection) -> DisplayResult<Option<render::Pictformat>> {
    if conn
        .extension_information(render::X11_EXTENSION_NAME)?
        .is_none()
    {
        return Ok(None);
    }
    let version = conn.render_query_version(0, 5)?.reply()?;
    if (version.major_version, version.minor_version) < (0, 5) {
        return Ok(None);
    }
    let formats = conn.render_query_pict_formats()?.reply()?;
    Ok(formats
        .formats
        .iter()
        .find(|f| {
            f.type_ == PictType::DIRECT
                && f.depth == 32
                && f.direct.alpha_mask == 0xff
                && f.direct.alpha_shift == 24
                && f.direct.red_shift == 16
                && f.direct.green_shift == 8
                && f.direct.blue_shift == 0
        })
        .map(|f| f.id))
}

/// Pressure valuator of a tablet device.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PressureAxis {
    number: u16,
    min: f64,
    max: f64,
}

impl PressureAxis {
    fn normalize(&self, raw: f64) -> f32 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        ((raw - self.min) / range).clamp(0.0, 1.0) as f32
    }
}

/// A pen or eraser slave device reporting through XInput 2.
#[derive(Debug, Clone, PartialEq)]
struct TabletDevice {
    id: xinput::DeviceId,
    tool: StylusTool,
    pressure: Option<PressureAxis>,
}

/// Guess the tool from a device name, as tablet drivers name their
/// devices "... Pen stylus", "... Pen eraser" and so on.
fn tool_from_name(name: &[u8]) -> Option<StylusTool> {
    let name = String::from_utf8_lossy(name).to_lowercase();
    if name.contains("eraser") {
        Some(StylusTool::Eraser)
    } else if name.contains("stylus") || name.contains("pen") {
        Some(StylusTool::Pen)
    } else {
        None
    }
}

fn fp3232(value: xinput::Fp3232) -> f64 {
    f64::from(value.integral) + f64::from(value.frac) / 4_294_967_296.0
}

/// Value of valuator `number` in an event's packed axis list. Only the
/// valuators set in `mask` are present in `values`.
fn valuator_value(mask: &[u32], values: &[xinput::Fp3232], number: u16) -> Option<f64> {
    let (word, bit) = (usize::from(number / 32), u32::from(number % 32));
    if mask.get(word)? & (1 << bit) == 0 {
        return None;
    }
    let below: u32 = mask[..word].iter().map(|m| m.count_ones()).sum::<u32>()
        + (mask[word] & ((1u32 << bit) - 1)).count_ones();
    values.get(below as usize).copied().map(fp3232)
}

/// Enabled pen and eraser devices, when the server speaks XInput 2.
fn find_tablets(conn: &RustConnection, pressure_label: Atom) -> DisplayResult<Vec<TabletDevice>> {
    if conn
        .extension_information(xinput::X11_EXTENSION_NAME)?
        .is_none()
    {
        return Ok(Vec::new());
    }
    let version = conn.xinput_xi_query_version(2, 0)?.reply()?;
    if version.major_version < 2 {
        return Ok(Vec::new());
    }
    let devices = conn.xinput_xi_query_device(xinput::Device::ALL)?.reply()?;
    Ok(devices
        .infos
        .iter()
        .filter(|info| info.enabled && info.type_ == xinput::DeviceType::SLAVE_POINTER)
        .filter_map(|info| {
            let tool = tool_from_name(&info.name)?;
            let pressure = info.classes.iter().find_map(|class| match &class.data {
                xinput::DeviceClassData::Valuator(v) if v.label == pressure_label => Some(PressureAxis {
                    number: v.number,
                    min: fp3232(v.min),
                    max: fp3232(v.max),
                }),
                _ => None,
            });
            Some(TabletDevice {
                id: info.deviceid,
                tool,
                pressure,
            })
        })
        .collect())
}

fn dim(value: i32) -> u16 {
    value.clamp(1, i32::from(u16::MAX)) as u16
}

fn coord(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Live connection to an X server.
pub struct X11Connection {
    conn: RustConnection,
    screen: usize,
    keyboard: KeyboardMap,
    argb_format: Option<render::Pictformat>,
    cursor_font: Cell<Option<u32>>,
    input_method: Option<ComposeInputMethod>,
    tablets: Vec<TabletDevice>,
    /// Events read ahead by `peek_event`.
    pending: RefCell<VecDeque<NativeEvent>>,
}

impl X11Connection {
    /// Connect to `display_name`, or to `$DISPLAY` when `None`.
    pub fn connect(display_name: Option<&str>) -> DisplayResult<Self> {
        let (conn, screen) = RustConnection::connect(display_name)?;

        let keyboard = match KeyboardMap::load(&conn) {
            Ok(map) => map,
            Err(err) => {
                warn!(target: targets::DISPLAY, %err, "cannot read keyboard mapping");
                KeyboardMap::default()
            }
        };
        let argb_format = match find_argb_format(&conn) {
            Ok(format) => format,
            Err(err) => {
                debug!(target: targets::DISPLAY, %err, "render extension unavailable");
                None
            }
        };
        if argb_format.is_none() {
            warn!(target: targets::DISPLAY, "ARGB cursors are not supported by this server");
        }
        let tablets = conn
            .intern_atom(false, b"Abs Pressure")
            .map_err(DisplayError::from)
            .and_then(|cookie| Ok(cookie.reply()?.atom))
            .and_then(|label| find_tablets(&conn, label))
            .unwrap_or_else(|err| {
                debug!(target: targets::DISPLAY, %err, "XInput 2 unavailable");
                Vec::new()
            });
        debug!(target: targets::DISPLAY, count = tablets.len(), "tablet devices");

        Ok(Self {
            conn,
            screen,
            keyboard,
            argb_format,
            cursor_font: Cell::new(None),
            input_method: ComposeInputMethod::from_locale(),
            tablets,
            pending: RefCell::new(VecDeque::new()),
        })
    }

    fn screen_info(&self) -> &x11rb::protocol::xproto::Screen {
        &self.conn.setup().roots[self.screen]
    }

    fn cursor_font(&self) -> DisplayResult<u32> {
        if let Some(font) = self.cursor_font.get() {
            return Ok(font);
        }
        let font = self.conn.generate_id()?;
        self.conn.open_font(font, b"cursor")?;
        self.cursor_font.set(Some(font));
        Ok(font)
    }

    /// Keysym at the shift level selected by the event state.
    fn level_keysym(&self, event: &KeyEvent) -> Keysym {
        let shifted = event.state & mask::SHIFT != 0;
        match self.keyboard.keysym(event.keycode, usize::from(shifted)) {
            0 => self.keyboard.keysym(event.keycode, 0),
            sym => sym,
        }
    }

    /// Text for a key event from the core keyboard mapping.
    fn keysym_text(&self, event: &KeyEvent) -> Option<String> {
        let shifted = event.state & mask::SHIFT != 0;
        let mut ch = keys::keysym_to_char(self.level_keysym(event))?;
        if event.state & LOCK_MASK != 0 && !shifted {
            ch = ch.to_uppercase().next().unwrap_or(ch);
        }
        Some(ch.to_string())
    }

    fn stylus(&self, event: &xinput::ButtonPressEvent, action: StylusAction) -> Option<NativeEvent> {
        let tablet = self
            .tablets
            .iter()
            .find(|t| t.id == event.sourceid || t.id == event.deviceid)?;
        let pressure = tablet
            .pressure
            .and_then(|axis| {
                valuator_value(&event.valuator_mask, &event.axisvalues, axis.number).map(|raw| axis.normalize(raw))
            })
            .unwrap_or(0.0);
        Some(NativeEvent::Stylus(StylusEvent {
            window: event.event,
            tool: tablet.tool,
            action,
            position: Point::new(event.event_x >> 16, event.event_y >> 16),
            state: event.mods.effective as u16,
            pressure,
            time: event.time,
        }))
    }

    fn convert(&self, event: XEvent) -> Option<NativeEvent> {
        let converted = match event {
            XEvent::ConfigureNotify(e) => NativeEvent::Configure {
                window: e.window,
                rect: Rect::new(e.x.into(), e.y.into(), e.width.into(), e.height.into()),
            },
            XEvent::Expose(e) => NativeEvent::Expose {
                window: e.window,
                rect: Rect::new(e.x.into(), e.y.into(), e.width.into(), e.height.into()),
            },
            XEvent::KeyPress(e) | XEvent::KeyRelease(e) => NativeEvent::Key(KeyEvent {
                window: e.event,
                pressed: e.response_type & 0x7f == x11rb::protocol::xproto::KEY_PRESS_EVENT,
                keycode: e.detail,
                state: u16::from(e.state),
                time: e.time,
            }),
            XEvent::ButtonPress(e) | XEvent::ButtonRelease(e) => NativeEvent::Button(ButtonEvent {
                window: e.event,
                pressed: e.response_type & 0x7f == x11rb::protocol::xproto::BUTTON_PRESS_EVENT,
                button: e.detail,
                position: Point::new(e.event_x.into(), e.event_y.into()),
                state: u16::from(e.state),
                time: e.time,
            }),
            XEvent::MotionNotify(e) => NativeEvent::Motion(MotionEvent {
                window: e.event,
                position: Point::new(e.event_x.into(), e.event_y.into()),
                state: u16::from(e.state),
                time: e.time,
            }),
            XEvent::EnterNotify(e) | XEvent::LeaveNotify(e) => NativeEvent::Crossing(CrossingEvent {
                window: e.event,
                entered: e.response_type & 0x7f == x11rb::protocol::xproto::ENTER_NOTIFY_EVENT,
                mode: if e.mode == NotifyMode::NORMAL {
                    CrossingMode::Normal
                } else if e.mode == NotifyMode::GRAB {
                    CrossingMode::Grab
                } else {
                    CrossingMode::Ungrab
                },
                position: Point::new(e.event_x.into(), e.event_y.into()),
                state: u16::from(e.state),
            }),
            XEvent::ClientMessage(e) if e.format == 32 => NativeEvent::ClientMessage(ClientMessage {
                window: e.window,
                message_type: e.type_,
                data: e.data.as_data32(),
            }),
            XEvent::PropertyNotify(e) => NativeEvent::Property {
                window: e.window,
                atom: e.atom,
            },
            XEvent::XinputMotion(e) => return self.stylus(&e, StylusAction::Motion),
            XEvent::XinputButtonPress(e) => return self.stylus(&e, StylusAction::Press(u8::try_from(e.detail).ok()?)),
            XEvent::XinputButtonRelease(e) => {
                return self.stylus(&e, StylusAction::Release(u8::try_from(e.detail).ok()?))
            }
            XEvent::MapNotify(e) => NativeEvent::Map { window: e.window },
            XEvent::UnmapNotify(e) => NativeEvent::Unmap { window: e.window },
            XEvent::Error(err) => {
                warn!(target: targets::DISPLAY, error = ?err, "X11 error");
                return None;
            }
            other => {
                trace!(target: targets::DISPLAY, event = ?other, "ignored event");
                return None;
            }
        };
        Some(converted)
    }

    /// Read events without blocking until one converts or the queue is
    /// empty.
    fn read_pending(&self) -> DisplayResult<Option<NativeEvent>> {
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(converted) = self.convert(event) {
                return Ok(Some(converted));
            }
        }
        Ok(None)
    }
}

impl DisplayServer for X11Connection {
    fn root_window(&self) -> Xid {
        self.screen_info().root
    }

    fn default_screen(&self) -> usize {
        self.screen
    }

    fn screen_size(&self) -> Size {
        let screen = self.screen_info();
        Size::new(screen.width_in_pixels.into(), screen.height_in_pixels.into())
    }

    fn create_window(&self, rect: Rect) -> DisplayResult<Xid> {
        let window = self.conn.generate_id()?;
        let event_mask = EventMask::STRUCTURE_NOTIFY
            | EventMask::EXPOSURE
            | EventMask::PROPERTY_CHANGE
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::BUTTON_PRESS
            | EventMask::BUTTON_RELEASE
            | EventMask::POINTER_MOTION
            | EventMask::KEY_PRESS
            | EventMask::KEY_RELEASE;
        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                self.root_window(),
                coord(rect.x),
                coord(rect.y),
                dim(rect.width),
                dim(rect.height),
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &CreateWindowAux::new().event_mask(event_mask),
            )?
            .check()?;
        Ok(window)
    }

    fn destroy_window(&self, window: Xid) -> DisplayResult<()> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn map_window(&self, window: Xid) -> DisplayResult<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Xid) -> DisplayResult<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn resize_window(&self, window: Xid, size: Size) -> DisplayResult<()> {
        let aux = ConfigureWindowAux::new()
            .width(u32::from(dim(size.width)))
            .height(u32::from(dim(size.height)));
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn geometry(&self, window: Xid) -> DisplayResult<Rect> {
        let reply = self.conn.get_geometry(window)?.reply()?;
        Ok(Rect::new(
            reply.x.into(),
            reply.y.into(),
            reply.width.into(),
            reply.height.into(),
        ))
    }

    fn translate_coordinates(&self, src: Xid, dst: Xid, point: Point) -> DisplayResult<Point> {
        let reply = self
            .conn
            .translate_coordinates(src, dst, coord(point.x), coord(point.y))?
            .reply()?;
        Ok(Point::new(reply.dst_x.into(), reply.dst_y.into()))
    }

    fn intern_atom(&self, name: &str) -> DisplayResult<Atom> {
        Ok(self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
    }

    fn change_property32(
        &self,
        window: Xid,
        property: Atom,
        type_: Atom,
        mode: PropertyMode,
        data: &[u32],
    ) -> DisplayResult<()> {
        let mode = match mode {
            PropertyMode::Replace => PropMode::REPLACE,
            PropertyMode::Append => PropMode::APPEND,
        };
        self.conn.change_property32(mode, window, property, type_, data)?;
        Ok(())
    }

    fn change_property8(&self, window: Xid, property: Atom, type_: Atom, data: &[u8]) -> DisplayResult<()> {
        self.conn
            .change_property8(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn get_property32(&self, window: Xid, property: Atom, type_: Atom, max_len: u32) -> DisplayResult<Option<Vec<u32>>> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, max_len)?
            .reply()?;
        if reply.type_ != type_ {
            return Ok(None);
        }
        Ok(reply.value32().map(|values| values.collect()))
    }

    fn get_property8(&self, window: Xid, property: Atom) -> DisplayResult<Option<Vec<u8>>> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, 0, u32::MAX / 4)?
            .reply()?;
        if reply.type_ == x11rb::NONE {
            return Ok(None);
        }
        Ok(reply.value8().map(|values| values.collect()))
    }

    fn send_client_message(&self, message: ClientMessage) -> DisplayResult<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: message.window,
            type_: message.message_type,
            data: ClientMessageData::from(message.data),
        };
        self.conn.send_event(
            false,
            self.root_window(),
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            event,
        )?;
        Ok(())
    }

    fn grab_pointer(&self, window: Xid) -> DisplayResult<()> {
        self.conn.grab_pointer(
            false,
            window,
            EventMask::POINTER_MOTION | EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
            x11rb::NONE,
            x11rb::NONE,
            x11rb::CURRENT_TIME,
        )?;
        Ok(())
    }

    fn ungrab_pointer(&self) -> DisplayResult<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn warp_pointer(&self, window: Xid, position: Point) -> DisplayResult<()> {
        self.conn
            .warp_pointer(x11rb::NONE, window, 0, 0, 0, 0, coord(position.x), coord(position.y))?;
        Ok(())
    }

    fn create_font_cursor(&self, shape: u16) -> DisplayResult<CursorHandle> {
        let font = self.cursor_font()?;
        let cursor = self.conn.generate_id()?;
        // Black glyph on a white outline, like XCreateFontCursor.
        self.conn.create_glyph_cursor(
            cursor,
            font,
            font,
            shape,
            shape + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        Ok(cursor)
    }

    fn create_empty_cursor(&self, window: Xid) -> DisplayResult<CursorHandle> {
        let pixmap = self.conn.generate_id()?;
        let gc = self.conn.generate_id()?;
        let cursor = self.conn.generate_id()?;

        self.conn.create_pixmap(1, pixmap, window, 1, 1)?;
        self.conn
            .create_gc(gc, pixmap, &CreateGCAux::new().foreground(0))?;
        self.conn.poly_fill_rectangle(
            pixmap,
            gc,
            &[Rectangle {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            }],
        )?;
        self.conn
            .create_cursor(cursor, pixmap, pixmap, 0, 0, 0, 0, 0, 0, 0, 0)?;
        self.conn.free_gc(gc)?;
        self.conn.free_pixmap(pixmap)?;
        Ok(cursor)
    }

    fn supports_argb_cursors(&self) -> bool {
        self.argb_format.is_some()
    }

    fn create_argb_cursor(&self, image: &CursorImage) -> DisplayResult<CursorHandle> {
        let format = self
            .argb_format
            .ok_or(DisplayError::MissingExtension(render::X11_EXTENSION_NAME))?;
        let (width, height) = (dim(image.width as i32), dim(image.height as i32));

        let big_endian = self.conn.setup().image_byte_order == ImageOrder::MSB_FIRST;
        let data: Vec<u8> = image
            .pixels
            .iter()
            .flat_map(|p| if big_endian { p.to_be_bytes() } else { p.to_le_bytes() })
            .collect();

        let pixmap = self.conn.generate_id()?;
        let gc = self.conn.generate_id()?;
        let picture = self.conn.generate_id()?;
        let cursor = self.conn.generate_id()?;

        self.conn
            .create_pixmap(32, pixmap, self.root_window(), width, height)?;
        self.conn.create_gc(gc, pixmap, &CreateGCAux::new())?;
        self.conn
            .put_image(ImageFormat::Z_PIXMAP, pixmap, gc, width, height, 0, 0, 0, 32, &data)?;
        self.conn
            .render_create_picture(picture, pixmap, format, &render::CreatePictureAux::new())?;
        self.conn.render_create_cursor(
            cursor,
            picture,
            image.hotspot.x.clamp(0, i32::from(width)) as u16,
            image.hotspot.y.clamp(0, i32::from(height)) as u16,
        )?;
        self.conn.render_free_picture(picture)?;
        self.conn.free_gc(gc)?;
        self.conn.free_pixmap(pixmap)?;
        Ok(cursor)
    }

    fn free_cursor(&self, cursor: CursorHandle) -> DisplayResult<()> {
        self.conn.free_cursor(cursor)?;
        Ok(())
    }

    fn define_cursor(&self, window: Xid, cursor: CursorHandle) -> DisplayResult<()> {
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().cursor(cursor))?;
        self.conn.flush()?;
        Ok(())
    }

    fn create_gc(&self, window: Xid) -> DisplayResult<GcHandle> {
        let gc = self.conn.generate_id()?;
        self.conn.create_gc(gc, window, &CreateGCAux::new())?.check()?;
        Ok(gc)
    }

    fn free_gc(&self, gc: GcHandle) -> DisplayResult<()> {
        self.conn.free_gc(gc)?;
        Ok(())
    }

    fn select_stylus_events(&self, window: Xid) -> bool {
        if self.tablets.is_empty() {
            return false;
        }
        let masks: Vec<xinput::EventMask> = self
            .tablets
            .iter()
            .map(|tablet| xinput::EventMask {
                deviceid: tablet.id,
                mask: vec![(xinput::XIEventMask::MOTION
                    | xinput::XIEventMask::BUTTON_PRESS
                    | xinput::XIEventMask::BUTTON_RELEASE)
                    .into()],
            })
            .collect();
        match self.conn.xinput_xi_select_events(window, &masks) {
            Ok(_) => true,
            Err(err) => {
                debug!(target: targets::DISPLAY, window, %err, "cannot select tablet events");
                false
            }
        }
    }

    fn create_input_context(&self, window: Xid) -> Option<InputContextId> {
        let ic = self.input_method.as_ref()?.open();
        trace!(target: targets::DISPLAY, window, ic, "input context opened");
        Some(ic)
    }

    fn destroy_input_context(&self, ic: InputContextId) {
        if let Some(im) = &self.input_method {
            im.close(ic);
        }
    }

    fn filter_key_event(&self, ic: Option<InputContextId>, event: &KeyEvent) -> bool {
        let (Some(im), Some(ic)) = (&self.input_method, ic) else {
            return false;
        };
        matches!(im.feed(ic, self.level_keysym(event), event.pressed), ComposeOutcome::Consumed)
    }

    fn lookup_text(&self, ic: Option<InputContextId>, event: &KeyEvent) -> Option<String> {
        let committed = self
            .input_method
            .as_ref()
            .zip(ic)
            .and_then(|(im, ic)| im.take_committed(ic));
        committed.or_else(|| self.keysym_text(event))
    }

    fn keysym(&self, keycode: u8) -> Keysym {
        self.keyboard.keysym(keycode, 0)
    }

    fn peek_event(&self) -> Option<NativeEvent> {
        if let Some(event) = self.pending.borrow().front() {
            return Some(*event);
        }
        match self.read_pending() {
            Ok(Some(event)) => {
                self.pending.borrow_mut().push_back(event);
                Some(event)
            }
            Ok(None) => None,
            Err(err) => {
                debug!(target: targets::DISPLAY, %err, "peek failed");
                None
            }
        }
    }

    fn poll_event(&self) -> DisplayResult<Option<NativeEvent>> {
        if let Some(event) = self.pending.borrow_mut().pop_front() {
            return Ok(Some(event));
        }
        self.read_pending()
    }

    fn wait_event(&self) -> DisplayResult<NativeEvent> {
        if let Some(event) = self.pending.borrow_mut().pop_front() {
            return Ok(event);
        }
        loop {
            let event = self.conn.wait_for_event()?;
            if let Some(converted) = self.convert(event) {
                return Ok(converted);
            }
        }
    }

    fn flush(&self) -> DisplayResult<()> {
        self.conn.flush()?;
        Ok(())
    }
}

impl Drop for X11Connection {
    fn drop(&mut self) {
        if let Some(font) = self.cursor_font.take() {
            let _ = self.conn.close_font(font);
        }
        let _ = self.conn.flush();
    }
}

impl std::fmt::Debug for X11Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Connection")
            .field("screen", &self.screen)
            .field("argb_cursors", &self.argb_format.is_some())
            .field("input_method", &self.input_method)
            .field("tablets", &self.tablets.len())
            .finish_non_exhaustive()
    }
}
