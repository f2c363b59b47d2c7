//! Integration tests for the platform-neutral window model.

use horizon_casement_core::{
    Border, ChannelEventQueue, Event, EventBuffer, EventKind, EventQueue, ImageSurface, KeyModifiers,
    MouseButton, NativeCursor, Point, Rect, Size, Surface, SurfaceError, SurfaceFormat, WindowAction,
    WindowId, WindowSpec,
};

#[test]
fn test_frame_and_client_rects_round_trip_through_insets() {
    let client = Rect::new(200, 150, 1024, 768);
    let insets = Border::new(4, 30, 4, 4);

    let frame = client.enlarged(insets);
    assert_eq!(frame, Rect::new(196, 120, 1032, 802));
    assert_eq!(frame.shrunk(insets), client);
}

#[test]
fn test_logical_positions_floor_outside_the_window() {
    // A captured pointer dragged left of the window reports negative
    // device coordinates.
    assert_eq!(Point::new(-3, 5).to_logical(2), Point::new(-2, 2));
    assert_eq!(Size::new(801, 600).to_logical(2), Size::new(400, 300));
    assert_eq!(Rect::new(1, 2, 3, 4).to_device(3), Rect::new(3, 6, 9, 12));
}

#[test]
fn test_events_are_queued_in_order() {
    let queue = EventBuffer::new();
    let window = WindowId::from_raw(0x0040_0001);

    queue.queue_event(
        Event::mouse(EventKind::MouseDown, Point::new(10, 10))
            .with_button(MouseButton::Left)
            .with_window(window),
    );
    queue.queue_event(Event::resize(Size::new(320, 240)).with_window(window));
    queue.queue_event(Event::new(EventKind::CloseWindow).with_window(window));

    let kinds: Vec<_> = queue.drain().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::MouseDown, EventKind::Resize, EventKind::CloseWindow]);
    assert!(queue.is_empty());
}

#[test]
fn test_channel_queue_crosses_threads() {
    let (queue, receiver) = ChannelEventQueue::unbounded();

    let producer = std::thread::spawn(move || {
        for i in 0..3 {
            queue.queue_event(Event::mouse(EventKind::MouseMove, Point::new(i, i)));
        }
    });
    producer.join().unwrap();

    let positions: Vec<_> = receiver.try_iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]);
}

#[test]
fn test_key_event_payload() {
    let event = Event::key(EventKind::KeyDown, horizon_casement_core::KeyScancode::A)
        .with_modifiers(KeyModifiers::SHIFT | KeyModifiers::SPACE)
        .with_unicode_char(Some('A'));

    assert!(event.kind.is_key());
    assert!(!event.kind.is_mouse());
    assert!(event.modifiers.contains(KeyModifiers::SPACE));
    assert_eq!(event.unicode_char, Some('A'));
}

#[test]
fn test_surface_from_rgba_is_argb() {
    let rgba = [0x11, 0x22, 0x33, 0x44, 0xaa, 0xbb, 0xcc, 0xdd];
    let surface = ImageSurface::from_rgba(&rgba, 2, 1).unwrap();

    assert_eq!(surface.format(), SurfaceFormat::ARGB32);
    assert_eq!(surface.row(0), &[0x4411_2233, 0xddaa_bbcc]);
    assert!(matches!(
        ImageSurface::from_rgba(&rgba, 3, 1),
        Err(SurfaceError::DataSizeMismatch { expected: 3, actual: 2 })
    ));
}

#[test]
fn test_surface_formats_convert_to_argb() {
    assert_eq!(SurfaceFormat::ABGR32.to_argb(0x80ff_0000), 0x8000_00ff);
    assert_eq!(SurfaceFormat::ARGB32.to_argb(0x1234_5678), 0x1234_5678);
}

#[test]
fn test_spec_prefers_frame_placement() {
    let spec = WindowSpec::new("Palette")
        .with_content_rect(Rect::new(0, 0, 300, 200))
        .with_floating(true)
        .with_parent(WindowId::from_raw(7));
    assert_eq!(spec.initial_rect(), (Rect::new(0, 0, 300, 200), false));
    assert_eq!(spec.parent(), Some(WindowId::from_raw(7)));

    let framed = spec.with_frame(Rect::new(10, 10, 320, 240));
    assert_eq!(framed.initial_rect(), (Rect::new(10, 10, 320, 240), true));
}

#[test]
fn test_cursor_and_action_vocabulary() {
    assert_eq!(NativeCursor::ALL.len(), 19);
    assert_eq!(NativeCursor::default(), NativeCursor::Arrow);
    assert!(WindowAction::ResizeFromBottomRight.is_resize());
    assert!(!WindowAction::Move.is_resize());
}
