//! Horizon Casement Basic Window Example
//!
//! Opens a frameless window and drives it entirely from canonical events:
//! - Left drag moves the window through the window manager
//! - Double-click toggles maximize
//! - F11 toggles fullscreen, Escape or the close button quits
//! - The cursor switches to a resize arrow near the right edge
//! - An optional image path argument becomes the window icon
//!
//! Run with: RUST_LOG=horizon_casement=debug cargo run -p horizon-casement --example basic_window [icon.png]

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::rc::Rc;

    use horizon_casement::platform::DefaultSystem;
    use horizon_casement::{
        EventBuffer, EventKind, ImageSurface, KeyScancode, MouseButton, NativeCursor, PlatformWindow, Rect,
        ShellConfig, WindowAction, WindowSpec,
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let events = Rc::new(EventBuffer::new());
    let system = DefaultSystem::connect(ShellConfig::new().with_class_name("CasementDemo"), events.clone())?;

    let spec = WindowSpec::new("Casement demo")
        .with_content_rect(Rect::new(100, 100, 480, 320))
        .with_borderless(true);
    let id = system.create_window(&spec)?;

    if let Some(path) = std::env::args().nth(1) {
        let icon = ImageSurface::from_path(&path)?;
        system.with_window(id, |w| w.set_icons(&[&icon]));
    }

    'running: loop {
        system.wait_and_dispatch()?;

        for event in events.drain() {
            if event.window != Some(id) {
                continue;
            }
            match event.kind {
                EventKind::CloseWindow => break 'running,
                EventKind::KeyDown if event.scancode == KeyScancode::Esc => break 'running,
                EventKind::KeyDown if event.scancode == KeyScancode::F11 => {
                    system.with_window(id, |w| {
                        let state = !w.is_fullscreen();
                        w.set_fullscreen(state);
                    });
                }
                EventKind::MouseDoubleClick => {
                    system.with_window(id, |w| w.maximize());
                }
                EventKind::MouseDown if event.button == MouseButton::Left => {
                    system.with_window(id, |w| w.perform_window_action(WindowAction::Move, Some(&event)));
                }
                EventKind::MouseMove => {
                    system.with_window(id, |w| {
                        let near_edge = event.position.x >= w.client_size().width - 8;
                        let cursor = if near_edge { NativeCursor::SizeE } else { NativeCursor::Arrow };
                        w.set_native_mouse_cursor(cursor);
                    });
                }
                EventKind::Resize => {
                    tracing::info!(width = event.size.width, height = event.size.height, "resized");
                }
                _ => {}
            }
        }
    }

    system.destroy_window(id)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("this example needs an X11 display");
}
