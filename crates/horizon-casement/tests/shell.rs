//! Integration tests for the window shell's public API.
//!
//! Tests that need a running X server are ignored by default:
//!
//! ```text
//! cargo test -p horizon-casement -- --ignored
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use horizon_casement::{CasementError, ShellConfig, WindowId, WindowRegistry};

#[test]
fn test_registry_shared_between_threads() {
    let registry: Arc<WindowRegistry<String>> = Arc::new(WindowRegistry::new());

    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .register(WindowId::from_raw(i), format!("window {i}"))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 4);
    let mut ids = registry.ids();
    ids.sort();
    assert_eq!(ids, (0..4).map(WindowId::from_raw).collect::<Vec<_>>());
    assert_eq!(&*registry.lookup(WindowId::from_raw(2)).unwrap(), "window 2");
}

#[test]
fn test_registry_rejects_duplicates_and_tolerates_unknown_removal() {
    let registry = WindowRegistry::new();
    let id = WindowId::from_raw(0x0040_0001);

    registry.register(id, 1).unwrap();
    assert!(matches!(registry.register(id, 2), Err(CasementError::DuplicateWindow(_))));
    assert_eq!(*registry.lookup(id).unwrap(), 1);

    assert_eq!(registry.unregister(id), Some(1));
    assert_eq!(registry.unregister(id), None);
    assert!(registry.lookup(id).is_none());
}

#[test]
fn test_registry_mutation_through_closure() {
    let registry = WindowRegistry::new();
    let id = WindowId::from_raw(9);
    registry.register(id, vec![1, 2]).unwrap();

    let len = registry.with_window_mut(id, |list| {
        list.push(3);
        list.len()
    });
    assert_eq!(len, Some(3));
    assert_eq!(registry.with_window_mut(WindowId::from_raw(10), |list| list.len()), None);
}

#[test]
fn test_config_defaults_and_overrides() {
    let config = ShellConfig::default();
    assert_eq!(config.class_name(), ShellConfig::DEFAULT_CLASS_NAME);
    assert_eq!(config.double_click_timeout(), Duration::from_millis(250));
    assert_eq!(config.display_name(), None);

    let config = ShellConfig::new()
        .with_class_name("Viewer")
        .with_resize_increment(0)
        .with_display_name(":1");
    assert_eq!(config.instance_name(), "viewer");
    assert_eq!(config.resize_increment(), 1);
    assert_eq!(config.display_name(), Some(":1"));
}

#[cfg(target_os = "linux")]
mod live {
    use std::rc::Rc;

    use horizon_casement::platform::DefaultSystem;
    use horizon_casement::{EventBuffer, NativeCursor, PlatformWindow, Rect, ShellConfig, WindowSpec};

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    #[ignore = "requires a running X server"]
    fn test_window_lifecycle_on_real_display() {
        init_logging();
        let events = Rc::new(EventBuffer::new());
        let system = DefaultSystem::connect(ShellConfig::default(), events.clone()).unwrap();

        let spec = WindowSpec::new("Casement test").with_content_rect(Rect::new(50, 50, 320, 240));
        let id = system.create_window(&spec).unwrap();

        system.with_window(id, |window| {
            window.set_title("Casement test - renamed");
            assert_eq!(window.title(), "Casement test - renamed");
            assert!(window.set_native_mouse_cursor(NativeCursor::IBeam));
            assert!(window.set_native_mouse_cursor(NativeCursor::Hidden));
        });

        system.pump_events().unwrap();
        system.destroy_window(id).unwrap();
        assert_eq!(system.window_count(), 0);
    }
}
