//! Shell-wide configuration.

use std::time::Duration;

/// Settings shared by every window of a display connection.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use horizon_casement::ShellConfig;
///
/// let config = ShellConfig::new()
///     .with_class_name("Editor")
///     .with_double_click_timeout(Duration::from_millis(300));
///
/// assert_eq!(config.instance_name(), "editor");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// WM_CLASS class name.
    class_name: String,
    /// Longest gap between two presses that still counts as a double click.
    double_click_timeout: Duration,
    /// Resize increment hint in device pixels.
    resize_increment: i32,
    /// Display to connect to; `None` uses `$DISPLAY`.
    display_name: Option<String>,
}

impl ShellConfig {
    /// Default WM_CLASS class name.
    pub const DEFAULT_CLASS_NAME: &'static str = "Horizon";
    pub const DEFAULT_DOUBLE_CLICK_TIMEOUT: Duration = Duration::from_millis(250);
    pub const DEFAULT_RESIZE_INCREMENT: i32 = 4;

    pub fn new() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS_NAME.to_string(),
            double_click_timeout: Self::DEFAULT_DOUBLE_CLICK_TIMEOUT,
            resize_increment: Self::DEFAULT_RESIZE_INCREMENT,
            display_name: None,
        }
    }

    /// Set the WM_CLASS class name.
    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }

    /// Set the double-click timeout.
    pub fn with_double_click_timeout(mut self, timeout: Duration) -> Self {
        self.double_click_timeout = timeout;
        self
    }

    /// Set the resize increment hint. Values below 1 are clamped to 1.
    pub fn with_resize_increment(mut self, increment: i32) -> Self {
        self.resize_increment = increment.max(1);
        self
    }

    /// Connect to a specific display instead of `$DISPLAY`.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// WM_CLASS instance name: the lowercase class name.
    pub fn instance_name(&self) -> String {
        self.class_name.to_lowercase()
    }

    pub fn double_click_timeout(&self) -> Duration {
        self.double_click_timeout
    }

    pub fn resize_increment(&self) -> i32 {
        self.resize_increment
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.class_name(), "Horizon");
        assert_eq!(config.instance_name(), "horizon");
        assert_eq!(config.double_click_timeout(), Duration::from_millis(250));
        assert_eq!(config.resize_increment(), 4);
        assert_eq!(config.display_name(), None);
    }

    #[test]
    fn test_builder() {
        let config = ShellConfig::new()
            .with_class_name("Paint")
            .with_resize_increment(0)
            .with_display_name(":1");
        assert_eq!(config.instance_name(), "paint");
        assert_eq!(config.resize_increment(), 1);
        assert_eq!(config.display_name(), Some(":1"));
    }
}
