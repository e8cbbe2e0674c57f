//! Ports to the hosting environment's navigation and presentation layer

/// Full-page navigation
pub trait Navigator: Send + Sync {
    /// Navigate to `path`, discarding all in-memory client state
    fn hard_redirect(&self, path: &str);
}

/// The document root element, whose classes drive global styling
pub trait RootElement: Send + Sync {
    /// Add (`enabled`) or remove a class on the root element
    fn set_class(&self, class: &str, enabled: bool);
}
