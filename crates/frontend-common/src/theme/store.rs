//! Persisted light/dark preference

use ovoz_core::storage::THEME_KEY;
use ovoz_core::theme::DARK_CLASS;
use ovoz_core::{KeyValueStore, RootElement, Theme};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Theme store
///
/// Every change is written to storage and mirrored as the `dark` class on the
/// root element before the setter returns.
#[derive(Clone)]
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    root: Arc<dyn RootElement>,
    state: Arc<watch::Sender<Theme>>,
}

impl ThemeStore {
    /// Load the stored preference and apply it right away
    pub fn new(storage: Arc<dyn KeyValueStore>, root: Arc<dyn RootElement>) -> Self {
        let theme = Theme::from_stored(storage.get(THEME_KEY).as_deref());
        let (state, _) = watch::channel(theme);
        let store = Self {
            storage,
            root,
            state: Arc::new(state),
        };
        store.apply(theme);
        store
    }

    pub fn theme(&self) -> Theme {
        *self.state.borrow()
    }

    pub fn is_dark(&self) -> bool {
        self.theme().is_dark()
    }

    /// Flip the theme and return the new value
    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggle();
        self.set_theme(next);
        next
    }

    pub fn set_dark(&self, dark: bool) {
        self.set_theme(Theme::from_dark(dark));
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.send_replace(theme);
        self.apply(theme);
    }

    /// Subscribe to theme changes
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.state.subscribe()
    }

    fn apply(&self, theme: Theme) {
        self.root.set_class(DARK_CLASS, theme.is_dark());
        if let Err(e) = self.storage.set(THEME_KEY, theme.as_str()) {
            warn!("Failed to persist theme: {e}");
        }
    }
}
