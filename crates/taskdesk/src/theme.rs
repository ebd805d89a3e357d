//! Persisted application theme.
//!
//! One global value (`light` or `dark`), rehydrated from durable storage when
//! the store is created, changed only through [`ThemeStore::set_theme`], and
//! readable from any thread. Subscribers are notified after each change has
//! been persisted.
//!
//! Storage holds a small versioned envelope under [`STORAGE_KEY`]:
//!
//! ```json
//! {"state":{"theme":"dark"},"version":0}
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key the theme envelope is stored under.
pub const STORAGE_KEY: &str = "apptheme-storage";

/// Envelope version written by this store. Anything else is discarded.
pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// Durable string key/value storage.
pub trait StateStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Replaced atomically via rename.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTheme {
    state: ThemeState,
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ThemeState {
    theme: Theme,
}

/// Handle returned by [`ThemeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Arc<dyn Fn(Theme) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// The global theme.
pub struct ThemeStore<S> {
    storage: S,
    theme: RwLock<Theme>,
    listeners: Mutex<Listeners>,
}

impl<S: StateStorage> ThemeStore<S> {
    /// Create the store and rehydrate it from `storage`.
    ///
    /// Missing, malformed or differently-versioned state falls back to the
    /// default theme; only an I/O failure reading storage is an error.
    pub fn hydrate(storage: S) -> Result<Self> {
        let theme = match storage.get_item(STORAGE_KEY)? {
            None => Theme::default(),
            Some(raw) => match serde_json::from_str::<PersistedTheme>(&raw) {
                Ok(persisted) if persisted.version == STATE_VERSION => persisted.state.theme,
                Ok(persisted) => {
                    tracing::warn!(
                        version = persisted.version,
                        "discarding theme state with unsupported version"
                    );
                    Theme::default()
                }
                Err(e) => {
                    tracing::warn!("discarding unreadable theme state: {e}");
                    Theme::default()
                }
            },
        };

        tracing::debug!(%theme, "theme state rehydrated");

        Ok(Self {
            storage,
            theme: RwLock::new(theme),
            listeners: Mutex::new(Listeners::default()),
        })
    }

    pub fn theme(&self) -> Theme {
        *self.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `theme`, then make it current and notify subscribers.
    ///
    /// If persisting fails the current theme is left unchanged.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.update(|_| theme).map(|_| ())
    }

    /// Switch between light and dark; returns the new theme.
    pub fn toggle(&self) -> Result<Theme> {
        self.update(Theme::toggled)
    }

    /// Return to the default theme, persisting and notifying like
    /// [`set_theme`](Self::set_theme).
    pub fn reset(&self) -> Result<()> {
        self.set_theme(Theme::default())
    }

    /// The write lock is held from reading the current value until the new
    /// one is both persisted and current, so storage and memory never
    /// disagree. Listeners run after it is released.
    fn update(&self, next: impl FnOnce(Theme) -> Theme) -> Result<Theme> {
        let theme = {
            let mut current = self.theme.write().unwrap_or_else(PoisonError::into_inner);
            let theme = next(*current);
            let envelope = PersistedTheme {
                state: ThemeState { theme },
                version: STATE_VERSION,
            };
            self.storage
                .set_item(STORAGE_KEY, &serde_json::to_string(&envelope)?)?;
            *current = theme;
            theme
        };

        // Snapshot so listeners may (un)subscribe from inside a callback.
        let listeners: Vec<Listener> = {
            let guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            guard.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(theme);
        }
        Ok(theme)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        let mut guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, Arc::new(listener)));
        Subscription(id)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.entries.len();
        guard.entries.retain(|(id, _)| *id != subscription.0);
        guard.entries.len() != before
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
