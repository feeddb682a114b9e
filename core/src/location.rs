use std::fmt::Debug;
use std::sync::Mutex;
use std::sync::MutexGuard;

use autos_url_codec::CodecConfig;
use autos_url_codec::ParamMap;
use autos_url_codec::parse_query_string;
use autos_url_codec::to_query_string;
use tokio::sync::watch;

/// The page URL and its history.
pub trait Location: Send + Sync + Debug {
    fn current_params(&self) -> ParamMap;

    /// Point the URL at `params`. `replace` overwrites the current history
    /// entry instead of pushing a new one. Must not fire a navigation
    /// notification.
    fn set_params(&self, params: ParamMap, replace: bool);

    /// Fires with the new parameters whenever the user navigates
    /// (back/forward or an edited address bar).
    fn subscribe(&self) -> watch::Receiver<ParamMap>;
}

/// One call to [`Location::set_params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationWrite {
    pub params: ParamMap,
    pub replace: bool,
}

/// In-process [`Location`] with a browser-like history stack.
#[derive(Debug)]
pub struct MemoryLocation {
    history: Mutex<History>,
    navigation: watch::Sender<ParamMap>,
}

#[derive(Debug)]
struct History {
    entries: Vec<ParamMap>,
    index: usize,
    writes: Vec<LocationWrite>,
}

impl History {
    fn current(&self) -> ParamMap {
        self.entries.get(self.index).cloned().unwrap_or_default()
    }

    fn push(&mut self, params: ParamMap) {
        self.entries.truncate(self.index + 1);
        self.entries.push(params);
        self.index = self.entries.len() - 1;
    }
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::with_params(ParamMap::new())
    }

    pub fn with_params(params: ParamMap) -> Self {
        Self {
            navigation: watch::channel(params.clone()).0,
            history: Mutex::new(History {
                entries: vec![params],
                index: 0,
                writes: Vec::new(),
            }),
        }
    }

    pub fn with_query(raw: &str) -> Self {
        Self::with_params(parse_query_string(raw))
    }

    /// Simulate the user opening a new URL.
    pub fn navigate(&self, params: ParamMap) {
        self.lock().push(params.clone());
        self.navigation.send_replace(params);
    }

    pub fn back(&self) -> bool {
        self.step(-1)
    }

    pub fn forward(&self) -> bool {
        self.step(1)
    }

    fn step(&self, delta: isize) -> bool {
        let params = {
            let mut history = self.lock();
            let Some(index) = history.index.checked_add_signed(delta) else {
                return false;
            };
            if index >= history.entries.len() {
                return false;
            }
            history.index = index;
            history.current()
        };
        self.navigation.send_replace(params);
        true
    }

    /// `?`-prefixed query string in canonical order, or empty.
    pub fn href(&self, config: &CodecConfig) -> String {
        let query = to_query_string(config, &self.current_params());
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }

    pub fn writes(&self) -> Vec<LocationWrite> {
        self.lock().writes.clone()
    }

    pub fn history_len(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Location for MemoryLocation {
    fn current_params(&self) -> ParamMap {
        self.lock().current()
    }

    fn set_params(&self, params: ParamMap, replace: bool) {
        let mut history = self.lock();
        if replace {
            let index = history.index;
            if let Some(entry) = history.entries.get_mut(index) {
                *entry = params.clone();
            }
        } else {
            history.push(params.clone());
        }
        history.writes.push(LocationWrite { params, replace });
    }

    fn subscribe(&self) -> watch::Receiver<ParamMap> {
        self.navigation.subscribe()
    }
}
