// src/bridge/input.rs - Non-blocking key sources and key bindings
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Host-level interrupt (Ctrl-C in raw mode). Always quits.
    Interrupt,
}

/// Anything the bridge can poll for keys. `poll` must never wait.
pub trait KeySource {
    fn poll(&mut self) -> io::Result<Option<Key>>;
}

impl<K: KeySource + ?Sized> KeySource for Box<K> {
    fn poll(&mut self) -> io::Result<Option<Key>> {
        (**self).poll()
    }
}

/// A source that never has input, used when stdin is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeys;

impl KeySource for NoKeys {
    fn poll(&mut self) -> io::Result<Option<Key>> {
        Ok(None)
    }
}

/// Queue of keys fed by tests or a replay script.
///
/// Clones share the queue, so a handle kept outside the bridge can keep
/// feeding it. `pause` inserts a break: the poll that reaches it reports no
/// input, which ends that tick's key drain.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    queue: Arc<Mutex<VecDeque<Option<Key>>>>,
}

impl ScriptedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(keys: &str) -> Self {
        let scripted = Self::new();
        scripted.type_str(keys);
        scripted
    }

    pub fn push(&self, key: Key) {
        self.lock().push_back(Some(key));
    }

    pub fn type_str(&self, keys: &str) {
        self.lock().extend(keys.chars().map(|c| Some(Key::Char(c))));
    }

    pub fn pause(&self) {
        self.lock().push_back(None);
    }

    pub fn pending(&self) -> usize {
        self.lock().iter().filter(|k| k.is_some()).count()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Option<Key>>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeySource for ScriptedKeys {
    fn poll(&mut self) -> io::Result<Option<Key>> {
        Ok(self.lock().pop_front().flatten())
    }
}

/// Keys the harness itself interprets instead of forwarding to an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: char,
    #[serde(default = "default_switch_app")]
    pub switch_app: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            switch_app: default_switch_app(),
        }
    }
}

impl KeyBindings {
    /// One-line hint for the frame footer.
    pub fn hint(&self) -> String {
        format!("{} quit   {} next app", self.quit, self.switch_app)
    }
}

fn default_quit() -> char {
    'q'
}
fn default_switch_app() -> char {
    'm'
}
