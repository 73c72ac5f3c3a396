//! Transient, non-blocking notices reporting how an action went.

use std::sync::Mutex;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, text: &str);

    fn success(&self, text: &str) {
        self.notify(Level::Success, text);
    }

    fn error(&self, text: &str) {
        self.notify(Level::Error, text);
    }
}

/// Prints notices to stderr beside the REPL output.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, level: Level, text: &str) {
        debug!(?level, "{}", text);
        match level {
            Level::Success => eprintln!("[ok] {}", text),
            Level::Error => eprintln!("[error] {}", text),
        }
    }
}

/// Keeps every notice in memory, in arrival order.
#[derive(Default)]
pub struct MemoryNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == Level::Error)
            .map(|n| n.text)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: Level, text: &str) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Notification { level, text: text.to_string() });
    }
}
