//! Reporting capability handed to the generators.
//!
//! Template builders never report anything; only the writer in
//! [`crate::generate`] does, through whatever `Reporter` its caller supplies.

pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, _message: &str) {}
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// Keeps every message in memory, in emission order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: std::cell::RefCell<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
}
