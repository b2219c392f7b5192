use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::SinkError;
use crate::palettes::ColorMap;

use super::ConfigSink;

/// An in-memory store that records every applied mapping in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    current: ColorMap,
    writes: Vec<ColorMap>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `colors` as the pre-existing static configuration.
    pub fn with_static(colors: ColorMap) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                current: colors,
                writes: Vec::new(),
            }),
        }
    }

    /// Every mapping applied so far, oldest first.
    pub fn writes(&self) -> Vec<ColorMap> {
        self.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    pub fn current(&self) -> ColorMap {
        self.lock().current.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn read_static(&self) -> Result<ColorMap, SinkError> {
        Ok(self.current())
    }

    fn apply(&self, colors: &ColorMap) -> Result<(), SinkError> {
        let mut state = self.lock();
        state.current = colors.clone();
        state.writes.push(colors.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes_in_order() {
        let sink = MemorySink::new();
        let first = ColorMap::from([("bg".to_string(), "#000000".to_string())]);
        let second = ColorMap::from([("bg".to_string(), "#ffffff".to_string())]);

        sink.apply(&first).unwrap();
        sink.apply(&second).unwrap();

        assert_eq!(sink.writes(), vec![first, second.clone()]);
        assert_eq!(sink.read_static().unwrap(), second);
    }
}
