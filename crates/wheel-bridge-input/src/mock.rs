//! Recording sink for tests.

use crate::error::InputError;
use crate::ScrollSink;

/// A [`ScrollSink`] that records raw engine output instead of emitting it.
///
/// Orientation policy lives in the real sink, so the recorded tick pairs
/// are exactly what the gesture engine produced.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub scrolls: Vec<(i32, i32)>,
    pub clicks: usize,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn total_vertical(&self) -> i32 {
        self.scrolls.iter().map(|(v, _)| v).sum()
    }

    #[must_use]
    pub fn total_horizontal(&self) -> i32 {
        self.scrolls.iter().map(|(_, h)| h).sum()
    }
}

impl ScrollSink for RecordingSink {
    fn emit_scroll(&mut self, vertical: i32, horizontal: i32) -> Result<(), InputError> {
        if vertical != 0 || horizontal != 0 {
            self.scrolls.push((vertical, horizontal));
        }
        Ok(())
    }

    fn emit_click(&mut self) -> Result<(), InputError> {
        self.clicks += 1;
        Ok(())
    }
}
