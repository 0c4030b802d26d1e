//! Typewriter animation for the greeting banner.
//!
//! Two sequences share one displayed buffer: a reveal that appends one
//! character of the source text per tick, and an erase that walks from the
//! end of the source text back to the start after a fixed startup delay.
//! The state machine is advanced externally via [`GreetingBanner::tick`];
//! the caller owns the clock, so tests fast-forward by calling `tick`
//! directly instead of waiting on timers.

use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

/// Cadence of both the reveal and erase sequences.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Ticks between triggering the erase and its first removal (1 s at the
/// 100 ms cadence).
pub const ERASE_DELAY_TICKS: u32 = 10;

struct EraseState {
    /// Remaining ticks before the first removal fires.
    delay_ticks: u32,
    /// Position of the next character to remove, counted in source
    /// characters. Starts at the last character of the full source text,
    /// not the currently revealed prefix.
    cursor: usize,
}

/// Character-by-character reveal/erase state machine for the greeting text.
///
/// "Character" means an extended grapheme cluster, so multi-byte glyphs and
/// emoji animate as single units.
pub struct GreetingBanner {
    source: Vec<String>,
    display: Vec<String>,
    reveal_cursor: usize,
    erase: Option<EraseState>,
    erase_finished: bool,
}

impl GreetingBanner {
    pub fn new(text: &str) -> Self {
        let source: Vec<String> = text.graphemes(true).map(str::to_string).collect();
        Self {
            source,
            display: Vec::new(),
            reveal_cursor: 0,
            erase: None,
            erase_finished: false,
        }
    }

    /// The currently displayed text.
    pub fn displayed(&self) -> String {
        self.display.concat()
    }

    /// True once every source character has been revealed.
    pub fn is_fully_revealed(&self) -> bool {
        self.reveal_cursor >= self.source.len()
    }

    /// True while a tick could still change the displayed text.
    pub fn is_animating(&self) -> bool {
        !self.is_fully_revealed() || (self.erase.is_some() && !self.erase_finished)
    }

    /// Start the erase sequence.
    ///
    /// A repeated trigger cancels and replaces any pending erase rather than
    /// stacking timers. Once the erase has run to the start boundary it is
    /// finished for good and further triggers are ignored. An empty source
    /// text never erases.
    pub fn trigger_erase(&mut self) {
        if self.source.is_empty() || self.erase_finished {
            return;
        }
        self.erase = Some(EraseState {
            delay_ticks: ERASE_DELAY_TICKS,
            cursor: self.source.len() - 1,
        });
    }

    /// Advance both sequences by one tick.
    pub fn tick(&mut self) {
        self.tick_reveal();
        self.tick_erase();
    }

    fn tick_reveal(&mut self) {
        if self.reveal_cursor < self.source.len() {
            self.display.push(self.source[self.reveal_cursor].clone());
            self.reveal_cursor += 1;
        }
    }

    fn tick_erase(&mut self) {
        let Some(erase) = self.erase.as_mut() else {
            return;
        };

        if erase.delay_ticks > 0 {
            erase.delay_ticks -= 1;
            if erase.delay_ticks > 0 {
                return;
            }
            // The delayed first removal fires on this tick.
        }

        // The cursor indexes source positions; while the reveal is still
        // running the displayed buffer may be shorter, so clamp to the end.
        if !self.display.is_empty() {
            let index = erase.cursor.min(self.display.len() - 1);
            self.display.remove(index);
        }

        if erase.cursor == 0 {
            self.erase = None;
            self.erase_finished = true;
        } else {
            erase.cursor -= 1;
        }
    }
}
