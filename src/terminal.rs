use alloc::format;
use alloc::vec::Vec;
use heapless::String as HString;

use crate::ring::Ring;
use crate::serial;
use crate::surface::Surface;

pub const MAX_LINES: usize = 100;
pub const LINE_CAPACITY: usize = 120;
pub const VISIBLE_LINES: usize = 30;
pub const HISTORY_SIZE: usize = 50;
pub const HISTORY_ENTRY_CAPACITY: usize = 256;

pub const LINE_HEIGHT: i32 = 12;
const TEXT_COLOR: u32 = 0xCCCCCC;

pub type Line = HString<LINE_CAPACITY>;
pub type HistoryEntry = HString<HISTORY_ENTRY_CAPACITY>;

pub struct TerminalInstance {
    lines: Ring<Line>,
    history: Ring<HistoryEntry>,
    scroll_offset: usize,
    history_pos: usize,
}

impl TerminalInstance {
    pub fn try_new() -> Option<Self> {
        Some(Self {
            lines: Ring::try_with_capacity(MAX_LINES)?,
            history: Ring::try_with_capacity(HISTORY_SIZE)?,
            scroll_offset: 0,
            history_pos: 0,
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.count()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|l| l.as_str())
    }

    /// Most recent output first.
    pub fn recent_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter_newest_first().map(|l| l.as_str())
    }

    /// Appends `text` as one line, chunked at the line capacity.
    pub fn print(&mut self, text: &str) {
        let mut line = Line::new();
        for ch in text.chars() {
            if line.push(ch).is_err() {
                self.lines.push(core::mem::take(&mut line));
                let _ = line.push(ch);
            }
        }
        self.lines.push(line);
        self.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
    }

    fn max_scroll(&self) -> usize {
        self.lines.retained().saturating_sub(VISIBLE_LINES)
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = (self.scroll_offset + 1).min(self.max_scroll());
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Draws the visible window of output with its top-left at `(x, y)`.
    pub fn render(&self, surface: &mut dyn Surface, x: i32, y: i32) {
        let start = self
            .lines
            .count()
            .saturating_sub(VISIBLE_LINES + self.scroll_offset);
        let mut row_y = y;
        for line in self.lines.iter_from(start).take(VISIBLE_LINES) {
            if !line.is_empty() {
                surface.draw_text(x, row_y, line, TEXT_COLOR);
            }
            row_y += LINE_HEIGHT;
        }
    }

    pub fn history_count(&self) -> usize {
        self.history.count()
    }

    pub fn history_pos(&self) -> usize {
        self.history_pos
    }

    pub fn history_entry(&self, index: usize) -> Option<&str> {
        self.history.get(index).map(|e| e.as_str())
    }

    pub fn add_to_history(&mut self, cmd: &str) {
        if cmd.is_empty() {
            return;
        }
        let repeat = self.history.newest().map(|last| last.as_str() == cmd).unwrap_or(false);
        if !repeat {
            let mut entry = HistoryEntry::new();
            for ch in cmd.chars() {
                if entry.push(ch).is_err() {
                    break;
                }
            }
            self.history.push(entry);
        }
        self.reset_history_pos();
    }

    pub fn reset_history_pos(&mut self) {
        self.history_pos = self.history.count();
    }

    /// Steps back one entry, stopping at the oldest retained one.
    pub fn history_prev(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        if self.history_pos > self.history.oldest() {
            self.history_pos -= 1;
        }
        self.history_entry(self.history_pos)
    }

    /// Steps forward; past the newest entry the result is an empty line.
    pub fn history_next(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        if self.history_pos < self.history.count() {
            self.history_pos += 1;
        }
        if self.history_pos >= self.history.count() {
            return Some("");
        }
        self.history_entry(self.history_pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TerminalId(usize);

impl TerminalId {
    /// The shared instance every unowned print falls back to.
    pub const DEFAULT: TerminalId = TerminalId(0);
}

/// Live terminal instances; the default one is never released.
pub struct TerminalTable {
    default: TerminalInstance,
    slots: Vec<Option<TerminalInstance>>,
    limit: usize,
}

impl TerminalTable {
    /// `limit` caps the number of instances besides the default one.
    pub fn new(limit: usize) -> Option<Self> {
        Some(Self {
            default: TerminalInstance::try_new()?,
            slots: Vec::new(),
            limit,
        })
    }

    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn create(&mut self) -> Option<TerminalId> {
        if self.live() >= self.limit {
            serial::write("terminal: instance limit reached");
            return None;
        }
        let Some(instance) = TerminalInstance::try_new() else {
            serial::write("terminal: instance alloc failed");
            return None;
        };
        if let Some(idx) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[idx] = Some(instance);
            return Some(TerminalId(idx + 1));
        }
        if self.slots.try_reserve(1).is_err() {
            serial::write("terminal: table grow failed");
            return None;
        }
        self.slots.push(Some(instance));
        serial::write(&format!("terminal: instance {} created", self.slots.len()));
        Some(TerminalId(self.slots.len()))
    }

    pub fn release(&mut self, id: TerminalId) {
        if id == TerminalId::DEFAULT {
            return;
        }
        if let Some(slot) = self.slots.get_mut(id.0 - 1) {
            *slot = None;
        }
    }

    pub fn get(&self, id: TerminalId) -> Option<&TerminalInstance> {
        if id == TerminalId::DEFAULT {
            return Some(&self.default);
        }
        self.slots.get(id.0 - 1).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: TerminalId) -> Option<&mut TerminalInstance> {
        if id == TerminalId::DEFAULT {
            return Some(&mut self.default);
        }
        self.slots.get_mut(id.0 - 1).and_then(Option::as_mut)
    }

    /// The instance for `id`, or the default one when `id` is absent or stale.
    pub fn resolve_mut(&mut self, id: Option<TerminalId>) -> &mut TerminalInstance {
        let slot = match id {
            Some(TerminalId(n)) if n > 0 => self.slots.get_mut(n - 1).and_then(Option::as_mut),
            _ => None,
        };
        match slot {
            Some(term) => term,
            None => &mut self.default,
        }
    }

    pub fn default_mut(&mut self) -> &mut TerminalInstance {
        &mut self.default
    }
}
