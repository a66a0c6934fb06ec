use heapless::String as HString;
use pc_keyboard::{layouts::Us104Key, DecodedKey, HandleControl, KeyCode, Keyboard, ScancodeSet1};

const EXTENDED_PREFIX: u8 = 0xE0;

const BACKSPACE: char = '\u{8}';

pub const LINE_BUFFER_CAPACITY: usize = 256;
/// One byte of the buffer is kept free, matching the terminal history entry size.
pub const LINE_MAX_CHARS: usize = LINE_BUFFER_CAPACITY - 1;

pub type LineBuffer = HString<LINE_BUFFER_CAPACITY>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Enter,
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
}

/// Scancode set 1 decoder. `extended` mirrors the 0xE0 prefix so navigation
/// keys are only taken from two-byte sequences.
pub struct KeyDecoder {
    kb: Keyboard<Us104Key, ScancodeSet1>,
    extended: bool,
}

impl KeyDecoder {
    pub const fn new() -> Self {
        Self {
            kb: Keyboard::new(ScancodeSet1::new(), Us104Key, HandleControl::Ignore),
            extended: false,
        }
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn decode(&mut self, byte: u8) -> Option<KeyEvent> {
        let extended = self.extended;
        self.extended = byte == EXTENDED_PREFIX;
        let evt = match self.kb.add_byte(byte) {
            Ok(Some(evt)) => evt,
            _ => return None,
        };
        match self.kb.process_keyevent(evt)? {
            DecodedKey::RawKey(code) if extended => navigation(code),
            DecodedKey::RawKey(_) => None,
            DecodedKey::Unicode('\n') => Some(KeyEvent::Enter),
            DecodedKey::Unicode(BACKSPACE) => Some(KeyEvent::Backspace),
            DecodedKey::Unicode(ch) if ch == ' ' || ch.is_ascii_graphic() => Some(KeyEvent::Char(ch)),
            DecodedKey::Unicode(_) => None,
        }
    }
}

fn navigation(code: KeyCode) -> Option<KeyEvent> {
    match code {
        KeyCode::ArrowUp => Some(KeyEvent::HistoryPrev),
        KeyCode::ArrowDown => Some(KeyEvent::HistoryNext),
        KeyCode::PageUp => Some(KeyEvent::ScrollUp),
        KeyCode::PageDown => Some(KeyEvent::ScrollDown),
        _ => None,
    }
}

/// Bounded line-edit buffer, append-only with backspace.
pub struct LineEditor {
    buf: LineBuffer,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self { buf: LineBuffer::new() }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn push(&mut self, ch: char) -> bool {
        if self.len() >= LINE_MAX_CHARS {
            return false;
        }
        self.buf.push(ch).is_ok()
    }

    pub fn backspace(&mut self) {
        self.buf.pop();
    }

    /// Returns the current line and leaves the buffer empty.
    pub fn take(&mut self) -> LineBuffer {
        core::mem::take(&mut self.buf)
    }

    pub fn replace(&mut self, text: &str) {
        self.buf.clear();
        for ch in text.chars() {
            if !self.push(ch) {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(dec: &mut KeyDecoder, bytes: &[u8]) -> heapless::Vec<KeyEvent, 16> {
        let mut out = heapless::Vec::new();
        for &b in bytes {
            if let Some(ev) = dec.decode(b) {
                let _ = out.push(ev);
            }
        }
        out
    }

    #[test]
    fn letters_and_enter() {
        let mut dec = KeyDecoder::new();
        // h e l p, with releases interleaved
        let ev = decode_all(&mut dec, &[0x23, 0xA3, 0x12, 0x92, 0x26, 0xA6, 0x19, 0x99, 0x1C, 0x9C]);
        assert_eq!(
            ev.as_slice(),
            &[
                KeyEvent::Char('h'),
                KeyEvent::Char('e'),
                KeyEvent::Char('l'),
                KeyEvent::Char('p'),
                KeyEvent::Enter,
            ]
        );
    }

    #[test]
    fn extended_sequences() {
        let mut dec = KeyDecoder::new();
        assert_eq!(dec.decode(0xE0), None);
        assert!(dec.is_extended());
        assert_eq!(dec.decode(0x48), Some(KeyEvent::HistoryPrev));
        assert!(!dec.is_extended());
        let ev = decode_all(&mut dec, &[0xE0, 0x50, 0xE0, 0x49, 0xE0, 0x51, 0xE0, 0xC8, 0xE0, 0x1D]);
        assert_eq!(
            ev.as_slice(),
            &[KeyEvent::HistoryNext, KeyEvent::ScrollUp, KeyEvent::ScrollDown]
        );
        // non-extended 0x48 is keypad 8 with num lock on
        assert_eq!(dec.decode(0x48), Some(KeyEvent::Char('8')));
        assert!(!dec.is_extended());
    }

    #[test]
    fn shift_selects_upper_layout() {
        let mut dec = KeyDecoder::new();
        assert_eq!(dec.decode(0x2A), None);
        assert_eq!(dec.decode(0x1E), Some(KeyEvent::Char('A')));
        assert_eq!(dec.decode(0x02), Some(KeyEvent::Char('!')));
        assert_eq!(dec.decode(0xAA), None);
        assert_eq!(dec.decode(0x1E), Some(KeyEvent::Char('a')));
        assert_eq!(dec.decode(0x36), None);
        assert_eq!(dec.decode(0x0D), Some(KeyEvent::Char('+')));
        assert_eq!(dec.decode(0xB6), None);
    }

    #[test]
    fn control_keys_are_not_printable() {
        let mut dec = KeyDecoder::new();
        assert_eq!(dec.decode(0x0E), Some(KeyEvent::Backspace));
        assert_eq!(dec.decode(0x0F), None);
        assert_eq!(dec.decode(0x01), None);
        assert_eq!(dec.decode(0x39), Some(KeyEvent::Char(' ')));
    }

    #[test]
    fn editor_respects_capacity() {
        let mut line = LineEditor::new();
        for _ in 0..300 {
            line.push('x');
        }
        assert_eq!(line.len(), LINE_MAX_CHARS);
        assert!(!line.push('y'));
    }

    #[test]
    fn editor_backspace_and_take() {
        let mut line = LineEditor::new();
        line.backspace();
        assert!(line.is_empty());
        line.replace("lsx");
        line.backspace();
        assert_eq!(line.as_str(), "ls");
        let taken = line.take();
        assert_eq!(taken.as_str(), "ls");
        assert!(line.is_empty());
    }
}
