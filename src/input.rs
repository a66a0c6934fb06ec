use core::sync::atomic::{AtomicU32, Ordering};
use heapless::{Deque, Vec as HVec};

use crate::irq::IrqMutex;
use crate::keyboard::{KeyDecoder, KeyEvent, LineBuffer, LineEditor};
use crate::mouse::{ButtonEdges, ButtonSample, MouseDecoder};
use crate::serial;
use crate::timer;

pub const EVENT_QUEUE_LEN: usize = 32;
pub const FRAME_EVENTS: usize = 16;

const DEFAULT_DEBOUNCE_TICKS: u64 = 10;

const KBD_ACK: u8 = 0xFA;
const KBD_RESEND: u8 = 0xFE;

/// Keyboard work the main loop has to finish against compositor state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
    /// A completed line; the edit buffer has already been cleared.
    Submit(LineBuffer),
}

/// Everything the main loop needs from one masked read.
#[derive(Debug)]
pub struct InputFrame {
    pub x: i32,
    pub y: i32,
    pub buttons: ButtonSample,
    pub events: HVec<InputEvent, FRAME_EVENTS>,
}

/// State written from interrupt context and read by the main loop.
pub struct InputDecoder {
    keys: KeyDecoder,
    line: LineEditor,
    mouse: MouseDecoder,
    edges: ButtonEdges,
    events: Deque<InputEvent, EVENT_QUEUE_LEN>,
    dropped: u32,
}

impl InputDecoder {
    pub const fn new() -> Self {
        Self {
            keys: KeyDecoder::new(),
            line: LineEditor::new(),
            mouse: MouseDecoder::new(),
            edges: ButtonEdges::new(DEFAULT_DEBOUNCE_TICKS),
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Sets pointer bounds and centres the pointer.
    pub fn set_screen(&mut self, width: usize, height: usize) {
        self.mouse.set_bounds(width, height);
        let cx = i32::try_from(width / 2).unwrap_or(0);
        let cy = i32::try_from(height / 2).unwrap_or(0);
        self.mouse.set_position(cx, cy);
    }

    pub fn set_debounce(&mut self, ticks: u64) {
        self.edges.set_debounce(ticks);
    }

    pub fn keyboard_byte(&mut self, byte: u8) {
        if byte == KBD_ACK || byte == KBD_RESEND {
            return;
        }
        let Some(event) = self.keys.decode(byte) else {
            return;
        };
        match event {
            KeyEvent::Char(ch) => {
                self.line.push(ch);
            }
            KeyEvent::Backspace => self.line.backspace(),
            KeyEvent::Enter => {
                let line = self.line.take();
                self.queue(InputEvent::Submit(line));
            }
            KeyEvent::HistoryPrev => self.queue(InputEvent::HistoryPrev),
            KeyEvent::HistoryNext => self.queue(InputEvent::HistoryNext),
            KeyEvent::ScrollUp => self.queue(InputEvent::ScrollUp),
            KeyEvent::ScrollDown => self.queue(InputEvent::ScrollDown),
        }
    }

    pub fn mouse_byte(&mut self, byte: u8) {
        self.mouse.push_byte(byte);
    }

    fn queue(&mut self, event: InputEvent) {
        if self.events.push_back(event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            serial::write_try("input: event queue full, key dropped");
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Samples the pointer, derives button edges and drains queued events.
    pub fn poll(&mut self, now: u64) -> InputFrame {
        let (x, y) = self.mouse.position();
        let buttons = self.edges.sample(self.mouse.left_pressed(), now);
        let mut events = HVec::new();
        while !events.is_full() {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            let _ = events.push(event);
        }
        InputFrame { x, y, buttons, events }
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn line_snapshot(&self) -> LineBuffer {
        let mut out = LineBuffer::new();
        let _ = out.push_str(self.line.as_str());
        out
    }

    pub fn replace_line(&mut self, text: &str) {
        self.line.replace(text);
    }
}

static IRQ_COUNT: AtomicU32 = AtomicU32::new(0);

pub static INPUT: IrqMutex<InputDecoder> = IrqMutex::new(InputDecoder::new());

pub fn irq_count() -> u32 {
    IRQ_COUNT.load(Ordering::Relaxed)
}

/// IRQ1 entry: one byte read from the PS/2 data port.
pub fn keyboard_interrupt(byte: u8) {
    IRQ_COUNT.fetch_add(1, Ordering::Relaxed);
    INPUT.lock(|decoder| decoder.keyboard_byte(byte));
}

/// IRQ12 entry.
pub fn mouse_interrupt(byte: u8) {
    IRQ_COUNT.fetch_add(1, Ordering::Relaxed);
    INPUT.lock(|decoder| decoder.mouse_byte(byte));
}

/// IRQ0 entry.
pub fn timer_interrupt() {
    IRQ_COUNT.fetch_add(1, Ordering::Relaxed);
    timer::tick();
}
