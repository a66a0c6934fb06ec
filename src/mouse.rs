const PACKET_LEN: usize = 3;

const FLAG_SYNC: u8 = 0x08;
const FLAG_OVERFLOW: u8 = 0xC0;
const BUTTON_MASK: u8 = 0x07;
pub const BUTTON_LEFT: u8 = 0x01;

fn clamp_i32(v: i32, min: i32, max: i32) -> i32 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

/// Assembles 3-byte PS/2 packets into an absolute pointer position.
pub struct MouseDecoder {
    packet: [u8; PACKET_LEN],
    cycle: usize,
    x: i32,
    y: i32,
    max_x: i32,
    max_y: i32,
    buttons: u8,
}

impl MouseDecoder {
    pub const fn new() -> Self {
        Self {
            packet: [0; PACKET_LEN],
            cycle: 0,
            x: 0,
            y: 0,
            max_x: 0,
            max_y: 0,
            buttons: 0,
        }
    }

    pub fn set_bounds(&mut self, width: usize, height: usize) {
        self.max_x = i32::try_from(width.saturating_sub(1)).unwrap_or(i32::MAX);
        self.max_y = i32::try_from(height.saturating_sub(1)).unwrap_or(i32::MAX);
        self.x = clamp_i32(self.x, 0, self.max_x);
        self.y = clamp_i32(self.y, 0, self.max_y);
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = clamp_i32(x, 0, self.max_x);
        self.y = clamp_i32(y, 0, self.max_y);
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    pub fn left_pressed(&self) -> bool {
        self.buttons & BUTTON_LEFT != 0
    }

    /// Feeds one byte; returns true when it completed a packet.
    pub fn push_byte(&mut self, byte: u8) -> bool {
        if self.cycle >= PACKET_LEN {
            self.cycle = 0;
        }
        if self.cycle == 0 && byte & FLAG_SYNC == 0 {
            return false;
        }
        self.packet[self.cycle] = byte;
        self.cycle += 1;
        if self.cycle < PACKET_LEN {
            return false;
        }
        self.cycle = 0;
        self.apply_packet();
        true
    }

    fn apply_packet(&mut self) {
        let flags = self.packet[0];
        self.buttons = flags & BUTTON_MASK;
        if flags & FLAG_OVERFLOW != 0 {
            return;
        }
        let dx = self.packet[1] as i8 as i32;
        let dy = self.packet[2] as i8 as i32;
        self.x = clamp_i32(self.x.saturating_add(dx), 0, self.max_x);
        self.y = clamp_i32(self.y.saturating_sub(dy), 0, self.max_y);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonSample {
    pub pressed: bool,
    pub released: bool,
    pub down: bool,
}

/// Press/release edge detection with a press debounce window.
pub struct ButtonEdges {
    prev: bool,
    last_press: Option<u64>,
    debounce_ticks: u64,
}

impl ButtonEdges {
    pub const fn new(debounce_ticks: u64) -> Self {
        Self { prev: false, last_press: None, debounce_ticks }
    }

    pub fn set_debounce(&mut self, ticks: u64) {
        self.debounce_ticks = ticks;
    }

    /// Compares `level` against the last accepted level.
    ///
    /// A press arriving inside the debounce window is not accepted and the
    /// stored level stays released, so a held button registers on a later
    /// sample once the window has passed.
    pub fn sample(&mut self, level: bool, now: u64) -> ButtonSample {
        let mut out = ButtonSample { down: level, ..ButtonSample::default() };
        if level && !self.prev {
            let settled = match self.last_press {
                Some(t) => now.saturating_sub(t) >= self.debounce_ticks,
                None => true,
            };
            if !settled {
                out.down = false;
                return out;
            }
            self.last_press = Some(now);
            out.pressed = true;
        } else if !level && self.prev {
            out.released = true;
        }
        self.prev = level;
        out
    }
}
