use alloc::boxed::Box;
use bitflags::bitflags;
use core::fmt;
use heapless::String as HString;

use crate::config::TITLEBAR_HEIGHT;
use crate::surface::Surface;
use crate::terminal::TerminalId;

pub const TITLE_CAPACITY: usize = 63;
pub const BUTTON_SIZE: i32 = 18;
const BUTTON_TOP: i32 = 2;
const CLOSE_OFFSET: i32 = 20;
const MAXIMIZE_OFFSET: i32 = 40;
const MINIMIZE_OFFSET: i32 = 60;

pub type Title = HString<TITLE_CAPACITY>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const VISIBLE = 1 << 0;
        const FOCUSED = 1 << 1;
        const MINIMIZED = 1 << 2;
        const MAXIMIZED = 1 << 3;
        const DRAGGING = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// What a window's content area shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Content {
    Plain,
    Terminal(TerminalId),
}

/// Optional per-window behaviour. Every method defaults to doing nothing.
pub trait WindowHooks {
    fn on_close(&mut self, _id: WindowId) {}
    fn on_minimize(&mut self, _id: WindowId) {}
    fn on_maximize(&mut self, _id: WindowId, _maximized: bool) {}
    /// Draws into the content area, which starts below the titlebar.
    fn render_content(&mut self, _surface: &mut dyn Surface, _area: Geometry) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowError {
    MissingTitle,
    WidthOutOfRange(i32),
    HeightOutOfRange(i32),
    PoolExhausted,
}

impl WindowError {
    pub fn message(&self) -> &'static str {
        match self {
            WindowError::MissingTitle => "window title is empty",
            WindowError::WidthOutOfRange(_) => "window width out of range",
            WindowError::HeightOutOfRange(_) => "window height out of range",
            WindowError::PoolExhausted => "too many windows",
        }
    }
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::WidthOutOfRange(w) => write!(f, "{} ({})", self.message(), w),
            WindowError::HeightOutOfRange(h) => write!(f, "{} ({})", self.message(), h),
            _ => f.write_str(self.message()),
        }
    }
}

pub struct Window {
    pub id: WindowId,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub(crate) saved: Option<Geometry>,
    pub title: Title,
    pub(crate) flags: WindowFlags,
    pub content: Content,
    pub(crate) hooks: Option<Box<dyn WindowHooks>>,
    pub(crate) drag_offset: (i32, i32),
}

impl Window {
    pub(crate) fn new(id: WindowId, geometry: Geometry, title: &str) -> Self {
        Self {
            id,
            x: geometry.x,
            y: geometry.y,
            w: geometry.w,
            h: geometry.h,
            saved: None,
            title: bounded_title(title),
            flags: WindowFlags::VISIBLE,
            content: Content::Plain,
            hooks: None,
            drag_offset: (0, 0),
        }
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn geometry(&self) -> Geometry {
        Geometry { x: self.x, y: self.y, w: self.w, h: self.h }
    }

    /// Content area: below the titlebar, `h` tall.
    pub fn content_area(&self) -> Geometry {
        Geometry { x: self.x, y: self.y + TITLEBAR_HEIGHT, w: self.w, h: self.h }
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(WindowFlags::FOCUSED)
    }

    pub fn is_minimized(&self) -> bool {
        self.flags.contains(WindowFlags::MINIMIZED)
    }

    pub fn is_maximized(&self) -> bool {
        self.flags.contains(WindowFlags::MAXIMIZED)
    }

    pub fn is_dragging(&self) -> bool {
        self.flags.contains(WindowFlags::DRAGGING)
    }

    /// Visible and not minimized.
    pub fn is_shown(&self) -> bool {
        self.flags.contains(WindowFlags::VISIBLE) && !self.is_minimized()
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + TITLEBAR_HEIGHT + self.h
    }

    pub fn is_in_titlebar(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + TITLEBAR_HEIGHT
    }

    fn in_button(&self, offset: i32, px: i32, py: i32) -> bool {
        let bx = self.x + self.w - offset;
        let by = self.y + BUTTON_TOP;
        px >= bx && px < bx + BUTTON_SIZE && py >= by && py < by + BUTTON_SIZE
    }

    pub fn is_in_close_button(&self, px: i32, py: i32) -> bool {
        self.in_button(CLOSE_OFFSET, px, py)
    }

    pub fn is_in_minimize_button(&self, px: i32, py: i32) -> bool {
        self.in_button(MINIMIZE_OFFSET, px, py)
    }

    pub fn is_in_maximize_button(&self, px: i32, py: i32) -> bool {
        self.in_button(MAXIMIZE_OFFSET, px, py)
    }

    pub(crate) fn control_origin(&self, control: Control) -> (i32, i32) {
        let offset = match control {
            Control::Minimize => MINIMIZE_OFFSET,
            Control::Maximize => MAXIMIZE_OFFSET,
            Control::Close => CLOSE_OFFSET,
        };
        (self.x + self.w - offset, self.y + BUTTON_TOP)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Control {
    Minimize,
    Maximize,
    Close,
}

/// Copies `title`, cutting at the last char that fits.
pub fn bounded_title(title: &str) -> Title {
    let mut out = Title::new();
    for ch in title.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
