use crate::surface::FramebufferInfo;

pub const TOPBAR_HEIGHT: i32 = 25;
pub const TASKBAR_HEIGHT: i32 = 30;
pub const TITLEBAR_HEIGHT: i32 = 22;

const DEFAULT_BACKGROUND: u32 = 0x1E1E1E;
const DEFAULT_TOPBAR: u32 = 0x2C3E50;
const DEFAULT_DEBOUNCE_TICKS: u64 = 10;
const DEFAULT_MAX_TERMINALS: usize = 16;

/// Screen size plus the fixed bands carved out of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub screen_w: i32,
    pub screen_h: i32,
    pub topbar_h: i32,
    pub taskbar_h: i32,
    pub titlebar_h: i32,
}

impl Layout {
    pub const fn new(screen_w: i32, screen_h: i32) -> Self {
        Self {
            screen_w,
            screen_h,
            topbar_h: TOPBAR_HEIGHT,
            taskbar_h: TASKBAR_HEIGHT,
            titlebar_h: TITLEBAR_HEIGHT,
        }
    }

    pub fn taskbar_y(&self) -> i32 {
        self.screen_h - self.taskbar_h
    }

    /// Height between the topbar and the taskbar.
    pub fn work_height(&self) -> i32 {
        (self.taskbar_y() - self.topbar_h).max(0)
    }

    /// Largest content height a window can have and still fit the work area.
    pub fn max_content_height(&self) -> i32 {
        (self.work_height() - self.titlebar_h).max(0)
    }

    /// Pulls a window's geometry back into the work area.
    ///
    /// Width and height are shrunk to fit first, then the position is
    /// clamped; the lower bounds are applied again last so a degenerate
    /// screen still yields a non-negative origin.
    pub fn clamp_window(&self, x: i32, y: i32, w: i32, h: i32) -> (i32, i32, i32, i32) {
        let w = w.min(self.screen_w).max(0);
        let h = h.min(self.max_content_height()).max(0);
        let max_x = self.screen_w - w;
        let max_y = self.taskbar_y() - self.titlebar_h - h;
        let mut nx = x.max(0).min(max_x);
        let mut ny = y.max(self.topbar_h).min(max_y);
        nx = nx.max(0);
        ny = ny.max(self.topbar_h);
        (nx, ny, w, h)
    }
}

#[derive(Clone, Debug)]
pub struct DesktopConfig {
    pub layout: Layout,
    pub label: &'static str,
    pub background: u32,
    pub topbar_color: u32,
    pub debounce_ticks: u64,
    pub max_terminals: usize,
    pub launcher_enabled: bool,
}

impl DesktopConfig {
    pub fn new(screen_w: i32, screen_h: i32) -> Self {
        Self {
            layout: Layout::new(screen_w, screen_h),
            label: "Windeck",
            background: DEFAULT_BACKGROUND,
            topbar_color: DEFAULT_TOPBAR,
            debounce_ticks: DEFAULT_DEBOUNCE_TICKS,
            max_terminals: DEFAULT_MAX_TERMINALS,
            launcher_enabled: true,
        }
    }

    pub fn for_framebuffer(info: &FramebufferInfo) -> Self {
        let w = i32::try_from(info.width).unwrap_or(i32::MAX);
        let h = i32::try_from(info.height).unwrap_or(i32::MAX);
        Self::new(w, h)
    }
}
