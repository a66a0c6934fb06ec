use alloc::boxed::Box;
use alloc::format;

use crate::config::Layout;
use crate::serial;
use crate::surface::Surface;
use crate::window::{
    Content, Control, Geometry, Window, WindowError, WindowFlags, WindowHooks, WindowId, BUTTON_SIZE,
};

pub const MAX_WINDOWS: usize = 16;

pub const MIN_WIDTH: i32 = 100;
pub const MAX_WIDTH: i32 = 2000;
pub const MIN_HEIGHT: i32 = 80;
pub const MAX_HEIGHT: i32 = 1500;

pub const MIN_RESIZE_WIDTH: i32 = 200;
pub const MIN_RESIZE_HEIGHT: i32 = 150;

const TITLE_ACTIVE: u32 = 0x2C3E50;
const TITLE_INACTIVE: u32 = 0x555555;
const TITLE_TEXT: u32 = 0xFFFFFF;
const MINIMIZE_COLOR: u32 = 0xF39C12;
const MAXIMIZE_COLOR: u32 = 0x27AE60;
const CLOSE_COLOR: u32 = 0xE74C3C;
const GLYPH_COLOR: u32 = 0xFFFFFF;
const CONTENT_BG: u32 = 0x2C2C2C;
const BORDER_COLOR: u32 = 0x1A1A1A;

/// Told about windows leaving the pool so derived state can follow.
pub trait WindowEvents {
    fn window_closed(&mut self, id: WindowId, content: Content);
}

impl WindowEvents for () {
    fn window_closed(&mut self, _id: WindowId, _content: Content) {}
}

/// Draws what a window shows inside its content area.
pub trait ContentRenderer {
    fn render_content(&mut self, surface: &mut dyn Surface, window: &Window);
}

impl ContentRenderer for () {
    fn render_content(&mut self, _surface: &mut dyn Surface, _window: &Window) {}
}

pub struct WindowManager {
    slots: [Option<Window>; MAX_WINDOWS],
    focused: Option<WindowId>,
    next_id: u32,
    layout: Layout,
}

impl WindowManager {
    pub fn new(layout: Layout) -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            focused: None,
            next_id: 1,
            layout,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Live windows in pool order.
    pub fn windows(&self) -> impl Iterator<Item = &Window> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows().find(|w| w.id == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.slots.iter_mut().filter_map(Option::as_mut).find(|w| w.id == id)
    }

    fn index_of(&self, id: WindowId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().map(|w| w.id == id).unwrap_or(false))
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// Focus and content read together, as one snapshot.
    pub fn focused_content(&self) -> Option<(WindowId, Content)> {
        let id = self.focused?;
        self.window(id).map(|w| (id, w.content))
    }

    pub fn create_window(&mut self, x: i32, y: i32, w: i32, h: i32, title: &str) -> Result<WindowId, WindowError> {
        if title.is_empty() {
            return Err(WindowError::MissingTitle);
        }
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&w) {
            return Err(WindowError::WidthOutOfRange(w));
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&h) {
            return Err(WindowError::HeightOutOfRange(h));
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(WindowError::PoolExhausted);
        };

        let id = WindowId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);

        let (x, y, w, h) = self.layout.clamp_window(x, y, w, h);
        let window = Window::new(id, Geometry { x, y, w, h }, title);
        serial::write(&format!("wm: window {} '{}' at {},{} {}x{}", id, window.title, x, y, w, h));
        self.slots[slot] = Some(window);
        self.focus_window(id);
        Ok(id)
    }

    pub fn set_content(&mut self, id: WindowId, content: Content) {
        if let Some(win) = self.window_mut(id) {
            win.content = content;
        }
    }

    pub fn set_hooks(&mut self, id: WindowId, hooks: Box<dyn WindowHooks>) {
        if let Some(win) = self.window_mut(id) {
            win.hooks = Some(hooks);
        }
    }

    pub fn destroy_window(&mut self, id: WindowId, events: &mut dyn WindowEvents) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let content = match self.slots[idx].as_mut() {
            Some(win) => {
                if let Some(hooks) = win.hooks.as_mut() {
                    hooks.on_close(id);
                }
                win.content
            }
            None => return,
        };
        events.window_closed(id, content);
        self.slots[idx] = None;
        serial::write(&format!("wm: window {} destroyed", id));
        if self.focused == Some(id) {
            self.focused = None;
            self.refocus();
        }
    }

    pub fn focus_window(&mut self, id: WindowId) {
        if self.index_of(id).is_some() {
            self.set_focus(Some(id));
        }
    }

    /// Sole writer of the FOCUSED flag.
    fn set_focus(&mut self, target: Option<WindowId>) {
        for win in self.slots.iter_mut().filter_map(Option::as_mut) {
            let on = Some(win.id) == target;
            win.flags.set(WindowFlags::FOCUSED, on);
        }
        self.focused = target;
    }

    // First shown window in pool order, or nothing.
    fn refocus(&mut self) {
        let next = self.windows().find(|w| w.is_shown()).map(|w| w.id);
        self.set_focus(next);
    }

    pub fn minimize_window(&mut self, id: WindowId) {
        let Some(win) = self.window_mut(id) else {
            return;
        };
        win.flags.insert(WindowFlags::MINIMIZED);
        win.flags.remove(WindowFlags::DRAGGING);
        if let Some(hooks) = win.hooks.as_mut() {
            hooks.on_minimize(id);
        }
        if self.focused == Some(id) {
            self.refocus();
        }
    }

    pub fn restore_window(&mut self, id: WindowId) {
        let Some(win) = self.window_mut(id) else {
            return;
        };
        win.flags.remove(WindowFlags::MINIMIZED);
        self.focus_window(id);
    }

    /// Toggles between the saved geometry and the full work area.
    pub fn maximize_window(&mut self, id: WindowId) {
        let layout = self.layout;
        let Some(win) = self.window_mut(id) else {
            return;
        };
        let maximized = if win.is_maximized() {
            if let Some(saved) = win.saved.take() {
                win.x = saved.x;
                win.y = saved.y;
                win.w = saved.w;
                win.h = saved.h;
            }
            win.flags.remove(WindowFlags::MAXIMIZED);
            false
        } else {
            win.saved = Some(win.geometry());
            win.x = 0;
            win.y = layout.topbar_h;
            win.w = layout.screen_w;
            win.h = layout.max_content_height();
            win.flags.insert(WindowFlags::MAXIMIZED);
            win.flags.remove(WindowFlags::DRAGGING);
            true
        };
        if let Some(hooks) = win.hooks.as_mut() {
            hooks.on_maximize(id, maximized);
        }
    }

    /// Moves the window, pulling it back into the work area. A maximized
    /// window keeps its geometry.
    pub fn move_window(&mut self, id: WindowId, x: i32, y: i32) {
        let layout = self.layout;
        let Some(win) = self.window_mut(id) else {
            return;
        };
        if win.is_maximized() {
            return;
        }
        let (nx, ny, _, _) = layout.clamp_window(x, y, win.w, win.h);
        win.x = nx;
        win.y = ny;
    }

    pub fn resize_window(&mut self, id: WindowId, w: i32, h: i32) {
        let layout = self.layout;
        let Some(win) = self.window_mut(id) else {
            return;
        };
        if win.is_maximized() {
            return;
        }
        let w = w.max(MIN_RESIZE_WIDTH);
        let h = h.max(MIN_RESIZE_HEIGHT);
        let (nx, ny, nw, nh) = layout.clamp_window(win.x, win.y, w, h);
        win.x = nx;
        win.y = ny;
        win.w = nw;
        win.h = nh;
    }

    /// Front-most shown window under the point.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        if let Some(win) = self.focused.and_then(|id| self.window(id)) {
            if win.is_shown() && win.contains(x, y) {
                return Some(win.id);
            }
        }
        self.windows()
            .find(|w| Some(w.id) != self.focused && w.is_shown() && w.contains(x, y))
            .map(|w| w.id)
    }

    pub fn mouse_down(&mut self, x: i32, y: i32, events: &mut dyn WindowEvents) {
        let Some(id) = self.window_at(x, y) else {
            return;
        };
        self.focus_window(id);
        let Some(win) = self.window(id) else {
            return;
        };
        if win.is_in_close_button(x, y) {
            self.destroy_window(id, events);
        } else if win.is_in_minimize_button(x, y) {
            self.minimize_window(id);
        } else if win.is_in_maximize_button(x, y) {
            self.maximize_window(id);
        } else if win.is_in_titlebar(x, y) && !win.is_maximized() {
            if let Some(win) = self.window_mut(id) {
                win.flags.insert(WindowFlags::DRAGGING);
                win.drag_offset = (x - win.x, y - win.y);
            }
        }
    }

    pub fn mouse_up(&mut self) {
        for win in self.slots.iter_mut().filter_map(Option::as_mut) {
            win.flags.remove(WindowFlags::DRAGGING);
        }
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) {
        let layout = self.layout;
        for win in self.slots.iter_mut().filter_map(Option::as_mut) {
            if !win.is_dragging() {
                continue;
            }
            let cx = x - win.drag_offset.0;
            let cy = y - win.drag_offset.1;
            let (nx, ny, nw, nh) = layout.clamp_window(cx, cy, win.w, win.h);
            win.x = nx;
            win.y = ny;
            win.w = nw;
            win.h = nh;
        }
    }

    /// Unfocused windows in pool order, then the focused one on top.
    pub fn render(&mut self, surface: &mut dyn Surface, renderer: &mut dyn ContentRenderer) {
        let focused_idx = self.focused.and_then(|id| self.index_of(id));
        for idx in 0..MAX_WINDOWS {
            if Some(idx) != focused_idx {
                self.draw_window(idx, surface, renderer);
            }
        }
        if let Some(idx) = focused_idx {
            self.draw_window(idx, surface, renderer);
        }
    }

    fn draw_window(&mut self, idx: usize, surface: &mut dyn Surface, renderer: &mut dyn ContentRenderer) {
        let titlebar_h = self.layout.titlebar_h;
        let Some(win) = self.slots[idx].as_mut() else {
            return;
        };
        if !win.is_shown() {
            return;
        }
        let bar = if win.is_focused() { TITLE_ACTIVE } else { TITLE_INACTIVE };
        surface.fill_rect(win.x, win.y, win.w, titlebar_h, bar);
        surface.draw_text(win.x + 6, win.y + 6, &win.title, TITLE_TEXT);
        draw_controls(win, surface);

        let area = win.content_area();
        surface.fill_rect(area.x, area.y, area.w, area.h, CONTENT_BG);
        if let Some(hooks) = win.hooks.as_mut() {
            hooks.render_content(surface, area);
        }
        renderer.render_content(surface, win);
        surface.draw_rect(win.x, win.y, win.w, titlebar_h + win.h, BORDER_COLOR);
    }
}

fn draw_controls(win: &Window, surface: &mut dyn Surface) {
    let (mx, my) = win.control_origin(Control::Minimize);
    surface.fill_rect(mx, my, BUTTON_SIZE, BUTTON_SIZE, MINIMIZE_COLOR);
    surface.fill_rect(mx + 4, my + 12, BUTTON_SIZE - 8, 2, GLYPH_COLOR);

    let (xx, xy) = win.control_origin(Control::Maximize);
    surface.fill_rect(xx, xy, BUTTON_SIZE, BUTTON_SIZE, MAXIMIZE_COLOR);
    surface.draw_rect(xx + 4, xy + 4, BUTTON_SIZE - 8, BUTTON_SIZE - 8, GLYPH_COLOR);

    let (cx, cy) = win.control_origin(Control::Close);
    surface.fill_rect(cx, cy, BUTTON_SIZE, BUTTON_SIZE, CLOSE_COLOR);
    for i in 4..BUTTON_SIZE - 4 {
        surface.put_pixel(cx + i, cy + i, GLYPH_COLOR);
        surface.put_pixel(cx + BUTTON_SIZE - 1 - i, cy + i, GLYPH_COLOR);
    }
}
