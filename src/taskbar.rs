use heapless::{String as HString, Vec as HVec};

use crate::config::Layout;
use crate::surface::Surface;
use crate::window::{Content, WindowId};
use crate::wm::{WindowEvents, WindowManager};

pub const MAX_BUTTONS: usize = 8;
pub const LABEL_CAPACITY: usize = 31;

const LAUNCHER_X: i32 = 10;
const LAUNCHER_W: i32 = 100;
const LAUNCHER_LABEL: &str = "Terminal";

/// Space kept free of window buttons: launcher, padding and the right edge.
const RESERVED_MARGIN: i32 = 260;
const BUTTONS_START_X: i32 = LAUNCHER_X + LAUNCHER_W + 10;
const BUTTON_GAP: i32 = 5;
pub const MIN_BUTTON_W: i32 = 80;
pub const MAX_BUTTON_W: i32 = 120;
const BUTTON_PAD_Y: i32 = 5;
const BUTTON_H: i32 = 20;

const LABEL_MAX_CHARS: usize = 18;
const LABEL_KEEP_CHARS: usize = 15;

const BAR_COLOR: u32 = 0x34495E;
const LAUNCHER_COLOR: u32 = 0x27AE60;
const BUTTON_COLOR: u32 = 0x2C3E50;
const BUTTON_ACTIVE: u32 = 0x3498DB;
const LABEL_COLOR: u32 = 0xECF0F1;
const LABEL_MINIMIZED: u32 = 0xBDC3C7;
const MINIMIZED_MARK: u32 = 0xF39C12;

const SPAWN_BASE_X: i32 = 50;
const SPAWN_BASE_Y: i32 = 80;

pub type Label = HString<LABEL_CAPACITY>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskbarButton {
    pub window: WindowId,
    pub label: Label,
    pub x: i32,
    pub width: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskbarClick {
    Ignored,
    /// The launcher was hit; a new terminal window belongs at `(x, y)`.
    Launch { x: i32, y: i32 },
    Restored(WindowId),
    Focused(WindowId),
}

pub struct Taskbar {
    buttons: HVec<TaskbarButton, MAX_BUTTONS>,
    layout: Layout,
    launcher_enabled: bool,
    launches: u32,
}

impl Taskbar {
    pub fn new(layout: Layout, launcher_enabled: bool) -> Self {
        Self { buttons: HVec::new(), layout, launcher_enabled, launches: 0 }
    }

    pub fn buttons(&self) -> &[TaskbarButton] {
        &self.buttons
    }

    pub fn y(&self) -> i32 {
        self.layout.taskbar_y()
    }

    pub fn add_button(&mut self, window: WindowId, label: &str) -> bool {
        if self.buttons.iter().any(|b| b.window == window) {
            return false;
        }
        let mut text = Label::new();
        for ch in label.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }
        let button = TaskbarButton { window, label: text, x: 0, width: 0 };
        if self.buttons.push(button).is_err() {
            return false;
        }
        self.relayout();
        true
    }

    pub fn remove_button(&mut self, window: WindowId) {
        let Some(idx) = self.buttons.iter().position(|b| b.window == window) else {
            return;
        };
        self.buttons.remove(idx);
        self.relayout();
    }

    fn relayout(&mut self) {
        let count = self.buttons.len() as i32;
        if count == 0 {
            return;
        }
        let available = (self.layout.screen_w - RESERVED_MARGIN).max(0);
        let width = (available / count).clamp(MIN_BUTTON_W, MAX_BUTTON_W);
        let mut x = BUTTONS_START_X;
        for button in self.buttons.iter_mut() {
            button.x = x;
            button.width = width;
            x += width + BUTTON_GAP;
        }
    }

    fn next_spawn_position(&mut self) -> (i32, i32) {
        self.launches = self.launches.wrapping_add(1);
        let c = (self.launches % 1000) as i32;
        (SPAWN_BASE_X + (c * 30) % 200, SPAWN_BASE_Y + (c * 25) % 150)
    }

    pub fn handle_click(&mut self, x: i32, y: i32, wm: &mut WindowManager) -> TaskbarClick {
        if y < self.y() {
            return TaskbarClick::Ignored;
        }
        let button_y = self.y() + BUTTON_PAD_Y;
        let on_launcher = x >= LAUNCHER_X
            && x < LAUNCHER_X + LAUNCHER_W
            && y >= button_y
            && y < button_y + BUTTON_H;
        if self.launcher_enabled && on_launcher {
            let (sx, sy) = self.next_spawn_position();
            return TaskbarClick::Launch { x: sx, y: sy };
        }
        let Some(button) = self.buttons.iter().find(|b| x >= b.x && x < b.x + b.width) else {
            return TaskbarClick::Ignored;
        };
        let id = button.window;
        match wm.window(id).map(|w| w.is_minimized()) {
            Some(true) => {
                wm.restore_window(id);
                TaskbarClick::Restored(id)
            }
            Some(false) => {
                wm.focus_window(id);
                TaskbarClick::Focused(id)
            }
            None => TaskbarClick::Ignored,
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, wm: &WindowManager) {
        let y = self.y();
        surface.fill_rect(0, y, self.layout.screen_w, self.layout.taskbar_h, BAR_COLOR);
        if self.launcher_enabled {
            surface.fill_rect(LAUNCHER_X, y + BUTTON_PAD_Y, LAUNCHER_W, BUTTON_H, LAUNCHER_COLOR);
            surface.draw_text(LAUNCHER_X + 10, y + 10, LAUNCHER_LABEL, LABEL_COLOR);
        }
        for button in self.buttons.iter() {
            let Some(win) = wm.window(button.window) else {
                continue;
            };
            let fill = if win.is_focused() { BUTTON_ACTIVE } else { BUTTON_COLOR };
            surface.fill_rect(button.x, y + BUTTON_PAD_Y, button.width, BUTTON_H, fill);
            let text_color = if win.is_minimized() { LABEL_MINIMIZED } else { LABEL_COLOR };
            surface.draw_text(button.x + 5, y + 10, &display_label(&button.label), text_color);
            if win.is_minimized() {
                surface.draw_text(button.x + button.width - 15, y + 10, "_", MINIMIZED_MARK);
            }
        }
    }
}

impl WindowEvents for Taskbar {
    fn window_closed(&mut self, id: WindowId, _content: Content) {
        self.remove_button(id);
    }
}

/// Labels past 18 chars keep 15 and gain "...".
fn display_label(label: &str) -> Label {
    let mut out = Label::new();
    if label.chars().count() <= LABEL_MAX_CHARS {
        let _ = out.push_str(label);
        return out;
    }
    for ch in label.chars().take(LABEL_KEEP_CHARS) {
        let _ = out.push(ch);
    }
    let _ = out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;
    use alloc::vec::Vec;

    fn setup() -> (WindowManager, Taskbar) {
        let layout = Layout::new(800, 600);
        (WindowManager::new(layout), Taskbar::new(layout, true))
    }

    fn assert_layout(bar: &Taskbar) {
        let mut expected_x = BUTTONS_START_X;
        for b in bar.buttons() {
            assert!((MIN_BUTTON_W..=MAX_BUTTON_W).contains(&b.width));
            assert_eq!(b.x, expected_x);
            expected_x = b.x + b.width + BUTTON_GAP;
        }
    }

    #[test]
    fn widths_stay_clamped_and_contiguous() {
        for screen_w in [640, 800, 1024, 1920] {
            let layout = Layout::new(screen_w, 600);
            let mut bar = Taskbar::new(layout, true);
            for n in 1..=MAX_BUTTONS as u32 {
                assert!(bar.add_button(WindowId(n), "Terminal"));
                assert_eq!(bar.buttons().len(), n as usize);
                assert_layout(&bar);
            }
            for n in (1..=MAX_BUTTONS as u32).step_by(2) {
                bar.remove_button(WindowId(n));
                assert_layout(&bar);
            }
        }
    }

    #[test]
    fn width_formula_for_800() {
        let (_, mut bar) = setup();
        bar.add_button(WindowId(1), "a");
        assert_eq!(bar.buttons()[0].width, MAX_BUTTON_W);
        for n in 2..=6 {
            bar.add_button(WindowId(n), "a");
        }
        assert_eq!(bar.buttons()[0].width, 90);
        for n in 7..=8 {
            bar.add_button(WindowId(n), "a");
        }
        assert_eq!(bar.buttons()[0].width, MIN_BUTTON_W);
    }

    #[test]
    fn duplicates_and_overflow_are_ignored() {
        let (_, mut bar) = setup();
        assert!(bar.add_button(WindowId(1), "a"));
        assert!(!bar.add_button(WindowId(1), "again"));
        for n in 2..=8 {
            assert!(bar.add_button(WindowId(n), "a"));
        }
        assert!(!bar.add_button(WindowId(9), "a"));
        assert_eq!(bar.buttons().len(), MAX_BUTTONS);
    }

    #[test]
    fn remove_keeps_order() {
        let (_, mut bar) = setup();
        for n in 1..=3 {
            bar.add_button(WindowId(n), "t");
        }
        bar.remove_button(WindowId(2));
        bar.remove_button(WindowId(42));
        let ids: Vec<u32> = bar.buttons().iter().map(|b| b.window.0).collect();
        assert_eq!(ids, [1, 3]);
        assert_layout(&bar);
    }

    #[test]
    fn clicks_above_band_are_ignored() {
        let (mut wm, mut bar) = setup();
        assert_eq!(bar.handle_click(20, 569, &mut wm), TaskbarClick::Ignored);
    }

    #[test]
    fn launcher_positions_rotate() {
        let (mut wm, mut bar) = setup();
        assert_eq!(bar.handle_click(20, 580, &mut wm), TaskbarClick::Launch { x: 80, y: 105 });
        assert_eq!(bar.handle_click(20, 580, &mut wm), TaskbarClick::Launch { x: 110, y: 130 });
        let mut off = Taskbar::new(wm.layout(), false);
        assert_eq!(off.handle_click(20, 580, &mut wm), TaskbarClick::Ignored);
    }

    #[test]
    fn launcher_only_answers_inside_its_button() {
        let (mut wm, mut bar) = setup();
        // band starts at 570, button spans 575..595
        assert_eq!(bar.handle_click(20, 572, &mut wm), TaskbarClick::Ignored);
        assert_eq!(bar.handle_click(20, 597, &mut wm), TaskbarClick::Ignored);
        assert_eq!(bar.handle_click(20, 575, &mut wm), TaskbarClick::Launch { x: 80, y: 105 });
        assert_eq!(bar.handle_click(20, 594, &mut wm), TaskbarClick::Launch { x: 110, y: 130 });
    }

    #[test]
    fn window_button_restores_or_focuses() {
        let (mut wm, mut bar) = setup();
        let a = wm.create_window(50, 80, 300, 200, "a").unwrap();
        let b = wm.create_window(50, 80, 300, 200, "b").unwrap();
        bar.add_button(a, "a");
        bar.add_button(b, "b");
        let ax = bar.buttons()[0].x + 2;
        assert_eq!(bar.handle_click(ax, 580, &mut wm), TaskbarClick::Focused(a));
        assert_eq!(wm.focused(), Some(a));
        wm.minimize_window(a);
        assert_eq!(bar.handle_click(ax, 580, &mut wm), TaskbarClick::Restored(a));
        assert!(!wm.window(a).unwrap().is_minimized());
        let gap = bar.buttons()[0].x + bar.buttons()[0].width + 1;
        assert_eq!(bar.handle_click(gap, 580, &mut wm), TaskbarClick::Ignored);
    }

    #[test]
    fn closing_window_drops_button() {
        let (mut wm, mut bar) = setup();
        let a = wm.create_window(50, 80, 300, 200, "a").unwrap();
        bar.add_button(a, "a");
        wm.destroy_window(a, &mut bar);
        assert!(bar.buttons().is_empty());
    }

    #[test]
    fn labels_truncate_and_mark_minimized() {
        assert_eq!(display_label("Terminal").as_str(), "Terminal");
        assert_eq!(display_label("abcdefghijklmnopqr").as_str(), "abcdefghijklmnopqr");
        assert_eq!(display_label("abcdefghijklmnopqrs").as_str(), "abcdefghijklmno...");

        let (mut wm, mut bar) = setup();
        let a = wm.create_window(50, 80, 300, 200, "a").unwrap();
        bar.add_button(a, "A very long window title");
        wm.minimize_window(a);
        let mut s = RecordingSurface::new(800, 600);
        bar.render(&mut s, &wm);
        let texts = s.texts();
        assert!(texts.contains(&"Terminal"));
        assert!(texts.contains(&"A very long win..."));
        assert!(texts.contains(&"_"));
    }
}
