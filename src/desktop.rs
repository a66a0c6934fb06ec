use alloc::boxed::Box;
use alloc::format;

use crate::commands::{self, CommandContext};
use crate::config::DesktopConfig;
use crate::cursor::Cursor;
use crate::input::{self, InputDecoder, InputEvent, INPUT};
use crate::irq::IrqMutex;
use crate::mouse::ButtonSample;
use crate::serial;
use crate::surface::{FramebufferInfo, Surface};
use crate::sysinfo::SystemInfo;
use crate::taskbar::{Taskbar, TaskbarClick};
use crate::terminal::{TerminalId, TerminalTable, LINE_HEIGHT};
use crate::timer::{self, Uptime};
use crate::window::{Content, Window, WindowId};
use crate::wm::{ContentRenderer, WindowEvents, WindowManager};

pub const TERMINAL_WIDTH: i32 = 700;
pub const TERMINAL_HEIGHT: i32 = 480;
pub const TERMINAL_TITLE: &str = "Terminal";

const BOOT_X: i32 = 50;
const BOOT_Y: i32 = 80;

const TOPBAR_TEXT: u32 = 0xECF0F1;
const PROMPT_COLOR: u32 = 0x00FF00;
const INPUT_COLOR: u32 = 0xFFFFFF;
const CARET_COLOR: u32 = 0xFFFFFF;

const TEXT_INSET: i32 = 10;
const INPUT_FROM_BOTTOM: i32 = 25;
const INPUT_TEXT_X: i32 = 30;
const GLYPH_W: i32 = 8;
const CARET_BLINK_IRQS: u32 = 25;

const WELCOME: [&str; 7] = [
    "Windowing system active.",
    "",
    "Type 'help' for available commands.",
    "Use UP/DOWN arrows for history.",
    "Drag windows by title bar!",
    "Click green 'Terminal' button for more terminals.",
    "",
];

const LAUNCH_GREETING: [&str; 3] = ["New independent terminal!", "This has its own buffer and history.", ""];

const ALLOC_WARNING: &str = "Warning: terminal allocation failed, using shared terminal.";

/// Follows a window out of the pool: drops its button and frees its terminal.
struct Teardown<'a> {
    taskbar: &'a mut Taskbar,
    terminals: &'a mut TerminalTable,
}

impl WindowEvents for Teardown<'_> {
    fn window_closed(&mut self, id: WindowId, content: Content) {
        self.taskbar.remove_button(id);
        if let Content::Terminal(term) = content {
            self.terminals.release(term);
        }
    }
}

struct TerminalView<'a> {
    terminals: &'a TerminalTable,
    line: &'a str,
    caret_on: bool,
}

impl ContentRenderer for TerminalView<'_> {
    fn render_content(&mut self, surface: &mut dyn Surface, window: &Window) {
        let Content::Terminal(id) = window.content else {
            return;
        };
        let Some(term) = self.terminals.get(id) else {
            return;
        };
        let area = window.content_area();
        term.render(surface, area.x + TEXT_INSET, area.y + TEXT_INSET);
        if !window.is_focused() {
            return;
        }
        let y = area.y + area.h - INPUT_FROM_BOTTOM;
        surface.draw_text(area.x + TEXT_INSET, y, "$ ", PROMPT_COLOR);
        surface.draw_text(area.x + INPUT_TEXT_X, y, self.line, INPUT_COLOR);
        if self.caret_on {
            let col = self.line.chars().count() as i32;
            surface.fill_rect(area.x + INPUT_TEXT_X + col * GLYPH_W, y, GLYPH_W, LINE_HEIGHT, CARET_COLOR);
        }
    }
}

pub struct Desktop {
    config: DesktopConfig,
    wm: WindowManager,
    taskbar: Taskbar,
    terminals: TerminalTable,
    cursor: Cursor,
    sysinfo: Box<dyn SystemInfo>,
}

impl Desktop {
    /// `None` only when the shared terminal cannot be allocated.
    pub fn new(config: DesktopConfig, sysinfo: Box<dyn SystemInfo>) -> Option<Self> {
        let terminals = TerminalTable::new(config.max_terminals)?;
        Some(Self {
            wm: WindowManager::new(config.layout),
            taskbar: Taskbar::new(config.layout, config.launcher_enabled),
            terminals,
            cursor: Cursor::new(),
            sysinfo,
            config,
        })
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn wm(&self) -> &WindowManager {
        &self.wm
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    pub fn terminals(&self) -> &TerminalTable {
        &self.terminals
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn set_background(&mut self, color: u32) {
        self.config.background = color;
    }

    /// Opens the first terminal window and greets the user in it.
    pub fn boot(&mut self) -> Option<WindowId> {
        let id = self.spawn_terminal(BOOT_X, BOOT_Y)?;
        let target = self.terminal_of(id);
        let term = self.terminals.resolve_mut(target);
        term.print(&format!("Welcome to {} GUI!", self.config.label));
        for line in WELCOME {
            term.print(line);
        }
        serial::write("desktop: session started");
        Some(id)
    }

    /// Terminal owned by the focused window, if it owns one.
    pub fn active_terminal(&self) -> Option<TerminalId> {
        match self.wm.focused_content() {
            Some((_, Content::Terminal(id))) => Some(id),
            _ => None,
        }
    }

    fn terminal_of(&self, id: WindowId) -> Option<TerminalId> {
        match self.wm.window(id).map(|w| w.content) {
            Some(Content::Terminal(term)) => Some(term),
            _ => None,
        }
    }

    /// Prints to the active terminal, or the shared one when none is focused.
    pub fn print(&mut self, text: &str) {
        let target = self.active_terminal();
        self.terminals.resolve_mut(target).print(text);
    }

    /// Creates a window with a taskbar button; failures are reported on screen.
    pub fn create_window(&mut self, x: i32, y: i32, w: i32, h: i32, title: &str) -> Option<WindowId> {
        match self.wm.create_window(x, y, w, h, title) {
            Ok(id) => {
                self.taskbar.add_button(id, title);
                Some(id)
            }
            Err(err) => {
                serial::write(&format!("desktop: create_window failed: {}", err));
                self.print(&format!("Error: {}", err));
                None
            }
        }
    }

    pub fn spawn_terminal(&mut self, x: i32, y: i32) -> Option<WindowId> {
        let id = self.create_window(x, y, TERMINAL_WIDTH, TERMINAL_HEIGHT, TERMINAL_TITLE)?;
        let term = match self.terminals.create() {
            Some(term) => term,
            None => {
                serial::write("desktop: terminal alloc failed, falling back to shared instance");
                self.terminals.default_mut().print(ALLOC_WARNING);
                TerminalId::DEFAULT
            }
        };
        self.wm.set_content(id, Content::Terminal(term));
        Some(id)
    }

    pub fn destroy_window(&mut self, id: WindowId) {
        let mut teardown = Teardown { taskbar: &mut self.taskbar, terminals: &mut self.terminals };
        self.wm.destroy_window(id, &mut teardown);
    }

    pub fn handle_pointer(&mut self, x: i32, y: i32, buttons: ButtonSample) {
        self.cursor.set_position(x, y);
        if buttons.pressed {
            if y >= self.taskbar.y() {
                self.taskbar_click(x, y);
            } else {
                let mut teardown = Teardown { taskbar: &mut self.taskbar, terminals: &mut self.terminals };
                self.wm.mouse_down(x, y, &mut teardown);
            }
        } else if buttons.released {
            self.wm.mouse_up();
        } else if buttons.down {
            self.wm.mouse_move(x, y);
        }
    }

    fn taskbar_click(&mut self, x: i32, y: i32) {
        if let TaskbarClick::Launch { x, y } = self.taskbar.handle_click(x, y, &mut self.wm) {
            let Some(id) = self.spawn_terminal(x, y) else {
                return;
            };
            let target = self.terminal_of(id);
            let term = self.terminals.resolve_mut(target);
            for line in LAUNCH_GREETING {
                term.print(line);
            }
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, input: &IrqMutex<InputDecoder>, ticks: u64) {
        let active = self.active_terminal();
        match event {
            InputEvent::Submit(line) => self.submit(&line, ticks),
            InputEvent::HistoryPrev => {
                if let Some(entry) = self.terminals.resolve_mut(active).history_prev() {
                    input.lock(|d| d.replace_line(entry));
                }
            }
            InputEvent::HistoryNext => {
                if let Some(entry) = self.terminals.resolve_mut(active).history_next() {
                    input.lock(|d| d.replace_line(entry));
                }
            }
            InputEvent::ScrollUp => self.terminals.resolve_mut(active).scroll_up(),
            InputEvent::ScrollDown => self.terminals.resolve_mut(active).scroll_down(),
        }
    }

    /// Echoes and runs a completed line in the terminal focused right now.
    pub fn submit(&mut self, line: &str, ticks: u64) {
        let target = self.active_terminal();
        let term = self.terminals.resolve_mut(target);
        term.print(&format!("$ {}", line));
        let ctx = CommandContext { ticks, sysinfo: &*self.sysinfo };
        commands::execute(line, term, &ctx);
    }

    pub fn render(&mut self, surface: &mut dyn Surface, line: &str, irq_count: u32, ticks: u64) {
        let layout = self.config.layout;
        surface.fill_rect(0, 0, layout.screen_w, layout.screen_h, self.config.background);
        self.render_topbar(surface, ticks);

        let mut view = TerminalView {
            terminals: &self.terminals,
            line,
            caret_on: (irq_count / CARET_BLINK_IRQS) % 2 == 0,
        };
        self.wm.render(surface, &mut view);
        self.taskbar.render(surface, &self.wm);
        self.cursor.render(surface);
        surface.present();
    }

    fn render_topbar(&self, surface: &mut dyn Surface, ticks: u64) {
        let layout = self.config.layout;
        surface.fill_rect(0, 0, layout.screen_w, layout.topbar_h, self.config.topbar_color);
        surface.draw_text(8, 7, &format!("{} GUI", self.config.label), TOPBAR_TEXT);
        let mem = self.sysinfo.memory();
        let ram = format!("RAM: {}/{}M", mem.free_mib(), mem.total_mib());
        surface.draw_text(layout.screen_w - 180, 7, &ram, TOPBAR_TEXT);
        surface.draw_text(layout.screen_w - 80, 7, &Uptime::from_ticks(ticks).clock(), TOPBAR_TEXT);
    }

    /// One main-loop iteration: sample input once, route it, redraw everything.
    pub fn frame(&mut self, input: &IrqMutex<InputDecoder>, surface: &mut dyn Surface, now: u64) {
        let polled = input.lock(|d| d.poll(now));
        self.handle_pointer(polled.x, polled.y, polled.buttons);
        for event in polled.events {
            self.handle_event(event, input, now);
        }
        let line = input.lock(|d| d.line_snapshot());
        self.render(surface, &line, input::irq_count(), now);
    }
}

/// Kernel entry into the desktop; never returns.
pub fn run(info: FramebufferInfo, surface: &mut dyn Surface, sysinfo: Box<dyn SystemInfo>) -> ! {
    let config = DesktopConfig::for_framebuffer(&info);
    INPUT.lock(|d| {
        d.set_screen(info.width, info.height);
        d.set_debounce(config.debounce_ticks);
    });
    let Some(mut desktop) = Desktop::new(config, sysinfo) else {
        serial::write("desktop: shared terminal alloc failed");
        loop {
            core::hint::spin_loop();
        }
    };
    if desktop.boot().is_none() {
        serial::write("desktop: boot terminal unavailable");
    }
    loop {
        desktop.frame(&INPUT, surface, timer::ticks());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawOp, RecordingSurface};
    use crate::sysinfo::{CpuSummary, MemoryInfo};

    struct FakeInfo;

    impl SystemInfo for FakeInfo {
        fn memory(&self) -> MemoryInfo {
            MemoryInfo { total_bytes: 128 << 20, free_bytes: 64 << 20 }
        }

        fn cpu(&self) -> Option<CpuSummary> {
            None
        }
    }

    fn desktop() -> Desktop {
        Desktop::new(DesktopConfig::new(800, 600), Box::new(FakeInfo)).unwrap()
    }

    fn press(d: &mut Desktop, x: i32, y: i32) {
        d.handle_pointer(x, y, ButtonSample { pressed: true, released: false, down: true });
        d.handle_pointer(x, y, ButtonSample { pressed: false, released: true, down: false });
    }

    #[test]
    fn boot_opens_greeted_terminal() {
        let mut d = desktop();
        let id = d.boot().unwrap();
        assert_eq!(d.wm().focused(), Some(id));
        assert_eq!(d.taskbar().buttons().len(), 1);
        let term = d.terminals().get(d.active_terminal().unwrap()).unwrap();
        assert_eq!(term.line(0), Some("Welcome to Windeck GUI!"));
        assert_eq!(term.line_count(), 1 + WELCOME.len());
    }

    #[test]
    fn launcher_click_spawns_independent_terminal() {
        let mut d = desktop();
        let first = d.boot().unwrap();
        press(&mut d, 20, 585);
        assert_eq!(d.wm().count(), 2);
        let second = d.wm().focused().unwrap();
        assert_ne!(first, second);
        let term = d.active_terminal().unwrap();
        assert_ne!(Some(term), d.terminal_of(first));
        assert_eq!(d.terminals().get(term).unwrap().line(0), Some(LAUNCH_GREETING[0]));
        let g = d.wm().window(second).unwrap().geometry();
        assert_eq!((g.x, g.y), (80, 68));
    }

    #[test]
    fn closing_terminal_frees_instance_and_button() {
        let mut d = desktop();
        let id = d.boot().unwrap();
        assert_eq!(d.terminals().live(), 1);
        let g = d.wm().window(id).unwrap().geometry();
        press(&mut d, g.x + g.w - 12, g.y + 8);
        assert_eq!(d.wm().count(), 0);
        assert_eq!(d.terminals().live(), 0);
        assert!(d.taskbar().buttons().is_empty());
        assert_eq!(d.active_terminal(), None);
    }

    #[test]
    fn alloc_failure_falls_back_to_shared_terminal() {
        let mut cfg = DesktopConfig::new(800, 600);
        cfg.max_terminals = 0;
        let mut d = Desktop::new(cfg, Box::new(FakeInfo)).unwrap();
        let id = d.boot().unwrap();
        assert_eq!(d.terminal_of(id), Some(TerminalId::DEFAULT));
        let shared = d.terminals().get(TerminalId::DEFAULT).unwrap();
        assert_eq!(shared.line(0), Some(ALLOC_WARNING));
        d.destroy_window(id);
        assert!(d.terminals().get(TerminalId::DEFAULT).is_some());
    }

    #[test]
    fn invalid_window_reports_error_on_screen() {
        let mut d = desktop();
        assert_eq!(d.create_window(0, 30, 10, 10, "tiny"), None);
        let shared = d.terminals().get(TerminalId::DEFAULT).unwrap();
        assert_eq!(shared.line(0), Some("Error: window width out of range (10)"));
        assert!(d.taskbar().buttons().is_empty());
    }

    #[test]
    fn history_keys_recall_into_line_buffer() {
        let mut d = desktop();
        d.boot();
        let input = IrqMutex::new(InputDecoder::new());
        d.submit("time", 0);
        d.submit("help", 0);
        d.handle_event(InputEvent::HistoryPrev, &input, 0);
        assert_eq!(input.lock(|i| i.line_snapshot()).as_str(), "help");
        d.handle_event(InputEvent::HistoryPrev, &input, 0);
        assert_eq!(input.lock(|i| i.line_snapshot()).as_str(), "time");
        d.handle_event(InputEvent::HistoryNext, &input, 0);
        d.handle_event(InputEvent::HistoryNext, &input, 0);
        assert_eq!(input.lock(|i| i.line_snapshot()).as_str(), "");
    }

    #[test]
    fn frame_draws_in_compositor_order() {
        let mut d = desktop();
        d.boot();
        d.set_background(0x123456);
        let mut s = RecordingSurface::new(800, 600);
        d.render(&mut s, "ls", 0, 3723 * 100);
        assert_eq!(s.ops[0], DrawOp::Fill { x: 0, y: 0, w: 800, h: 600, color: 0x123456 });
        let topbar = s.position_of_text("Windeck GUI").unwrap();
        let title = s.position_of_text(TERMINAL_TITLE).unwrap();
        let prompt = s.position_of_text("$ ").unwrap();
        let launcher = s.ops.iter().rposition(|op| matches!(op, DrawOp::Text { text, .. } if text == "Terminal")).unwrap();
        assert!(topbar < title && title < prompt && prompt < launcher);
        assert!(s.texts().contains(&"RAM: 64/128M"));
        assert!(s.texts().contains(&"01:02:03"));
        assert!(s.texts().contains(&"ls"));
        assert!(!s.pixels.is_empty());
        assert_eq!(s.ops.last(), Some(&DrawOp::Present));
    }

    #[test]
    fn caret_blinks_with_irq_count() {
        let mut d = desktop();
        d.boot();
        let caret = |s: &RecordingSurface| {
            s.ops.iter().any(|op| matches!(op, DrawOp::Fill { w: 8, h: 12, color: CARET_COLOR, .. }))
        };
        let mut on = RecordingSurface::new(800, 600);
        d.render(&mut on, "", 10, 0);
        assert!(caret(&on));
        let mut off = RecordingSurface::new(800, 600);
        d.render(&mut off, "", 30, 0);
        assert!(!caret(&off));
    }
}
