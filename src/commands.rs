use alloc::format;

use crate::sysinfo::SystemInfo;
use crate::terminal::TerminalInstance;
use crate::timer::Uptime;

pub const HELP_LINES: [&str; 6] = [
    "Available commands:",
    "  help      - Show this help",
    "  clear     - Clear screen",
    "  sysinfo   - System information",
    "  time      - Show uptime",
    "",
];

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type 'help' for available commands.";

pub struct CommandContext<'a> {
    pub ticks: u64,
    pub sysinfo: &'a dyn SystemInfo,
}

/// Runs one submitted line against `term`.
pub fn execute(line: &str, term: &mut TerminalInstance, ctx: &CommandContext<'_>) {
    if line.is_empty() {
        term.print("");
        term.reset_history_pos();
        return;
    }
    term.add_to_history(line);
    match line {
        "help" => help(term),
        "clear" => term.clear(),
        "sysinfo" => sysinfo(term, ctx.sysinfo),
        "time" => uptime(term, ctx.ticks),
        _ => {
            term.print(UNKNOWN_COMMAND);
            term.print("");
        }
    }
    term.reset_history_pos();
}

fn help(term: &mut TerminalInstance) {
    for line in HELP_LINES {
        term.print(line);
    }
}

fn uptime(term: &mut TerminalInstance, ticks: u64) {
    term.print(&format!("Uptime: {}", Uptime::from_ticks(ticks)));
    term.print("");
}

fn sysinfo(term: &mut TerminalInstance, info: &dyn SystemInfo) {
    term.print("=== SYSTEM INFORMATION ===");
    term.print("");
    term.print("CPU:");
    match info.cpu() {
        Some(cpu) => {
            if !cpu.brand.is_empty() {
                term.print(&format!("  Model: {}", cpu.brand));
            }
            if !cpu.vendor.is_empty() {
                term.print(&format!("  Vendor: {}", cpu.vendor));
            }
            term.print(&format!(
                "  Family: {}, Model: {}, Stepping: {}",
                cpu.family, cpu.model, cpu.stepping
            ));
            if cpu.logical_cores > 0 {
                term.print(&format!("  Logical Cores: {}", cpu.logical_cores));
            }
        }
        None => term.print("  CPU information unavailable"),
    }
    term.print("");
    let mem = info.memory();
    term.print("Memory:");
    term.print(&format!("  Total: {} MB", mem.total_mib()));
    term.print(&format!("  Used: {} MB", mem.used_mib()));
    term.print(&format!("  Free: {} MB", mem.free_mib()));
    term.print("");
    term.print("=== END SYSTEM INFORMATION ===");
    term.print("");
}
