#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod commands;
pub mod config;
pub mod cursor;
pub mod desktop;
pub mod input;
pub mod irq;
pub mod keyboard;
pub mod mouse;
pub mod ring;
pub mod serial;
pub mod surface;
pub mod sysinfo;
pub mod taskbar;
pub mod terminal;
pub mod timer;
pub mod window;
pub mod wm;
