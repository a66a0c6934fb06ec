/// Framebuffer handed over by the bootloader.
#[derive(Clone, Copy, Debug)]
pub struct FramebufferInfo {
    pub base: usize,
    pub width: usize,
    pub height: usize,
}

/// Drawing contract the compositor renders through.
///
/// Implementations clip to their own bounds; callers may pass coordinates
/// that fall partly or fully outside the surface.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn put_pixel(&mut self, x: i32, y: i32, color: u32);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32);
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: u32);
    fn present(&mut self);

    /// 1px outline.
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }
}
