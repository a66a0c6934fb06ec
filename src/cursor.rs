use crate::surface::Surface;

const START_X: i32 = 320;
const START_Y: i32 = 240;

const OUTLINE: u32 = 0x000000;
const FILL: u32 = 0xFFFFFF;
const HAND_COLOR: u32 = 0xFFFF00;
const HAND_SIZE: i32 = 12;

// '#' outline, '.' fill, ' ' transparent.
const ARROW: [&[u8; 16]; 16] = [
    b"#               ",
    b"##              ",
    b"#.#             ",
    b"#..#            ",
    b"#...#           ",
    b"#....#          ",
    b"#.....#         ",
    b"#......#        ",
    b"#.......#       ",
    b"#........#      ",
    b"#.....#####     ",
    b"#..#..#         ",
    b"#.# #..#        ",
    b"##  #..#        ",
    b"#    #..#       ",
    b"     ####       ",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    Hand,
    Resize,
    Text,
}

pub struct Cursor {
    x: i32,
    y: i32,
    visible: bool,
    shape: CursorShape,
}

impl Cursor {
    pub const fn new() -> Self {
        Self { x: START_X, y: START_Y, visible: true, shape: CursorShape::Arrow }
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_shape(&mut self, shape: CursorShape) {
        self.shape = shape;
    }

    pub fn shape(&self) -> CursorShape {
        self.shape
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if !self.visible {
            return;
        }
        let (x, y) = (self.x, self.y);
        match self.shape {
            CursorShape::Arrow => {
                for (row, bits) in ARROW.iter().enumerate() {
                    for (col, &cell) in bits.iter().enumerate() {
                        let color = match cell {
                            b'#' => OUTLINE,
                            b'.' => FILL,
                            _ => continue,
                        };
                        surface.put_pixel(x + col as i32, y + row as i32, color);
                    }
                }
            }
            CursorShape::Hand => {
                surface.fill_rect(x, y, HAND_SIZE, HAND_SIZE, HAND_COLOR);
            }
            CursorShape::Resize => {
                surface.fill_rect(x - 7, y, 15, 1, FILL);
                surface.fill_rect(x, y - 7, 1, 15, FILL);
            }
            CursorShape::Text => {
                surface.fill_rect(x - 3, y - 8, 7, 1, FILL);
                surface.fill_rect(x, y - 8, 1, 16, FILL);
                surface.fill_rect(x - 3, y + 7, 7, 1, FILL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;

    #[test]
    fn starts_visible_as_arrow() {
        let c = Cursor::new();
        assert_eq!(c.position(), (320, 240));
        assert!(c.is_visible());
        assert_eq!(c.shape(), CursorShape::Arrow);
    }

    #[test]
    fn arrow_skips_transparent_cells() {
        let mut c = Cursor::new();
        c.set_position(10, 20);
        let mut s = RecordingSurface::new(100, 100);
        c.render(&mut s);
        assert!(s.pixels.contains(&(10, 20, OUTLINE)));
        assert!(s.pixels.contains(&(11, 22, FILL)));
        assert!(!s.pixels.iter().any(|&(x, y, _)| x == 25 && y == 20));
        let expected = ARROW.iter().flat_map(|r| r.iter()).filter(|&&b| b != b' ').count();
        assert_eq!(s.pixels.len(), expected);
    }

    #[test]
    fn hidden_cursor_draws_nothing() {
        let mut c = Cursor::new();
        c.set_visible(false);
        let mut s = RecordingSurface::new(100, 100);
        c.render(&mut s);
        assert!(s.pixels.is_empty() && s.ops.is_empty());
        c.set_visible(true);
        c.set_shape(CursorShape::Hand);
        c.render(&mut s);
        assert_eq!(s.ops.len(), 1);
    }
}
