/// Shelf packer for the glyph atlas.
///
/// Glyphs are placed left to right on the current row; a glyph that does not
/// fit horizontally starts a new row below the tallest glyph of the current one.
/// Once a glyph does not fit vertically the packer reports full and refuses
/// every later placement.
#[derive(Debug, Clone)]
pub(crate) struct ShelfPacker {
    size: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    pub(crate) fn new(size: u32, padding: u32) -> Self {
        Self {
            size,
            padding,
            cursor_x: padding,
            cursor_y: padding,
            row_height: 0,
            full: false,
        }
    }

    /// Reserves a `w`x`h` cell and returns its top-left texel.
    pub(crate) fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }

        if self.cursor_x + w + self.padding > self.size {
            self.cursor_y += self.row_height + self.padding;
            self.cursor_x = self.padding;
            self.row_height = 0;
        }

        if self.cursor_y + h + self.padding > self.size || w + 2 * self.padding > self.size {
            self.full = true;
            return None;
        }

        let origin = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(origin)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.full
    }

    /// Converts a placed cell to normalized UV corners.
    pub(crate) fn uv(&self, origin: (u32, u32), w: u32, h: u32) -> ([f32; 2], [f32; 2]) {
        let s = self.size as f32;
        (
            [origin.0 as f32 / s, origin.1 as f32 / s],
            [(origin.0 + w) as f32 / s, (origin.1 + h) as f32 / s],
        )
    }
}
