/// Straight-alpha RGBA color, components in `[0, 1]`.
///
/// Matches fixed-function conventions (`glClearColor`, `glColor4f`). Backends
/// premultiply where their pipelines need it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Premultiplied `[r, g, b, a]`, clamped.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            self.r.clamp(0.0, 1.0) * a,
            self.g.clamp(0.0, 1.0) * a,
            self.b.clamp(0.0, 1.0) * a,
            a,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_scales_rgb_by_alpha() {
        let c = Color::new(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!(c, [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn premultiplied_clamps_out_of_range() {
        let c = Color::new(2.0, -1.0, 0.5, 3.0).premultiplied();
        assert_eq!(c, [1.0, 0.0, 0.5, 1.0]);
    }
}
