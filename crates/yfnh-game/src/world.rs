use nalgebra::Point3;

use yfnh_engine::core::{Player, World};

use crate::player::Explorer;

/// Axis-aligned region members are kept inside.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, p: Point3<f32>) -> Point3<f32> {
        Point3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point3::new(-256.0, 0.0, -256.0), Point3::new(256.0, 128.0, 256.0))
    }
}

/// The demo world: a bounded, empty level that tracks its members.
#[derive(Debug, Default)]
pub struct Level {
    bounds: Bounds,
    members: usize,
    paused: bool,
    ticks: u64,
}

impl Level {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds, ..Self::default() }
    }

    pub fn members(&self) -> usize {
        self.members
    }

    /// Simulation steps taken while not paused.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl World<Explorer> for Level {
    fn add(&mut self, member: &mut Explorer) {
        self.members += 1;
        member.place(self.bounds.clamp(member.position()));
        log::debug!("level member #{} added", self.members);
    }

    fn move_to(&mut self, member: &mut Explorer, position: Point3<f32>) {
        let clamped = self.bounds.clamp(position);
        if clamped != position {
            log::warn!("move to {position:?} clamped to {clamped:?}");
        }
        member.place(clamped);
    }

    fn update(&mut self) {
        if !self.paused {
            self.ticks += 1;
        }
    }

    fn paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_places_the_member() {
        let mut level = Level::default();
        let mut explorer = Explorer::new(16.0 / 9.0, 70.0);
        level.add(&mut explorer);
        level.move_to(&mut explorer, Point3::new(5.0, 5.0, 5.0));

        assert_eq!(level.members(), 1);
        assert_eq!(explorer.position(), Point3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn positions_outside_the_bounds_are_clamped() {
        let mut level = Level::new(Bounds::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0)));
        let mut explorer = Explorer::new(1.0, 70.0);
        level.move_to(&mut explorer, Point3::new(-3.0, 4.0, 99.0));
        assert_eq!(explorer.position(), Point3::new(0.0, 4.0, 10.0));
    }

    #[test]
    fn paused_level_does_not_tick() {
        let mut level = Level::default();
        level.update();
        level.paused = true;
        level.update();
        level.update();

        assert!(level.paused());
        assert_eq!(level.ticks(), 1);
    }
}
