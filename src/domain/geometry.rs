// Cell-grid geometry: positions, aim directions and the viewport layout.
// Rows grow downward; row 0 is the top of the presentation surface.

/// Smallest surface the presentation sink is allowed to report.
pub const MIN_SURFACE_WIDTH: i32 = 40;
pub const MIN_SURFACE_HEIGHT: i32 = 8;

pub const DEFAULT_SURFACE_WIDTH: i32 = 120;
pub const DEFAULT_SURFACE_HEIGHT: i32 = 32;
pub const HEADER_BAND: i32 = 3;
pub const FOOTER_BAND: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev-style proximity check used by both collision directions.
    pub fn within(self, other: Position, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimDirection {
    #[default]
    Vertical,
    DiagonalLeft,
    DiagonalRight,
    HorizontalLeft,
    HorizontalRight,
}

impl AimDirection {
    /// Per-step displacement of a projectile launched in this direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::Vertical => (0, -1),
            Self::DiagonalLeft => (-1, -1),
            Self::DiagonalRight => (1, -1),
            Self::HorizontalLeft => (-1, 0),
            Self::HorizontalRight => (1, 0),
        }
    }
}

/// Presentation surface size plus the two fixed layout bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMetrics {
    pub width: i32,
    pub height: i32,
    pub header: i32,
    pub footer: i32,
}

impl ViewportMetrics {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            header: HEADER_BAND,
            footer: FOOTER_BAND,
        }
    }

    /// Row where descending targets touch down and projectiles launch from.
    pub fn ground_row(&self) -> i32 {
        self.height - self.footer - 1
    }

    /// First row below the header band; targets enter here.
    pub fn entry_row(&self) -> i32 {
        self.header
    }

    /// True when the position lies inside the play field (between the bands).
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.x < self.width
            && position.y >= self.header
            && position.y < self.height - self.footer
    }

    pub fn clamp_column(&self, x: i32) -> i32 {
        x.clamp(0, (self.width - 1).max(0))
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_both_deltas_are_inside_tolerance_then_positions_collide() {
        let origin = Position::new(10, 10);
        assert!(origin.within(Position::new(12, 8), 2));
        assert!(!origin.within(Position::new(13, 10), 2));
        assert!(!origin.within(Position::new(10, 7), 2));
    }

    #[test]
    fn when_default_viewport_then_ground_is_above_footer() {
        let viewport = ViewportMetrics::default();
        assert_eq!(viewport.ground_row(), 29);
        assert!(viewport.contains(Position::new(0, viewport.ground_row())));
        assert!(!viewport.contains(Position::new(0, viewport.header - 1)));
        assert!(!viewport.contains(Position::new(viewport.width, 10)));
    }

    #[test]
    fn when_column_is_outside_then_it_is_clamped() {
        let viewport = ViewportMetrics::new(50, 20);
        assert_eq!(viewport.clamp_column(-4), 0);
        assert_eq!(viewport.clamp_column(60), 49);
        assert_eq!(viewport.clamp_column(20), 20);
    }
}
