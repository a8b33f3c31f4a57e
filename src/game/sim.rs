//! Drone simulation state and per-tick transition
//!
//! The simulation is deliberately timer-free: `advance` is one deterministic
//! tick against a geometry snapshot, and `apply` folds in edge-triggered
//! player input. The session loop in [`super::session`] drives both.

use super::geometry::TunnelGeometry;
use super::{
    InputEvent, CANVAS_WIDTH, CENTER_X, COLLISION_TOLERANCE, DRONE_SIZE, DRONE_START_X,
    INITIAL_SCROLL_SPEED, LATERAL_SPEED, MAX_SCROLL_SPEED, SCORE_MULTIPLIER, SEGMENT_HEIGHT,
    WIN_MARGIN,
};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scrolling has not yet carried the drone past the first segment
    NotStarted,
    /// Run in progress
    Running,
    /// Tunnel end reached
    Won,
    /// Drone hit a wall
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// Authoritative per-session simulation state
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Drone left edge, clamped to `[0, CANVAS_WIDTH - DRONE_SIZE]`
    pub drone_x: f64,
    /// Signed lateral velocity, set and cleared by steering input
    pub lateral_speed: f64,
    /// Vertical scroll offset, non-decreasing while active
    pub offset_y: f64,
    /// Vertical traversal rate; zero only before the first speed-up
    pub scroll_speed: f64,
    /// Accrued score
    pub score: f64,
    pub phase: Phase,
    complexity: u32,
}

impl Simulation {
    pub fn new(complexity: u32) -> Self {
        Self {
            drone_x: DRONE_START_X,
            lateral_speed: 0.0,
            offset_y: 0.0,
            scroll_speed: 0.0,
            score: 0.0,
            phase: Phase::NotStarted,
            complexity,
        }
    }

    /// Scroll speed adjustment step; higher complexity reacts more coarsely
    fn speed_increment(&self) -> f64 {
        self.complexity as f64 / 10.0
    }

    /// Fold one edge-triggered input event into the state
    pub fn apply(&mut self, event: InputEvent) {
        if self.phase.is_terminal() {
            return;
        }

        match event {
            InputEvent::LeftPressed => self.lateral_speed = -LATERAL_SPEED,
            InputEvent::RightPressed => self.lateral_speed = LATERAL_SPEED,
            InputEvent::LeftReleased | InputEvent::RightReleased => self.lateral_speed = 0.0,
            InputEvent::SpeedUp => {
                self.scroll_speed = if self.scroll_speed == 0.0 {
                    INITIAL_SCROLL_SPEED
                } else {
                    (self.scroll_speed + self.speed_increment()).min(MAX_SCROLL_SPEED)
                };
            }
            InputEvent::SlowDown => {
                // Cannot return to a standstill once scrolling has started,
                // and does not start the scroll on its own.
                if self.scroll_speed > 0.0 {
                    self.scroll_speed =
                        (self.scroll_speed - self.speed_increment()).max(INITIAL_SCROLL_SPEED);
                }
            }
            InputEvent::Quit => {}
        }
    }

    /// Advance the state by one fixed tick against the current geometry
    pub fn advance(&mut self, geometry: &TunnelGeometry) {
        if self.phase.is_terminal() {
            return;
        }

        if self.scroll_speed > 0.0 {
            self.score += SCORE_MULTIPLIER * (self.complexity as f64 + self.scroll_speed);
        }

        self.offset_y += self.scroll_speed;

        if self.phase == Phase::NotStarted && self.offset_y > SEGMENT_HEIGHT {
            self.phase = Phase::Running;
        }

        self.drone_x =
            (self.drone_x + self.lateral_speed).clamp(0.0, CANVAS_WIDTH - DRONE_SIZE);

        self.check_collision(geometry);
        self.check_win(geometry);
    }

    /// Collision against the leading-edge segment at the current offset.
    ///
    /// A discrete approximation: the tick rate bounds scroll distance per
    /// tick below the segment height, so the leading segment is the only
    /// candidate each tick.
    fn check_collision(&mut self, geometry: &TunnelGeometry) {
        let index = TunnelGeometry::leading_index(self.offset_y);
        let Some(segment) = geometry.get(index) else {
            return;
        };

        let left_limit = CENTER_X + segment.left;
        let right_limit = CENTER_X + segment.right;

        let drone_left = self.drone_x;
        let drone_right = self.drone_x + DRONE_SIZE;

        if drone_left < left_limit - COLLISION_TOLERANCE
            || drone_right > right_limit + COLLISION_TOLERANCE
        {
            self.phase = Phase::Lost;
        }
    }

    fn check_win(&mut self, geometry: &TunnelGeometry) {
        if self.phase != Phase::Running || !geometry.is_complete() {
            return;
        }
        if self.offset_y >= geometry.total_height() - WIN_MARGIN {
            self.phase = Phase::Won;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::geometry::WallSegment;
    use super::*;

    /// Frozen corridor of identical segments
    fn corridor(count: usize, left: f64, right: f64) -> TunnelGeometry {
        let mut geo = TunnelGeometry::new();
        for _ in 0..count {
            geo.push(WallSegment { left, right });
        }
        geo.freeze();
        geo
    }

    #[test]
    fn drone_inside_the_walls_survives() {
        // Walls at [200, 300]; drone right edge exactly on the left limit.
        let geo = corridor(100, -50.0, 50.0);
        let mut sim = Simulation::new(1);
        sim.drone_x = 180.0;

        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::NotStarted);
    }

    #[test]
    fn drone_past_the_left_wall_is_lost() {
        let geo = corridor(100, -50.0, 50.0);
        let mut sim = Simulation::new(1);
        sim.drone_x = 150.0;

        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::Lost);
    }

    #[test]
    fn drone_past_the_right_wall_is_lost() {
        let geo = corridor(100, -50.0, 50.0);
        let mut sim = Simulation::new(1);

        sim.drone_x = 290.0; // right edge 310, within the tolerance band
        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::NotStarted);

        sim.drone_x = 310.0; // right edge 330, past it
        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::Lost);
    }

    #[test]
    fn collision_skipped_where_no_segment_exists() {
        let geo = corridor(2, -50.0, 50.0);
        let mut sim = Simulation::new(1);
        sim.offset_y = 10.0 * SEGMENT_HEIGHT; // past the last segment
        sim.drone_x = 0.0;

        sim.advance(&geo);
        assert_ne!(sim.phase, Phase::Lost);
    }

    #[test]
    fn no_score_while_stationary() {
        let geo = corridor(100, -200.0, 200.0);
        let mut sim = Simulation::new(1);

        for _ in 0..50 {
            sim.advance(&geo);
        }
        assert_eq!(sim.score, 0.0);
        assert_eq!(sim.offset_y, 0.0);
    }

    #[test]
    fn score_increases_strictly_while_scrolling() {
        let geo = corridor(1000, -200.0, 200.0);
        let mut sim = Simulation::new(3);
        sim.apply(InputEvent::SpeedUp);

        let mut last = 0.0;
        for _ in 0..50 {
            sim.advance(&geo);
            assert!(sim.score > last);
            last = sim.score;
        }
    }

    #[test]
    fn run_starts_after_the_first_segment_scrolls_past() {
        let geo = corridor(1000, -200.0, 200.0);
        let mut sim = Simulation::new(1);
        sim.apply(InputEvent::SpeedUp); // speed 1.0

        for _ in 0..10 {
            sim.advance(&geo);
            assert_eq!(sim.phase, Phase::NotStarted);
        }
        sim.advance(&geo); // offset 11.0 > SEGMENT_HEIGHT
        assert_eq!(sim.phase, Phase::Running);
    }

    #[test]
    fn win_fires_once_and_is_idempotent() {
        let geo = corridor(50, -200.0, 200.0);
        let mut sim = Simulation::new(10);
        for _ in 0..100 {
            sim.apply(InputEvent::SpeedUp);
        }
        assert_eq!(sim.scroll_speed, MAX_SCROLL_SPEED);

        let mut ticks = 0;
        while sim.phase != Phase::Won {
            sim.advance(&geo);
            ticks += 1;
            assert!(ticks < 1000, "run never finished");
        }

        // 500 total height, win margin 20, 10 units per tick.
        assert_eq!(ticks, 48);
        let final_score = sim.score;
        let final_offset = sim.offset_y;

        for _ in 0..20 {
            sim.advance(&geo);
        }
        assert_eq!(sim.phase, Phase::Won);
        assert_eq!(sim.score, final_score);
        assert_eq!(sim.offset_y, final_offset);
    }

    #[test]
    fn no_win_before_the_geometry_is_frozen() {
        let mut geo = TunnelGeometry::new();
        for _ in 0..5 {
            geo.push(WallSegment { left: -200.0, right: 200.0 });
        }

        let mut sim = Simulation::new(1);
        sim.phase = Phase::Running;
        sim.offset_y = geo.total_height();
        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::Running);

        geo.freeze();
        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::Won);
    }

    #[test]
    fn scroll_speed_stays_within_bounds() {
        let mut sim = Simulation::new(10);

        // Slowing down before the first speed-up must not start the scroll.
        for _ in 0..10 {
            sim.apply(InputEvent::SlowDown);
        }
        assert_eq!(sim.scroll_speed, 0.0);

        for _ in 0..500 {
            sim.apply(InputEvent::SpeedUp);
            assert!(sim.scroll_speed <= MAX_SCROLL_SPEED);
        }
        assert_eq!(sim.scroll_speed, MAX_SCROLL_SPEED);

        for _ in 0..500 {
            sim.apply(InputEvent::SlowDown);
            assert!(sim.scroll_speed >= INITIAL_SCROLL_SPEED);
        }
        assert_eq!(sim.scroll_speed, INITIAL_SCROLL_SPEED);
    }

    #[test]
    fn speed_increment_scales_with_complexity() {
        let mut sim = Simulation::new(5);
        sim.apply(InputEvent::SpeedUp); // 0 -> initial
        sim.apply(InputEvent::SpeedUp);
        assert_eq!(sim.scroll_speed, INITIAL_SCROLL_SPEED + 0.5);
    }

    #[test]
    fn steering_clamps_to_the_play_field() {
        let geo = corridor(100, -260.0, 260.0); // walls beyond the field
        let mut sim = Simulation::new(1);

        sim.apply(InputEvent::LeftPressed);
        for _ in 0..200 {
            sim.advance(&geo);
        }
        assert_eq!(sim.drone_x, 0.0);

        sim.apply(InputEvent::LeftReleased);
        sim.advance(&geo);
        assert_eq!(sim.drone_x, 0.0);

        sim.apply(InputEvent::RightPressed);
        for _ in 0..200 {
            sim.advance(&geo);
        }
        assert_eq!(sim.drone_x, CANVAS_WIDTH - DRONE_SIZE);
    }

    #[test]
    fn input_after_a_terminal_phase_is_ignored() {
        let geo = corridor(100, -50.0, 50.0);
        let mut sim = Simulation::new(1);
        sim.drone_x = 0.0;
        sim.advance(&geo);
        assert_eq!(sim.phase, Phase::Lost);

        sim.apply(InputEvent::SpeedUp);
        assert_eq!(sim.scroll_speed, 0.0);
    }
}
