use serde::Serialize;

use crate::geometry::Axis;

pub const DIAGONAL_SCALE: f64 = std::f64::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub const fn intent(self) -> Intent {
        match self {
            Direction::Left => Intent { x: -1, y: 0 },
            Direction::Right => Intent { x: 1, y: 0 },
            Direction::Up => Intent { x: 0, y: -1 },
            Direction::Down => Intent { x: 0, y: 1 },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Intent {
    pub x: i32,
    pub y: i32,
}

impl Intent {
    pub const ZERO: Intent = Intent { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    pub fn from_directions<I>(directions: I) -> Self
    where
        I: IntoIterator<Item = Direction>,
    {
        let (x, y) = directions
            .into_iter()
            .map(Direction::intent)
            .fold((0, 0), |(x, y), intent| (x + intent.x, y + intent.y));
        Self::new(x, y)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn is_diagonal(&self) -> bool {
        self.x != 0 && self.y != 0
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Sub-pixel motion carried between ticks. Each component keeps the sign of
/// the motion that produced it and stays strictly inside (-1, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Remainder {
    pub x: f64,
    pub y: f64,
}

impl Remainder {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Displacement {
    pub dx: i32,
    pub dy: i32,
}

impl Displacement {
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
        }
    }
}

pub fn advance(
    intent: Intent,
    speed_px_per_second: f64,
    dt_seconds: f64,
    remainder: &mut Remainder,
) -> Displacement {
    let dt_seconds = if dt_seconds.is_finite() {
        dt_seconds.max(0.0)
    } else {
        0.0
    };
    let scale = if intent.is_diagonal() {
        DIAGONAL_SCALE
    } else {
        1.0
    };
    let frame_speed = speed_px_per_second * scale * dt_seconds;

    let mut displacement = Displacement::default();
    for axis in Axis::BOTH {
        let accumulated = remainder.get(axis) + f64::from(intent.get(axis)) * frame_speed;
        let (whole, fraction) = split_whole(accumulated);
        remainder.set(axis, fraction);
        match axis {
            Axis::X => displacement.dx = whole,
            Axis::Y => displacement.dy = whole,
        }
    }
    displacement
}

/// Splits `value` into whole pixels and a fraction with the same sign as
/// `value`: `-1.2` becomes `(-1, -0.2)` and `-0.3` stays `(0, -0.3)`.
pub fn split_whole(value: f64) -> (i32, f64) {
    if !value.is_finite() {
        return (0, 0.0);
    }
    let fraction = value % 1.0;
    let whole = (value - fraction).round();
    (whole as i32, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(intent: Intent, speed: f64, dt: f64, ticks: usize) -> (i64, i64, Remainder) {
        let mut remainder = Remainder::default();
        let mut total = (0i64, 0i64);
        for _ in 0..ticks {
            let step = advance(intent, speed, dt, &mut remainder);
            total.0 += i64::from(step.dx);
            total.1 += i64::from(step.dy);
        }
        (total.0, total.1, remainder)
    }

    #[test]
    fn split_whole_keeps_sign_of_value() {
        assert_eq!(split_whole(2.5), (2, 0.5));
        let (whole, fraction) = split_whole(-1.25);
        assert_eq!(whole, -1);
        assert!((fraction + 0.25).abs() < 1e-12);
        let (whole, fraction) = split_whole(-0.3);
        assert_eq!(whole, 0);
        assert!((fraction + 0.3).abs() < 1e-12);
    }

    #[test]
    fn split_whole_degrades_non_finite_to_zero() {
        assert_eq!(split_whole(f64::NAN), (0, 0.0));
        assert_eq!(split_whole(f64::INFINITY), (0, 0.0));
    }

    #[test]
    fn ten_tenth_second_ticks_move_190_pixels() {
        let (dx, dy, remainder) = run_ticks(Direction::Right.intent(), 190.0, 0.1, 10);
        assert_eq!(dx, 190);
        assert_eq!(dy, 0);
        assert!(remainder.x.abs() < 1e-6, "remainder = {}", remainder.x);
    }

    #[test]
    fn cumulative_displacement_is_frame_rate_independent() {
        let total_seconds = 2.0;
        let speed = 137.0;
        for ticks in [1usize, 2, 3, 7, 10, 33, 60, 144, 1000] {
            let dt = total_seconds / ticks as f64;
            for direction in Direction::ALL {
                let intent = direction.intent();
                let (dx, dy, _) = run_ticks(intent, speed, dt, ticks);
                let expected = (speed * total_seconds).round() as i64;
                let moved = dx.abs() + dy.abs();
                assert!(
                    (moved - expected).abs() <= 1,
                    "{direction:?} over {ticks} ticks moved {moved}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn small_negative_motion_accumulates_into_whole_pixels() {
        let mut remainder = Remainder::default();
        let mut total = 0;
        for _ in 0..10 {
            total += advance(Direction::Left.intent(), 3.0, 0.1, &mut remainder).dx;
        }
        assert!((total + 3).abs() <= 1, "total = {total}");
        assert!(remainder.x <= 0.0);
    }

    #[test]
    fn diagonal_intent_matches_straight_distance() {
        let speed = 190.0;
        let (sx, _, _) = run_ticks(Intent::new(1, 0), speed, 1.0 / 60.0, 120);
        let (dx, dy, _) = run_ticks(Intent::new(1, 1), speed, 1.0 / 60.0, 120);
        let diagonal = ((dx * dx + dy * dy) as f64).sqrt();
        assert!(
            (diagonal - sx as f64).abs() <= 2.0,
            "diagonal {diagonal} vs straight {sx}"
        );
        assert_eq!(dx, dy);
    }

    #[test]
    fn opposite_directions_cancel() {
        let intent = Intent::from_directions([Direction::Left, Direction::Right, Direction::Up]);
        assert_eq!(intent, Intent::new(0, -1));
        assert!(Intent::from_directions([]).is_zero());
    }

    #[test]
    fn zero_or_invalid_dt_does_not_move() {
        let mut remainder = Remainder { x: 0.5, y: -0.5 };
        let step = advance(Intent::new(1, 1), 190.0, f64::NAN, &mut remainder);
        assert!(step.is_zero());
        assert_eq!(remainder, Remainder { x: 0.5, y: -0.5 });
        let step = advance(Intent::new(1, 0), 190.0, -1.0, &mut remainder);
        assert!(step.is_zero());
    }
}
