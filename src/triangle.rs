//! Apparent to true wind vector transform

use crate::math::{round2, wrap_degrees};

/// True wind relative to the boat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrueWind {
    /// True wind speed, knots
    pub speed_kn: f64,
    /// True wind angle, degrees `[0, 360)`
    pub angle_deg: f64,
}

impl TrueWind {
    /// Both values rounded to two decimals for display and logging
    pub fn rounded(&self) -> Self {
        Self {
            speed_kn: round2(self.speed_kn),
            angle_deg: round2(self.angle_deg),
        }
    }
}

/// Wind triangle solver
///
/// Resolves the apparent wind into bow (x) and starboard (y) components and
/// removes the boat's own forward motion from the bow component. Leeway and
/// current are not modelled.
///
/// # Example
/// ```
/// use fusion_wind::WindTriangleSolver;
///
/// let wind = WindTriangleSolver.solve(10.0, 45.0, 5.0).rounded();
/// assert_eq!(wind.speed_kn, 7.37);
/// assert_eq!(wind.angle_deg, 73.68);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WindTriangleSolver;

impl WindTriangleSolver {
    /// Solve for true wind; no intermediate rounding.
    ///
    /// # Arguments
    /// * `aws` - Apparent wind speed, knots
    /// * `awa` - Apparent wind angle (already shift-corrected), degrees
    /// * `boat_speed` - Boat speed, knots
    pub fn solve(&self, aws: f64, awa: f64, boat_speed: f64) -> TrueWind {
        let (sin_awa, cos_awa) = awa.to_radians().sin_cos();
        let tw_x = aws * cos_awa - boat_speed;
        let tw_y = aws * sin_awa;

        TrueWind {
            speed_kn: tw_x.hypot(tw_y),
            angle_deg: wrap_degrees(tw_y.atan2(tw_x).to_degrees()),
        }
    }
}
