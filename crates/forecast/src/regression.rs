use serde::Serialize;

/// Ordinary least squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Clamped to `[0, 1]`.
    pub r_squared: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through `points`.
///
/// Fewer than two points give a flat line through the single y value (or 0).
/// Points sharing one x value give a flat line through the mean of y. Both
/// degenerate cases report an R² of 0.
pub fn linear_regression(points: &[(f64, f64)]) -> Regression {
    match points {
        [] => return Regression::default(),
        [(_, y)] => {
            return Regression {
                slope: 0.0,
                intercept: *y,
                r_squared: 0.0,
            };
        }
        _ => {}
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in points {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }
    if denominator == 0.0 {
        return Regression {
            slope: 0.0,
            intercept: y_mean,
            r_squared: 0.0,
        };
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in points {
        ss_res += (y - (slope * x + intercept)).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    Regression {
        slope,
        intercept,
        r_squared: r_squared.clamp(0.0, 1.0),
    }
}
