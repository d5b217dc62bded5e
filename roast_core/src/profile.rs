//! Piecewise-linear reference profiles (time → bean temperature).
//!
//! A profile is an ordered list of `(minutes, °C)` waypoints evaluated with
//! hold-first / hold-last / linear-interpolate-between rules. The same
//! evaluation is used for plotting sequences, PID setpoints, and the neural
//! controller's future/past reference samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, RoastError};
use crate::state::TEMP_SCALE;

/// One `(minutes, °C)` profile waypoint.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Waypoint {
    pub time_min: f64,
    pub temp_c: f64,
}

/// Summary metadata carried with a full profile.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ProfileSummary {
    pub duration_min: f64,
    pub max_temp_c: f64,
    pub final_temp_c: f64,
    /// Steepest segment slope in °C/min.
    pub max_ror_c_per_min: f64,
}

/// Validated, time-sorted reference trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceProfile {
    waypoints: Vec<Waypoint>,
}

impl ReferenceProfile {
    /// Build a profile from waypoints. Rejects fewer than two points or
    /// non-finite values; sorts by time and rejects duplicate times, so an
    /// out-of-order edit can never reach evaluation.
    pub fn new(mut waypoints: Vec<Waypoint>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(eyre::Report::new(RoastError::Profile(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            ))));
        }
        for (i, w) in waypoints.iter().enumerate() {
            if !w.time_min.is_finite() || !w.temp_c.is_finite() {
                return Err(eyre::Report::new(RoastError::Profile(format!(
                    "waypoint {i} has non-finite values"
                ))));
            }
        }
        waypoints.sort_by(|a, b| a.time_min.total_cmp(&b.time_min));
        for i in 1..waypoints.len() {
            if waypoints[i].time_min == waypoints[i - 1].time_min {
                return Err(eyre::Report::new(RoastError::Profile(format!(
                    "duplicate waypoint time {} min",
                    waypoints[i].time_min
                ))));
            }
        }
        Ok(Self { waypoints })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Evaluate the target temperature at `t_min`: hold the first value
    /// before the profile, hold the last after it, interpolate between.
    pub fn evaluate(&self, t_min: f64) -> f64 {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        if t_min <= first.time_min {
            return first.temp_c;
        }
        if t_min >= last.time_min {
            return last.temp_c;
        }
        for pair in self.waypoints.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t_min >= a.time_min && t_min < b.time_min {
                let frac = (t_min - a.time_min) / (b.time_min - a.time_min);
                return a.temp_c + frac * (b.temp_c - a.temp_c);
            }
        }
        // Unreachable given the hold checks above; keep the hold-last rule.
        last.temp_c
    }

    /// Evaluate onto an arbitrary time sequence (dense plotting, scoring).
    pub fn sample(&self, times_min: &[f64]) -> Vec<f64> {
        times_min.iter().map(|&t| self.evaluate(t)).collect()
    }

    pub fn summary(&self) -> ProfileSummary {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        let max_temp_c = self
            .waypoints
            .iter()
            .map(|w| w.temp_c)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_ror_c_per_min = self
            .waypoints
            .windows(2)
            .map(|p| (p[1].temp_c - p[0].temp_c) / (p[1].time_min - p[0].time_min))
            .fold(0.0_f64, f64::max);
        ProfileSummary {
            duration_min: last.time_min - first.time_min,
            max_temp_c,
            final_temp_c: last.temp_c,
            max_ror_c_per_min,
        }
    }

    /// Fixed default roast curve: room temp, 1-minute-scale drying ramp,
    /// development to 203 °C at 10 minutes.
    pub fn default_roast() -> Self {
        // The 5-minute waypoint is 160 °C; see DESIGN.md.
        let waypoints = vec![
            Waypoint {
                time_min: 0.0,
                temp_c: 24.0,
            },
            Waypoint {
                time_min: 0.5,
                temp_c: 100.0,
            },
            Waypoint {
                time_min: 5.0,
                temp_c: 160.0,
            },
            Waypoint {
                time_min: 10.0,
                temp_c: 203.0,
            },
        ];
        Self { waypoints }
    }

    /// Two-point linear ramp from `(0, start_c)` to `(duration_min, end_c)`;
    /// evaluation holds `end_c` beyond the duration.
    pub fn linear_ramp(start_c: f64, end_c: f64, duration_min: f64) -> Result<Self> {
        if !(duration_min > 0.0) {
            return Err(eyre::Report::new(RoastError::Profile(
                "ramp duration must be > 0".into(),
            )));
        }
        Self::new(vec![
            Waypoint {
                time_min: 0.0,
                temp_c: start_c,
            },
            Waypoint {
                time_min: duration_min,
                temp_c: end_c,
            },
        ])
    }

    /// Seeded randomized profile.
    ///
    /// One fixed drying segment from 24 °C to 100 °C over exactly 1 minute,
    /// then 4–9 development segments of equal duration filling the remainder
    /// of `total_min`. Development slopes are drawn uniformly from
    /// [0, 0.2] normalized/min and sorted descending, so segment slopes
    /// decelerate monotonically while temperature keeps rising. Temperatures
    /// are clipped to [0.2, 2.5] normalized (20–250 °C) before denormalizing.
    pub fn randomized(seed: u64, total_min: f64) -> Result<Self> {
        const DRYING_MIN: f64 = 1.0;
        const DRYING_START: f64 = 0.24;
        const DRYING_END: f64 = 1.0;
        const SLOPE_MAX: f64 = 0.2;
        const CLIP_LO: f64 = 0.2;
        const CLIP_HI: f64 = 2.5;

        if !(total_min > DRYING_MIN) {
            return Err(eyre::Report::new(RoastError::Profile(format!(
                "randomized profile needs total_min > {DRYING_MIN}, got {total_min}"
            ))));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let n_dev: usize = rng.gen_range(4..=9);
        let mut slopes: Vec<f64> = (0..n_dev)
            .map(|_| rng.gen_range(0.0..=SLOPE_MAX))
            .collect();
        slopes.sort_by(|a, b| b.total_cmp(a));

        let dev_total = total_min - DRYING_MIN;
        let seg_min = dev_total / n_dev as f64;

        let mut waypoints = Vec::with_capacity(n_dev + 2);
        let clip = |t: f64| t.clamp(CLIP_LO, CLIP_HI);
        waypoints.push(Waypoint {
            time_min: 0.0,
            temp_c: clip(DRYING_START) * TEMP_SCALE,
        });
        waypoints.push(Waypoint {
            time_min: DRYING_MIN,
            temp_c: clip(DRYING_END) * TEMP_SCALE,
        });

        // Segment n starts at the ending temperature of segment n-1.
        let mut t_norm = DRYING_END;
        for (i, slope) in slopes.iter().enumerate() {
            t_norm += slope * seg_min;
            waypoints.push(Waypoint {
                time_min: DRYING_MIN + seg_min * (i + 1) as f64,
                temp_c: clip(t_norm) * TEMP_SCALE,
            });
        }

        Self::new(waypoints)
    }
}
