//! Parametric 3D curves used to sweep tubes (guide lines, sample knots).

use std::f32::consts::TAU;

use glam::Vec3;

/// Number of samples used to approximate arc length.
const ARC_LENGTH_DIVISIONS: usize = 200;

/// A curve parameterised over `t ∈ [0, 1]`.
///
/// [`point`](Self::point) is the raw parameterisation. The `*_at` variants
/// take an arc-length fraction `u` instead so that equally spaced `u` give
/// equally spaced points.
pub trait Curve3: Send + Sync {
    fn point(&self, t: f32) -> Vec3;

    /// Whether the curve ends where it starts.
    fn is_closed(&self) -> bool {
        false
    }

    /// Cumulative lengths at `divisions + 1` evenly spaced `t`.
    fn arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for i in 1..=divisions {
            let p = self.point(i as f32 / divisions as f32);
            sum += p.distance(last);
            lengths.push(sum);
            last = p;
        }
        lengths
    }

    fn length(&self) -> f32 {
        self.arc_lengths(ARC_LENGTH_DIVISIONS)
            .last()
            .copied()
            .unwrap_or(0.0)
    }

    /// Maps an arc-length fraction `u` to the raw parameter `t`.
    fn u_to_t(&self, u: f32) -> f32 {
        u_to_t(&self.arc_lengths(ARC_LENGTH_DIVISIONS), u)
    }

    fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length fraction `u` (finite difference).
    fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.u_to_t(u);
        let delta = 1e-4;
        let t1 = (t - delta).max(0.0);
        let t2 = (t + delta).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    /// `divisions + 1` points equally spaced along the curve.
    fn spaced_points(&self, divisions: usize) -> Vec<Vec3> {
        let lengths = self.arc_lengths(ARC_LENGTH_DIVISIONS);
        (0..=divisions)
            .map(|i| self.point(u_to_t(&lengths, i as f32 / divisions as f32)))
            .collect()
    }
}

fn u_to_t(lengths: &[f32], u: f32) -> f32 {
    let Some(&total) = lengths.last() else {
        return u;
    };
    if lengths.len() < 2 || total <= 0.0 {
        return u;
    }
    let target = u.clamp(0.0, 1.0) * total;

    // First sample whose cumulative length reaches the target.
    let i = lengths.partition_point(|&l| l < target).max(1);
    let (before, after) = (lengths[i - 1], lengths[i.min(lengths.len() - 1)]);
    let segment = after - before;
    let fraction = if segment > 0.0 {
        (target - before) / segment
    } else {
        0.0
    };
    ((i - 1) as f32 + fraction) / (lengths.len() - 1) as f32
}

/// Centripetal Catmull-Rom spline through a list of control points.
#[derive(Debug, Clone)]
pub struct CatmullRomCurve3 {
    pub points: Vec<Vec3>,
    pub closed: bool,
}

impl CatmullRomCurve3 {
    #[must_use]
    pub fn new(points: Vec<Vec3>, closed: bool) -> Self {
        Self { points, closed }
    }
}

impl Curve3 for CatmullRomCurve3 {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn point(&self, t: f32) -> Vec3 {
        let points = &self.points;
        let l = points.len();
        match l {
            0 => return Vec3::ZERO,
            1 => return points[0],
            _ => {}
        }

        let p = (l - usize::from(!self.closed)) as f32 * t.clamp(0.0, 1.0);
        let mut int_point = p.floor() as usize;
        let mut weight = p - int_point as f32;

        if !self.closed && int_point >= l - 1 {
            int_point = l - 2;
            weight = 1.0;
        }

        let at = |i: isize| points[i.rem_euclid(l as isize) as usize];
        let i = int_point as isize;

        let p0 = if self.closed || int_point > 0 {
            at(i - 1)
        } else {
            // Mirror the first segment outward.
            2.0 * points[0] - points[1]
        };
        let p1 = at(i);
        let p2 = at(i + 1);
        let p3 = if self.closed || int_point + 2 < l {
            at(i + 2)
        } else {
            2.0 * points[l - 1] - points[l - 2]
        };

        // Centripetal: knot spacing is |Δp|^0.5, i.e. |Δp|²^0.25.
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let mut t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
        let mut t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
        t1 *= dt1;
        t2 *= dt1;

        // Cubic Hermite between p1 and p2.
        let c0 = p1;
        let c1 = t1;
        let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
        let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;
        let w = weight;
        c0 + c1 * w + c2 * w * w + c3 * w * w * w
    }
}

/// The "granny knot" closed curve, scaled by 20.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrannyKnot;

impl Curve3 for GrannyKnot {
    fn is_closed(&self) -> bool {
        true
    }

    fn point(&self, t: f32) -> Vec3 {
        let t = TAU * t;
        let x = -0.22 * t.cos() - 1.28 * t.sin() - 0.44 * (3.0 * t).cos() - 0.78 * (3.0 * t).sin();
        let y = -0.1 * (2.0 * t).cos() - 0.27 * (2.0 * t).sin()
            + 0.38 * (4.0 * t).cos()
            + 0.46 * (4.0 * t).sin();
        let z = 0.7 * (3.0 * t).cos() - 0.4 * (3.0 * t).sin();
        Vec3::new(x, y, z) * 20.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_spline_hits_its_endpoints() {
        let curve = CatmullRomCurve3::new(
            vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)],
            false,
        );
        assert!(curve.point(0.0).distance(Vec3::ZERO) < 1e-4);
        assert!(curve.point(1.0).distance(Vec3::new(10.0, 10.0, 0.0)) < 1e-4);
        assert!(curve.point(0.5).distance(Vec3::new(10.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn closed_spline_wraps_around() {
        let curve = CatmullRomCurve3::new(
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ],
            true,
        );
        assert!(curve.point(0.0).distance(curve.point(1.0)) < 1e-4);
    }

    #[test]
    fn granny_knot_is_closed() {
        let knot = GrannyKnot;
        assert!(knot.point(0.0).distance(knot.point(1.0)) < 1e-3);
        assert!(knot.length() > 0.0);
    }

    #[test]
    fn spaced_points_are_even() {
        let line = CatmullRomCurve3::new(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)], false);
        let pts = line.spaced_points(4);
        assert_eq!(pts.len(), 5);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.x - i as f32).abs() < 1e-2);
        }
    }
}
