use nalgebra::{Matrix3, Point3, Vector3};

/// Right-handed rotation about the x axis.
pub fn rotation_about_x(angle_degrees: f64) -> Matrix3<f64> {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

pub fn rotation_about_y(angle_degrees: f64) -> Matrix3<f64> {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    Matrix3::new(
        c, 0.0, s, //
        0.0, 1.0, 0.0, //
        -s, 0.0, c,
    )
}

pub fn rotation_about_z(angle_degrees: f64) -> Matrix3<f64> {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    Matrix3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Weighted mean of `points`, or `None` when the total weight is not positive.
pub fn weighted_centroid(points: &[(Point3<f64>, f64)]) -> Option<Point3<f64>> {
    let total: f64 = points.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, (p, w)| acc + p.coords * *w);
    Some(Point3::from(sum / total))
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Point3<f64>, b: &Point3<f64>) {
        assert!((a - b).norm() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn quarter_turns_follow_right_hand_rule() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        let z = Point3::new(0.0, 0.0, 1.0);
        assert_close(&(rotation_about_z(90.0) * x), &y);
        assert_close(&(rotation_about_x(90.0) * y), &z);
        assert_close(&(rotation_about_y(90.0) * z), &x);
    }

    #[test]
    fn weighted_centroid_leans_toward_heavier_points() {
        let points = [
            (Point3::new(0.0, 0.0, 0.0), 1.0),
            (Point3::new(4.0, 0.0, 0.0), 3.0),
        ];
        assert_close(&weighted_centroid(&points).unwrap(), &Point3::new(3.0, 0.0, 0.0));
        assert!(weighted_centroid(&[]).is_none());
    }
}
