use nalgebra::Point3;

/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_sq(p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    nalgebra::distance_squared(p1, p2)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    distance_sq(p1, p2).sqrt()
}

/// Distance between atoms `i` and `j` (0-based), `None` if either is missing.
pub fn pair_distance(coords: &[Point3<f64>], i: usize, j: usize) -> Option<f64> {
    Some(distance(coords.get(i)?, coords.get(j)?))
}
