use nalgebra::Vector2;

/// Smallest distance the collision code will divide by.
pub const EPSILON: f64 = 1e-5;

/// Euclidean distance between two points.
pub fn distance(p0: &Vector2<f64>, p1: &Vector2<f64>) -> f64 {
    magnitude(&[p1.x - p0.x, p1.y - p0.y])
}

/// Euclidean norm of a vector of any arity.
pub fn magnitude(components: &[f64]) -> f64 {
    components.iter().map(|c| c * c).sum::<f64>().sqrt()
}

pub fn clamp_distance(d: f64) -> f64 {
    d.max(EPSILON)
}

/// Unit vector at `angle` radians from the positive x axis.
pub fn unit(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Vector2::new(1., 2.);
        let b = Vector2::new(4., 6.);
        assert_eq!(distance(&a, &b), 5.);
        assert_eq!(distance(&b, &a), 5.);
        assert_eq!(distance(&a, &a), 0.);
    }

    #[test]
    fn magnitude_any_arity() {
        assert_eq!(magnitude(&[]), 0.);
        assert_eq!(magnitude(&[-3.]), 3.);
        assert_eq!(magnitude(&[3., 4.]), 5.);
        assert_eq!(magnitude(&[2., 3., 6.]), 7.);
    }

    #[test]
    fn clamp_keeps_divisor_positive() {
        assert_eq!(clamp_distance(0.), EPSILON);
        assert_eq!(clamp_distance(2.), 2.);
    }
}
