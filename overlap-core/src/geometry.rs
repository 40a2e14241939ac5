/// Placement of the fixed left circle and the adjustable right circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleLayout {
    pub left_center: (f64, f64),
    pub left_radius: f64,
    pub right_center: (f64, f64),
    pub right_radius: f64,
}

impl CircleLayout {
    /// Horizontal distance between the two centers.
    pub fn separation(&self) -> f64 {
        self.right_center.0 - self.left_center.0
    }
}

/// Radius of the right circle so that its *area* is `size_percent` of the
/// base circle's area.
pub fn right_radius(size_percent: f64, base_radius: f64) -> f64 {
    base_radius * (size_percent / 100.0).sqrt()
}

/// Center-to-center distance for the requested overlap.
///
/// 0% leaves the circles touching; 100% slides the right circle in by the
/// diameter of the smaller one.
pub fn separation(overlap_percent: f64, left_radius: f64, right_radius: f64) -> f64 {
    if overlap_percent == 0.0 {
        return left_radius + right_radius;
    }
    let max_overlap = 2.0 * left_radius.min(right_radius);
    let actual_overlap = (overlap_percent / 100.0) * max_overlap;
    left_radius + right_radius - actual_overlap
}

/// Computes both circles from the two slider values.
///
/// The left circle keeps `base_radius` and `left_center`; the right circle
/// shares its vertical center. `size_percent` must be positive, which the
/// size slider's bounds guarantee.
pub fn compute_layout(
    size_percent: f64,
    overlap_percent: f64,
    base_radius: f64,
    left_center: (f64, f64),
) -> CircleLayout {
    let right = right_radius(size_percent, base_radius);
    let right_x = left_center.0 + separation(overlap_percent, base_radius, right);
    CircleLayout {
        left_center,
        left_radius: base_radius,
        right_center: (right_x, left_center.1),
        right_radius: right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn radius_scales_with_area() {
        assert!((right_radius(100.0, 50.0) - 50.0).abs() < EPS);
        assert!((right_radius(400.0, 50.0) - 100.0).abs() < EPS);
        assert!((right_radius(25.0, 50.0) - 25.0).abs() < EPS);
    }

    #[test]
    fn zero_overlap_touches() {
        let layout = compute_layout(400.0, 0.0, 50.0, (550.0, 300.0));
        assert!((layout.separation() - 150.0).abs() < EPS);
        assert_eq!(layout.right_center.1, 300.0);
    }

    #[test]
    fn full_overlap_with_equal_radii_is_concentric() {
        let layout = compute_layout(100.0, 100.0, 50.0, (550.0, 300.0));
        assert!(layout.separation().abs() < EPS);
        assert!((layout.right_center.0 - 550.0).abs() < EPS);
    }

    #[test]
    fn full_overlap_uses_smaller_diameter() {
        // r1 = 50, r2 = 100: max overlap is 100, so centers end 50 apart
        assert!((separation(100.0, 50.0, 100.0) - 50.0).abs() < EPS);
    }

    #[test]
    fn separation_never_grows_with_overlap() {
        for &size in &[10.0, 55.0, 100.0, 400.0, 1000.0] {
            let r2 = right_radius(size, 50.0);
            let mut last = f64::INFINITY;
            for step in 0..=100 {
                let s = separation(step as f64, 50.0, r2);
                assert!(s <= last + EPS, "size {size}, overlap {step}");
                last = s;
            }
        }
    }
}
