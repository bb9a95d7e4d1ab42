//! Tilt (beta) angle extraction from an averaged attitude.

use crate::orientation::Quaternion;

/// Forward pitch of the device in radians, in (-pi, pi].
///
/// `atan2(2(ex + yz), 1 - 2(x^2 + y^2))`, evaluated literally so that unnormalized
/// averages behave as they always have. Because of the constant `1`, only unit-norm
/// inputs are invariant under rescaling.
///
/// The zero quaternion has no attitude; passing it is a contract violation.
pub fn tilt(q: &Quaternion) -> f64 {
    debug_assert!(!q.is_zero(), "tilt of the zero quaternion is undefined");
    (2.0 * (q.e * q.x + q.y * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    /// Homogeneous form of the same angle: equal to `tilt` on unit quaternions and
    /// unchanged by any positive rescaling.
    fn homogeneous_tilt(q: &Quaternion) -> f64 {
        (2.0 * (q.e * q.x + q.y * q.z)).atan2(q.e * q.e + q.z * q.z - q.x * q.x - q.y * q.y)
    }

    /// Angular distance modulo a full turn, so +-pi count as equal.
    fn wrapped_diff(a: f64, b: f64) -> f64 {
        let diff = (a - b).rem_euclid(2.0 * PI);
        diff.min(2.0 * PI - diff)
    }

    #[test]
    fn identity_is_level() {
        assert_eq!(tilt(&Quaternion::IDENTITY), 0.0);
    }

    #[test]
    fn recovers_pitch_angle() {
        for angle in [-3.0, -FRAC_PI_2, -0.25, FRAC_PI_4, 2.0, 3.0] {
            assert_relative_eq!(tilt(&Quaternion::from_tilt(angle)), angle, epsilon = 1e-12);
        }
    }

    #[test]
    fn upside_down_is_pi() {
        assert_relative_eq!(tilt(&Quaternion::new(1.0, 0.0, 0.0, 0.0)), PI);
    }

    #[test]
    fn yaw_does_not_tilt() {
        let half = 0.6_f64;
        let yawed = Quaternion::new(0.0, 0.0, half.sin(), half.cos());
        assert_relative_eq!(tilt(&yawed), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rescaled_attitude_changes_literal_tilt() {
        let q = Quaternion::from_tilt(FRAC_PI_4);
        let halved = tilt(&(q * 0.5));
        // atan2(sin(pi/4) / 4, 1 - (1 - cos(pi/4)) / 4)
        assert_relative_eq!(halved, 0.1767767_f64.atan2(0.9267767), epsilon = 1e-6);
        assert!((halved - FRAC_PI_4).abs() > 0.5);
    }

    proptest! {
        #[test]
        fn literal_tilt_matches_homogeneous_form_on_unit_quaternions(
            x in -1.0f64..1.0,
            y in -1.0f64..1.0,
            z in -1.0f64..1.0,
            e in -1.0f64..1.0,
        ) {
            let q = Quaternion::new(x, y, z, e);
            prop_assume!(q.norm() > 1e-3);
            let unit = q * (1.0 / q.norm());
            prop_assert!(wrapped_diff(tilt(&unit), homogeneous_tilt(&unit)) < 1e-9);
        }

        #[test]
        fn rescaling_keeps_homogeneous_but_not_literal_tilt(
            angle in -3.0f64..3.0,
            k in 0.1f64..10.0,
        ) {
            let q = Quaternion::from_tilt(angle);
            let scaled = q * k;
            prop_assert!(wrapped_diff(homogeneous_tilt(&scaled), tilt(&q)) < 1e-9);
            if (k - 1.0).abs() > 1e-3 && angle.abs() > 0.1 && (PI - angle.abs()) > 0.1 {
                prop_assert!(wrapped_diff(tilt(&scaled), tilt(&q)) > 1e-9);
            }
        }
    }
}
