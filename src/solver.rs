//! Numerical building blocks for placing a body on its orbit.

use core::f64::consts::TAU;

use glam::{DMat3, DVec2, DVec3};

use crate::{keplers_equation, keplers_equation_derivative, Matrix3x2, EPSILON, ITERATION_LIMIT};

/// The result of solving Kepler's equation for the eccentric anomaly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EccentricAnomaly {
    /// Newton-Raphson reached the tolerance within the iteration limit.
    Converged {
        /// The eccentric anomaly, in radians.
        value: f64,
        /// How many corrections were checked before the tolerance was met.
        iterations: u32,
    },
    /// The iteration limit was hit (or the iteration left the finite range)
    /// and the mean anomaly is used instead, which is the equivalent position
    /// on a circular orbit.
    Fallback {
        /// The mean anomaly the solve was started from, in radians.
        value: f64,
    },
}

impl EccentricAnomaly {
    /// Gets the eccentric anomaly to use for the position, whichever way the
    /// solve went.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            EccentricAnomaly::Converged { value, .. } => value,
            EccentricAnomaly::Fallback { value } => value,
        }
    }

    /// Whether the solve met the tolerance.
    #[inline]
    pub fn converged(self) -> bool {
        matches!(self, EccentricAnomaly::Converged { .. })
    }
}

/// Wraps a time into `[0, period)`.
///
/// Negative times (reverse traversal) wrap around to the end of the orbit.
///
/// # Example
/// ```
/// use orbit_rails::solver::wrap_time;
///
/// assert_eq!(wrap_time(12.0, 10.0), 2.0);
/// assert_eq!(wrap_time(-2.0, 10.0), 8.0);
/// ```
pub fn wrap_time(time: f64, period: f64) -> f64 {
    let wrapped = time.rem_euclid(period);

    // rem_euclid can round up to exactly `period` for tiny negative inputs
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Solves Kepler's equation `E - e sin(E) = M` for the eccentric anomaly
/// using Newton-Raphson iteration, seeded with `E = M`.
///
/// At most [`ITERATION_LIMIT`] corrections are checked. If none of them is
/// within [`EPSILON`], the mean anomaly is returned as a
/// [`Fallback`][EccentricAnomaly::Fallback].
///
/// # Example
/// ```
/// use orbit_rails::solver::solve_eccentric_anomaly;
///
/// let solved = solve_eccentric_anomaly(1.0, 0.3);
/// assert!(solved.converged());
///
/// let e = solved.value();
/// assert!((e - 0.3 * e.sin() - 1.0).abs() < 1e-5);
/// ```
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> EccentricAnomaly {
    let mut eccentric_anomaly = mean_anomaly;

    for iteration in 0..ITERATION_LIMIT {
        let delta = -keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity)
            / keplers_equation_derivative(eccentric_anomaly, eccentricity);

        if !delta.is_finite() {
            break;
        }

        if delta.abs() <= EPSILON {
            return EccentricAnomaly::Converged {
                value: eccentric_anomaly,
                iterations: iteration + 1,
            };
        }

        eccentric_anomaly += delta;
    }

    EccentricAnomaly::Fallback {
        value: mean_anomaly,
    }
}

/// Gets the sine and cosine of the true anomaly at an eccentric anomaly.
///
/// Returns `(sin, cos)`.
pub fn true_anomaly_sin_cos(eccentric_anomaly: f64, eccentricity: f64) -> (f64, f64) {
    let (sin_ecc, cos_ecc) = eccentric_anomaly.sin_cos();
    let denominator = keplers_equation_derivative(eccentric_anomaly, eccentricity);

    let sin_true = (1.0 - eccentricity * eccentricity).sqrt() * sin_ecc / denominator;
    let cos_true = (cos_ecc - eccentricity) / denominator;

    (sin_true, cos_true)
}

/// Gets the orbital radius at a true anomaly.
///
/// The conic-section radius is scaled by `1 / (1 - e)`, which pairs with the
/// apsis-based semi-major axis of [`OrbitalElements::derive`][crate::OrbitalElements::derive].
/// Both sides have to stay in step.
#[inline]
pub fn radius_at_true_anomaly(semilatus_rectum: f64, eccentricity: f64, cos_true: f64) -> f64 {
    semilatus_rectum / (1.0 + eccentricity * cos_true) / (1.0 - eccentricity)
}

/// Gets the 2D position in the orbital plane.
///
/// At periapsis this points along -q with length equal to the initial
/// distance from the centre.
#[inline]
pub fn perifocal_position(radius: f64, eccentricity: f64, sin_true: f64, cos_true: f64) -> DVec2 {
    DVec2::new(radius * sin_true, radius * (eccentricity - cos_true))
}

/// Gets the transformation matrix that tilts the orbital plane into 3D,
/// from the classical three-angle composition.
///
/// Reference:
/// <https://downloads.rene-schwarz.com/download/M001-Keplerian_Orbit_Elements_to_Cartesian_State_Vectors.pdf>
pub fn transformation_matrix(
    inclination: f64,
    arg_perifocal_point: f64,
    right_ascension: f64,
) -> Matrix3x2 {
    let (sin_inc, cos_inc) = inclination.sin_cos();
    let (sin_arg, cos_arg) = arg_perifocal_point.sin_cos();
    let (sin_ra, cos_ra) = right_ascension.sin_cos();

    Matrix3x2 {
        e11: cos_arg * cos_ra - sin_arg * cos_inc * sin_ra,
        e12: -(sin_arg * cos_ra + cos_arg * cos_inc * sin_ra),

        e21: cos_arg * sin_ra + sin_arg * cos_inc * cos_ra,
        e22: cos_arg * cos_inc * cos_ra - sin_arg * sin_ra,

        e31: sin_arg * sin_inc,
        e32: cos_arg * sin_inc,
    }
}

/// Tilts a perifocal position into the simulation frame.
///
/// The simulation frame is the classical inertial frame turned a quarter
/// turn about +Z, so `(X, Y, Z)` lands on `(-Y, X, Z)`.
#[inline]
pub fn tilt_perifocal(matrix: &Matrix3x2, perifocal: DVec2) -> DVec3 {
    let inertial = matrix.dot_vec(perifocal);
    DVec3::new(-inertial.y, inertial.x, inertial.z)
}

/// Rotates an offset about +Z by a yaw angle in radians.
#[inline]
pub fn apply_yaw(offset: DVec3, yaw: f64) -> DVec3 {
    DMat3::from_rotation_z(yaw) * offset
}

/// Splits a direction into `(pitch, yaw)` in radians.
///
/// Pitch is the elevation above the XY plane, yaw the heading from +X
/// towards +Y. A zero vector gives `(0, 0)`.
pub fn pitch_yaw(direction: DVec3) -> (f64, f64) {
    let yaw = direction.y.atan2(direction.x);
    let pitch = direction.z.atan2(direction.truncate().length());
    (pitch, yaw.rem_euclid(TAU))
}
