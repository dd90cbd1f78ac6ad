use core::f64::consts::TAU;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{solver, InitError, Matrix3x2};

/// The static orbital elements of a body on rails.
///
/// Elements are derived once, from a snapshot of the body's offset from its
/// centre of orbit, and are never mutated afterwards. A value is obtained
/// either from [`OrbitalElements::derive`], which validates its inputs, or by
/// deserializing one that was derived elsewhere. Deserialized elements are
/// taken as they are; check them with
/// [`is_consistent`][OrbitalElements::is_consistent] before trusting them.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_rails::OrbitalElements;
///
/// let elements = OrbitalElements::derive(
///     // Offset of the orbiting body from the centre of orbit
///     DVec3::new(100.0, 0.0, 0.0),
///
///     // Eccentricity
///     0.0,
///
///     // Right ascension of the ascending node
///     0.0,
///
///     // Argument of perifocal point
///     0.0,
///
///     // Gravitational parameter
///     1e6,
/// )
/// .unwrap();
///
/// let position = elements.position_at_time(DVec3::ZERO, 0.0);
/// assert!((position - DVec3::new(100.0, 0.0, 0.0)).length() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElements {
    /// The eccentricity of the orbit, in `[0, 1)`.
    eccentricity: f64,

    /// The right ascension of the ascending node, in radians.
    right_ascension: f64,

    /// The argument of the perifocal point, in radians.
    arg_perifocal_point: f64,

    /// The inclination, in radians. Derived from the initial offset.
    inclination: f64,

    /// The heading of the initial offset about +Z, in radians.
    start_yaw: f64,

    semilatus_rectum: f64,

    /// Mean motion, in radians per second.
    mean_motion: f64,

    /// The time taken for one revolution, in seconds.
    period: f64,

    /// The time since periapsis at the moment of derivation, in seconds.
    initial_time: f64,

    /// The gravitational parameter of the centre of orbit.
    mu: f64,

    cache: ElementsCache,
}

// -------- MEMO --------
// When updating this struct, please review `OrbitalElements::derive()`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct ElementsCache {
    /// The transformation matrix to tilt the 2D planar orbit into 3D space.
    transformation_matrix: Matrix3x2,
}

impl OrbitalElements {
    /// Derives the orbital elements from the offset of the orbiting body
    /// relative to its centre of orbit.
    ///
    /// The offset is taken as an apsis of the orbit: true anomaly is zero at
    /// the moment of derivation, and the orbit plane's inclination and heading
    /// come from the offset's direction.
    ///
    /// # Parameters
    /// - `relative_position`: Orbiting body location minus centre location.
    /// - `eccentricity`: The eccentricity of the orbit. Must be below 1.
    /// - `right_ascension`: The right ascension of the ascending node, in radians.
    /// - `arg_perifocal_point`: The argument of the perifocal point, in radians.
    /// - `mu`: The gravitational parameter of the centre of orbit. Must be positive.
    ///
    /// # Errors
    /// - [`InitError::NoGravity`] if `mu` is not a positive finite number.
    /// - [`InitError::DegenerateOrbit`] if the eccentricity is outside `[0, 1)`.
    /// - [`InitError::InvalidOrientation`] if either angle is not finite.
    /// - [`InitError::CoincidentCentre`] if `relative_position` is zero.
    pub fn derive(
        relative_position: DVec3,
        eccentricity: f64,
        right_ascension: f64,
        arg_perifocal_point: f64,
        mu: f64,
    ) -> Result<OrbitalElements, InitError> {
        if !(mu > 0.0 && mu.is_finite()) {
            return Err(InitError::NoGravity { mu });
        }

        // Written so that NaN fails too
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(InitError::DegenerateOrbit { eccentricity });
        }

        if !(right_ascension.is_finite() && arg_perifocal_point.is_finite()) {
            return Err(InitError::InvalidOrientation {
                right_ascension,
                arg_perifocal_point,
            });
        }

        let distance = relative_position.length();

        if !(distance > 0.0 && distance.is_finite()) {
            return Err(InitError::CoincidentCentre);
        }

        // The centre of orbit sits on a focus and the orbiter is at an apsis
        let semi_major_axis = distance / (1.0 - eccentricity);
        let semilatus_rectum = semi_major_axis * (1.0 - eccentricity * eccentricity);

        let mean_motion = (mu / semi_major_axis.powi(3)).sqrt();
        let period = TAU / mean_motion;

        if !(period > 0.0 && period.is_finite()) {
            return Err(InitError::NoGravity { mu });
        }

        let (pitch, start_yaw) = solver::pitch_yaw(relative_position);
        let inclination = -pitch;

        let initial_time = Self::mean_anomaly_at_true_anomaly(0.0, eccentricity) / mean_motion;

        let cache = ElementsCache {
            transformation_matrix: solver::transformation_matrix(
                inclination,
                arg_perifocal_point,
                right_ascension,
            ),
        };

        Ok(OrbitalElements {
            eccentricity,
            right_ascension,
            arg_perifocal_point,
            inclination,
            start_yaw,
            semilatus_rectum,
            mean_motion,
            period,
            initial_time,
            mu,
            cache,
        })
    }

    fn mean_anomaly_at_true_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
        let (sin_true, cos_true) = true_anomaly.sin_cos();
        let denominator = 1.0 + eccentricity * cos_true;

        let sin_ecc = (1.0 - eccentricity * eccentricity).sqrt() * sin_true / denominator;
        let cos_ecc = (eccentricity + cos_true) / denominator;
        let eccentric_anomaly = sin_ecc.atan2(cos_ecc);

        // https://en.wikipedia.org/wiki/Kepler%27s_equation#Equation
        eccentric_anomaly - eccentricity * sin_ecc
    }

    /// Whether the derived values describe an orbit [`derive`][Self::derive]
    /// could have produced: eccentricity in `[0, 1)`, positive finite period,
    /// mean motion, semilatus rectum and gravitational parameter, and finite
    /// angles, initial time and transformation matrix.
    ///
    /// Deserialized elements are only as good as their sender, so observers
    /// check this before installing them.
    pub fn is_consistent(&self) -> bool {
        let positive = |value: f64| value > 0.0 && value.is_finite();
        let matrix = self.cache.transformation_matrix;

        (0.0..1.0).contains(&self.eccentricity)
            && positive(self.period)
            && positive(self.mean_motion)
            && positive(self.semilatus_rectum)
            && positive(self.mu)
            && [
                self.right_ascension,
                self.arg_perifocal_point,
                self.inclination,
                self.start_yaw,
                self.initial_time,
                matrix.e11,
                matrix.e12,
                matrix.e21,
                matrix.e22,
                matrix.e31,
                matrix.e32,
            ]
            .iter()
            .all(|value| value.is_finite())
    }

    /// Gets the absolute position of the orbiting body at a time relative to
    /// the moment of derivation.
    ///
    /// `elapsed` may be negative to traverse the orbit backwards, and may be
    /// any number of periods away; it is wrapped into a single revolution.
    ///
    /// The returned position is `centre_position` plus the orbital offset.
    ///
    /// # Performance
    /// This solves Kepler's equation numerically, bounded by
    /// [`ITERATION_LIMIT`][crate::ITERATION_LIMIT] iterations.
    pub fn position_at_time(&self, centre_position: DVec3, elapsed: f64) -> DVec3 {
        centre_position + self.offset_at_time(elapsed)
    }

    /// Gets the offset from the centre of orbit at a time relative to the
    /// moment of derivation.
    pub fn offset_at_time(&self, elapsed: f64) -> DVec3 {
        let eccentric_anomaly =
            solver::solve_eccentric_anomaly(self.mean_anomaly_at_time(elapsed), self.eccentricity);

        self.offset_at_eccentric_anomaly(eccentric_anomaly.value())
    }

    /// Gets the offset from the centre of orbit at an eccentric anomaly.
    pub fn offset_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> DVec3 {
        let e = self.eccentricity;
        let (sin_true, cos_true) = solver::true_anomaly_sin_cos(eccentric_anomaly, e);

        let radius = solver::radius_at_true_anomaly(self.semilatus_rectum, e, cos_true);
        let perifocal = solver::perifocal_position(radius, e, sin_true, cos_true);
        let tilted = solver::tilt_perifocal(&self.cache.transformation_matrix, perifocal);

        solver::apply_yaw(tilted, self.start_yaw)
    }

    /// Gets the time since periapsis at a time relative to the moment of
    /// derivation, wrapped into `[0, period)`.
    #[inline]
    pub fn time_since_periapsis(&self, elapsed: f64) -> f64 {
        solver::wrap_time(self.initial_time + elapsed, self.period)
    }

    /// Gets the mean anomaly at a time relative to the moment of derivation.
    #[inline]
    pub fn mean_anomaly_at_time(&self, elapsed: f64) -> f64 {
        self.mean_motion * self.time_since_periapsis(elapsed)
    }

    /// Gets the transformation matrix used to tilt the orbital plane.
    #[inline]
    pub fn transformation_matrix(&self) -> Matrix3x2 {
        self.cache.transformation_matrix
    }

    /// Gets the semi-major axis, which is the apsis distance scaled by
    /// `1 / (1 - e)`.
    #[inline]
    pub fn semi_major_axis(&self) -> f64 {
        self.semilatus_rectum / (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Gets the eccentricity of the orbit.
    #[inline]
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Gets the right ascension of the ascending node, in radians.
    #[inline]
    pub fn right_ascension(&self) -> f64 {
        self.right_ascension
    }

    /// Gets the argument of the perifocal point, in radians.
    #[inline]
    pub fn arg_perifocal_point(&self) -> f64 {
        self.arg_perifocal_point
    }

    /// Gets the inclination derived from the initial offset, in radians.
    #[inline]
    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    /// Gets the heading of the initial offset about +Z, in radians.
    #[inline]
    pub fn start_yaw(&self) -> f64 {
        self.start_yaw
    }

    /// Gets the semilatus rectum of the orbit.
    #[inline]
    pub fn semilatus_rectum(&self) -> f64 {
        self.semilatus_rectum
    }

    /// Gets the mean motion, in radians per second.
    #[inline]
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Gets the time it takes to complete one revolution, in seconds.
    ///
    /// Always positive.
    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Gets the time since periapsis at the moment of derivation.
    #[inline]
    pub fn initial_time(&self) -> f64 {
        self.initial_time
    }

    /// Gets the gravitational parameter the orbit was derived with.
    #[doc(alias = "mu")]
    #[inline]
    pub fn gravitational_parameter(&self) -> f64 {
        self.mu
    }
}
