//! # Keplerian Orbits on Rails
//! This library crate moves bodies along fixed Keplerian (elliptical) orbits
//! for real-time simulations and games.
//!
//! Instead of integrating gravity every frame, an orbiting body derives a set
//! of orbital elements once, when it is spawned, from where it sits relative
//! to its centre of orbit. From then on its location at any time is a pure
//! function of those elements and the clock. Frame rate, lag, and rejoining
//! clients cannot make the orbit drift, and every host that shares the same
//! elements sees the body in the same place.
//!
//! It is a two-body model: orbits do not perturb each other and never decay.
//!
//! ## Getting started
//! This crate provides these main pieces:
//! - [`OrbitalElements`]: The static elements of one orbit. Derive them with
//!   [`OrbitalElements::derive`] and query positions with
//!   [`OrbitalElements::position_at_time`].
//! - [`OrbitMovement`]: The movement of one body. It resolves its body and
//!   its centre of orbit through an [`OrbitHost`], maps the world clock onto
//!   the orbit's clock, and keeps the last known location, velocity, and
//!   acceleration.
//! - [`FrozenOrbitState`]: The derived state the authoritative host sends to
//!   observers once, so they never derive the orbit themselves.
//! - [`Universe`]: A ready-made host holding bodies and their satellites,
//!   which it ticks centres first.
//!
//! The [`solver`] module holds the numerical pieces, including the
//! Newton-Raphson solver for Kepler's equation.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//!
//! use orbit_rails::OrbitalElements;
//!
//! # fn main() {
//! // A circular orbit 100 units out, around a centre at the origin
//! let elements = OrbitalElements::derive(DVec3::new(0.0, 0.0, 100.0), 0.0, 0.0, 0.0, 1e6).unwrap();
//!
//! let quarter = elements.position_at_time(DVec3::ZERO, elements.period() / 4.0);
//! assert!((quarter.length() - 100.0).abs() < 1e-6);
//! # }
//! ```

#![warn(missing_docs)]

mod body;
mod config;
mod elements;
mod error;
mod host;
mod movement;
mod replication;
pub mod solver;
mod universe;

pub use body::Body;
pub use config::OrbitConfig;
pub use elements::OrbitalElements;
pub use error::{AuthorityError, InitError, QueryError};
pub use host::{session_time, BodyId, OrbitHost, Session};
pub use movement::OrbitMovement;
pub use replication::FrozenOrbitState;
pub use universe::{BodyAddError, BodyRelation, CentreChangeError, Universe, DEFAULT_TIME_STEP};

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scales a centre's mass (or a fake gravity value) into the gravitational
/// parameter of orbits around it.
pub const MU_FACTOR: f64 = 1_000_000.0;

/// The largest Newton-Raphson correction, in radians, accepted as converged.
pub const EPSILON: f64 = 0.00001;

/// The maximum number of Newton-Raphson corrections checked when solving
/// Kepler's equation.
///
/// This is used to bound the cost of every position query.
pub const ITERATION_LIMIT: u32 = 20;

/// A struct representing a 3x2 matrix.
///
/// This struct is used to store the transformation matrix
/// for transforming a 2D vector into a 3D vector.
///
/// Namely, it is used to tilt a position in the orbital plane into 3D,
/// using the orbital elements.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
///
/// use orbit_rails::Matrix3x2;
///
/// let matrix = Matrix3x2 {
///    e11: 1.0, e12: 0.0,
///    e21: 0.0, e22: 1.0,
///    e31: 0.0, e32: 0.0,
/// };
///
/// let vec = DVec2::new(1.0, 2.0);
///
/// let result = matrix.dot_vec(vec);
///
/// assert_eq!(result, DVec3::new(1.0, 2.0, 0.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3x2 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e21: f64,
    pub e22: f64,
    pub e31: f64,
    pub e32: f64,
}

impl Matrix3x2 {
    /// Computes a dot product between this matrix and a 2D vector.
    ///
    /// # Example
    /// ```
    /// use glam::{DVec2, DVec3};
    ///
    /// use orbit_rails::Matrix3x2;
    ///
    /// let matrix = Matrix3x2 {
    ///     e11: 1.0, e12: 0.0,
    ///     e21: 0.0, e22: 1.0,
    ///     e31: 1.0, e32: 1.0,
    /// };
    ///
    /// let vec = DVec2::new(1.0, 2.0);
    ///
    /// let result = matrix.dot_vec(vec);
    ///
    /// assert_eq!(result, DVec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn dot_vec(&self, vec: DVec2) -> DVec3 {
        DVec3::new(
            vec.x * self.e11 + vec.y * self.e12,
            vec.x * self.e21 + vec.y * self.e22,
            vec.x * self.e31 + vec.y * self.e32,
        )
    }
}


#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - (eccentricity * eccentric_anomaly.sin()) - mean_anomaly
}
#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - (eccentricity * eccentric_anomaly.cos())
}
