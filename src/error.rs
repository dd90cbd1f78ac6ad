//! Error types reported by orbit derivation, position queries, and
//! authority-gated mutation.

/// Why an orbit could not be derived.
///
/// A failed derivation leaves the mover uninitialized; it keeps holding its
/// last known location until a later derivation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InitError {
    /// The orbiting body itself could not be resolved by the host.
    #[error("the orbiting body could not be resolved")]
    NoOwner,

    /// No centre of orbit is set, or it no longer resolves.
    #[error("no centre of orbit")]
    NoCentre,

    /// The gravitational parameter is not a positive finite number.
    #[error("no gravity: gravitational parameter {mu} is not positive")]
    NoGravity {
        /// The rejected gravitational parameter.
        mu: f64,
    },

    /// The eccentricity is not in `[0, 1)`.
    #[error("degenerate orbit: eccentricity {eccentricity} is outside [0, 1)")]
    DegenerateOrbit {
        /// The rejected eccentricity.
        eccentricity: f64,
    },

    /// An orientation angle is NaN or infinite.
    #[error(
        "invalid orientation: right ascension {right_ascension}, \
        argument of perifocal point {arg_perifocal_point}"
    )]
    InvalidOrientation {
        /// The requested right ascension of the ascending node.
        right_ascension: f64,
        /// The requested argument of the perifocal point.
        arg_perifocal_point: f64,
    },

    /// The orbiting body sits exactly on its centre of orbit.
    #[error("the orbiting body coincides with its centre of orbit")]
    CoincidentCentre,
}

/// Why a position query could not be answered from the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The orbital elements have not been derived yet.
    #[error("position queried before the orbit was initialized")]
    Uninitialized,

    /// The centre of orbit no longer resolves.
    #[error("the centre of orbit could not be resolved")]
    NoCentre,
}

/// A mutation was attempted from a non-authoritative context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// Only the authoritative owner may change the centre of orbit.
    #[error("only the authoritative context may change the centre of orbit")]
    NotAuthoritative,
}
