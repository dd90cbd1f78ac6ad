#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The editable settings of an orbiting body.
///
/// These are the fields a level designer sets and that get saved with the
/// body. Everything else about the orbit is derived from them plus the body's
/// placement when the orbit is initialized.
///
/// Missing fields take their default when deserialized.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrbitConfig {
    /// The eccentricity of the orbit. 0 is circular, and it must stay below 1.
    pub eccentricity: f64,

    /// The right ascension of the ascending node, in radians.
    pub right_ascension: f64,

    /// The argument of the perifocal point, in radians.
    pub arg_perifocal_point: f64,

    /// Goes the other way around the centre of orbit.
    pub reverse: bool,

    /// Stand-in for the centre's mass when the centre has none.
    ///
    /// Like a real mass, it is scaled by [`MU_FACTOR`][crate::MU_FACTOR].
    pub fake_gravity: f64,

    /// Added to the session time before evaluating the orbit, in seconds.
    pub start_time_offset: f64,

    /// Runs on the world clock instead of the session clock.
    pub persistent: bool,
}

impl OrbitConfig {
    /// Creates a circular orbit config with the given fake gravity.
    pub fn circular(fake_gravity: f64) -> Self {
        Self {
            fake_gravity,
            ..Self::default()
        }
    }

    /// Sets the eccentricity.
    #[must_use]
    pub fn with_eccentricity(mut self, eccentricity: f64) -> Self {
        self.eccentricity = eccentricity;
        self
    }

    /// Sets the orientation angles, in radians.
    #[must_use]
    pub fn with_orientation(mut self, right_ascension: f64, arg_perifocal_point: f64) -> Self {
        self.right_ascension = right_ascension;
        self.arg_perifocal_point = arg_perifocal_point;
        self
    }

    /// Sets the reverse flag.
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Sets the start time offset, in seconds.
    #[must_use]
    pub fn with_start_time_offset(mut self, start_time_offset: f64) -> Self {
        self.start_time_offset = start_time_offset;
        self
    }

    /// Sets whether the mover runs on the world clock.
    #[must_use]
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Gets the gravitational parameter for a centre of orbit.
    ///
    /// Uses the centre's mass when it has one, and the fake gravity otherwise.
    /// The result is not validated, so a zero mass gives a zero parameter.
    pub fn gravitational_parameter(&self, centre_mass: Option<f64>) -> f64 {
        match centre_mass {
            Some(mass) => mass * crate::MU_FACTOR,
            None => self.fake_gravity * crate::MU_FACTOR,
        }
    }
}

impl Default for OrbitConfig {
    /// A circular, forward-running, session-bound orbit with no fake gravity.
    fn default() -> Self {
        Self {
            eccentricity: 0.0,
            right_ascension: 0.0,
            arg_perifocal_point: 0.0,
            reverse: false,
            fake_gravity: 0.0,
            start_time_offset: 0.0,
            persistent: false,
        }
    }
}
