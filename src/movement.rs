use std::sync::OnceLock;

use glam::DVec3;
use log::{debug, error, warn};

use crate::{
    host::session_time, AuthorityError, BodyId, FrozenOrbitState, InitError, OrbitConfig,
    OrbitHost, OrbitalElements, QueryError,
};

/// Moves a body along a fixed Keplerian orbit around another body.
///
/// The movement holds the orbit's settings, the orbital elements once they
/// have been derived, and the body's last known location, velocity, and
/// acceleration.
///
/// The elements are written once. They are derived into a local value and
/// then published in a single step, so shared references never see a
/// half-derived orbit and reads need no locking. Only
/// [`reinitialize`][Self::reinitialize], which takes `&mut self`, replaces
/// them.
///
/// Until the elements exist, every location query returns the last known
/// location unchanged.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_rails::{BodyId, OrbitConfig, OrbitHost, OrbitMovement, Session};
///
/// struct Scene;
///
/// impl OrbitHost for Scene {
///     fn location_of(&self, id: BodyId) -> Option<DVec3> {
///         match id {
///             0 => Some(DVec3::ZERO),
///             1 => Some(DVec3::new(100.0, 0.0, 0.0)),
///             _ => None,
///         }
///     }
///     fn mass_of(&self, id: BodyId) -> Option<f64> {
///         (id == 0).then_some(1.0)
///     }
///     fn is_authoritative(&self) -> bool {
///         true
///     }
///     fn session(&self) -> Session {
///         Session::InProgress { start_time: None }
///     }
/// }
///
/// let movement = OrbitMovement::new(1, Some(0), OrbitConfig::default(), DVec3::new(100.0, 0.0, 0.0));
/// movement.initialize(&Scene).unwrap();
///
/// let period = movement.period(&Scene);
/// let half_way = movement.location_at_world_time(&Scene, period / 2.0);
/// assert!((half_way - DVec3::new(-100.0, 0.0, 0.0)).length() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct OrbitMovement {
    /// The body being moved.
    owner: BodyId,

    /// The body being orbited. Never owned, only looked up.
    centre: Option<BodyId>,

    config: OrbitConfig,

    elements: OnceLock<OrbitalElements>,

    /// The last known location of the body.
    location: DVec3,

    /// The velocity over the last tick.
    velocity: DVec3,

    /// The change in velocity over the last tick.
    acceleration: DVec3,
}

// Initialization and element management
impl OrbitMovement {
    /// Creates an uninitialized movement for `owner`, currently at `location`.
    ///
    /// Call [`initialize`][Self::initialize] once the host can resolve both
    /// the owner and the centre of orbit.
    pub fn new(
        owner: BodyId,
        centre: Option<BodyId>,
        config: OrbitConfig,
        location: DVec3,
    ) -> OrbitMovement {
        OrbitMovement {
            owner,
            centre,
            config,
            elements: OnceLock::new(),
            location,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
        }
    }

    /// Creates a movement from state frozen by the authoritative host.
    ///
    /// The frozen elements are installed without being derived again.
    /// Elements that fail [`OrbitalElements::is_consistent`] are dropped with
    /// an error log, leaving the movement uninitialized.
    pub fn from_frozen_state(
        owner: BodyId,
        state: FrozenOrbitState,
        location: DVec3,
    ) -> OrbitMovement {
        let elements = match state.elements {
            Some(elements) if elements.is_consistent() => OnceLock::from(elements),
            Some(elements) => {
                error!("body {owner}: discarding inconsistent frozen orbit {elements:?}");
                OnceLock::new()
            }
            None => OnceLock::new(),
        };

        OrbitMovement {
            owner,
            centre: state.centre,
            config: state.config,
            elements,
            location,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
        }
    }

    /// Freezes the settings and derived elements for replication.
    pub fn frozen_state(&self) -> FrozenOrbitState {
        FrozenOrbitState {
            config: self.config.clone(),
            centre: self.centre,
            elements: self.elements.get().cloned(),
        }
    }

    /// Derives the orbital elements from where the host currently has the
    /// owner and the centre of orbit, and publishes them.
    ///
    /// If the elements have already been published, they are returned as they
    /// are; later changes to either body do not affect them.
    ///
    /// # Errors
    /// - [`InitError::NoOwner`] if the host cannot locate the owner.
    /// - [`InitError::NoCentre`] if there is no centre, or it cannot be located.
    /// - Any error from [`OrbitalElements::derive`].
    ///
    /// Errors are also logged, and the movement stays uninitialized.
    pub fn initialize<H: OrbitHost + ?Sized>(
        &self,
        host: &H,
    ) -> Result<&OrbitalElements, InitError> {
        self.publish(host).inspect_err(|err| {
            error!("orbit of body {} failed to initialize: {err}", self.owner);
        })
    }

    fn publish<H: OrbitHost + ?Sized>(&self, host: &H) -> Result<&OrbitalElements, InitError> {
        if let Some(elements) = self.elements.get() {
            return Ok(elements);
        }

        let elements = self.derive_elements(host)?;

        // Another thread may have won the race, in which case theirs stays
        Ok(self.elements.get_or_init(|| elements))
    }

    /// Throws away the current elements, if any, and derives them again.
    pub fn reinitialize<H: OrbitHost + ?Sized>(
        &mut self,
        host: &H,
    ) -> Result<&OrbitalElements, InitError> {
        self.elements = OnceLock::new();
        self.initialize(host)
    }

    fn derive_elements<H: OrbitHost + ?Sized>(
        &self,
        host: &H,
    ) -> Result<OrbitalElements, InitError> {
        let owner_location = host.location_of(self.owner).ok_or(InitError::NoOwner)?;
        let centre = self.centre.ok_or(InitError::NoCentre)?;
        let centre_location = host.location_of(centre).ok_or(InitError::NoCentre)?;

        let mu = self.config.gravitational_parameter(host.mass_of(centre));

        OrbitalElements::derive(
            owner_location - centre_location,
            self.config.eccentricity,
            self.config.right_ascension,
            self.config.arg_perifocal_point,
            mu,
        )
    }

    /// Gets the published elements, if the orbit has been initialized.
    #[inline]
    pub fn elements(&self) -> Option<&OrbitalElements> {
        self.elements.get()
    }

    /// Whether the orbit has been initialized.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.elements.get().is_some()
    }

    /// Gets the time it takes to complete one revolution, in seconds.
    ///
    /// If the orbit has not been initialized yet, this tries to initialize it
    /// first. Returns 0 if that fails. Unlike [`initialize`][Self::initialize],
    /// failures here are only logged at debug level.
    pub fn period<H: OrbitHost + ?Sized>(&self, host: &H) -> f64 {
        match self.publish(host) {
            Ok(elements) => elements.period(),
            Err(err) => {
                debug!("body {}: no period yet: {err}", self.owner);
                0.0
            }
        }
    }
}

// Location queries
impl OrbitMovement {
    /// Gets the location of the body at a time on the orbit's own clock,
    /// or why it cannot be worked out.
    ///
    /// The reverse flag is applied here: a reversed orbit at `t` is a forward
    /// orbit at `-t`.
    pub fn try_location_at_time<H: OrbitHost + ?Sized>(
        &self,
        host: &H,
        time: f64,
    ) -> Result<DVec3, QueryError> {
        let elements = self.elements.get().ok_or(QueryError::Uninitialized)?;
        let centre_location = self
            .centre
            .and_then(|centre| host.location_of(centre))
            .ok_or(QueryError::NoCentre)?;

        let time = if self.config.reverse { -time } else { time };

        Ok(elements.position_at_time(centre_location, time))
    }

    /// Gets the location of the body at a time on the orbit's own clock.
    ///
    /// Falls back to the last known location when the orbit is uninitialized
    /// or the centre cannot be located.
    pub fn location_at_time<H: OrbitHost + ?Sized>(&self, host: &H, time: f64) -> DVec3 {
        match self.try_location_at_time(host, time) {
            Ok(location) => location,
            Err(err) => {
                warn!("body {} holding position: {err}", self.owner);
                self.location
            }
        }
    }

    /// Gets the location of the body at a world time, as the authoritative
    /// host would see it.
    ///
    /// The world time is first mapped onto the session clock (see
    /// [`session_time`][crate::session_time]), then offset by the configured
    /// start time offset. Once the session has ended the body stays at its
    /// last known location.
    pub fn location_at_world_time<H: OrbitHost + ?Sized>(
        &self,
        host: &H,
        world_time: f64,
    ) -> DVec3 {
        match session_time(world_time, host.session(), self.config.persistent) {
            Some(time) => self.location_at_time(host, time + self.config.start_time_offset),
            None => self.location,
        }
    }

    /// Moves the body to where it should be at `world_time`, and updates the
    /// velocity and acceleration from the change since the last tick.
    ///
    /// Does nothing if the centre of orbit cannot be located. When
    /// `delta_seconds` is not positive the location is still updated, but the
    /// velocity and acceleration are left as they were.
    ///
    /// Returns the new location.
    pub fn tick<H: OrbitHost + ?Sized>(
        &mut self,
        host: &H,
        world_time: f64,
        delta_seconds: f64,
    ) -> DVec3 {
        let centre = self.centre.and_then(|centre| host.location_of(centre));
        if centre.is_none() {
            error!("body {}: no centre of orbit", self.owner);
            return self.location;
        }

        let updated = self.location_at_world_time(host, world_time);

        if delta_seconds > 0.0 {
            let velocity = (updated - self.location) / delta_seconds;
            self.acceleration = (velocity - self.velocity) / delta_seconds;
            self.velocity = velocity;
        } else {
            debug!("body {}: skipping velocity update, dt = {delta_seconds}", self.owner);
        }

        self.location = updated;
        self.location
    }
}

// Settings
impl OrbitMovement {
    /// Changes the centre of orbit.
    ///
    /// Only the authoritative host may do this. The elements are not derived
    /// again; call [`reinitialize`][Self::reinitialize] for that.
    ///
    /// # Errors
    /// [`AuthorityError::NotAuthoritative`] if the host is not authoritative.
    /// The attempt is logged and the centre is left unchanged.
    pub fn set_centre_of_orbit<H: OrbitHost + ?Sized>(
        &mut self,
        host: &H,
        centre: Option<BodyId>,
    ) -> Result<(), AuthorityError> {
        if !host.is_authoritative() {
            warn!(
                "body {}: non-authoritative attempt to set the centre of orbit",
                self.owner
            );
            return Err(AuthorityError::NotAuthoritative);
        }

        self.centre = centre;
        Ok(())
    }

    /// Gets the centre of orbit.
    #[inline]
    pub fn centre_of_orbit(&self) -> Option<BodyId> {
        self.centre
    }

    /// Gets the body being moved.
    #[inline]
    pub fn owner(&self) -> BodyId {
        self.owner
    }

    /// Gets the settings of the orbit.
    #[inline]
    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Gets the offset added to the session time, in seconds.
    #[inline]
    pub fn start_time_offset(&self) -> f64 {
        self.config.start_time_offset
    }

    /// Sets the offset added to the session time, in seconds.
    #[inline]
    pub fn set_start_time_offset(&mut self, offset: f64) {
        self.config.start_time_offset = offset;
    }

    /// Gets the last known location.
    #[inline]
    pub fn location(&self) -> DVec3 {
        self.location
    }

    /// Gets the velocity over the last tick.
    #[inline]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Gets the acceleration over the last tick.
    #[inline]
    pub fn acceleration(&self) -> DVec3 {
        self.acceleration
    }
}

impl PartialEq for OrbitMovement {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.centre == other.centre
            && self.config == other.config
            && self.elements.get() == other.elements.get()
            && self.location == other.location
            && self.velocity == other.velocity
            && self.acceleration == other.acceleration
    }
}
