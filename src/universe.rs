use core::fmt;
use std::collections::{HashMap, VecDeque};

use glam::DVec3;
use log::warn;

use crate::{AuthorityError, Body, BodyId, OrbitConfig, OrbitHost, OrbitMovement, Session};

/// The default time step, in seconds.
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;

/// Struct that represents a simulation of bodies on rails.
///
/// The universe is an [`OrbitHost`] for the movements of its own bodies: it
/// resolves body ids to locations and masses, and holds the clock, the
/// session state, and whether this instance is the authority.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_rails::{Body, OrbitConfig, Universe};
///
/// let mut universe = Universe::default();
/// universe.authoritative = true;
///
/// let sun = universe.add_body(Body::new("Sun", Some(1.0), DVec3::ZERO));
/// let planet = universe
///     .add_satellite(
///         Body::new("Planet", None, DVec3::new(100.0, 0.0, 0.0)),
///         sun,
///         OrbitConfig::default().with_persistent(true),
///     )
///     .unwrap();
///
/// universe.tick();
/// let distance = universe.get_body(planet).unwrap().location.length();
/// assert!((distance - 100.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    /// The bodies in the universe and their relations.
    bodies: HashMap<BodyId, BodyWrapper>,

    /// The next ID to assign to a body.
    next_id: BodyId,

    /// The world time, in seconds.
    pub time: f64,

    /// The time step of the simulation, in seconds.
    pub time_step: f64,

    /// The session non-persistent movers are tied to.
    pub session: Session,

    /// Whether this universe is the authority over its bodies' orbits.
    pub authoritative: bool,
}

/// Which body a body orbits, and which bodies orbit it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyRelation {
    /// The centre of orbit, if any.
    pub parent: Option<BodyId>,
    /// The bodies orbiting this one.
    pub satellites: Vec<BodyId>,
}

#[derive(Clone, Debug, PartialEq)]
struct BodyWrapper {
    body: Body,
    relations: BodyRelation,
}

/// Why a body could not be added.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BodyAddError {
    /// There was no body with the requested centre of orbit id.
    #[error("there was no body at the specified parent index")]
    ParentNotFound,
}

/// Why the centre of orbit of a body could not be changed.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CentreChangeError {
    /// This universe is not the authority.
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// The new centre is the body itself, or already orbits it.
    #[error("body {body} cannot orbit {centre}, which orbits it")]
    OrbitCycle {
        /// The body whose centre was being changed.
        body: BodyId,
        /// The rejected centre of orbit.
        centre: BodyId,
    },
}

impl Universe {
    /// Creates an empty universe.
    pub fn new(time_step: Option<f64>, session: Session, authoritative: bool) -> Universe {
        Universe {
            bodies: HashMap::new(),
            next_id: 0,
            time: 0.0,
            time_step: time_step.unwrap_or(DEFAULT_TIME_STEP),
            session,
            authoritative,
        }
    }

    fn next_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Adds a body that does not orbit anything.
    ///
    /// Any movement already attached to the body is dropped.
    ///
    /// Returns: The id of the newly-added body.
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        body.movement = None;

        let id = self.next_id();
        self.bodies.insert(
            id,
            BodyWrapper {
                body,
                relations: BodyRelation {
                    parent: None,
                    satellites: Vec::new(),
                },
            },
        );

        id
    }

    /// Adds a body orbiting `centre`, starting from the body's current
    /// location, and initializes its orbit.
    ///
    /// A body whose orbit fails to initialize is still added; it holds its
    /// location until [`reinitialize`][Self::reinitialize] succeeds.
    ///
    /// Returns: The id of the newly-added body.
    pub fn add_satellite(
        &mut self,
        mut body: Body,
        centre: BodyId,
        config: OrbitConfig,
    ) -> Result<BodyId, (BodyAddError, Body)> {
        if !self.bodies.contains_key(&centre) {
            return Err((BodyAddError::ParentNotFound, body));
        }

        let id = self.next_id();
        body.movement = Some(OrbitMovement::new(id, Some(centre), config, body.location));

        self.bodies.insert(
            id,
            BodyWrapper {
                body,
                relations: BodyRelation {
                    parent: Some(centre),
                    satellites: Vec::new(),
                },
            },
        );
        if let Some(wrapper) = self.bodies.get_mut(&centre) {
            wrapper.relations.satellites.push(id);
        }

        if let Some(movement) = self.movement(id) {
            // Failures are logged by the movement itself
            let _ = movement.initialize(&*self);
        }

        Ok(id)
    }

    /// Removes a body from the universe, along with everything orbiting it.
    ///
    /// Returns: A Vec of all bodies that were removed, including the one specified.
    /// An empty Vec is returned if the body was not found.
    pub fn remove_body(&mut self, id: BodyId) -> Vec<Body> {
        let wrapper = match self.bodies.remove(&id) {
            Some(wrapper) => wrapper,
            None => return Vec::new(),
        };

        let (body, relations) = (wrapper.body, wrapper.relations);
        let mut bodies = vec![body];

        if let Some(parent) = relations.parent {
            self.unlink_satellite(parent, id);
        }

        for &satellite in &relations.satellites {
            bodies.append(&mut self.remove_body(satellite));
        }

        bodies
    }

    fn unlink_satellite(&mut self, parent: BodyId, satellite: BodyId) {
        if let Some(parent_wrapper) = self.bodies.get_mut(&parent) {
            parent_wrapper
                .relations
                .satellites
                .retain(|&id| id != satellite);
        }
    }

    /// Gets a Vec of all bodies in the universe.
    pub fn get_bodies(&self) -> Vec<&Body> {
        self.bodies.values().map(|wrapper| &wrapper.body).collect()
    }

    /// Gets the relations of a body.
    pub fn get_body_relation(&self, id: BodyId) -> Option<&BodyRelation> {
        self.bodies.get(&id).map(|wrapper| &wrapper.relations)
    }

    /// Gets a mutable reference to a body in the universe.
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id).map(|wrapper| &mut wrapper.body)
    }

    /// Gets an immutable reference to a body in the universe.
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id).map(|wrapper| &wrapper.body)
    }

    /// Gets the id of a body with a given name.
    pub fn get_body_id_with_name(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, w)| w.body.name == name)
            .map(|(id, _)| *id)
    }

    fn movement(&self, id: BodyId) -> Option<&OrbitMovement> {
        self.bodies.get(&id)?.body.movement.as_ref()
    }

    /// Changes which body a satellite orbits.
    ///
    /// The orbit keeps its elements, so the satellite carries on along the
    /// same path around the new centre. Call
    /// [`reinitialize`][Self::reinitialize] to fit the orbit to where the
    /// satellite is now.
    ///
    /// Does nothing if `id` has no movement.
    ///
    /// # Errors
    /// - [`CentreChangeError::OrbitCycle`] if `centre` is `id` itself or one
    ///   of the bodies orbiting it, directly or further down.
    /// - [`CentreChangeError::Authority`] if this universe is not the
    ///   authority.
    pub fn set_centre_of_orbit(
        &mut self,
        id: BodyId,
        centre: Option<BodyId>,
    ) -> Result<(), CentreChangeError> {
        if let Some(new) = centre {
            if self.orbits_around(new, id) {
                warn!("body {id}: refusing to orbit {new}, which orbits it");
                return Err(CentreChangeError::OrbitCycle {
                    body: id,
                    centre: new,
                });
            }
        }

        let Some(mut movement) = self.take_movement(id) else {
            return Ok(());
        };

        let old_centre = movement.centre_of_orbit();
        let result = movement.set_centre_of_orbit(&*self, centre);
        self.put_movement(id, movement);
        result?;

        if let Some(old) = old_centre {
            self.unlink_satellite(old, id);
        }
        if let Some(new) = centre {
            if let Some(wrapper) = self.bodies.get_mut(&new) {
                wrapper.relations.satellites.push(id);
            }
        }
        if let Some(wrapper) = self.bodies.get_mut(&id) {
            wrapper.relations.parent = centre;
        }

        Ok(())
    }

    /// Whether `body` is `ancestor` or orbits it, directly or through other
    /// bodies.
    fn orbits_around(&self, body: BodyId, ancestor: BodyId) -> bool {
        let mut current = Some(body);

        // Bounded by the body count in case a cycle already exists
        for _ in 0..=self.bodies.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.get_body_relation(id).and_then(|r| r.parent),
                None => return false,
            }
        }

        true
    }

    /// Derives the orbit of a satellite again from where it and its centre
    /// are now.
    ///
    /// Returns whether the satellite ended up with a usable orbit.
    pub fn reinitialize(&mut self, id: BodyId) -> bool {
        let Some(mut movement) = self.take_movement(id) else {
            return false;
        };

        let initialized = movement.reinitialize(&*self).is_ok();
        self.put_movement(id, movement);

        initialized
    }

    fn take_movement(&mut self, id: BodyId) -> Option<OrbitMovement> {
        self.bodies.get_mut(&id)?.body.movement.take()
    }

    fn put_movement(&mut self, id: BodyId, movement: OrbitMovement) {
        if let Some(wrapper) = self.bodies.get_mut(&id) {
            wrapper.body.movement = Some(movement);
        }
    }

    /// Gets body ids ordered so that every centre of orbit comes before the
    /// bodies orbiting it.
    fn update_order(&self) -> Vec<BodyId> {
        let mut order = Vec::with_capacity(self.bodies.len());
        let mut queue: VecDeque<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, wrapper)| {
                wrapper
                    .relations
                    .parent
                    .map_or(true, |parent| !self.bodies.contains_key(&parent))
            })
            .map(|(&id, _)| id)
            .collect();

        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(wrapper) = self.bodies.get(&id) {
                queue.extend(wrapper.relations.satellites.iter().copied());
            }
        }

        order
    }

    fn update_movements(&mut self, delta_seconds: f64) {
        for id in self.update_order() {
            let Some(mut movement) = self.take_movement(id) else {
                continue;
            };

            let location = movement.tick(&*self, self.time, delta_seconds);

            if let Some(wrapper) = self.bodies.get_mut(&id) {
                wrapper.body.location = location;
                wrapper.body.movement = Some(movement);
            }
        }
    }

    /// Advances the simulation by a tick.
    pub fn tick(&mut self) {
        self.time += self.time_step;
        self.update_movements(self.time_step);
    }

    /// Advances the universe by multiple ticks at once.
    ///
    /// Velocities and accelerations are averaged over the whole warp.
    pub fn warp(&mut self, ticks: u32) {
        let delta = f64::from(ticks) * self.time_step;
        self.time += delta;
        self.update_movements(delta);
    }
}

impl OrbitHost for Universe {
    fn location_of(&self, id: BodyId) -> Option<DVec3> {
        self.get_body(id).map(|body| body.location)
    }

    fn mass_of(&self, id: BodyId) -> Option<f64> {
        self.get_body(id).and_then(|body| body.mass)
    }

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    fn session(&self) -> Session {
        self.session
    }
}

impl Default for Universe {
    /// An empty authoritative universe whose session is running since time 0.
    fn default() -> Self {
        Universe::new(None, Session::InProgress { start_time: Some(0.0) }, true)
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Universe with {} bodies, t={}",
            self.bodies.len(),
            self.time
        )
    }
}
