use glam::DVec3;

use crate::OrbitMovement;

/// A struct representing a body in a [`Universe`][crate::Universe].
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// The name of the body.
    pub name: String,

    /// The mass of the body, or `None` for a massless marker that satellites
    /// orbit using their fake gravity.
    pub mass: Option<f64>,

    /// The current location of the body.
    pub location: DVec3,

    /// The movement of the body, if it is orbiting another one.
    pub movement: Option<OrbitMovement>,
}

impl Body {
    /// Creates a new `Body` instance that is not orbiting anything.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the body.
    /// * `mass` - The mass of the body, if it has one.
    /// * `location` - Where the body starts out.
    ///
    /// # Returns
    ///
    /// A new `Body` instance.
    pub fn new(name: impl Into<String>, mass: Option<f64>, location: DVec3) -> Self {
        Self {
            name: name.into(),
            mass,
            location,
            movement: None,
        }
    }

    /// Releases the body from its orbit. It stays where it last was.
    pub fn release_from_orbit(&mut self) {
        self.movement = None;
    }
}
