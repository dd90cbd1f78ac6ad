//! The interface an orbiting body needs from the simulation hosting it.

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The identifier of a body in the host's scene.
///
/// Orbit movements refer to their own body and to their centre of orbit by
/// id only. Ids are looked up through the host on every use and may stop
/// resolving at any time.
pub type BodyId = u64;

/// The state of the session (match) that non-persistent movers are tied to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Session {
    /// No session, or the session has not started. Movers sit at their
    /// starting point.
    #[default]
    NotStarted,

    /// The session is running.
    InProgress {
        /// The world time the session started at, if one was recorded.
        start_time: Option<f64>,
    },

    /// The session is over. Movers freeze where they are.
    Ended,
}

/// What an [`OrbitMovement`][crate::OrbitMovement] needs from its host.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_rails::{BodyId, OrbitHost, Session};
///
/// struct Fixed;
///
/// impl OrbitHost for Fixed {
///     fn location_of(&self, id: BodyId) -> Option<DVec3> {
///         match id {
///             0 => Some(DVec3::ZERO),
///             1 => Some(DVec3::new(100.0, 0.0, 0.0)),
///             _ => None,
///         }
///     }
///
///     fn mass_of(&self, id: BodyId) -> Option<f64> {
///         (id == 0).then_some(1.0)
///     }
///
///     fn is_authoritative(&self) -> bool {
///         true
///     }
///
///     fn session(&self) -> Session {
///         Session::InProgress { start_time: None }
///     }
/// }
/// ```
pub trait OrbitHost {
    /// Gets the current location of a body, or `None` if the id no longer
    /// resolves.
    fn location_of(&self, id: BodyId) -> Option<DVec3>;

    /// Gets the mass of a body.
    ///
    /// `None` means the body has no mass, and movers around it fall back to
    /// their configured fake gravity.
    fn mass_of(&self, id: BodyId) -> Option<f64>;

    /// Whether the current execution context is authoritative for the
    /// orbiting bodies, e.g. the server in a client-server game.
    fn is_authoritative(&self) -> bool;

    /// Gets the current session state.
    fn session(&self) -> Session;
}

impl<H: OrbitHost + ?Sized> OrbitHost for &H {
    fn location_of(&self, id: BodyId) -> Option<DVec3> {
        (**self).location_of(id)
    }

    fn mass_of(&self, id: BodyId) -> Option<f64> {
        (**self).mass_of(id)
    }

    fn is_authoritative(&self) -> bool {
        (**self).is_authoritative()
    }

    fn session(&self) -> Session {
        (**self).session()
    }
}

/// Maps a world time onto the clock a mover's orbit runs on.
///
/// Persistent movers run on the world clock directly. Everything else is tied
/// to the session: before it starts the clock reads 0, while it runs the
/// recorded start time is subtracted, and once it ends `None` is returned,
/// meaning the mover should stay where it is.
///
/// # Example
/// ```
/// use orbit_rails::{session_time, Session};
///
/// let running = Session::InProgress { start_time: Some(10.0) };
///
/// assert_eq!(session_time(25.0, running, false), Some(15.0));
/// assert_eq!(session_time(25.0, running, true), Some(25.0));
/// assert_eq!(session_time(25.0, Session::NotStarted, false), Some(0.0));
/// assert_eq!(session_time(25.0, Session::Ended, false), None);
/// ```
pub fn session_time(world_time: f64, session: Session, persistent: bool) -> Option<f64> {
    if persistent {
        return Some(world_time);
    }

    match session {
        Session::NotStarted => Some(0.0),
        Session::InProgress { start_time } => Some(world_time - start_time.unwrap_or(0.0)),
        Session::Ended => None,
    }
}
