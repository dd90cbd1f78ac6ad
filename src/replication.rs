#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BodyId, OrbitConfig, OrbitalElements};

/// Everything an observer needs to move a body exactly like the
/// authoritative host does.
///
/// The authority sends this once, when the body is spawned, and never again.
/// Observers install the derived elements as-is instead of deriving their own,
/// so floating-point differences between hosts cannot make the orbits drift
/// apart.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_rails::{FrozenOrbitState, OrbitConfig, OrbitMovement, OrbitalElements};
///
/// let elements = OrbitalElements::derive(DVec3::new(0.0, 50.0, 0.0), 0.2, 0.0, 0.0, 1e6).unwrap();
///
/// let frozen = FrozenOrbitState {
///     config: OrbitConfig::default().with_eccentricity(0.2),
///     centre: Some(0),
///     elements: Some(elements.clone()),
/// };
///
/// let observer = OrbitMovement::from_frozen_state(1, frozen, DVec3::new(0.0, 50.0, 0.0));
/// assert_eq!(observer.elements(), Some(&elements));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrozenOrbitState {
    /// The editable settings of the orbit.
    pub config: OrbitConfig,

    /// The centre of orbit, if one was set.
    pub centre: Option<BodyId>,

    /// The derived elements, or `None` if the authority failed to derive
    /// them.
    pub elements: Option<OrbitalElements>,
}

impl FrozenOrbitState {
    /// Whether this carries a usable orbit, i.e. elements that pass
    /// [`OrbitalElements::is_consistent`].
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.elements
            .as_ref()
            .is_some_and(OrbitalElements::is_consistent)
    }
}
