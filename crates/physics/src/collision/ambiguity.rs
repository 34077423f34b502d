//! Deciding whether a rim/edge contact is a top/bottom hit or a side hit.

use crate::collision::CollisionConfig;
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContactSide {
    /// Top or bottom: the contact normal is vertical.
    Cap,
    /// The contact normal is horizontal.
    Side,
}

/// Which projections overlapped at the committed (previous) positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PriorOverlap {
    pub vertical: bool,
    pub horizontal: bool,
}

/// Classifies a contact that could be either a cap or a side hit.
///
/// If the bodies already overlapped along exactly one projection before this
/// frame, the other projection is the one that closed, which settles it.
/// Otherwise the relative velocity of body 1 against body 2 decides, biased
/// toward `Cap` so that grazing landings do not fall through floors.
pub(crate) fn classify(
    prior: PriorOverlap,
    relative_speed: Vec3,
    body1_above: bool,
    config: &CollisionConfig,
) -> ContactSide {
    match (prior.vertical, prior.horizontal) {
        (true, false) => return ContactSide::Side,
        (false, true) => return ContactSide::Cap,
        _ => {}
    }

    let vz = relative_speed.z;
    let closing_vertically = if body1_above { vz < 0.0 } else { vz > 0.0 };
    if vz.abs() < config.negligible_speed || !closing_vertically {
        return ContactSide::Side;
    }

    let vxy = relative_speed.truncate().length();
    if vxy < config.negligible_speed {
        return ContactSide::Cap;
    }

    if vxy > config.top_bias * vz.abs() {
        ContactSide::Side
    } else {
        ContactSide::Cap
    }
}
