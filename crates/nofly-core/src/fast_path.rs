//! Short-circuit checks run before any graph work.

use tracing::debug;

use crate::error::{Result, RouteError};
use crate::models::Position;
use crate::zones::ForbiddenZones;

/// What the planner should do after the fast-path checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastPath {
    /// The straight segment is already a valid route.
    Direct,
    /// A detour is needed; build the visibility graph.
    Search,
}

/// Decide whether the direct segment is valid, or whether an endpoint makes
/// any route impossible.
///
/// Enclosure is checked for the start against every hole before the finish
/// is considered, so a request with both endpoints sealed in holes reports
/// [`RouteError::EnclosedStart`].
pub fn check(
    zones: Option<&ForbiddenZones>,
    start: Position,
    finish: Position,
) -> Result<FastPath> {
    let Some(zones) = zones.filter(|zones| !zones.is_empty()) else {
        debug!("no forbidden zones; using direct segment");
        return Ok(FastPath::Direct);
    };

    if !zones.segment_blocked(start, finish) {
        debug!("direct segment clears all zones");
        return Ok(FastPath::Direct);
    }

    if zones.strictly_contains(start) || zones.strictly_contains(finish) {
        return Err(RouteError::PointBlocked);
    }

    if zones.hole_encloses(start) {
        return Err(RouteError::EnclosedStart);
    }
    if zones.hole_encloses(finish) {
        return Err(RouteError::EnclosedFinish);
    }

    Ok(FastPath::Search)
}
