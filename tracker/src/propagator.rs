//! SGP4 propagation of an element set to an arbitrary instant.

use tle_types::prelude::InertialState;

use crate::{
    elements::ElementSet,
    store::ElementSetStore,
    units::{JulianDate, Timestamp},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    #[error("Degenerate propagation result. {0}")]
    Degenerate(String),
    #[error("No element set has been loaded")]
    NoElementsLoaded,
}

/// Inertial (TEME) state of the object at `instant`
pub fn propagate(
    elements: &ElementSet,
    instant: Timestamp,
) -> Result<InertialState, PropagationError> {
    propagate_julian(elements, instant.julian_date())
}

pub fn propagate_julian(
    elements: &ElementSet,
    jd: JulianDate,
) -> Result<InertialState, PropagationError> {
    let minutes = jd.minutes_since(&elements.epoch_julian_date());
    let prediction = elements
        .constants()
        .propagate(sgp4::MinutesSinceEpoch(minutes))
        .map_err(|e| PropagationError::Degenerate(e.to_string()))?;

    let state = InertialState::new(prediction.position, prediction.velocity);
    if !state.position.iter().all(|c| c.is_finite()) {
        return Err(PropagationError::Degenerate(format!(
            "non-finite position {} at {minutes:.3} min from epoch",
            state.position
        )));
    }
    Ok(state)
}

/// Propagate whatever element set the store currently holds
pub fn propagate_current(
    store: &ElementSetStore,
    instant: Timestamp,
) -> Result<InertialState, PropagationError> {
    let elements = store
        .current_elements()
        .ok_or(PropagationError::NoElementsLoaded)?;
    propagate(&elements, instant)
}
