use std::collections::HashMap;

use crate::types::{HandSide, ImagePoint, PersonId};

/// Points per stroke before it is sealed and a fresh one continues.
pub const STROKE_POINT_CAP: usize = 5;

/// A polyline drawn by one hand. Sealed strokes are immutable; the
/// accumulator only ever appends to the single unsealed stroke per
/// (person, side).
#[derive(Clone, Debug)]
pub struct Stroke {
    pub person: PersonId,
    pub side: HandSide,
    pub points: Vec<ImagePoint>,
}

impl Stroke {
    fn new(person: PersonId, side: HandSide) -> Self {
        Self {
            person,
            side,
            points: Vec::with_capacity(STROKE_POINT_CAP),
        }
    }
}

/// Per-(person, hand) stroke state machine.
///
/// Idle until the hand's gesture turns extended, then accumulates the
/// hand-tip position every extended tick. A stroke seals when it reaches
/// [`STROKE_POINT_CAP`] points (accumulation continues into a fresh stroke)
/// or when the gesture retracts (sealing whatever was collected). Losing
/// tracking discards the unsealed stroke without sealing it.
#[derive(Default)]
pub struct StrokeAccumulator {
    active: HashMap<(PersonId, HandSide), Stroke>,
    sealed: Vec<Stroke>,
}

impl StrokeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one hand by one tick.
    pub fn tick(&mut self, person: PersonId, side: HandSide, extended: bool, tip: ImagePoint) {
        let key = (person, side);

        if !extended {
            if let Some(stroke) = self.active.remove(&key) {
                if !stroke.points.is_empty() {
                    self.sealed.push(stroke);
                }
            }
            return;
        }

        let stroke = self
            .active
            .entry(key)
            .or_insert_with(|| Stroke::new(person, side));
        stroke.points.push(tip);

        if stroke.points.len() >= STROKE_POINT_CAP {
            let full = std::mem::replace(stroke, Stroke::new(person, side));
            self.sealed.push(full);
        }
    }

    /// Tracking loss: drop every unsealed stroke for `person`.
    pub fn purge(&mut self, person: PersonId) {
        self.active.retain(|(owner, _), _| *owner != person);
    }

    pub fn sealed(&self) -> &[Stroke] {
        &self.sealed
    }

    pub fn in_progress(&self) -> impl Iterator<Item = &Stroke> {
        self.active.values()
    }

    pub fn in_progress_for(&self, person: PersonId, side: HandSide) -> Option<&Stroke> {
        self.active.get(&(person, side))
    }

    /// Reset the drawing surface.
    pub fn clear_sealed(&mut self) {
        self.sealed.clear();
    }
}
