use serde::{Deserialize, Serialize};

use crate::model::{ApplicationState, Building, LegalStatus, Product, Traveler};
use crate::patch::{BuildingPatch, ContactPatch, TravelDates, TravelerPatch};
use crate::steps::{self, Step};

/// Wizard state machine for one session.
///
/// Owns the [`ApplicationState`] plus the display selection for each entity
/// list and the generation counter used to discard stale submission
/// responses. All mutation goes through these methods. Transitions and edits
/// are no-ops once the application is submitted; only [`Wizard::reset`]
/// leaves the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wizard {
    state: ApplicationState,
    active_building: Option<usize>,
    active_traveler: Option<usize>,
    generation: u64,
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: ApplicationState::new(),
            active_building: None,
            active_traveler: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Bumped on every reset; a submission response whose captured generation
    /// no longer matches must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_submitted(&self) -> bool {
        self.state.submitted
    }

    /// Display selection for the building list.
    pub fn active_building(&self) -> Option<usize> {
        self.active_building
    }

    /// Display selection for the traveler list; `None` means the add-form is
    /// showing.
    pub fn active_traveler(&self) -> Option<usize> {
        self.active_traveler
    }

    /// Step the user is currently on, or `None` before a product is chosen.
    pub fn current_step(&self) -> Option<Step> {
        let product = self.state.product?;
        steps::step_at(product, self.state.step)
    }

    /// Picks the product and starts its sequence from step 1.
    pub fn select_product(&mut self, product: Product) {
        if self.state.submitted {
            return;
        }
        self.state.product = Some(product);
        self.state.step = 1;
    }

    /// Moves one step forward, stopping at the last step.
    ///
    /// Performs no validation; the caller gates this on the current step's
    /// requirements (see [`crate::validate::step_report`]).
    pub fn advance(&mut self) {
        if self.state.submitted {
            return;
        }
        let Some(product) = self.state.product else {
            return;
        };
        if self.state.step < steps::step_count(product) {
            self.state.step += 1;
        }
    }

    /// Moves one step back. Backing out of step 1 clears the product and
    /// returns the user to the product choice screen.
    pub fn retreat(&mut self) {
        if self.state.submitted || self.state.product.is_none() {
            return;
        }
        if self.state.step > 1 {
            self.state.step -= 1;
        } else {
            self.state.product = None;
        }
    }

    /// Restores the initial state and bumps the generation counter so any
    /// in-flight submission response is discarded. Works in every state,
    /// including after submission.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Wizard::new();
        self.generation = generation;
    }

    pub fn set_legal_status(&mut self, status: LegalStatus) {
        if self.state.submitted {
            return;
        }
        self.state.legal_status = status;
    }

    /// Appends a building with defaults and selects it for display. Returns
    /// the new index, or `None` when the wizard is frozen.
    pub fn add_building(&mut self) -> Option<usize> {
        if self.state.submitted {
            return None;
        }
        self.state.buildings.push(Building::new());
        let index = self.state.buildings.len() - 1;
        self.active_building = Some(index);
        Some(index)
    }

    /// Applies a patch to the building at `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of range. Bounds checking user-supplied
    /// indexes is the caller's job; an out-of-range index here is a bug.
    pub fn update_building(&mut self, index: usize, patch: BuildingPatch) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.buildings.len(),
            "building index {index} out of range"
        );
        patch.apply(&mut self.state.buildings[index]);
    }

    /// Removes the building at `index`, adjusting the display selection.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn remove_building(&mut self, index: usize) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.buildings.len(),
            "building index {index} out of range"
        );
        self.state.buildings.remove(index);
        self.active_building =
            fallback_selection(self.active_building, index, self.state.buildings.len());
    }

    /// Changes which building is displayed.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn select_building(&mut self, index: usize) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.buildings.len(),
            "building index {index} out of range"
        );
        self.active_building = Some(index);
    }

    /// Appends a traveler with defaults and selects it for display. Returns
    /// the new index, or `None` when the wizard is frozen.
    pub fn add_traveler(&mut self) -> Option<usize> {
        if self.state.submitted {
            return None;
        }
        self.state.travel.travelers.push(Traveler::new());
        let index = self.state.travel.travelers.len() - 1;
        self.active_traveler = Some(index);
        Some(index)
    }

    /// Applies a patch to the traveler at `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn update_traveler(&mut self, index: usize, patch: TravelerPatch) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.travel.travelers.len(),
            "traveler index {index} out of range"
        );
        patch.apply(&mut self.state.travel.travelers[index]);
    }

    /// Removes the traveler at `index`, adjusting the display selection.
    /// Removing the only traveler clears the selection (the add-form shows
    /// again).
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn remove_traveler(&mut self, index: usize) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.travel.travelers.len(),
            "traveler index {index} out of range"
        );
        self.state.travel.travelers.remove(index);
        self.active_traveler = fallback_selection(
            self.active_traveler,
            index,
            self.state.travel.travelers.len(),
        );
    }

    /// Changes which traveler is displayed.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn select_traveler(&mut self, index: usize) {
        if self.state.submitted {
            return;
        }
        assert!(
            index < self.state.travel.travelers.len(),
            "traveler index {index} out of range"
        );
        self.active_traveler = Some(index);
    }

    /// Replaces the travel date range wholesale.
    pub fn set_travel_dates(&mut self, dates: TravelDates) {
        if self.state.submitted {
            return;
        }
        self.state.travel.date_from = dates.date_from;
        self.state.travel.date_to = dates.date_to;
    }

    pub fn update_contact(&mut self, patch: ContactPatch) {
        if self.state.submitted {
            return;
        }
        patch.apply(&mut self.state.contact);
    }

    /// Marks the application delivered. Called by the dispatcher once the
    /// delivery collaborator has accepted the payload.
    pub fn mark_submitted(&mut self) {
        self.state.submitted = true;
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

/// Display selection after removing `removed` from a list now `len` long.
///
/// Removing the displayed entry falls back to the new last index; removing an
/// earlier entry shifts the selection down so the same entry stays displayed.
fn fallback_selection(active: Option<usize>, removed: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match active {
        Some(a) if a == removed => Some(len - 1),
        Some(a) if a > removed => Some(a - 1),
        other => other,
    }
}
