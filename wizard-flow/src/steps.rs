use serde::{Deserialize, Serialize};

use crate::model::Product;

/// One screen in the wizard. Which sequence applies depends on the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Legal-status choice plus the risk explanation (property flow opener).
    Intro,
    /// Building list and per-building forms.
    PropertyDetails,
    /// Traveler list and the travel date range.
    Travelers,
    /// Contact details and consent.
    Contact,
    /// Read-only recap with the submit action.
    Summary,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Intro => "Risks and legal status",
            Step::PropertyDetails => "Insured property",
            Step::Travelers => "Travelers",
            Step::Contact => "Contact details",
            Step::Summary => "Summary",
        }
    }
}

const PROPERTY_STEPS: &[Step] = &[
    Step::Intro,
    Step::PropertyDetails,
    Step::Contact,
    Step::Summary,
];

const TRAVEL_STEPS: &[Step] = &[Step::Travelers, Step::Contact, Step::Summary];

/// Step sequence for the given product.
pub fn sequence(product: Product) -> &'static [Step] {
    match product {
        Product::Property => PROPERTY_STEPS,
        Product::Travel => TRAVEL_STEPS,
    }
}

/// Number of steps in the product's sequence.
pub fn step_count(product: Product) -> u32 {
    sequence(product).len() as u32
}

/// Step at the 1-based position, if within the sequence.
pub fn step_at(product: Product, step: u32) -> Option<Step> {
    if step == 0 {
        return None;
    }
    sequence(product).get(step as usize - 1).copied()
}
