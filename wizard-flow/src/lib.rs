pub mod dispatch;
pub mod error;
pub mod model;
pub mod patch;
pub mod steps;
pub mod storage;
pub mod summary;
pub mod validate;
pub mod wizard;

// Re-export commonly used types
#[cfg(feature = "http")]
pub use dispatch::HttpDeliverer;
pub use dispatch::{Deliverer, SubmissionDispatcher};
pub use error::{DeliveryError, FlowError, Result};
pub use model::{ApplicationState, Building, Contact, LegalStatus, Product, TravelPlan, Traveler};
pub use patch::{BuildingPatch, ContactPatch, TravelDates, TravelerPatch};
pub use steps::Step;
pub use storage::{InMemorySessionStorage, SessionStorage, WizardSession};
pub use summary::{SummaryDocument, SummaryRow, SummarySection};
pub use validate::FieldError;
pub use wizard::Wizard;
