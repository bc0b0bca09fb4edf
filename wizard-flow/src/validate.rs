use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::model::{
    ApplicationState, Building, Contact, LegalStatus, ObjectType, Product, TravelPlan, Traveler,
};
use crate::steps::{self, Step};

/// Earliest accepted renovation year; also makes the four-digit check.
const MIN_RENOVATION_YEAR: i32 = 1850;

/// Longest accepted commercial activity description.
const MAX_ACTIVITY_LEN: usize = 200;

/// One field-level validation failure, addressed by wire field name
/// (`currentFloor`, `buildings[2].propertyArea`, ...).
///
/// Failures are data handed back to the caller; they block forward
/// navigation and submission but are never raised as errors across
/// component boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// Validates one building. Unconditional rules come first, then the rules
/// gated by the object-type discriminator and the rider flags. Rider fields
/// whose governing flag is off are never required.
pub fn building_report(
    building: &Building,
    legal_status: LegalStatus,
    today: NaiveDate,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match building.property_area {
        Some(area) if area > 0.0 => {}
        _ => errors.push(FieldError::new(
            "propertyArea",
            "Property area must be a positive number",
        )),
    }

    if let Some(year) = building.last_renovation_year {
        if year < MIN_RENOVATION_YEAR || year > today.year() {
            let message = format!(
                "Renovation year must be a four-digit year between {MIN_RENOVATION_YEAR} and {}",
                today.year()
            );
            errors.push(FieldError::new("lastRenovationYear", message));
        }
    }

    match building.object_type {
        ObjectType::Apartment => {
            if building.current_floor.is_none() {
                errors.push(FieldError::new("currentFloor", "Current floor is required"));
            }
            if building.total_floors.is_none() {
                errors.push(FieldError::new("totalFloors", "Total floors is required"));
            }
            if let (Some(current), Some(total)) = (building.current_floor, building.total_floors) {
                if current > total {
                    errors.push(FieldError::new(
                        "currentFloor",
                        "Current floor cannot exceed total floors",
                    ));
                }
            }
        }
        ObjectType::House => {
            if building.total_floors.is_none() {
                errors.push(FieldError::new("totalFloors", "Total floors is required"));
            }
        }
        ObjectType::Outbuilding => {}
    }

    if building.has_solar_panels {
        if building.solar_panels_count.is_none() {
            errors.push(FieldError::new(
                "solarPanelsCount",
                "Number of panels is required",
            ));
        }
        if building.solar_panels_value.is_none() {
            errors.push(FieldError::new(
                "solarPanelsValue",
                "Total panel value is required",
            ));
        }
        if building.solar_panels_location.is_none() {
            errors.push(FieldError::new(
                "solarPanelsLocation",
                "Panel location is required",
            ));
        }
    }

    if building.is_commercial && legal_status == LegalStatus::LegalEntity {
        match building.commercial_activity_type.as_deref().map(str::trim) {
            None | Some("") => errors.push(FieldError::new(
                "commercialActivityType",
                "Commercial activity type is required",
            )),
            Some(activity) if activity.chars().count() > MAX_ACTIVITY_LEN => {
                errors.push(FieldError::new(
                    "commercialActivityType",
                    format!("Commercial activity type cannot exceed {MAX_ACTIVITY_LEN} characters"),
                ));
            }
            Some(_) => {}
        }
    }

    if building.civil_liability_insurance_included {
        if building.civil_liability_coverage.is_none() {
            errors.push(FieldError::new(
                "civilLiabilityCoverage",
                "Liability coverage area is required",
            ));
        }
        if building.civil_liability_value.is_none() {
            errors.push(FieldError::new(
                "civilLiabilityValue",
                "Liability insured value is required",
            ));
        }
    }

    if building.movable_property_included && building.total_movable_property_value.is_none() {
        errors.push(FieldError::new(
            "totalMovablePropertyValue",
            "Movable property value is required",
        ));
    }

    errors
}

/// Validates one traveler. The six risk-activity answers default to "no" and
/// never fail.
pub fn traveler_report(traveler: &Traveler, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();

    name_length(&mut errors, "firstName", "First name", &traveler.first_name);
    name_length(&mut errors, "lastName", "Last name", &traveler.last_name);

    match traveler.birth_date {
        None => errors.push(FieldError::new("birthDate", "Birth date is required")),
        Some(date) if date > today => errors.push(FieldError::new(
            "birthDate",
            "Birth date cannot be in the future",
        )),
        Some(_) => {}
    }

    if traveler.policy_type.is_none() {
        errors.push(FieldError::new("policyType", "Please choose a policy type"));
    }

    errors
}

fn name_length(errors: &mut Vec<FieldError>, path: &str, label: &str, value: &str) {
    let len = value.trim().chars().count();
    if len < 2 {
        errors.push(FieldError::new(
            path,
            format!("{label} must be at least 2 characters"),
        ));
    } else if len > 120 {
        errors.push(FieldError::new(
            path,
            format!("{label} cannot exceed 120 characters"),
        ));
    }
}

/// Both travel dates are optional; when both are set the range must not be
/// inverted.
pub fn travel_dates_report(travel: &TravelPlan) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let (Some(from), Some(to)) = (travel.date_from, travel.date_to) {
        if to < from {
            errors.push(FieldError::new(
                "dateTo",
                "Travel end date cannot be before the start date",
            ));
        }
    }
    errors
}

pub fn contact_report(contact: &Contact) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if contact.name.trim().chars().count() < 2 {
        errors.push(FieldError::new(
            "name",
            "Name must be at least 2 characters",
        ));
    }
    if !email_regex().is_match(contact.email.trim()) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    if contact.phone.trim().chars().count() < 8 {
        errors.push(FieldError::new(
            "phone",
            "Phone number must be at least 8 characters",
        ));
    }
    if !contact.consent {
        errors.push(FieldError::new(
            "consent",
            "You must agree to the terms to continue",
        ));
    }

    errors
}

/// Property-step gate: at least one building and every building valid.
pub fn buildings_report(state: &ApplicationState, today: NaiveDate) -> Vec<FieldError> {
    if state.buildings.is_empty() {
        return vec![FieldError::new(
            "buildings",
            "At least one insured object is required",
        )];
    }
    let mut errors = Vec::new();
    for (index, building) in state.buildings.iter().enumerate() {
        for error in building_report(building, state.legal_status, today) {
            errors.push(FieldError::new(
                format!("buildings[{index}].{}", error.path),
                error.message,
            ));
        }
    }
    errors
}

/// Traveler-step gate: at least one traveler, every traveler valid, and the
/// date range not inverted.
pub fn travelers_report(state: &ApplicationState, today: NaiveDate) -> Vec<FieldError> {
    if state.travel.travelers.is_empty() {
        return vec![FieldError::new(
            "travelers",
            "At least one traveler is required",
        )];
    }
    let mut errors = Vec::new();
    for (index, traveler) in state.travel.travelers.iter().enumerate() {
        for error in traveler_report(traveler, today) {
            errors.push(FieldError::new(
                format!("travelers[{index}].{}", error.path),
                error.message,
            ));
        }
    }
    errors.extend(travel_dates_report(&state.travel));
    errors
}

/// Requirements of the step the user is currently on. Advancing is allowed
/// only when this comes back empty.
pub fn step_report(state: &ApplicationState, today: NaiveDate) -> Vec<FieldError> {
    let Some(product) = state.product else {
        return Vec::new();
    };
    let Some(step) = steps::step_at(product, state.step) else {
        return Vec::new();
    };
    match step {
        Step::Intro | Step::Summary => Vec::new(),
        Step::PropertyDetails => buildings_report(state, today),
        Step::Travelers => travelers_report(state, today),
        Step::Contact => contact_report(&state.contact),
    }
}

/// Submit gate: the whole application must validate, whatever step the
/// session is on. Consent failing here blocks submission on its own.
pub fn application_report(state: &ApplicationState, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match state.product {
        None => errors.push(FieldError::new("product", "Please choose a product")),
        Some(Product::Property) => errors.extend(buildings_report(state, today)),
        Some(Product::Travel) => errors.extend(travelers_report(state, today)),
    }
    errors.extend(contact_report(&state.contact));
    errors
}
