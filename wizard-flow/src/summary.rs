use serde::Serialize;

use crate::model::{
    ApplicationState, Building, Contact, LegalStatus, ObjectType, Product, TravelPlan, Traveler,
};

const NOT_PROVIDED: &str = "Not provided";

/// Rendered, UI-agnostic recap of the application.
///
/// Every field that validation required to be present appears as a row; the
/// HTML/email formatting belongs to the delivery side.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryDocument {
    pub title: String,
    pub sections: Vec<SummarySection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

fn row(label: &str, value: impl Into<String>) -> SummaryRow {
    SummaryRow {
        label: label.to_string(),
        value: value.into(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn or_not_provided<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

fn text_or_not_provided(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Renders the full state into labeled sections.
pub fn render(state: &ApplicationState) -> SummaryDocument {
    let mut sections = vec![application_section(state), contact_section(&state.contact)];

    match state.product {
        Some(Product::Property) => {
            for (index, building) in state.buildings.iter().enumerate() {
                sections.push(building_section(index, building, state.legal_status));
            }
        }
        Some(Product::Travel) => {
            sections.push(travel_period_section(&state.travel));
            for (index, traveler) in state.travel.travelers.iter().enumerate() {
                sections.push(traveler_section(index, traveler));
            }
        }
        None => {}
    }

    SummaryDocument {
        title: "New insurance application".to_string(),
        sections,
    }
}

fn application_section(state: &ApplicationState) -> SummarySection {
    let mut rows = vec![row(
        "Product",
        or_not_provided(state.product.map(|p| p.label())),
    )];
    if state.product == Some(Product::Property) {
        rows.push(row("Legal status", state.legal_status.label()));
    }
    SummarySection {
        title: "Application".to_string(),
        rows,
    }
}

fn contact_section(contact: &Contact) -> SummarySection {
    let mut rows = vec![
        row("Name", text_or_not_provided(&contact.name)),
        row("Email", text_or_not_provided(&contact.email)),
        row("Phone", text_or_not_provided(&contact.phone)),
    ];
    if let Some(company) = contact.company.as_deref() {
        if !company.trim().is_empty() {
            rows.push(row("Company", company.trim()));
        }
    }
    rows.push(row("Consent to terms", yes_no(contact.consent)));
    SummarySection {
        title: "Contact details".to_string(),
        rows,
    }
}

fn building_section(
    index: usize,
    building: &Building,
    legal_status: LegalStatus,
) -> SummarySection {
    let mut rows = vec![
        row("Object type", building.object_type.label()),
        row("Owner", text_or_not_provided(&building.owner_name)),
        row(
            "Property area",
            building
                .property_area
                .map(|a| format!("{a} m²"))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        ),
        row(
            "Construction material",
            building.construction_material.label(),
        ),
        row("Commissioning year", building.commissioning_year.label()),
        row(
            "Last renovation year",
            or_not_provided(building.last_renovation_year),
        ),
        row("Finishing level", building.finishing_level.label()),
    ];

    match building.object_type {
        ObjectType::Apartment => {
            rows.push(row("Current floor", or_not_provided(building.current_floor)));
            rows.push(row("Total floors", or_not_provided(building.total_floors)));
        }
        ObjectType::House => {
            rows.push(row("Total floors", or_not_provided(building.total_floors)));
        }
        ObjectType::Outbuilding => {}
    }

    rows.push(row(
        "Constantly inhabited",
        yes_no(building.is_constantly_inhabited),
    ));
    rows.push(row(
        "Losses in the last 3 years",
        yes_no(building.losses_in_last_3_years),
    ));
    rows.push(row("Rented out", yes_no(building.is_rented)));
    rows.push(row("Security alarm", yes_no(building.has_security_alarm)));

    if legal_status == LegalStatus::LegalEntity {
        rows.push(row("Commercial activity", yes_no(building.is_commercial)));
        if building.is_commercial {
            rows.push(row(
                "Activity type",
                or_not_provided(building.commercial_activity_type.as_deref()),
            ));
        }
    }

    rows.push(row("Solar panels", yes_no(building.has_solar_panels)));
    if building.has_solar_panels {
        rows.push(row("Panel count", or_not_provided(building.solar_panels_count)));
        rows.push(row(
            "Panel value",
            building
                .solar_panels_value
                .map(|v| format!("{v} EUR"))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        ));
        rows.push(row(
            "Panel location",
            or_not_provided(building.solar_panels_location.map(|l| l.label())),
        ));
    }

    rows.push(row(
        "Movable property",
        yes_no(building.movable_property_included),
    ));
    if building.movable_property_included {
        rows.push(row(
            "Movable property value",
            building
                .total_movable_property_value
                .map(|v| format!("{v} EUR"))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        ));
        rows.push(row(
            "High-value items",
            yes_no(building.valuable_movable_property_included),
        ));
    }

    rows.push(row(
        "Civil liability insurance",
        yes_no(building.civil_liability_insurance_included),
    ));
    if building.civil_liability_insurance_included {
        rows.push(row(
            "Liability coverage",
            or_not_provided(building.civil_liability_coverage.map(|c| c.label())),
        ));
        rows.push(row(
            "Liability insured value",
            or_not_provided(building.civil_liability_value.map(|v| v.label())),
        ));
    }

    SummarySection {
        title: format!("Insured object #{}", index + 1),
        rows,
    }
}

fn travel_period_section(travel: &TravelPlan) -> SummarySection {
    SummarySection {
        title: "Travel period".to_string(),
        rows: vec![
            row("From", or_not_provided(travel.date_from)),
            row("To", or_not_provided(travel.date_to)),
        ],
    }
}

fn traveler_section(index: usize, traveler: &Traveler) -> SummarySection {
    SummarySection {
        title: format!("Traveler #{}", index + 1),
        rows: vec![
            row("First name", text_or_not_provided(&traveler.first_name)),
            row("Last name", text_or_not_provided(&traveler.last_name)),
            row("Birth date", or_not_provided(traveler.birth_date)),
            row(
                "Policy type",
                or_not_provided(traveler.policy_type.map(|p| p.label())),
            ),
            row("Winter sports", traveler.winter_sports.label()),
            row("Diving", traveler.diving.label()),
            row("Other sports", traveler.other_sports.label()),
            row("Competitions or training", traveler.competitions.label()),
            row("Extreme sports", traveler.extreme_sports.label()),
            row("Physical work", traveler.physical_work.label()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CivilLiabilityCoverage, CivilLiabilityValue, PolicyType, SolarPanelsLocation,
    };
    use chrono::NaiveDate;

    fn full_property_state() -> ApplicationState {
        let mut state = ApplicationState::new();
        state.product = Some(Product::Property);
        state.legal_status = LegalStatus::LegalEntity;

        let mut building = Building::new();
        building.object_type = ObjectType::Apartment;
        building.owner_name = "SIA Nams".to_string();
        building.property_area = Some(62.5);
        building.current_floor = Some(3);
        building.total_floors = Some(9);
        building.is_commercial = true;
        building.commercial_activity_type = Some("Grocery store".to_string());
        building.has_solar_panels = true;
        building.solar_panels_count = Some(12);
        building.solar_panels_value = Some(8000.0);
        building.solar_panels_location = Some(SolarPanelsLocation::MainBuildingRoof);
        building.movable_property_included = true;
        building.total_movable_property_value = Some(4500.0);
        building.civil_liability_insurance_included = true;
        building.civil_liability_coverage = Some(CivilLiabilityCoverage::Latvia);
        building.civil_liability_value = Some(CivilLiabilityValue::Eur10000);
        state.buildings.push(building);

        state.contact.name = "Anna Ozola".to_string();
        state.contact.email = "anna@example.lv".to_string();
        state.contact.phone = "+371 26123456".to_string();
        state.contact.consent = true;
        state
    }

    fn labels(document: &SummaryDocument) -> Vec<&str> {
        document
            .sections
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.label.as_str()))
            .collect()
    }

    #[test]
    fn surfaces_every_validation_required_field() {
        let document = render(&full_property_state());
        let labels = labels(&document);

        for required in [
            "Property area",
            "Current floor",
            "Total floors",
            "Activity type",
            "Panel count",
            "Panel value",
            "Panel location",
            "Liability coverage",
            "Liability insured value",
            "Movable property value",
            "Name",
            "Email",
            "Phone",
            "Consent to terms",
        ] {
            assert!(labels.contains(&required), "missing row {required:?}");
        }
    }

    #[test]
    fn rider_rows_hidden_while_flags_are_off() {
        let mut state = full_property_state();
        {
            let building = &mut state.buildings[0];
            building.has_solar_panels = false;
            building.movable_property_included = false;
            building.civil_liability_insurance_included = false;
            building.is_commercial = false;
        }

        let document = render(&state);
        let labels = labels(&document);

        for hidden in [
            "Panel count",
            "Movable property value",
            "Liability coverage",
            "Activity type",
        ] {
            assert!(!labels.contains(&hidden), "unexpected row {hidden:?}");
        }
        // The flag rows themselves stay visible.
        assert!(labels.contains(&"Solar panels"));
        assert!(labels.contains(&"Civil liability insurance"));
    }

    #[test]
    fn commercial_rows_only_for_legal_entities() {
        let mut state = full_property_state();
        state.legal_status = LegalStatus::Individual;

        let document = render(&state);
        let labels = labels(&document);
        assert!(!labels.contains(&"Commercial activity"));
        assert!(!labels.contains(&"Activity type"));
    }

    #[test]
    fn travel_summary_has_period_and_traveler_sections() {
        let mut state = ApplicationState::new();
        state.product = Some(Product::Travel);
        state.travel.date_from = NaiveDate::from_ymd_opt(2025, 7, 1);
        state.travel.date_to = NaiveDate::from_ymd_opt(2025, 7, 14);

        let mut traveler = Traveler::new();
        traveler.first_name = "Anna".to_string();
        traveler.last_name = "Ozola".to_string();
        traveler.birth_date = NaiveDate::from_ymd_opt(1990, 3, 14);
        traveler.policy_type = Some(PolicyType::WinterSports);
        state.travel.travelers.push(traveler);

        let document = render(&state);
        let titles: Vec<&str> = document.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Application", "Contact details", "Travel period", "Traveler #1"]
        );

        let traveler_rows = &document.sections[3].rows;
        assert!(
            traveler_rows
                .iter()
                .any(|r| r.label == "Policy type" && r.value == "Winter sports")
        );
        assert!(traveler_rows.iter().any(|r| r.label == "Winter sports" && r.value == "No"));
    }

    #[test]
    fn missing_optional_values_render_as_not_provided() {
        let state = full_property_state();
        let document = render(&state);
        let building_rows = &document.sections[2].rows;

        let renovation = building_rows
            .iter()
            .find(|r| r.label == "Last renovation year")
            .unwrap();
        assert_eq!(renovation.value, NOT_PROVIDED);
    }

    #[test]
    fn legal_status_row_skipped_for_travel() {
        let mut state = ApplicationState::new();
        state.product = Some(Product::Travel);
        let document = render(&state);
        assert!(!labels(&document).contains(&"Legal status"));
    }
}
