use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{
    Answer, Building, CivilLiabilityCoverage, CivilLiabilityValue, CommissioningYear,
    ConstructionMaterial, Contact, FinishingLevel, ObjectType, PolicyType, SolarPanelsLocation,
    Traveler,
};

/// Field-level update for one [`Building`].
///
/// `None` (or an absent JSON key) leaves the field untouched; a patch cannot
/// clear an optional field back to unset. Rider fields whose governing flag
/// is off are ignored by validation anyway, so clearing is never needed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingPatch {
    pub object_type: Option<ObjectType>,
    pub owner_name: Option<String>,
    pub property_area: Option<f64>,
    pub commissioning_year: Option<CommissioningYear>,
    pub construction_material: Option<ConstructionMaterial>,
    pub finishing_level: Option<FinishingLevel>,
    pub last_renovation_year: Option<i32>,
    pub current_floor: Option<u32>,
    pub total_floors: Option<u32>,
    pub is_constantly_inhabited: Option<bool>,
    pub is_rented: Option<bool>,
    pub has_security_alarm: Option<bool>,
    pub losses_in_last_3_years: Option<bool>,
    pub is_commercial: Option<bool>,
    pub commercial_activity_type: Option<String>,
    pub has_solar_panels: Option<bool>,
    pub solar_panels_count: Option<u32>,
    pub solar_panels_value: Option<f64>,
    pub solar_panels_location: Option<SolarPanelsLocation>,
    pub movable_property_included: Option<bool>,
    pub total_movable_property_value: Option<f64>,
    pub valuable_movable_property_included: Option<bool>,
    pub civil_liability_insurance_included: Option<bool>,
    pub civil_liability_coverage: Option<CivilLiabilityCoverage>,
    pub civil_liability_value: Option<CivilLiabilityValue>,
}

impl BuildingPatch {
    pub fn apply(self, building: &mut Building) {
        if let Some(v) = self.object_type {
            building.object_type = v;
        }
        if let Some(v) = self.owner_name {
            building.owner_name = v;
        }
        if let Some(v) = self.property_area {
            building.property_area = Some(v);
        }
        if let Some(v) = self.commissioning_year {
            building.commissioning_year = v;
        }
        if let Some(v) = self.construction_material {
            building.construction_material = v;
        }
        if let Some(v) = self.finishing_level {
            building.finishing_level = v;
        }
        if let Some(v) = self.last_renovation_year {
            building.last_renovation_year = Some(v);
        }
        if let Some(v) = self.current_floor {
            building.current_floor = Some(v);
        }
        if let Some(v) = self.total_floors {
            building.total_floors = Some(v);
        }
        if let Some(v) = self.is_constantly_inhabited {
            building.is_constantly_inhabited = v;
        }
        if let Some(v) = self.is_rented {
            building.is_rented = v;
        }
        if let Some(v) = self.has_security_alarm {
            building.has_security_alarm = v;
        }
        if let Some(v) = self.losses_in_last_3_years {
            building.losses_in_last_3_years = v;
        }
        if let Some(v) = self.is_commercial {
            building.is_commercial = v;
        }
        if let Some(v) = self.commercial_activity_type {
            building.commercial_activity_type = Some(v);
        }
        if let Some(v) = self.has_solar_panels {
            building.has_solar_panels = v;
        }
        if let Some(v) = self.solar_panels_count {
            building.solar_panels_count = Some(v);
        }
        if let Some(v) = self.solar_panels_value {
            building.solar_panels_value = Some(v);
        }
        if let Some(v) = self.solar_panels_location {
            building.solar_panels_location = Some(v);
        }
        if let Some(v) = self.movable_property_included {
            building.movable_property_included = v;
        }
        if let Some(v) = self.total_movable_property_value {
            building.total_movable_property_value = Some(v);
        }
        if let Some(v) = self.valuable_movable_property_included {
            building.valuable_movable_property_included = v;
        }
        if let Some(v) = self.civil_liability_insurance_included {
            building.civil_liability_insurance_included = v;
        }
        if let Some(v) = self.civil_liability_coverage {
            building.civil_liability_coverage = Some(v);
        }
        if let Some(v) = self.civil_liability_value {
            building.civil_liability_value = Some(v);
        }
    }
}

/// Field-level update for one [`Traveler`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub policy_type: Option<PolicyType>,
    pub winter_sports: Option<Answer>,
    pub diving: Option<Answer>,
    pub other_sports: Option<Answer>,
    pub competitions: Option<Answer>,
    pub extreme_sports: Option<Answer>,
    pub physical_work: Option<Answer>,
}

impl TravelerPatch {
    pub fn apply(self, traveler: &mut Traveler) {
        if let Some(v) = self.first_name {
            traveler.first_name = v;
        }
        if let Some(v) = self.last_name {
            traveler.last_name = v;
        }
        if let Some(v) = self.birth_date {
            traveler.birth_date = Some(v);
        }
        if let Some(v) = self.policy_type {
            traveler.policy_type = Some(v);
        }
        if let Some(v) = self.winter_sports {
            traveler.winter_sports = v;
        }
        if let Some(v) = self.diving {
            traveler.diving = v;
        }
        if let Some(v) = self.other_sports {
            traveler.other_sports = v;
        }
        if let Some(v) = self.competitions {
            traveler.competitions = v;
        }
        if let Some(v) = self.extreme_sports {
            traveler.extreme_sports = v;
        }
        if let Some(v) = self.physical_work {
            traveler.physical_work = v;
        }
    }
}

/// Field-level update for the [`Contact`] block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub consent: Option<bool>,
}

impl ContactPatch {
    pub fn apply(self, contact: &mut Contact) {
        if let Some(v) = self.name {
            contact.name = v;
        }
        if let Some(v) = self.email {
            contact.email = v;
        }
        if let Some(v) = self.phone {
            contact.phone = v;
        }
        if let Some(v) = self.company {
            contact.company = Some(v);
        }
        if let Some(v) = self.consent {
            contact.consent = v;
        }
    }
}

/// Replacement value for the travel date range. Unlike the patches above this
/// is applied wholesale, so either date can be cleared by omitting it.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelDates {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
