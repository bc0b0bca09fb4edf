use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Insurance product chosen on the opening screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    Property,
    Travel,
}

impl Product {
    pub fn label(&self) -> &'static str {
        match self {
            Product::Property => "Property insurance",
            Product::Travel => "Travel insurance",
        }
    }
}

/// Applicant legal status; gates the commercial-activity questions on buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegalStatus {
    #[default]
    Individual,
    LegalEntity,
}

impl LegalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LegalStatus::Individual => "Individual",
            LegalStatus::LegalEntity => "Legal entity",
        }
    }
}

/// Discriminator that decides which building fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Apartment,
    House,
    Outbuilding,
}

impl ObjectType {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectType::Apartment => "Apartment",
            ObjectType::House => "House",
            ObjectType::Outbuilding => "Outbuilding",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissioningYear {
    Before1971,
    From1972To1999,
    After2000,
    NotCommissioned,
}

impl CommissioningYear {
    pub fn label(&self) -> &'static str {
        match self {
            CommissioningYear::Before1971 => "Before 1971",
            CommissioningYear::From1972To1999 => "1972 - 1999",
            CommissioningYear::After2000 => "After 2000",
            CommissioningYear::NotCommissioned => "Not commissioned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionMaterial {
    Masonry,
    Wood,
    Mixed,
}

impl ConstructionMaterial {
    pub fn label(&self) -> &'static str {
        match self {
            ConstructionMaterial::Masonry => "Masonry",
            ConstructionMaterial::Wood => "Wood",
            ConstructionMaterial::Mixed => "Mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishingLevel {
    Simple,
    Quality,
    Exclusive,
}

impl FinishingLevel {
    pub fn label(&self) -> &'static str {
        match self {
            FinishingLevel::Simple => "Simple",
            FinishingLevel::Quality => "Quality",
            FinishingLevel::Exclusive => "Exclusive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarPanelsLocation {
    MainBuildingRoof,
    Outbuilding,
    Ground,
}

impl SolarPanelsLocation {
    pub fn label(&self) -> &'static str {
        match self {
            SolarPanelsLocation::MainBuildingRoof => "Main building roof",
            SolarPanelsLocation::Outbuilding => "Outbuilding",
            SolarPanelsLocation::Ground => "Ground",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CivilLiabilityCoverage {
    ApartmentOnly,
    Latvia,
    Worldwide,
}

impl CivilLiabilityCoverage {
    pub fn label(&self) -> &'static str {
        match self {
            CivilLiabilityCoverage::ApartmentOnly => "Apartment only",
            CivilLiabilityCoverage::Latvia => "All of Latvia",
            CivilLiabilityCoverage::Worldwide => "Worldwide",
        }
    }
}

/// Insured-value tier for the liability rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CivilLiabilityValue {
    Eur5000,
    Eur10000,
    Eur15000,
    Eur20000Plus,
}

impl CivilLiabilityValue {
    pub fn label(&self) -> &'static str {
        match self {
            CivilLiabilityValue::Eur5000 => "5 000 EUR",
            CivilLiabilityValue::Eur10000 => "10 000 EUR",
            CivilLiabilityValue::Eur15000 => "15 000 EUR",
            CivilLiabilityValue::Eur20000Plus => "20 000 EUR and above",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyType {
    Standard,
    WinterSports,
    ExtremeSports,
    Student,
    Senior,
}

impl PolicyType {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyType::Standard => "Standard",
            PolicyType::WinterSports => "Winter sports",
            PolicyType::ExtremeSports => "Extreme sports",
            PolicyType::Student => "Student",
            PolicyType::Senior => "Senior",
        }
    }
}

/// Yes/no answer to a risk-activity question. Unanswered means "no".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    #[default]
    No,
}

impl Answer {
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

/// One insured object in the property flow.
///
/// Flag-gated rider fields (`solar_panels_*`, `civil_liability_*`,
/// `total_movable_property_value`, `commercial_activity_type`) stay in place
/// when their flag is switched off; they are simply ignored by validation,
/// serialization consumers and the summary until the flag is on again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: String,
    pub object_type: ObjectType,
    pub owner_name: String,
    pub property_area: Option<f64>,
    pub commissioning_year: CommissioningYear,
    pub construction_material: ConstructionMaterial,
    pub finishing_level: FinishingLevel,
    pub last_renovation_year: Option<i32>,
    pub current_floor: Option<u32>,
    pub total_floors: Option<u32>,
    pub is_constantly_inhabited: bool,
    pub is_rented: bool,
    pub has_security_alarm: bool,
    pub losses_in_last_3_years: bool,
    pub is_commercial: bool,
    pub commercial_activity_type: Option<String>,
    pub has_solar_panels: bool,
    pub solar_panels_count: Option<u32>,
    pub solar_panels_value: Option<f64>,
    pub solar_panels_location: Option<SolarPanelsLocation>,
    pub movable_property_included: bool,
    pub total_movable_property_value: Option<f64>,
    pub valuable_movable_property_included: bool,
    pub civil_liability_insurance_included: bool,
    pub civil_liability_coverage: Option<CivilLiabilityCoverage>,
    pub civil_liability_value: Option<CivilLiabilityValue>,
}

impl Building {
    /// Fresh building with the defaults the add-object action produces.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            object_type: ObjectType::House,
            owner_name: String::new(),
            property_area: None,
            commissioning_year: CommissioningYear::After2000,
            construction_material: ConstructionMaterial::Masonry,
            finishing_level: FinishingLevel::Quality,
            last_renovation_year: None,
            current_floor: None,
            total_floors: None,
            is_constantly_inhabited: true,
            is_rented: false,
            has_security_alarm: false,
            losses_in_last_3_years: false,
            is_commercial: false,
            commercial_activity_type: None,
            has_solar_panels: false,
            solar_panels_count: None,
            solar_panels_value: None,
            solar_panels_location: None,
            movable_property_included: false,
            total_movable_property_value: None,
            valuable_movable_property_included: false,
            civil_liability_insurance_included: false,
            civil_liability_coverage: None,
            civil_liability_value: None,
        }
    }
}

impl Default for Building {
    fn default() -> Self {
        Self::new()
    }
}

/// One insured person in the travel flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub policy_type: Option<PolicyType>,
    #[serde(default)]
    pub winter_sports: Answer,
    #[serde(default)]
    pub diving: Answer,
    #[serde(default)]
    pub other_sports: Answer,
    #[serde(default)]
    pub competitions: Answer,
    #[serde(default)]
    pub extreme_sports: Answer,
    #[serde(default)]
    pub physical_work: Answer,
}

impl Traveler {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: String::new(),
            last_name: String::new(),
            birth_date: None,
            policy_type: None,
            winter_sports: Answer::No,
            diving: Answer::No,
            other_sports: Answer::No,
            competitions: Answer::No,
            extreme_sports: Answer::No,
            physical_work: Answer::No,
        }
    }
}

impl Default for Traveler {
    fn default() -> Self {
        Self::new()
    }
}

/// Travel sub-state: optional date range plus the insured persons.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub travelers: Vec<Traveler>,
}

/// Contact details collected on the next-to-last step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub consent: bool,
}

/// Root application state, one per session.
///
/// Mutated only through [`crate::Wizard`] transitions; `submitted = true` is
/// terminal and freezes every transition and edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub step: u32,
    pub product: Option<Product>,
    pub legal_status: LegalStatus,
    pub buildings: Vec<Building>,
    pub travel: TravelPlan,
    pub contact: Contact,
    pub submitted: bool,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self {
            step: 1,
            product: None,
            legal_status: LegalStatus::Individual,
            buildings: Vec::new(),
            travel: TravelPlan::default(),
            contact: Contact::default(),
            submitted: false,
        }
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}
