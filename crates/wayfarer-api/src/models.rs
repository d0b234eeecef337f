use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Category of a planned activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Sightseeing,
    Dining,
    Entertainment,
    Shopping,
    Culture,
    Other,
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sightseeing => "sightseeing",
            Self::Dining => "dining",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Culture => "culture",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityCategory {
    type Err = ActivityCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sightseeing" => Ok(Self::Sightseeing),
            "dining" => Ok(Self::Dining),
            "entertainment" => Ok(Self::Entertainment),
            "shopping" => Ok(Self::Shopping),
            "culture" => Ok(Self::Culture),
            "other" => Ok(Self::Other),
            other => Err(ActivityCategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActivityCategory`] string.
#[derive(Debug, Clone)]
pub struct ActivityCategoryParseError(pub String);

impl fmt::Display for ActivityCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid activity category: {:?}", self.0)
    }
}

impl std::error::Error for ActivityCategoryParseError {}

// ---------------------------------------------------------------------------

/// Routing profile accepted by the directions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelProfile {
    #[default]
    DrivingCar,
    CyclingRegular,
    FootWalking,
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DrivingCar => "driving-car",
            Self::CyclingRegular => "cycling-regular",
            Self::FootWalking => "foot-walking",
        };
        f.write_str(s)
    }
}

impl FromStr for TravelProfile {
    type Err = TravelProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving-car" => Ok(Self::DrivingCar),
            "cycling-regular" => Ok(Self::CyclingRegular),
            "foot-walking" => Ok(Self::FootWalking),
            other => Err(TravelProfileParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TravelProfile`] string.
#[derive(Debug, Clone)]
pub struct TravelProfileParseError(pub String);

impl fmt::Display for TravelProfileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid travel profile: {:?}", self.0)
    }
}

impl std::error::Error for TravelProfileParseError {}

// ---------------------------------------------------------------------------
// Itinerary
// ---------------------------------------------------------------------------

/// A generated itinerary.
///
/// The payload is owned by the remote generator and kept verbatim. Only
/// `total_estimated_cost` and the `days` array are ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary(pub serde_json::Value);

impl Itinerary {
    /// Estimated total cost reported by the generator, if any.
    pub fn total_estimated_cost(&self) -> Option<f64> {
        self.0.get("total_estimated_cost").and_then(|v| v.as_f64())
    }

    /// Number of entries in the `days` array (0 when missing).
    pub fn day_count(&self) -> usize {
        self.0
            .get("days")
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len)
    }

    /// `false` for `null` and for an object with no keys.
    ///
    /// Freshly created plans carry `{}` until generation runs.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }
}

impl From<serde_json::Value> for Itinerary {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Inputs sent to `POST /generate-itinerary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub destination: String,
    pub budget: f64,
    pub duration: i32,
    pub interests: Vec<String>,
}

impl From<&TravelPlan> for ItineraryRequest {
    fn from(plan: &TravelPlan) -> Self {
        Self {
            destination: plan.destination.clone(),
            budget: plan.budget,
            duration: plan.duration,
            interests: plan.interests.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

/// A user profile as returned by the backend (never includes credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Travel plans
// ---------------------------------------------------------------------------

/// A user's trip record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    pub budget: f64,
    pub duration: i32,
    #[serde(default)]
    pub interests: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub itinerary: Option<Itinerary>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TravelPlan {
    /// Whether a non-empty itinerary is attached.
    pub fn has_itinerary(&self) -> bool {
        self.itinerary.as_ref().is_some_and(Itinerary::is_present)
    }
}

/// Body of `POST /travel-plans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTravelPlan {
    pub destination: String,
    pub budget: f64,
    pub duration: i32,
    pub interests: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial body of `PUT /travel-plans/{id}`. Absent fields are left alone
/// by the backend and are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelPlanUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Itinerary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl TravelPlanUpdate {
    /// Update that attaches a generated itinerary along with its cost.
    pub fn with_itinerary(itinerary: Itinerary) -> Self {
        let total_cost = itinerary.total_estimated_cost();
        Self {
            itinerary: Some(itinerary),
            total_cost,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Places, activities, expenses
// ---------------------------------------------------------------------------

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A geocoding hit from `GET /places/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of `POST /directions`. Points are `[lng, lat]` as the routing
/// service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub profile: TravelProfile,
}

/// Body of `POST /activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub plan_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
}

/// An activity attached to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: serde_json::Value,
    pub cost: f64,
    pub duration: i32,
    pub category: String,
    pub day: i32,
    pub time_slot: String,
}

/// Body of `POST /expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub plan_id: Uuid,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
