pub mod api;
pub mod dashboard;
pub mod form;
pub mod itinerary;

pub use api::TravelPlanApi;
pub use dashboard::{AssumeYes, Confirm, DashboardSnapshot, Outcome, Phase, PlanDashboard};
pub use form::{PlanForm, PlanFormError};
pub use itinerary::ItinerarySummary;
