use wayfarer_api::models::TravelPlan;

/// Headline figures shown on a plan card once an itinerary is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItinerarySummary {
    /// The plan's stored `total_cost`, falling back to the itinerary's own
    /// estimate when the plan has none.
    pub total_cost: Option<f64>,
    pub days_planned: usize,
}

impl ItinerarySummary {
    /// `None` when the plan has no (or an empty) itinerary.
    pub fn for_plan(plan: &TravelPlan) -> Option<Self> {
        let itinerary = plan.itinerary.as_ref().filter(|it| it.is_present())?;
        Some(Self {
            total_cost: plan.total_cost.or_else(|| itinerary.total_estimated_cost()),
            days_planned: itinerary.day_count(),
        })
    }
}
