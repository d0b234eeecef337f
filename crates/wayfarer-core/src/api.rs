//! The `TravelPlanApi` trait -- the remote operations the plan dashboard
//! depends on.
//!
//! [`ApiClient`] is the production implementation. Tests substitute fakes
//! to script failures and interleavings.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use wayfarer_api::models::{Itinerary, ItineraryRequest, NewTravelPlan, TravelPlan, TravelPlanUpdate};
use wayfarer_api::{ApiClient, ApiError};

/// Remote plan store as seen by [`crate::PlanDashboard`].
#[async_trait]
pub trait TravelPlanApi: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<TravelPlan>, ApiError>;

    async fn create_plan(&self, plan: &NewTravelPlan) -> Result<TravelPlan, ApiError>;

    async fn update_plan(
        &self,
        id: Uuid,
        update: &TravelPlanUpdate,
    ) -> Result<TravelPlan, ApiError>;

    async fn delete_plan(&self, id: Uuid) -> Result<(), ApiError>;

    /// Pure computation on the server; must not modify any plan.
    async fn generate_itinerary(&self, input: &ItineraryRequest) -> Result<Itinerary, ApiError>;
}

// Compile-time assertion: TravelPlanApi must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn TravelPlanApi) {}
};

#[async_trait]
impl TravelPlanApi for ApiClient {
    async fn list_plans(&self) -> Result<Vec<TravelPlan>, ApiError> {
        self.travel_plans().await
    }

    async fn create_plan(&self, plan: &NewTravelPlan) -> Result<TravelPlan, ApiError> {
        self.create_travel_plan(plan).await
    }

    async fn update_plan(
        &self,
        id: Uuid,
        update: &TravelPlanUpdate,
    ) -> Result<TravelPlan, ApiError> {
        self.update_travel_plan(id, update).await
    }

    async fn delete_plan(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete_travel_plan(id).await
    }

    async fn generate_itinerary(&self, input: &ItineraryRequest) -> Result<Itinerary, ApiError> {
        ApiClient::generate_itinerary(self, input).await
    }
}

#[async_trait]
impl<T: TravelPlanApi + ?Sized> TravelPlanApi for Arc<T> {
    async fn list_plans(&self) -> Result<Vec<TravelPlan>, ApiError> {
        (**self).list_plans().await
    }

    async fn create_plan(&self, plan: &NewTravelPlan) -> Result<TravelPlan, ApiError> {
        (**self).create_plan(plan).await
    }

    async fn update_plan(
        &self,
        id: Uuid,
        update: &TravelPlanUpdate,
    ) -> Result<TravelPlan, ApiError> {
        (**self).update_plan(id, update).await
    }

    async fn delete_plan(&self, id: Uuid) -> Result<(), ApiError> {
        (**self).delete_plan(id).await
    }

    async fn generate_itinerary(&self, input: &ItineraryRequest) -> Result<Itinerary, ApiError> {
        (**self).generate_itinerary(input).await
    }
}
