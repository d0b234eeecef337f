//! Endpoint methods for `/travel-plans`.

use reqwest::Method;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{NewTravelPlan, TravelPlan, TravelPlanUpdate};

const PLANS_PATH: &str = "/travel-plans";

fn plan_path(id: Uuid) -> String {
    format!("{PLANS_PATH}/{id}")
}

impl ApiClient {
    /// List the signed-in user's plans, newest first.
    pub async fn travel_plans(&self) -> Result<Vec<TravelPlan>, ApiError> {
        self.get(PLANS_PATH).await
    }

    /// Create a plan. Returns the stored record with server-generated
    /// fields (id, timestamps, empty itinerary).
    pub async fn create_travel_plan(&self, plan: &NewTravelPlan) -> Result<TravelPlan, ApiError> {
        self.send_json(Method::POST, PLANS_PATH, plan).await
    }

    /// Fetch a single plan.
    pub async fn travel_plan(&self, id: Uuid) -> Result<TravelPlan, ApiError> {
        self.get(&plan_path(id)).await
    }

    /// Apply a partial update and return the updated record.
    pub async fn update_travel_plan(
        &self,
        id: Uuid,
        update: &TravelPlanUpdate,
    ) -> Result<TravelPlan, ApiError> {
        self.send_json(Method::PUT, &plan_path(id), update).await
    }

    /// Delete a plan. Any response body is discarded.
    pub async fn delete_travel_plan(&self, id: Uuid) -> Result<(), ApiError> {
        let _: serde_json::Value = self.request(Method::DELETE, &plan_path(id), None).await?;
        Ok(())
    }
}
