use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Itinerary, ItineraryRequest};

impl ApiClient {
    /// Ask the backend to generate an itinerary. Nothing is stored; attach
    /// the result with [`ApiClient::update_travel_plan`].
    pub async fn generate_itinerary(&self, input: &ItineraryRequest) -> Result<Itinerary, ApiError> {
        self.send_json(Method::POST, "/generate-itinerary", input).await
    }
}
