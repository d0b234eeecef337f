//! Endpoint methods backed by the geocoding/routing service.

use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{DirectionsRequest, Place};

impl ApiClient {
    /// Search places by free text, optionally near a named location.
    pub async fn search_places(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<Vec<Place>, ApiError> {
        let mut params = vec![("query", query)];
        if let Some(location) = location {
            params.push(("location", location));
        }
        self.get_with_query("/places/search", &params).await
    }

    /// Route between two `[lng, lat]` points. The route payload is passed
    /// through as returned by the routing service.
    pub async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::POST, "/directions", request).await
    }
}
