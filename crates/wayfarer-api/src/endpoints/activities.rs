use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Activity, NewActivity};

impl ApiClient {
    /// Attach an activity to a plan. Omitted fields take server defaults.
    pub async fn add_activity(&self, activity: &NewActivity) -> Result<Activity, ApiError> {
        self.send_json(Method::POST, "/activities", activity).await
    }
}
