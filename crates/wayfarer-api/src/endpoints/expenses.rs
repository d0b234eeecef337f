use reqwest::Method;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Expense, NewExpense};

const EXPENSES_PATH: &str = "/expenses";

impl ApiClient {
    /// List a plan's expenses, most recent date first.
    pub async fn expenses(&self, plan_id: Uuid) -> Result<Vec<Expense>, ApiError> {
        let plan_id = plan_id.to_string();
        self.get_with_query(EXPENSES_PATH, &[("plan_id", plan_id.as_str())])
            .await
    }

    /// Record an expense against a plan.
    pub async fn add_expense(&self, expense: &NewExpense) -> Result<Expense, ApiError> {
        self.send_json(Method::POST, EXPENSES_PATH, expense).await
    }
}
