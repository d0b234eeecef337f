//! Tests for `PlanDashboard` against a scripted in-process API.
//!
//! `FakeApi` keeps its own plan store, records the order of calls, and can
//! be told to fail a given operation or to hold a list call until released.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::{Notify, oneshot};
use uuid::Uuid;

use wayfarer_api::ApiError;
use wayfarer_api::models::{
    Itinerary, ItineraryRequest, NewTravelPlan, TravelPlan, TravelPlanUpdate,
};
use wayfarer_core::dashboard::{
    CREATE_FAILED, DELETE_FAILED, DELETE_PROMPT, GENERATE_FAILED, LOAD_FAILED,
};
use wayfarer_core::{AssumeYes, Outcome, Phase, PlanDashboard, TravelPlanApi};

// ---------------------------------------------------------------------------
// Fake API
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeApi {
    plans: Mutex<Vec<TravelPlan>>,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    updates: Mutex<Vec<TravelPlanUpdate>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    list_entered: Notify,
    create_hangs: AtomicBool,
}

impl FakeApi {
    fn with_plans(plans: Vec<TravelPlan>) -> Arc<Self> {
        let api = Self::default();
        *api.plans.lock().unwrap() = plans;
        Arc::new(api)
    }

    fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn set_plans(&self, plans: Vec<TravelPlan>) {
        *self.plans.lock().unwrap() = plans;
    }

    /// Make every create call wait forever.
    fn hang_creates(&self) {
        self.create_hangs.store(true, Ordering::SeqCst);
    }

    /// Hold the next list call after it has read the store.
    fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.lock().unwrap() = Some(rx);
        tx
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Request {
                status: StatusCode::UNAUTHORIZED,
                message: "invalid token".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TravelPlanApi for FakeApi {
    async fn list_plans(&self) -> Result<Vec<TravelPlan>, ApiError> {
        self.enter("list")?;
        let snapshot = self.plans.lock().unwrap().clone();
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.list_entered.notify_one();
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn create_plan(&self, plan: &NewTravelPlan) -> Result<TravelPlan, ApiError> {
        self.enter("create")?;
        if self.create_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let mut created = sample_plan(&plan.destination);
        created.budget = plan.budget;
        created.duration = plan.duration;
        created.interests = plan.interests.clone();
        created.itinerary = Some(Itinerary(json!({})));
        created.total_cost = Some(0.0);
        self.plans.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_plan(
        &self,
        id: Uuid,
        update: &TravelPlanUpdate,
    ) -> Result<TravelPlan, ApiError> {
        self.enter("update")?;
        self.updates.lock().unwrap().push(update.clone());
        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::Request {
                status: StatusCode::NOT_FOUND,
                message: "Travel plan not found".to_string(),
            })?;
        if let Some(it) = &update.itinerary {
            plan.itinerary = Some(it.clone());
        }
        if let Some(cost) = update.total_cost {
            plan.total_cost = Some(cost);
        }
        Ok(plan.clone())
    }

    async fn delete_plan(&self, id: Uuid) -> Result<(), ApiError> {
        self.enter("delete")?;
        self.plans.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn generate_itinerary(&self, input: &ItineraryRequest) -> Result<Itinerary, ApiError> {
        self.enter("generate")?;
        let days: Vec<_> = (1..=input.duration).map(|d| json!({ "day": d })).collect();
        Ok(Itinerary(json!({
            "days": days,
            "total_estimated_cost": input.budget * 0.9,
        })))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_plan(destination: &str) -> TravelPlan {
    let now = Utc::now().naive_utc();
    TravelPlan {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        destination: destination.to_string(),
        budget: 1000.0,
        duration: 3,
        interests: vec!["food".to_string()],
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        itinerary: None,
        total_cost: None,
        created_at: now,
        updated_at: now,
    }
}

fn new_plan(destination: &str) -> NewTravelPlan {
    NewTravelPlan {
        destination: destination.to_string(),
        budget: 2000.0,
        duration: 7,
        interests: vec!["culture".to_string()],
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
    }
}

fn destinations(dash: &PlanDashboard<Arc<FakeApi>>) -> Vec<String> {
    dash.plans().into_iter().map(|p| p.destination).collect()
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_load_populates_list() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome"), sample_plan("Oslo")]);
    let dash = PlanDashboard::new(api.clone());
    assert_eq!(dash.phase(), Phase::Loading);
    assert!(dash.is_stale());

    assert_eq!(dash.refresh_if_stale().await, Outcome::Applied);
    assert_eq!(dash.phase(), Phase::Ready);
    assert_eq!(destinations(&dash), vec!["Rome", "Oslo"]);
    assert!(!dash.is_stale());
    assert_eq!(dash.banner(), None);

    assert_eq!(dash.refresh_if_stale().await, Outcome::Unchanged);
    assert_eq!(api.calls(), vec!["list"]);
}

#[tokio::test]
async fn failed_load_shows_banner_with_empty_list() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome")]);
    api.fail("list");
    let dash = PlanDashboard::new(api.clone());

    assert_eq!(dash.load().await, Outcome::Failed);
    let snap = dash.snapshot();
    assert_eq!(snap.phase, Phase::Ready);
    assert!(snap.plans.is_empty());
    assert_eq!(snap.banner.as_deref(), Some(LOAD_FAILED));
    assert_eq!(api.calls(), vec!["list"], "no automatic retry");
}

#[tokio::test]
async fn server_message_never_reaches_banner() {
    let api = FakeApi::with_plans(vec![]);
    api.fail("list");
    let dash = PlanDashboard::new(api);

    let _ = dash.load().await;
    let banner = dash.banner().unwrap();
    assert_eq!(banner, "Failed to load travel plans");
    assert!(!banner.contains("invalid token"));

    dash.dismiss_banner();
    assert_eq!(dash.banner(), None);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_prepends_and_closes_form() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome"), sample_plan("Oslo")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;

    dash.open_create_form();
    assert!(dash.can_submit());

    assert_eq!(dash.create_plan(&new_plan("Paris")).await, Outcome::Applied);
    assert_eq!(destinations(&dash), vec!["Paris", "Rome", "Oslo"]);
    assert!(!dash.is_create_form_open());
    assert_eq!(dash.phase(), Phase::Ready);
    assert_eq!(api.calls(), vec!["list", "create"], "create does not reload");
}

#[tokio::test]
async fn failed_create_keeps_list_and_form() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome"), sample_plan("Oslo")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    api.fail("create");

    dash.open_create_form();
    assert_eq!(dash.create_plan(&new_plan("Paris")).await, Outcome::Failed);

    assert_eq!(destinations(&dash), vec!["Rome", "Oslo"]);
    assert!(dash.is_create_form_open());
    assert_eq!(dash.banner().as_deref(), Some(CREATE_FAILED));
}

#[tokio::test]
async fn abandoned_create_returns_to_ready() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    api.hang_creates();
    dash.open_create_form();

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), dash.create_plan(&new_plan("Paris"))).await;
    assert!(abandoned.is_err(), "create should still be pending");

    assert_eq!(dash.phase(), Phase::Ready);
    assert!(dash.can_submit());
    assert!(dash.is_create_form_open());
    assert_eq!(destinations(&dash), vec!["Rome"]);
}

#[tokio::test]
async fn create_clears_previous_banner() {
    let api = FakeApi::with_plans(vec![]);
    api.fail("list");
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    assert!(dash.banner().is_some());

    assert_eq!(dash.create_plan(&new_plan("Paris")).await, Outcome::Applied);
    assert_eq!(dash.banner(), None);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirmed_delete_removes_only_that_plan() {
    let plans = vec![sample_plan("A"), sample_plan("X"), sample_plan("B")];
    let x = plans[1].id;
    let api = FakeApi::with_plans(plans);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;

    let prompts = Mutex::new(Vec::new());
    let confirm = |prompt: &str| {
        prompts.lock().unwrap().push(prompt.to_string());
        true
    };
    assert_eq!(dash.delete_plan(x, &confirm).await, Outcome::Applied);

    assert_eq!(destinations(&dash), vec!["A", "B"]);
    assert_eq!(prompts.into_inner().unwrap(), vec![DELETE_PROMPT.to_string()]);
    assert_eq!(api.calls(), vec!["list", "delete"], "delete does not reload");
}

#[tokio::test]
async fn cancelled_delete_sends_nothing() {
    let plans = vec![sample_plan("A"), sample_plan("X")];
    let x = plans[1].id;
    let api = FakeApi::with_plans(plans);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;

    let decline = |_: &str| false;
    assert_eq!(dash.delete_plan(x, &decline).await, Outcome::Cancelled);

    assert_eq!(destinations(&dash), vec!["A", "X"]);
    assert_eq!(api.calls(), vec!["list"]);
    assert_eq!(dash.banner(), None);
}

#[tokio::test]
async fn failed_delete_keeps_list() {
    let plans = vec![sample_plan("A"), sample_plan("X")];
    let x = plans[1].id;
    let api = FakeApi::with_plans(plans);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    api.fail("delete");

    assert_eq!(dash.delete_plan(x, &AssumeYes).await, Outcome::Failed);
    assert_eq!(destinations(&dash), vec!["A", "X"]);
    assert_eq!(dash.banner().as_deref(), Some(DELETE_FAILED));
}

// ---------------------------------------------------------------------------
// Generate itinerary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_runs_generate_update_reload() {
    let api = FakeApi::with_plans(vec![]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    let _ = dash.create_plan(&new_plan("Paris")).await;
    let paris = dash.plans()[0].id;

    assert_eq!(dash.generate_itinerary(paris).await, Outcome::Applied);

    assert_eq!(
        api.calls(),
        vec!["list", "create", "generate", "update", "list"]
    );
    let updates = api.updates.lock().unwrap().clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].total_cost, Some(1800.0));
    assert!(updates[0].destination.is_none(), "only itinerary fields sent");

    let plan = dash.plan(paris).unwrap();
    assert_eq!(plan.total_cost, Some(1800.0));
    assert!(plan.has_itinerary());
    assert!(!dash.is_stale());
}

#[tokio::test]
async fn failed_generate_leaves_plan_untouched() {
    let api = FakeApi::with_plans(vec![sample_plan("Paris")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    let before = dash.plans();
    api.fail("generate");

    assert_eq!(dash.generate_itinerary(before[0].id).await, Outcome::Failed);
    assert_eq!(dash.plans(), before);
    assert_eq!(dash.banner().as_deref(), Some(GENERATE_FAILED));
    assert_eq!(api.calls(), vec!["list", "generate"]);
}

#[tokio::test]
async fn failed_update_leaves_plan_untouched() {
    let api = FakeApi::with_plans(vec![sample_plan("Paris")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    let before = dash.plans();
    api.fail("update");

    assert_eq!(dash.generate_itinerary(before[0].id).await, Outcome::Failed);
    assert_eq!(dash.plans(), before);
    assert_eq!(dash.banner().as_deref(), Some(GENERATE_FAILED));
    assert_eq!(api.calls(), vec!["list", "generate", "update"]);
}

#[tokio::test]
async fn generate_for_unknown_plan_fails_without_calls() {
    let api = FakeApi::with_plans(vec![sample_plan("Paris")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;

    assert_eq!(dash.generate_itinerary(Uuid::new_v4()).await, Outcome::Failed);
    assert_eq!(dash.banner().as_deref(), Some(GENERATE_FAILED));
    assert_eq!(api.calls(), vec!["list"]);
}

#[tokio::test]
async fn failed_reload_after_generate_keeps_patched_plan() {
    let api = FakeApi::with_plans(vec![sample_plan("Paris")]);
    let dash = PlanDashboard::new(api.clone());
    let _ = dash.load().await;
    let id = dash.plans()[0].id;
    api.fail("list");

    assert_eq!(dash.generate_itinerary(id).await, Outcome::Applied);
    assert_eq!(dash.plan(id).unwrap().total_cost, Some(900.0));
    assert_eq!(dash.banner().as_deref(), Some(LOAD_FAILED));
    assert!(dash.is_stale());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn superseded_load_is_discarded() {
    let a = sample_plan("A");
    let b = sample_plan("B");
    let api = FakeApi::with_plans(vec![a]);
    let dash = PlanDashboard::new(api.clone());
    let release = api.gate_next_list();

    let (first, second) = tokio::join!(dash.load(), async {
        api.list_entered.notified().await;
        api.set_plans(vec![b.clone()]);
        let outcome = dash.load().await;
        let _ = release.send(());
        outcome
    });

    assert_eq!(second, Outcome::Applied);
    assert_eq!(first, Outcome::Discarded);
    assert_eq!(destinations(&dash), vec!["B"]);
    assert!(!dash.is_stale(), "the newer load already refreshed the cache");

    assert_eq!(dash.refresh_if_stale().await, Outcome::Unchanged);
    assert_eq!(api.calls(), vec!["list", "list"]);
}

#[tokio::test]
async fn load_racing_create_does_not_drop_new_plan() {
    let api = FakeApi::with_plans(vec![sample_plan("Rome")]);
    let dash = PlanDashboard::new(api.clone());
    let release = api.gate_next_list();

    let (load, create) = tokio::join!(dash.load(), async {
        api.list_entered.notified().await;
        let outcome = dash.create_plan(&new_plan("Paris")).await;
        let _ = release.send(());
        outcome
    });

    assert_eq!(create, Outcome::Applied);
    assert_eq!(load, Outcome::Discarded);
    assert_eq!(destinations(&dash), vec!["Paris"]);
    assert!(dash.is_stale());

    assert_eq!(dash.refresh_if_stale().await, Outcome::Applied);
    assert_eq!(destinations(&dash), vec!["Paris", "Rome"]);
}
