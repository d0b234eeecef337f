//! Plan list view-model.
//!
//! [`PlanDashboard`] owns the in-memory list of the signed-in user's plans
//! and keeps it consistent with the backend after every successful
//! mutation, either by reloading the whole list or by patching the single
//! affected record.
//!
//! ```text
//! loading    -> ready       (first load finished, list or banner)
//! ready      -> submitting  (create in flight)
//! submitting -> ready       (create finished)
//! ```
//!
//! Every remote failure is logged with its detail and mapped to a fixed
//! banner per operation. There are no retries.
//!
//! Each list load takes a ticket from a generation counter that every load
//! and every local splice advances. A load whose ticket is no longer
//! current when it returns is discarded, so an older response never
//! overwrites newer local state. The cache is marked stale on discard only
//! if the list has moved past the last applied load.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, warn};
use uuid::Uuid;

use wayfarer_api::models::{ItineraryRequest, NewTravelPlan, TravelPlan, TravelPlanUpdate};

use crate::api::TravelPlanApi;

pub const LOAD_FAILED: &str = "Failed to load travel plans";
pub const CREATE_FAILED: &str = "Failed to create travel plan";
pub const GENERATE_FAILED: &str = "Failed to generate itinerary";
pub const DELETE_FAILED: &str = "Failed to delete travel plan";

/// Question put to the user before a plan is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this travel plan?";

/// Interactive yes/no confirmation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirmation that always says yes (e.g. `--yes` on the command line).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Coarse view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The first load has not finished yet.
    Loading,
    Ready,
    /// At least one create is in flight.
    Submitting,
}

/// What an operation did to the local state.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do (e.g. the cache was already fresh).
    Unchanged,
    /// The user declined the confirmation; no request was sent.
    Cancelled,
    /// The response arrived after newer state and was dropped.
    Discarded,
    /// A remote call failed; the banner is set.
    Failed,
}

/// Point-in-time copy of the dashboard for rendering.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub phase: Phase,
    pub plans: Vec<TravelPlan>,
    pub banner: Option<String>,
    pub create_form_open: bool,
    pub stale: bool,
}

#[derive(Debug)]
struct DashboardState {
    plans: Vec<TravelPlan>,
    banner: Option<String>,
    create_form_open: bool,
    loaded_once: bool,
    creates_in_flight: usize,
    stale: bool,
    generation: u64,
    /// Generation of the last load whose list was applied.
    applied: u64,
}

impl DashboardState {
    fn phase(&self) -> Phase {
        if !self.loaded_once {
            Phase::Loading
        } else if self.creates_in_flight > 0 {
            Phase::Submitting
        } else {
            Phase::Ready
        }
    }

    /// Advance the generation; in-flight loads become superseded.
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

fn lock(state: &Mutex<DashboardState>) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Holds one slot of `creates_in_flight` until dropped.
struct CreateInFlight<'a>(&'a Mutex<DashboardState>);

impl<'a> CreateInFlight<'a> {
    fn enter(state: &'a Mutex<DashboardState>) -> Self {
        lock(state).creates_in_flight += 1;
        Self(state)
    }
}

impl Drop for CreateInFlight<'_> {
    fn drop(&mut self) {
        lock(self.0).creates_in_flight -= 1;
    }
}

/// The plan list view-model.
///
/// All methods take `&self`; internal state sits behind a mutex that is
/// never held across an `.await`, so operations may be issued concurrently.
/// No ordering is enforced between them and nothing is de-duplicated.
pub struct PlanDashboard<A> {
    api: A,
    state: Mutex<DashboardState>,
}

impl<A: TravelPlanApi> PlanDashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(DashboardState {
                plans: Vec::new(),
                banner: None,
                create_form_open: false,
                loaded_once: false,
                creates_in_flight: 0,
                stale: true,
                generation: 0,
                applied: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        lock(&self.state)
    }

    // -- Queries --

    pub fn snapshot(&self) -> DashboardSnapshot {
        let s = self.state();
        DashboardSnapshot {
            phase: s.phase(),
            plans: s.plans.clone(),
            banner: s.banner.clone(),
            create_form_open: s.create_form_open,
            stale: s.stale,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state().phase()
    }

    pub fn plans(&self) -> Vec<TravelPlan> {
        self.state().plans.clone()
    }

    pub fn plan(&self, id: Uuid) -> Option<TravelPlan> {
        self.state().plans.iter().find(|p| p.id == id).cloned()
    }

    pub fn banner(&self) -> Option<String> {
        self.state().banner.clone()
    }

    pub fn is_stale(&self) -> bool {
        self.state().stale
    }

    pub fn is_create_form_open(&self) -> bool {
        self.state().create_form_open
    }

    /// Whether the submit control should be enabled.
    ///
    /// Purely advisory: [`Self::create_plan`] never refuses a call.
    pub fn can_submit(&self) -> bool {
        let s = self.state();
        s.create_form_open && s.creates_in_flight == 0
    }

    // -- Local UI state --

    pub fn open_create_form(&self) {
        self.state().create_form_open = true;
    }

    pub fn close_create_form(&self) {
        self.state().create_form_open = false;
    }

    pub fn dismiss_banner(&self) {
        self.state().banner = None;
    }

    // -- Remote operations --

    /// Replace the list with the server's.
    ///
    /// On failure the banner is set and the current list is kept (empty on
    /// the first load).
    pub async fn load(&self) -> Outcome {
        let ticket = self.state().bump();
        debug!(ticket, "loading travel plans");

        let result = self.api.list_plans().await;

        let mut s = self.state();
        s.loaded_once = true;
        let superseded = ticket != s.generation;

        match result {
            Ok(_) if superseded => {
                debug!(ticket, current = s.generation, "discarding superseded plan list");
                if s.generation != s.applied {
                    s.stale = true;
                }
                Outcome::Discarded
            }
            Ok(plans) => {
                debug!(count = plans.len(), "travel plans loaded");
                s.plans = plans;
                s.stale = false;
                s.applied = ticket;
                Outcome::Applied
            }
            Err(e) if superseded => {
                warn!(error = %e, ticket, "superseded plan load failed");
                Outcome::Discarded
            }
            Err(e) => {
                error!(error = %e, "failed to load travel plans");
                s.banner = Some(LOAD_FAILED.to_owned());
                Outcome::Failed
            }
        }
    }

    /// Reload only if the cache is marked stale. A new dashboard starts
    /// stale, so the first call performs the initial load.
    pub async fn refresh_if_stale(&self) -> Outcome {
        if !self.is_stale() {
            return Outcome::Unchanged;
        }
        self.load().await
    }

    /// Create a plan and put it at the head of the list.
    ///
    /// Input is not validated here; see [`crate::form::PlanForm`]. On
    /// failure the list is untouched and the create form stays open.
    pub async fn create_plan(&self, plan: &NewTravelPlan) -> Outcome {
        self.state().banner = None;
        let in_flight = CreateInFlight::enter(&self.state);

        let result = self.api.create_plan(plan).await;

        drop(in_flight);
        let mut s = self.state();
        match result {
            Ok(created) => {
                debug!(plan_id = %created.id, destination = %created.destination, "travel plan created");
                s.bump();
                s.plans.insert(0, created);
                s.create_form_open = false;
                Outcome::Applied
            }
            Err(e) => {
                error!(error = %e, destination = %plan.destination, "failed to create travel plan");
                s.banner = Some(CREATE_FAILED.to_owned());
                Outcome::Failed
            }
        }
    }

    /// Generate an itinerary for a plan in the list and persist it.
    ///
    /// Runs generate, then update with the itinerary and its estimated
    /// cost, then a full reload. If generate or update fails the local plan
    /// is left exactly as it was. A failed reload after a successful update
    /// only sets the load banner; the patched record stays.
    pub async fn generate_itinerary(&self, plan_id: Uuid) -> Outcome {
        let plan = {
            let mut s = self.state();
            s.banner = None;
            let plan = s.plans.iter().find(|p| p.id == plan_id).cloned();
            if plan.is_none() {
                warn!(%plan_id, "cannot generate itinerary for a plan that is not loaded");
                s.banner = Some(GENERATE_FAILED.to_owned());
            }
            plan
        };
        let Some(plan) = plan else {
            return Outcome::Failed;
        };

        let itinerary = match self
            .api
            .generate_itinerary(&ItineraryRequest::from(&plan))
            .await
        {
            Ok(it) => it,
            Err(e) => {
                error!(error = %e, %plan_id, "failed to generate itinerary");
                self.state().banner = Some(GENERATE_FAILED.to_owned());
                return Outcome::Failed;
            }
        };

        let update = TravelPlanUpdate::with_itinerary(itinerary);
        let updated = match self.api.update_plan(plan_id, &update).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, %plan_id, "failed to save generated itinerary");
                self.state().banner = Some(GENERATE_FAILED.to_owned());
                return Outcome::Failed;
            }
        };

        {
            let mut s = self.state();
            s.bump();
            if let Some(slot) = s.plans.iter_mut().find(|p| p.id == plan_id) {
                *slot = updated;
            }
            s.stale = true;
        }
        debug!(%plan_id, "itinerary saved, reloading plans");

        // The patch above already reflects the server, so a failed reload
        // does not undo the operation.
        let _ = self.load().await;
        Outcome::Applied
    }

    /// Delete a plan after confirmation and drop it from the list.
    ///
    /// A declined confirmation sends nothing.
    pub async fn delete_plan(&self, plan_id: Uuid, confirm: &dyn Confirm) -> Outcome {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%plan_id, "delete cancelled");
            return Outcome::Cancelled;
        }

        let result = self.api.delete_plan(plan_id).await;

        let mut s = self.state();
        match result {
            Ok(()) => {
                debug!(%plan_id, "travel plan deleted");
                s.bump();
                s.plans.retain(|p| p.id != plan_id);
                Outcome::Applied
            }
            Err(e) => {
                error!(error = %e, %plan_id, "failed to delete travel plan");
                s.banner = Some(DELETE_FAILED.to_owned());
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_confirmations() {
        let yes = |_: &str| true;
        let no = |_: &str| false;
        assert!(yes.confirm(DELETE_PROMPT));
        assert!(!no.confirm(DELETE_PROMPT));
        assert!(AssumeYes.confirm("anything"));
    }

    #[test]
    fn phase_follows_state() {
        let mut s = DashboardState {
            plans: Vec::new(),
            banner: None,
            create_form_open: false,
            loaded_once: false,
            creates_in_flight: 0,
            stale: true,
            generation: 0,
            applied: 0,
        };
        assert_eq!(s.phase(), Phase::Loading);

        s.loaded_once = true;
        assert_eq!(s.phase(), Phase::Ready);

        s.creates_in_flight = 2;
        assert_eq!(s.phase(), Phase::Submitting);
    }

    #[test]
    fn bump_is_monotonic() {
        let mut s = DashboardState {
            plans: Vec::new(),
            banner: None,
            create_form_open: false,
            loaded_once: false,
            creates_in_flight: 0,
            stale: true,
            generation: 5,
            applied: 0,
        };
        assert_eq!(s.bump(), 6);
        assert_eq!(s.bump(), 7);
    }

    #[test]
    fn in_flight_slot_is_released_on_drop() {
        let state = Mutex::new(DashboardState {
            plans: Vec::new(),
            banner: None,
            create_form_open: false,
            loaded_once: true,
            creates_in_flight: 0,
            stale: false,
            generation: 0,
            applied: 0,
        });
        let first = CreateInFlight::enter(&state);
        let second = CreateInFlight::enter(&state);
        assert_eq!(lock(&state).phase(), Phase::Submitting);

        drop(first);
        assert_eq!(lock(&state).creates_in_flight, 1);
        drop(second);
        assert_eq!(lock(&state).phase(), Phase::Ready);
    }
}
