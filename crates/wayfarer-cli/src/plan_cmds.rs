//! CLI handlers for `wayfarer plan` subcommands.
//!
//! Implements:
//! - `wayfarer plan list`               -- list plans, newest first
//! - `wayfarer plan show <plan>`        -- show one plan
//! - `wayfarer plan create ...`         -- create a plan from flags
//! - `wayfarer plan delete <plan>`      -- delete after confirmation
//! - `wayfarer plan generate <plan>`    -- generate and save an itinerary
//!
//! All of them drive a [`PlanDashboard`]; a failed operation surfaces the
//! dashboard's banner as the command error.

use anyhow::{Context, Result, bail};

use wayfarer_api::ApiClient;
use wayfarer_api::models::TravelPlan;
use wayfarer_core::{AssumeYes, Confirm, ItinerarySummary, Outcome, PlanDashboard, PlanForm};

use crate::PlanCommands;
use crate::prompt::StdinConfirm;
use crate::resolve::resolve_plan_id;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, client: ApiClient) -> Result<()> {
    let dash = PlanDashboard::new(client);
    match command {
        PlanCommands::List => cmd_list(&dash).await,
        PlanCommands::Show { plan } => cmd_show(&dash, &plan).await,
        PlanCommands::Create {
            destination,
            budget,
            duration,
            interests,
            start,
            end,
        } => {
            let form = PlanForm {
                destination,
                budget,
                duration,
                interests,
                start_date: start,
                end_date: end,
            };
            cmd_create(&dash, &form).await
        }
        PlanCommands::Delete { plan, yes } => {
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };
            cmd_delete(&dash, &plan, confirm).await
        }
        PlanCommands::Generate { plan } => cmd_generate(&dash, &plan).await,
    }
}

/// Turn a failed outcome into an error carrying the dashboard banner.
fn ensure_ok(dash: &PlanDashboard<ApiClient>, outcome: Outcome) -> Result<Outcome> {
    if outcome == Outcome::Failed {
        let banner = dash.banner().unwrap_or_else(|| "Request failed".to_string());
        bail!(banner);
    }
    Ok(outcome)
}

async fn load(dash: &PlanDashboard<ApiClient>) -> Result<Vec<TravelPlan>> {
    let outcome = dash.refresh_if_stale().await;
    ensure_ok(dash, outcome)?;
    Ok(dash.plans())
}

// -----------------------------------------------------------------------
// wayfarer plan list
// -----------------------------------------------------------------------

async fn cmd_list(dash: &PlanDashboard<ApiClient>) -> Result<()> {
    let plans = load(dash).await?;

    if plans.is_empty() {
        println!("No travel plans yet. Use `wayfarer plan create` to add one.");
        return Ok(());
    }

    let id_w = 36;
    let dest_w = plans
        .iter()
        .map(|p| p.destination.chars().count())
        .max()
        .unwrap_or(11)
        .max(11);
    let dates_w = 23;
    let budget_w = 10;

    println!(
        "{:<id_w$}  {:<dest_w$}  {:<dates_w$}  {:>budget_w$}  ITINERARY",
        "ID", "DESTINATION", "DATES", "BUDGET",
    );

    for plan in &plans {
        let dates = format!("{} - {}", plan.start_date, plan.end_date);
        let itinerary = match ItinerarySummary::for_plan(plan) {
            Some(summary) => format_summary(&summary),
            None => "-".to_string(),
        };
        println!(
            "{:<id_w$}  {:<dest_w$}  {:<dates_w$}  {:>budget_w$.2}  {}",
            plan.id, plan.destination, dates, plan.budget, itinerary,
        );
    }

    Ok(())
}

fn format_summary(summary: &ItinerarySummary) -> String {
    match summary.total_cost {
        Some(cost) => format!("{} days, est. {cost:.2}", summary.days_planned),
        None => format!("{} days", summary.days_planned),
    }
}

// -----------------------------------------------------------------------
// wayfarer plan show <plan>
// -----------------------------------------------------------------------

async fn cmd_show(dash: &PlanDashboard<ApiClient>, input: &str) -> Result<()> {
    let plans = load(dash).await?;
    let plan_id = resolve_plan_id(input, &plans)?;
    let plan = dash
        .plan(plan_id)
        .with_context(|| format!("travel plan {plan_id} not found"))?;
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &TravelPlan) {
    println!("Travel plan: {}", plan.destination);
    println!("  ID:         {}", plan.id);
    println!("  Dates:      {} to {}", plan.start_date, plan.end_date);
    println!("  Duration:   {} days", plan.duration);
    println!("  Budget:     {:.2}", plan.budget);
    if !plan.interests.is_empty() {
        println!("  Interests:  {}", plan.interests.join(", "));
    }
    println!(
        "  Created:    {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    match ItinerarySummary::for_plan(plan) {
        Some(summary) => {
            println!("  Itinerary:  {}", format_summary(&summary));
        }
        None => {
            println!("  Itinerary:  none (run `wayfarer plan generate {}`)", plan.id);
        }
    }
}

// -----------------------------------------------------------------------
// wayfarer plan create
// -----------------------------------------------------------------------

async fn cmd_create(dash: &PlanDashboard<ApiClient>, form: &PlanForm) -> Result<()> {
    let new_plan = form.parse().context("invalid travel plan")?;

    dash.open_create_form();
    let outcome = dash.create_plan(&new_plan).await;
    ensure_ok(dash, outcome)?;

    let created = dash
        .plans()
        .into_iter()
        .next()
        .context("created plan missing from list")?;

    println!("Travel plan created.");
    println!();
    println!("  ID:          {}", created.id);
    println!("  Destination: {}", created.destination);
    println!("  Dates:       {} to {}", created.start_date, created.end_date);
    println!("  Budget:      {:.2}", created.budget);
    Ok(())
}

// -----------------------------------------------------------------------
// wayfarer plan delete <plan>
// -----------------------------------------------------------------------

async fn cmd_delete(
    dash: &PlanDashboard<ApiClient>,
    input: &str,
    confirm: &dyn Confirm,
) -> Result<()> {
    let plans = load(dash).await?;
    let plan_id = resolve_plan_id(input, &plans)?;

    match ensure_ok(dash, dash.delete_plan(plan_id, confirm).await)? {
        Outcome::Cancelled => println!("Cancelled."),
        _ => println!("Travel plan {plan_id} deleted."),
    }
    Ok(())
}

// -----------------------------------------------------------------------
// wayfarer plan generate <plan>
// -----------------------------------------------------------------------

async fn cmd_generate(dash: &PlanDashboard<ApiClient>, input: &str) -> Result<()> {
    let plans = load(dash).await?;
    let plan_id = resolve_plan_id(input, &plans)?;

    println!("Generating itinerary...");
    let outcome = dash.generate_itinerary(plan_id).await;
    ensure_ok(dash, outcome)?;

    // The plan is saved even if the follow-up reload failed.
    if let Some(banner) = dash.banner() {
        tracing::warn!(%banner, "plan list could not be refreshed");
    }

    let plan = dash
        .plan(plan_id)
        .with_context(|| format!("travel plan {plan_id} not found after update"))?;
    println!("Itinerary saved.");
    println!();
    print_plan(&plan);
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
