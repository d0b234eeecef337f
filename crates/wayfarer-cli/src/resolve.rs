//! Plan ID resolution.
//!
//! [`resolve_plan_id`] accepts either a full UUID or a prefix of one. A
//! prefix must match exactly one of the user's plans.

use anyhow::{Context, Result, bail};
use uuid::Uuid;

use wayfarer_api::ApiClient;
use wayfarer_api::models::TravelPlan;

/// Shortest accepted prefix.
const MIN_PREFIX_LEN: usize = 4;

/// Resolve `input` against the loaded `plans`.
///
/// A well-formed UUID is returned as is, even if it is not in `plans`, so
/// the server gets to report "not found".
pub fn resolve_plan_id(input: &str, plans: &[TravelPlan]) -> Result<Uuid> {
    let input = input.trim();
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let prefix = input.to_ascii_lowercase();
    if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("invalid plan ID: {input:?} (expected a UUID or at least {MIN_PREFIX_LEN} hex characters of one)");
    }

    let matches: Vec<&TravelPlan> = plans
        .iter()
        .filter(|p| p.id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => bail!("no travel plan matches ID prefix {input:?}"),
        [plan] => Ok(plan.id),
        many => {
            let names: Vec<String> = many
                .iter()
                .map(|p| format!("{} ({})", p.id, p.destination))
                .collect();
            bail!(
                "ID prefix {input:?} is ambiguous; matches:\n  {}",
                names.join("\n  ")
            )
        }
    }
}

/// Like [`resolve_plan_id`], fetching the plan list only when `input` is
/// not already a full UUID.
pub async fn resolve_plan_id_remote(client: &ApiClient, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input.trim()) {
        return Ok(id);
    }
    let plans = client
        .travel_plans()
        .await
        .context("failed to load travel plans")?;
    resolve_plan_id(input, &plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn plan(id: &str, destination: &str) -> TravelPlan {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TravelPlan {
            id: Uuid::parse_str(id).unwrap(),
            user_id: Uuid::nil(),
            destination: destination.to_string(),
            budget: 100.0,
            duration: 1,
            interests: vec![],
            start_date: ts.date(),
            end_date: ts.date(),
            itinerary: None,
            total_cost: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn plans() -> Vec<TravelPlan> {
        vec![
            plan("550e8400-e29b-41d4-a716-446655440000", "Paris"),
            plan("550e9999-e29b-41d4-a716-446655440000", "Rome"),
            plan("a1b2c3d4-0000-4000-8000-000000000000", "Oslo"),
        ]
    }

    #[test]
    fn full_uuid_passes_through() {
        let id = "00000000-0000-4000-8000-000000000001";
        assert_eq!(resolve_plan_id(id, &plans()).unwrap().to_string(), id);
    }

    #[test]
    fn unique_prefix_resolves() {
        let id = resolve_plan_id("A1B2", &plans()).unwrap();
        assert_eq!(id.to_string(), "a1b2c3d4-0000-4000-8000-000000000000");
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let err = resolve_plan_id("550e", &plans()).unwrap_err().to_string();
        assert!(err.contains("ambiguous"), "unexpected error: {err}");
        assert!(err.contains("Paris") && err.contains("Rome"));
    }

    #[test]
    fn unknown_or_short_prefix_errors() {
        assert!(resolve_plan_id("ffff", &plans()).is_err());
        assert!(resolve_plan_id("a1", &plans()).is_err());
        assert!(resolve_plan_id("not-a-uuid", &plans()).is_err());
    }
}
