//! Create-plan form parsing.
//!
//! [`PlanForm`] holds the raw text a user typed. [`PlanForm::parse`]
//! validates it into a [`NewTravelPlan`]:
//! - destination, budget, duration, dates and interests are all required;
//! - budget is a non-negative number and duration a positive integer;
//! - dates are `YYYY-MM-DD` and the end date is not before the start date;
//! - interests are comma-separated, trimmed, and empty entries are dropped.

use chrono::NaiveDate;
use thiserror::Error;

use wayfarer_api::models::NewTravelPlan;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while validating a [`PlanForm`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanFormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid budget {0:?} (expected a non-negative number)")]
    InvalidBudget(String),

    #[error("invalid duration {0:?} (expected a positive number of days)")]
    InvalidDuration(String),

    #[error("invalid {field} {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Raw create-plan input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanForm {
    pub destination: String,
    pub budget: String,
    pub duration: String,
    pub interests: String,
    pub start_date: String,
    pub end_date: String,
}

impl PlanForm {
    pub fn parse(&self) -> Result<NewTravelPlan, PlanFormError> {
        let destination = required("destination", &self.destination)?;

        let budget_raw = required("budget", &self.budget)?;
        let budget = budget_raw
            .parse::<f64>()
            .ok()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .ok_or_else(|| PlanFormError::InvalidBudget(budget_raw.to_owned()))?;

        let duration_raw = required("duration", &self.duration)?;
        let duration = duration_raw
            .parse::<i32>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| PlanFormError::InvalidDuration(duration_raw.to_owned()))?;

        let start_date = date("start date", &self.start_date)?;
        let end_date = date("end date", &self.end_date)?;
        if end_date < start_date {
            return Err(PlanFormError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        let interests = split_interests(&self.interests);
        if interests.is_empty() {
            return Err(PlanFormError::MissingField("interests"));
        }

        Ok(NewTravelPlan {
            destination: destination.to_owned(),
            budget,
            duration,
            interests,
            start_date,
            end_date,
        })
    }
}

/// Split a comma-separated tag list, trimming and dropping blanks.
pub fn split_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, PlanFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PlanFormError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn date(field: &'static str, value: &str) -> Result<NaiveDate, PlanFormError> {
    let raw = required(field, value)?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| PlanFormError::InvalidDate {
        field,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> PlanForm {
        PlanForm {
            destination: "Paris".into(),
            budget: "2000".into(),
            duration: "7".into(),
            interests: "culture, food".into(),
            start_date: "2025-06-01".into(),
            end_date: "2025-06-08".into(),
        }
    }

    #[test]
    fn parse_valid_form() {
        let plan = paris().parse().unwrap();
        assert_eq!(plan.destination, "Paris");
        assert_eq!(plan.budget, 2000.0);
        assert_eq!(plan.duration, 7);
        assert_eq!(plan.interests, vec!["culture", "food"]);
        assert_eq!(plan.start_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
    }

    #[test]
    fn interests_drop_blanks() {
        assert_eq!(
            split_interests(" art ,, hiking ,  "),
            vec!["art".to_string(), "hiking".to_string()]
        );
        assert!(split_interests(" , ").is_empty());
    }

    #[test]
    fn missing_fields_are_named() {
        let form = PlanForm {
            destination: "   ".into(),
            ..paris()
        };
        assert_eq!(
            form.parse().unwrap_err(),
            PlanFormError::MissingField("destination")
        );

        let form = PlanForm {
            interests: ", ,".into(),
            ..paris()
        };
        assert_eq!(
            form.parse().unwrap_err(),
            PlanFormError::MissingField("interests")
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        let form = PlanForm {
            budget: "-5".into(),
            ..paris()
        };
        assert!(matches!(form.parse(), Err(PlanFormError::InvalidBudget(_))));

        let form = PlanForm {
            budget: "lots".into(),
            ..paris()
        };
        assert!(matches!(form.parse(), Err(PlanFormError::InvalidBudget(_))));

        let form = PlanForm {
            duration: "0".into(),
            ..paris()
        };
        assert!(matches!(form.parse(), Err(PlanFormError::InvalidDuration(_))));

        let form = PlanForm {
            duration: "2.5".into(),
            ..paris()
        };
        assert!(matches!(form.parse(), Err(PlanFormError::InvalidDuration(_))));
    }

    #[test]
    fn rejects_bad_dates() {
        let form = PlanForm {
            start_date: "06/01/2025".into(),
            ..paris()
        };
        assert_eq!(
            form.parse().unwrap_err(),
            PlanFormError::InvalidDate {
                field: "start date",
                value: "06/01/2025".into()
            }
        );

        let form = PlanForm {
            end_date: "2025-05-30".into(),
            ..paris()
        };
        assert!(matches!(
            form.parse(),
            Err(PlanFormError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn same_day_trip_is_allowed() {
        let form = PlanForm {
            duration: "1".into(),
            end_date: "2025-06-01".into(),
            ..paris()
        };
        assert!(form.parse().is_ok());
    }
}
