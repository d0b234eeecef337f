//! `wayfarer activity add`.

use anyhow::{Context, Result};

use wayfarer_api::ApiClient;
use wayfarer_api::models::NewActivity;

use crate::ActivityCommands;
use crate::resolve::resolve_plan_id_remote;

pub async fn run_activity_command(command: ActivityCommands, client: &ApiClient) -> Result<()> {
    match command {
        ActivityCommands::Add {
            plan,
            name,
            description,
            cost,
            duration,
            category,
            day,
            time_slot,
        } => {
            let plan_id = resolve_plan_id_remote(client, &plan).await?;
            let activity = client
                .add_activity(&NewActivity {
                    plan_id,
                    name,
                    description,
                    location: None,
                    cost,
                    duration,
                    category,
                    day,
                    time_slot,
                })
                .await
                .context("failed to add activity")?;

            println!("Activity added.");
            println!("  ID:       {}", activity.id);
            println!("  Name:     {}", activity.name);
            println!("  Day:      {} at {}", activity.day, activity.time_slot);
            println!("  Category: {}", activity.category);
            println!("  Cost:     {:.2}", activity.cost);
            Ok(())
        }
    }
}
