mod activity_cmd;
mod auth_cmds;
mod config;
mod expense_cmds;
mod places_cmds;
mod plan_cmds;
mod prompt;
mod resolve;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wayfarer_api::models::TravelProfile;
use wayfarer_api::{ApiClient, ApiConfig, Session};

use config::WayfarerConfig;

#[derive(Parser)]
#[command(name = "wayfarer", about = "Plan trips against the travel-plans API")]
struct Cli {
    /// API base URL (overrides WAYFARER_API_URL env var)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a wayfarer config file
    Init {
        /// API base URL, including the /api prefix
        #[arg(long, default_value = ApiConfig::DEFAULT_URL)]
        url: String,
        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create an account (does not sign in)
    Register {
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and remember the session
    Login {
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Ask the server instead of reading the stored profile
        #[arg(long)]
        remote: bool,
    },
    /// Travel plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Search for places
    Places {
        /// Free-text search
        query: String,
        /// Narrow the search to an area (e.g. a city)
        #[arg(long)]
        location: Option<String>,
    },
    /// Route between two points
    Directions {
        /// Start point as "lng,lat"
        #[arg(long, value_parser = places_cmds::parse_point)]
        from: [f64; 2],
        /// End point as "lng,lat"
        #[arg(long, value_parser = places_cmds::parse_point)]
        to: [f64; 2],
        /// driving-car, cycling-regular or foot-walking
        #[arg(long, default_value = "driving-car")]
        profile: TravelProfile,
    },
    /// Activity management
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Expense tracking
    Expense {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List your travel plans, newest first
    List,
    /// Show one plan and its itinerary summary
    Show {
        /// Plan ID or unique ID prefix
        plan: String,
    },
    /// Create a travel plan
    Create {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        budget: String,
        /// Length of the trip in days
        #[arg(long)]
        duration: String,
        /// Comma-separated interests (e.g. "food, museums")
        #[arg(long)]
        interests: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
    /// Delete a travel plan
    Delete {
        /// Plan ID or unique ID prefix
        plan: String,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Generate and save an itinerary for a plan
    Generate {
        /// Plan ID or unique ID prefix
        plan: String,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// Add an activity to a plan
    Add {
        /// Plan ID or unique ID prefix
        plan: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
        /// Duration in hours
        #[arg(long)]
        duration: Option<i32>,
        /// sightseeing, dining, entertainment, shopping, culture or other
        #[arg(long)]
        category: Option<wayfarer_api::models::ActivityCategory>,
        /// Day of the trip (1-based)
        #[arg(long)]
        day: Option<i32>,
        /// Start time, HH:MM
        #[arg(long)]
        time_slot: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List expenses for a plan, most recent first
    List {
        /// Plan ID or unique ID prefix
        plan: String,
    },
    /// Record an expense
    Add {
        /// Plan ID or unique ID prefix
        plan: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
}

/// Execute the `wayfarer init` command: write config file.
fn cmd_init(url: &str, timeout_secs: Option<u64>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let base_url = ApiConfig::new(url).base_url;
    let cfg = config::ConfigFile {
        api: config::ApiSection {
            url: base_url.clone(),
            timeout_secs,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  api.url = {base_url}");
    if let Some(secs) = timeout_secs {
        println!("  api.timeout_secs = {secs}");
    }
    println!();
    println!("Next: run `wayfarer login <email>` to sign in.");

    Ok(())
}

/// Build a client from resolved config and the persisted session.
fn connect(cli_api_url: Option<&str>) -> anyhow::Result<ApiClient> {
    let resolved = WayfarerConfig::resolve(cli_api_url)?;
    let session = Session::restore(resolved.session_storage()).with_context(|| {
        format!(
            "failed to read session from {}",
            resolved.session_dir.display()
        )
    })?;
    Ok(ApiClient::new(resolved.api_config, session))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Init {
            url,
            timeout_secs,
            force,
        } => {
            cmd_init(&url, timeout_secs, force)?;
        }
        Commands::Register {
            email,
            name,
            password,
        } => {
            let client = connect(api_url)?;
            auth_cmds::run_register(&client, &email, &name, password).await?;
        }
        Commands::Login { email, password } => {
            let mut client = connect(api_url)?;
            auth_cmds::run_login(&mut client, &email, password).await?;
        }
        Commands::Logout => {
            let mut client = connect(api_url)?;
            auth_cmds::run_logout(&mut client)?;
        }
        Commands::Whoami { remote } => {
            let client = connect(api_url)?;
            auth_cmds::run_whoami(&client, remote).await?;
        }
        Commands::Plan { command } => {
            let client = connect(api_url)?;
            plan_cmds::run_plan_command(command, client).await?;
        }
        Commands::Places { query, location } => {
            let client = connect(api_url)?;
            places_cmds::run_places(&client, &query, location.as_deref()).await?;
        }
        Commands::Directions { from, to, profile } => {
            let client = connect(api_url)?;
            places_cmds::run_directions(&client, from, to, profile).await?;
        }
        Commands::Activity { command } => {
            let client = connect(api_url)?;
            activity_cmd::run_activity_command(command, &client).await?;
        }
        Commands::Expense { command } => {
            let client = connect(api_url)?;
            expense_cmds::run_expense_command(command, &client).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "wayfarer",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_plan_delete_with_yes() {
        let cli = Cli::try_parse_from(["wayfarer", "plan", "delete", "abc123", "--yes"]).unwrap();
        match cli.command {
            Commands::Plan {
                command: PlanCommands::Delete { plan, yes },
            } => {
                assert_eq!(plan, "abc123");
                assert!(yes);
            }
            _ => panic!("expected plan delete"),
        }
    }

    #[test]
    fn api_url_flag_is_global() {
        let cli =
            Cli::try_parse_from(["wayfarer", "plan", "list", "--api-url", "http://x/api"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x/api"));
    }

    #[test]
    fn directions_points_parse() {
        let cli = Cli::try_parse_from([
            "wayfarer",
            "directions",
            "--from",
            "2.29,48.85",
            "--to",
            "2.33,48.86",
            "--profile",
            "foot-walking",
        ])
        .unwrap();
        match cli.command {
            Commands::Directions { from, to, profile } => {
                assert_eq!(from, [2.29, 48.85]);
                assert_eq!(to, [2.33, 48.86]);
                assert_eq!(profile, TravelProfile::FootWalking);
            }
            _ => panic!("expected directions"),
        }
    }
}
