mod commands;

use clap::{Parser, Subcommand};
use mise::mise_data::Difficulty;
use mise::{init_tracing, AppError, MiseApp, MiseConfig};

#[derive(Parser)]
#[command(name = "recipe-explorer", version, about = "Browse recipes and check permissions")]
struct Cli {
    /// Configuration profile (application-{profile}.yaml, .env.{profile})
    #[arg(long, global = true, default_value = "dev")]
    profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published recipes, newest first
    List {
        /// One-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show the featured recipes
    Featured,
    /// Search by title, description or tag
    Search {
        query: String,
        /// Cuisine tag (repeatable)
        #[arg(long)]
        cuisine: Vec<String>,
        /// Easy, Medium or Hard (repeatable)
        #[arg(long)]
        difficulty: Vec<Difficulty>,
        /// Maximum cook time in minutes
        #[arg(long)]
        max_cook_time: Option<u32>,
        /// Dietary tag (repeatable)
        #[arg(long)]
        dietary: Vec<String>,
    },
    /// Show one recipe
    Show { id: String },
    /// List every setting, its environment variable and whether it is set
    Config,
    /// Check whether a role (plus explicit grants) may do something
    Can {
        /// user, admin, moderator or content_creator
        #[arg(long, default_value = "user")]
        role: String,
        /// Explicit grant as resource:action (repeatable)
        #[arg(long = "grant")]
        grants: Vec<String>,
        resource: String,
        action: String,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Can {
            role,
            grants,
            resource,
            action,
        } => commands::access::can(&role, &grants, &resource, &action),
        Commands::Config => MiseConfig::load(&cli.profile)
            .map_err(AppError::from)
            .map(|config| commands::settings::show(&config)),
        command => match build_app(&cli.profile) {
            Ok(app) => run_browse(&app, command).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        let line = format!("Error ({}): {}", e.status_code(), e.message());
        eprintln!("{}", colored::Colorize::red(line.as_str()));
        std::process::exit(1);
    }
}

fn build_app(profile: &str) -> Result<MiseApp, AppError> {
    let config = MiseConfig::load(profile)?;
    Ok(MiseApp::from_config(&config)?)
}

async fn run_browse(app: &MiseApp, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::List { page } => commands::browse::list(app, page).await,
        Commands::Featured => commands::browse::featured(app).await,
        Commands::Search {
            query,
            cuisine,
            difficulty,
            max_cook_time,
            dietary,
        } => {
            let filters = commands::browse::SearchArgs {
                cuisine,
                difficulty,
                max_cook_time,
                dietary,
            };
            commands::browse::search(app, &query, filters).await
        }
        Commands::Show { id } => commands::browse::show(app, &id).await,
        Commands::Can { .. } | Commands::Config => Ok(()),
    }
}
