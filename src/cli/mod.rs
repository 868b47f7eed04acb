pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wotlwedu")]
#[command(about = "wotlwedu Console - administrative client for the wotlwedu backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in (completes two-factor verification when required)")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "One-time code for two-factor verification")]
        code: Option<String>,
    },

    #[command(about = "Sign out and clear session and scope state")]
    Logout,

    #[command(about = "Show current session, role, and scope")]
    Status,

    #[command(about = "Console configuration (API base URL)")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },

    #[command(about = "Active workgroup scope selection")]
    Scope {
        #[command(subcommand)]
        cmd: commands::scope::ScopeCommands,
    },

    #[command(about = "CRUD operations on a managed resource")]
    Resource {
        #[arg(help = "Resource route key (organizations, users, items, ...)")]
        name: String,
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Backend health, ping, and unread notifications")]
    Dashboard,

    #[command(about = "AI workbench endpoints")]
    Ai {
        #[command(subcommand)]
        cmd: commands::ai::AiCommands,
    },
}

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Login { email, password, code } => {
            commands::auth::login(email, password, code, output_format).await
        }
        Commands::Logout => commands::auth::logout(output_format).await,
        Commands::Status => commands::auth::status(output_format).await,
        Commands::Config { cmd } => commands::config::handle(cmd, output_format).await,
        Commands::Scope { cmd } => commands::scope::handle(cmd, output_format).await,
        Commands::Resource { name, cmd } => {
            commands::resource::handle(&name, cmd, output_format).await
        }
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Ai { cmd } => commands::ai::handle(cmd, output_format).await,
    }
}
