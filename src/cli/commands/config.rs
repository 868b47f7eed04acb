use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the API base URL in effect")]
    Show,

    #[command(about = "Persist a new API base URL (takes effect on next run)")]
    SetUrl {
        #[arg(help = "Base URL, e.g. https://api.wotlwedu.com:9876")]
        url: String,
    },
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;

    match cmd {
        ConfigCommands::Show => output_success(
            &output_format,
            &format!("API base URL: {}", ctx.base_url()),
            Some(json!({ "baseUrl": ctx.base_url() })),
        ),
        ConfigCommands::SetUrl { url } => {
            ctx.set_base_url(&url)?;
            output_success(
                &output_format,
                &format!("API base URL set to {}", url.trim()),
                Some(json!({ "baseUrl": url.trim() })),
            )
        }
    }
}
