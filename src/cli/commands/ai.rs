use clap::Subcommand;

use crate::cli::utils::{output_error, output_value, warn_if_expired};
use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::workbench;

#[derive(Subcommand)]
pub enum AiCommands {
    #[command(about = "Free-form assistant query")]
    Query {
        #[arg(help = "Query text")]
        query: String,
    },

    #[command(about = "Suggest list items from a prompt")]
    SuggestItems {
        #[arg(help = "Prompt text")]
        prompt: String,
    },

    #[command(about = "Categorize a piece of text")]
    Categorize {
        #[arg(help = "Text to categorize")]
        text: String,
    },

    #[command(about = "Moderate a piece of text")]
    Moderate {
        #[arg(help = "Text to moderate")]
        text: String,
    },

    #[command(about = "Summarize an election")]
    ElectionSummary {
        #[arg(help = "Election id")]
        id: String,
    },

    #[command(about = "Recommendations for an election")]
    ElectionRecommendations {
        #[arg(help = "Election id")]
        id: String,
    },

    #[command(about = "Suggest participants for an election")]
    ElectionParticipants {
        #[arg(help = "Election id")]
        id: String,
    },

    #[command(about = "Describe an image")]
    DescribeImage {
        #[arg(help = "Image id")]
        id: String,
    },

    #[command(about = "Generate a notification digest")]
    NotificationDigest,
}

pub async fn handle(cmd: AiCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;
    let client = ctx.client();

    let result = match cmd {
        AiCommands::Query { query } => workbench::assistant_query(client, &query).await,
        AiCommands::SuggestItems { prompt } => workbench::suggest_list_items(client, &prompt).await,
        AiCommands::Categorize { text } => workbench::categorize_text(client, &text).await,
        AiCommands::Moderate { text } => workbench::moderate_text(client, &text).await,
        AiCommands::ElectionSummary { id } => workbench::election_summary(client, &id).await,
        AiCommands::ElectionRecommendations { id } => {
            workbench::election_recommendations(client, &id).await
        }
        AiCommands::ElectionParticipants { id } => {
            workbench::election_participants(client, &id).await
        }
        AiCommands::DescribeImage { id } => workbench::describe_image(client, &id).await,
        AiCommands::NotificationDigest => workbench::notification_digest(client).await,
    };

    match result {
        Ok(value) => output_value(&output_format, &value)?,
        Err(e) => output_error(&output_format, &e.to_string())?,
    }

    warn_if_expired(&ctx, &output_format)
}
