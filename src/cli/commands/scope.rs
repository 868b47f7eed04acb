use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success, warn_if_expired};
use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum ScopeCommands {
    #[command(about = "Show the active workgroup scope")]
    Show,

    #[command(about = "Select a workgroup as the active scope")]
    Set {
        #[arg(help = "Workgroup id")]
        id: String,
    },

    #[command(about = "Clear the active scope")]
    Clear,

    #[command(about = "List workgroups available for scoping")]
    List,
}

pub async fn handle(cmd: ScopeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;

    match cmd {
        ScopeCommands::Show => match ctx.active_workgroup() {
            Some(id) => output_success(
                &output_format,
                &format!("Active workgroup: {}", id),
                Some(json!({ "activeWorkgroup": id })),
            ),
            None => output_error(&output_format, "No active workgroup scope"),
        },
        ScopeCommands::Set { id } => {
            ctx.set_active_workgroup(Some(&id))?;
            output_success(
                &output_format,
                &format!("Active workgroup set to {}", id),
                Some(json!({ "activeWorkgroup": id })),
            )
        }
        ScopeCommands::Clear => {
            ctx.set_active_workgroup(None)?;
            output_success(&output_format, "Active workgroup cleared", None)
        }
        ScopeCommands::List => {
            let mut shell = Shell::new(ctx.clone());
            match shell.refresh_workgroups().await {
                Ok(()) => {
                    let options: Vec<_> = shell
                        .workgroup_options()
                        .iter()
                        .map(|o| json!({ "id": o.id, "name": o.name }))
                        .collect();
                    match output_format {
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({ "workgroups": options }))?
                        ),
                        OutputFormat::Text => {
                            if options.is_empty() {
                                println!("No workgroups available");
                            }
                            for option in shell.workgroup_options() {
                                println!("{}  {}", option.id, option.name);
                            }
                        }
                    }
                }
                Err(e) => output_error(&output_format, &e.to_string())?,
            }
            warn_if_expired(&ctx, &output_format)
        }
    }
}
