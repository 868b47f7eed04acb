use serde_json::json;

use crate::cli::utils::{output_error, output_success, prompt};
use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::login::{LoginFlow, LoginState};
use crate::shell::{display_name, role_label};
use crate::storage::Session;

pub async fn login(
    email: String,
    password: Option<String>,
    code: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };

    let mut flow = LoginFlow::new();
    let state = match flow.submit_credentials(ctx.client(), &email, &password).await {
        Ok(state) => state.clone(),
        Err(e) => return output_error(&output_format, &e.to_string()),
    };

    match state {
        LoginState::Authenticated(session) => finish(&ctx, &session, &output_format),
        LoginState::AwaitingTwoFactor(_) => {
            let code = match code {
                Some(c) => c,
                None => prompt("Two-factor code")?,
            };
            let state = match flow.submit_code(ctx.client(), &code).await {
                Ok(state) => state.clone(),
                Err(e) => return output_error(&output_format, &e.to_string()),
            };
            match state {
                LoginState::Authenticated(session) => finish(&ctx, &session, &output_format),
                _ => output_error(&output_format, "Verification did not complete"),
            }
        }
        LoginState::EnteringCredentials => output_error(&output_format, "Login did not complete"),
    }
}

fn finish(
    ctx: &AppContext,
    session: &Session,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.establish_session(session)?;
    output_success(
        output_format,
        &format!("Logged in as {} ({})", display_name(session), role_label(session)),
        Some(json!({ "userId": session.user_id, "email": session.email })),
    )
}

pub async fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;
    ctx.logout()?;
    output_success(&output_format, "Logged out", None)
}

pub async fn status(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;
    match ctx.session() {
        Some(session) => output_success(
            &output_format,
            &format!("Signed in as {} ({})", display_name(&session), role_label(&session)),
            Some(json!({
                "userId": session.user_id,
                "email": session.email,
                "activeWorkgroup": ctx.active_workgroup(),
                "baseUrl": ctx.base_url(),
            })),
        ),
        None => output_error(&output_format, "Not logged in"),
    }
}
