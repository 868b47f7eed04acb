//! Shell model: the fixed navigation sections, the session summary line,
//! and the workgroup-scope selector. Rendering lives in the driver; this
//! module owns the state and the list call behind the selector.

use std::sync::Arc;

use serde_json::Value;

use crate::client::api_error;
use crate::context::AppContext;
use crate::error::ConsoleError;
use crate::storage::Session;

/// Selector page size; large enough to show every workgroup unfiltered.
const SELECTOR_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct NavItem {
    pub label: &'static str,
    pub route: &'static str,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem { label: "Dashboard", route: "/dashboard" },
    NavItem { label: "Organizations", route: "/organizations" },
    NavItem { label: "Workgroups", route: "/workgroups" },
    NavItem { label: "Users", route: "/users" },
    NavItem { label: "Roles", route: "/roles" },
    NavItem { label: "Capabilities", route: "/capabilities" },
    NavItem { label: "Categories", route: "/categories" },
    NavItem { label: "Items", route: "/items" },
    NavItem { label: "Images", route: "/images" },
    NavItem { label: "Lists", route: "/lists" },
    NavItem { label: "Elections", route: "/elections" },
    NavItem { label: "Votes", route: "/votes" },
    NavItem { label: "Notifications", route: "/notifications" },
    NavItem { label: "Preferences", route: "/preferences" },
    NavItem { label: "AI Workbench", route: "/ai" },
];

/// Display name for the topbar: short alias over email over a fallback.
pub fn display_name(session: &Session) -> &str {
    session
        .alias
        .as_deref()
        .or(session.email.as_deref())
        .unwrap_or("User")
}

/// Role label by priority: system beats organization beats workgroup
/// beats the generic fallback.
pub fn role_label(session: &Session) -> &'static str {
    if session.system_admin {
        "System Admin"
    } else if session.organization_admin {
        "Organization Admin"
    } else if session.workgroup_admin {
        "Workgroup Admin"
    } else {
        "User"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkgroupOption {
    pub id: String,
    pub name: String,
}

/// Persistent navigation plus the workgroup-scope selector. The selector
/// options are fetched once per session-token change.
pub struct Shell {
    ctx: Arc<AppContext>,
    active_route: &'static str,
    options: Vec<WorkgroupOption>,
    loaded_for_token: Option<String>,
}

impl Shell {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            active_route: "/dashboard",
            options: Vec::new(),
            loaded_for_token: None,
        }
    }

    pub fn active_route(&self) -> &'static str {
        self.active_route
    }

    /// Select a navigation route; unknown routes fall back to the
    /// dashboard.
    pub fn navigate(&mut self, route: &str) {
        self.active_route = NAV_ITEMS
            .iter()
            .find(|item| item.route == route)
            .map(|item| item.route)
            .unwrap_or("/dashboard");
    }

    pub fn workgroup_options(&self) -> &[WorkgroupOption] {
        &self.options
    }

    /// Refresh the selector options if the session token changed since
    /// the last load. A large page, no filter.
    pub async fn refresh_workgroups(&mut self) -> Result<(), ConsoleError> {
        let token = self.ctx.session().map(|s| s.auth_token);
        if token == self.loaded_for_token {
            return Ok(());
        }
        if token.is_none() {
            self.options.clear();
            self.loaded_for_token = None;
            return Ok(());
        }

        let query = [
            ("page", "1".to_string()),
            ("items", SELECTOR_PAGE_SIZE.to_string()),
        ];
        let response = self.ctx.client().get_query("/workgroup", &query).await?;
        if response.is_error() {
            return Err(api_error(&response, "Failed to load workgroups"));
        }

        self.options = response.body["data"]["workgroups"]
            .as_array()
            .map(|rows| rows.iter().filter_map(option_from_row).collect())
            .unwrap_or_default();
        self.loaded_for_token = token;
        Ok(())
    }

    /// Update the persisted scope. The caller is responsible for
    /// notifying mounted editors via `scope_changed`.
    pub fn select_workgroup(&self, id: Option<&str>) -> Result<(), ConsoleError> {
        self.ctx.set_active_workgroup(id)
    }

    pub fn active_workgroup(&self) -> Option<String> {
        self.ctx.active_workgroup()
    }

    /// Clears session and scope and returns to the login screen.
    pub fn logout(&mut self) -> Result<(), ConsoleError> {
        self.ctx.logout()?;
        self.options.clear();
        self.loaded_for_token = None;
        self.active_route = "/dashboard";
        Ok(())
    }
}

fn option_from_row(row: &Value) -> Option<WorkgroupOption> {
    let id = row["id"].as_str().filter(|s| !s.is_empty())?;
    let name = row["name"].as_str().unwrap_or(id);
    Some(WorkgroupOption { id: id.to_string(), name: name.to_string() })
}
