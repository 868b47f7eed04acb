use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File names under the config directory. Fixed so a restart of the
/// console recovers prior session/scope/endpoint configuration.
const SESSION_FILE: &str = "session.json";
const WORKGROUP_FILE: &str = "workgroup";
const API_FILE: &str = "api";

pub const DEFAULT_BASE_URL: &str = "https://api.wotlwedu.com:9876";

/// Authenticated session as returned by the login endpoints and persisted
/// between console runs. Wire payloads use camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub auth_token: String,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub alias: Option<String>,
    #[serde(default)]
    pub system_admin: bool,
    #[serde(default)]
    pub organization_admin: bool,
    #[serde(default)]
    pub workgroup_admin: bool,
    pub organization_id: Option<String>,
    pub admin_workgroup_id: Option<String>,
}

impl Session {
    /// Build a session from a login (or 2FA verification) response body.
    /// Returns `None` when the payload carries no auth token. Flag fields
    /// count only when the backend sent a literal `true`; id fields count
    /// only when non-empty.
    pub fn from_login_payload(payload: &Value) -> Option<Self> {
        let auth_token = non_empty(payload, "authToken")?;
        Some(Self {
            auth_token,
            refresh_token: non_empty(payload, "refreshToken"),
            user_id: non_empty(payload, "userId"),
            email: non_empty(payload, "email"),
            alias: non_empty(payload, "alias"),
            system_admin: payload["systemAdmin"].as_bool().unwrap_or(false),
            organization_admin: payload["organizationAdmin"].as_bool().unwrap_or(false),
            workgroup_admin: payload["workgroupAdmin"].as_bool().unwrap_or(false),
            organization_id: non_empty(payload, "organizationId"),
            admin_workgroup_id: non_empty(payload, "adminWorkgroupId"),
        })
    }
}

fn non_empty(payload: &Value, key: &str) -> Option<String> {
    payload[key].as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Resolve the console's config directory, creating it if needed.
/// `WOTLWEDU_CONSOLE_CONFIG_DIR` overrides the default of
/// `$HOME/.config/wotlwedu/console`.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let dir = if let Ok(custom) = std::env::var("WOTLWEDU_CONSOLE_CONFIG_DIR") {
        PathBuf::from(custom)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("wotlwedu").join("console")
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

/// Persists exactly one session record (or none) as JSON on disk.
/// No network access; a malformed payload reads as absent, never errors.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn get(&self) -> Option<Session> {
        let raw = fs::read_to_string(self.file()).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("discarding malformed session record: {}", e);
                None
            }
        }
    }

    pub fn set(&self, session: &Session) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.file(), content)
    }

    pub fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(self.file()) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.get().map(|s| s.auth_token)
    }
}

/// Persists the single active-workgroup id, independent of the session.
/// Absence is the only empty state; setting `None` or an empty id removes
/// the persisted value.
#[derive(Debug, Clone)]
pub struct ScopeStore {
    dir: PathBuf,
}

impl ScopeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(WORKGROUP_FILE)
    }

    pub fn get(&self) -> Option<String> {
        let raw = fs::read_to_string(self.file()).ok()?;
        let id = raw.trim();
        if id.is_empty() { None } else { Some(id.to_string()) }
    }

    pub fn set(&self, id: Option<&str>) -> std::io::Result<()> {
        match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => fs::write(self.file(), id),
            None => match fs::remove_file(self.file()) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        }
    }
}

/// User-chosen API base URL override, a plain string file.
pub fn load_base_url(dir: &Path) -> String {
    match fs::read_to_string(dir.join(API_FILE)) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

pub fn save_base_url(dir: &Path, base_url: &str) -> std::io::Result<()> {
    fs::write(dir.join(API_FILE), base_url.trim())
}
