//! Process configuration loaded via OrthoConfig.
//!
//! Each struct reads its own environment prefix (`EVENTHUB_`,
//! `ENROLLMENT_`, `BOOTSTRAP_`) and exposes accessors that apply defaults.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::{
    AdminSeed, BootstrapPlan, EnrollmentPolicy, EventValidationError, NewEvent,
    UserValidationError, Username,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EVENT_NAMES: [&str; 3] = ["Hackathon 2025", "Workshop 2025", "Seminar 2025"];
const DEFAULT_EVENT_CAPACITY: u32 = 100;
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Errors raised while turning loaded settings into runtime values.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load {section} settings: {message}")]
    Load {
        section: &'static str,
        message: String,
    },
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid bootstrap event '{name}': {source}")]
    Event {
        name: String,
        #[source]
        source: EventValidationError,
    },
    #[error("invalid bootstrap admin username: {0}")]
    AdminUsername(#[from] UserValidationError),
}

/// HTTP listener and database connection settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EVENTHUB")]
pub struct ServerSettings {
    /// PostgreSQL URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Socket address to bind.
    pub bind_addr: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Pool checkout timeout in milliseconds.
    #[ortho_config(default = 5000)]
    pub pool_timeout_ms: u64,
}

impl ServerSettings {
    /// Database URL with blank values treated as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_timeout_ms)
    }
}

/// Retry and time-budget knobs for the enrollment core.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ENROLLMENT")]
pub struct EnrollmentSettings {
    /// Total attempts per call, first try included.
    #[ortho_config(default = 3)]
    pub max_attempts: u32,
    /// Overall budget per call in milliseconds.
    #[ortho_config(default = 5000)]
    pub budget_ms: u64,
    /// Base backoff between attempts in milliseconds.
    #[ortho_config(default = 50)]
    pub backoff_ms: u64,
}

impl EnrollmentSettings {
    pub fn policy(&self) -> EnrollmentPolicy {
        EnrollmentPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_budget(Duration::from_millis(self.budget_ms))
            .with_backoff(Duration::from_millis(self.backoff_ms))
    }
}

/// Start-up seeding of default events and the administrator account.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOTSTRAP")]
pub struct BootstrapSettings {
    /// Run seeding on start-up.
    #[ortho_config(default = true)]
    pub enabled: bool,
    /// Event names, comma-separated in the environment. A single name
    /// needs a trailing comma to be read as a list (`Meetup,`).
    pub event_names: Option<Vec<String>>,
    /// Capacity given to every seeded event.
    pub event_capacity: Option<u32>,
    /// Administrator username.
    pub admin_username: Option<String>,
    /// Administrator password. No administrator is seeded without it.
    pub admin_password: Option<String>,
    /// bcrypt work factor for stored passwords.
    pub bcrypt_cost: Option<u32>,
}

impl std::fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("enabled", &self.enabled)
            .field("event_names", &self.event_names)
            .field("event_capacity", &self.event_capacity)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl BootstrapSettings {
    pub fn event_capacity(&self) -> u32 {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY)
    }

    /// Configured event names, trimmed, with blanks dropped.
    pub fn event_names(&self) -> Vec<&str> {
        match &self.event_names {
            Some(names) => names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .collect(),
            None => DEFAULT_EVENT_NAMES.to_vec(),
        }
    }

    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    pub fn bcrypt_cost(&self) -> Option<u32> {
        self.bcrypt_cost
    }

    /// Validate the settings into a seeding plan.
    ///
    /// A disabled bootstrap yields an empty plan.
    pub fn plan(&self) -> Result<BootstrapPlan, SettingsError> {
        if !self.enabled {
            return Ok(BootstrapPlan::default());
        }
        let capacity = self.event_capacity();
        let events = self
            .event_names()
            .into_iter()
            .map(|name| {
                NewEvent::try_from_parts(name, capacity).map_err(|source| SettingsError::Event {
                    name: name.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let admin = match self.admin_password.as_deref() {
            Some(password) if !password.is_empty() => Some(AdminSeed {
                username: Username::new(self.admin_username())?,
                password: Zeroizing::new(password.to_owned()),
            }),
            _ => None,
        };
        Ok(BootstrapPlan { events, admin })
    }
}

/// All settings needed to start the server.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub enrollment: EnrollmentSettings,
    pub bootstrap: BootstrapSettings,
}

impl Settings {
    /// Load every section from the environment and configuration files.
    ///
    /// Command-line arguments are not consulted.
    pub fn load() -> Result<Self, SettingsError> {
        let args = || [OsString::from(env!("CARGO_PKG_NAME"))];
        Ok(Self {
            server: ServerSettings::load_from_iter(args()).map_err(|err| SettingsError::Load {
                section: "server",
                message: err.to_string(),
            })?,
            enrollment: EnrollmentSettings::load_from_iter(args()).map_err(|err| {
                SettingsError::Load {
                    section: "enrollment",
                    message: err.to_string(),
                }
            })?,
            bootstrap: BootstrapSettings::load_from_iter(args()).map_err(|err| {
                SettingsError::Load {
                    section: "bootstrap",
                    message: err.to_string(),
                }
            })?,
        })
    }
}
