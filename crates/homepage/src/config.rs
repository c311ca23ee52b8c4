//! Process configuration.
//!
//! Values come from environment variables, optionally seeded from a `.env` file:
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `HOMEPAGE_ENVIRONMENT`  | `Production`   |
//! | `HOMEPAGE_LISTEN`       | `0.0.0.0:5800` |
//! | `HOMEPAGE_WEB_ROOT`     | `wwwroot`      |
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the hosting environment.
pub const ENVIRONMENT_VAR: &str = "HOMEPAGE_ENVIRONMENT";
/// Environment variable holding the socket address to listen on.
pub const LISTEN_VAR: &str = "HOMEPAGE_LISTEN";
/// Environment variable holding the static files directory.
pub const WEB_ROOT_VAR: &str = "HOMEPAGE_WEB_ROOT";

const DEFAULT_LISTEN: &str = "0.0.0.0:5800";
const DEFAULT_WEB_ROOT: &str = "wwwroot";

/// Errors raised while loading [`AppConfig`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The listen address is not a socket address.
    #[error("invalid listen address `{value}`")]
    InvalidListenAddr {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        #[source]
        source: AddrParseError,
    },
    /// The static files directory was set to an empty string.
    #[error("web root must not be empty")]
    EmptyWebRoot,
    /// The static files directory does not exist.
    #[error(
        "web root `{}` is not a directory, set HOMEPAGE_WEB_ROOT to the site's `wwwroot`",
        .0.display()
    )]
    WebRootNotFound(PathBuf),
}

/// The hosting environment.
///
/// Only [`Environment::Development`] changes behavior: it keeps the framework's diagnostic
/// error pages instead of rendering the error page.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    /// Local development.
    Development,
    /// Pre-production.
    Staging,
    /// Production.
    #[default]
    Production,
    /// Any other named environment.
    Custom(String),
}

impl Environment {
    /// Parse an environment name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("development") {
            Self::Development
        } else if name.eq_ignore_ascii_case("staging") {
            Self::Staging
        } else if name.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Custom(name.to_owned())
        }
    }

    /// The environment's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Development => "Development",
            Self::Staging => "Staging",
            Self::Production => "Production",
            Self::Custom(name) => name,
        }
    }

    /// Whether this is the development environment.
    #[inline]
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Whether this environment is called `name`, ignoring ASCII case.
    #[inline]
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Configuration of the homepage server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// The hosting environment.
    pub environment: Environment,
    /// Address to listen on.
    pub listen_addr: SocketAddr,
    /// Directory static files are served from.
    pub web_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5800)),
            web_root: PathBuf::from(DEFAULT_WEB_ROOT),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = non_blank(ENVIRONMENT_VAR)
            .map(|name| Environment::parse(&name))
            .unwrap_or_default();

        let listen = non_blank(LISTEN_VAR).unwrap_or_else(|| DEFAULT_LISTEN.to_owned());
        let listen_addr = listen
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: listen.clone(),
                source,
            })?;

        let web_root = match lookup(WEB_ROOT_VAR) {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::EmptyWebRoot),
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_WEB_ROOT),
        };

        Ok(Self {
            environment,
            listen_addr,
            web_root,
        })
    }

    /// Check that the web root is an existing directory.
    ///
    /// A relative web root resolves against the current directory.
    pub fn check_web_root(&self) -> Result<(), ConfigError> {
        if self.web_root.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::WebRootNotFound(self.web_root.clone()))
        }
    }

    /// Set the hosting environment.
    #[inline]
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the static files directory.
    #[inline]
    #[must_use]
    pub fn web_root(mut self, web_root: impl Into<PathBuf>) -> Self {
        self.web_root = web_root.into();
        self
    }
}
