use std::path::Path;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::csrf::{DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "coursechat.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "COURSECHAT_CONFIG")]
    pub config: Option<String>,

    /// Base URL of the course assistant server
    #[arg(long, env = "COURSECHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Start with Bangla explanation mode switched on
    #[arg(long)]
    pub bangla: bool,

    /// Skip loading the chat page to obtain the CSRF cookie
    #[arg(long)]
    pub no_bootstrap: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub csrf: CsrfConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Path of the JSON chat endpoint.
    pub chat_path: String,
    /// Page that issues the CSRF cookie.
    pub page_path: String,
    /// Load `page_path` before the first send.
    pub bootstrap: bool,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/api/chat/".to_string(),
            page_path: "/chat-ui/".to_string(),
            bootstrap: true,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
    /// Initial `Cookie:` string, e.g. `sessionid=...; csrftoken=...`.
    #[serde(default)]
    pub cookie: Option<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            cookie: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Send the `bangla_mode` flag at all.
    pub mode_flag: bool,
    /// Initial state of the mode toggle.
    pub bangla_mode: bool,
    /// Prefix of material detail links; the source id and `/` are appended.
    pub detail_path_prefix: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            mode_flag: true,
            bangla_mode: false,
            detail_path_prefix: "/material-detail/".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Priority: CLI flag > `COURSECHAT_` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let client = ClientConfig::default();
        let csrf = CsrfConfig::default();
        let widget = WidgetConfig::default();

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("client.base_url", client.base_url)?
            .set_default("client.chat_path", client.chat_path)?
            .set_default("client.page_path", client.page_path)?
            .set_default("client.bootstrap", client.bootstrap)?
            .set_default("csrf.cookie_name", csrf.cookie_name)?
            .set_default("csrf.header_name", csrf.header_name)?
            .set_default("widget.mode_flag", widget.mode_flag)?
            .set_default("widget.bangla_mode", widget.bangla_mode)?
            .set_default("widget.detail_path_prefix", widget.detail_path_prefix)?;

        // 2. Config file: explicit path must exist, the cwd fallback may not
        match &cli.config {
            Some(path) => builder = builder.add_source(File::with_name(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        // 3. Environment, e.g. COURSECHAT_CLIENT__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix("COURSECHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI overrides
        if let Some(base_url) = &cli.base_url {
            builder = builder.set_override("client.base_url", base_url.as_str())?;
        }
        if cli.bangla {
            builder = builder.set_override("widget.bangla_mode", true)?;
        }
        if cli.no_bootstrap {
            builder = builder.set_override("client.bootstrap", false)?;
        }

        builder.build()?.try_deserialize()
    }
}
