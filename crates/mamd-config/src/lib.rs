//! Configuration management for MaMD.
//!
//! Parses `mamd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.template`
//! - `site.stylesheet`
//! - `site.extension`
//! - `highlight.style`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page template path.
    pub template: Option<PathBuf>,
    /// Override stylesheet path.
    pub stylesheet: Option<PathBuf>,
    /// Override highlight style name.
    pub style: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mamd.toml";

const DEFAULT_TEMPLATE: &str = "template.html";
const DEFAULT_STYLESHEET: &str = "mamd.css";
const DEFAULT_EXTENSION: &str = "md";
const DEFAULT_STYLE: &str = "monokailight";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Markdown conversion options.
    pub markdown: MarkdownConfig,
    /// Syntax highlighting options.
    pub highlight: HighlightConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    template: Option<String>,
    stylesheet: Option<String>,
    extension: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Page template file.
    pub template: PathBuf,
    /// Stylesheet copied into the output root.
    pub stylesheet: PathBuf,
    /// Extension of source files, without the dot.
    pub extension: String,
}

/// Markdown conversion options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Rewrite relative `.md` links to `.html`.
    pub rewrite_links: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            rewrite_links: false,
        }
    }
}

/// Syntax highlighting options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Style name.
    pub style: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.template`").
        field: String,
        /// Error message (e.g., "${`THEME_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mamd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(template) = &settings.template {
            self.site_resolved.template.clone_from(template);
        }
        if let Some(stylesheet) = &settings.stylesheet {
            self.site_resolved.stylesheet.clone_from(stylesheet);
        }
        if let Some(style) = &settings.style {
            self.highlight.style.clone_from(style);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),
            site_resolved: SiteConfig {
                template: base.join(DEFAULT_TEMPLATE),
                stylesheet: base.join(DEFAULT_STYLESHEET),
                extension: DEFAULT_EXTENSION.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand before path resolution so variables can hold directories
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extension = &self.site_resolved.extension;
        require_non_empty(extension, "site.extension")?;
        if extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "site.extension must not start with a dot (got \"{extension}\")"
            )));
        }
        require_non_empty(&self.highlight.style, "highlight.style")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let site = &mut self.site;
        site.template = expand::expand_opt(site.template.as_deref(), "site.template")?;
        site.stylesheet = expand::expand_opt(site.stylesheet.as_deref(), "site.stylesheet")?;
        site.extension = expand::expand_opt(site.extension.as_deref(), "site.extension")?;
        self.highlight.style = expand::expand_env(&self.highlight.style, "highlight.style")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.site_resolved = SiteConfig {
            template: resolve(self.site.template.as_deref(), DEFAULT_TEMPLATE),
            stylesheet: resolve(self.site.stylesheet.as_deref(), DEFAULT_STYLESHEET),
            extension: self
                .site
                .extension
                .clone()
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_owned()),
        };
    }
}
