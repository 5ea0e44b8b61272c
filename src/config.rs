//! Configure the site builder.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::{
    build::css_budget::MAX_CSS_SIZE_BYTES,
    cli::Opts,
    util::{path::PathExt, targets::BrowserTargetSet},
};

/// Name of the configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "ampsite.toml";

/// Build mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Produce the final artifact: every transform is applied.
    #[default]
    Production,
    /// Local preview: pages are written as rendered.
    Development,
}

impl BuildMode {
    /// Check if this is the production mode.
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Configuration for the site builder.
#[derive(Debug)]
pub struct Config {
    /// Path of the configuration file, if any.
    pub config_path: Option<PathBuf>,

    /// Directory of rendered pages and static files.
    pub input_dir: PathBuf,

    /// Directory of output files.
    pub output_dir: PathBuf,

    /// Build mode.
    pub mode: BuildMode,

    /// Maximum size of the inline stylesheet, in bytes.
    pub max_css_bytes: usize,

    /// Browser targets of the CSS optimizer.
    pub browsers: BrowserTargetSet,

    /// SCSS entry compiled into the inline stylesheet.
    ///
    /// If set to `None`, pages keep the stylesheet they were rendered with.
    pub stylesheet: Option<PathBuf>,

    /// Paths of files to ignore.
    pub ignore_paths: HashSet<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            mode: BuildMode::default(),
            max_css_bytes: MAX_CSS_SIZE_BYTES,
            browsers: BrowserTargetSet::default_set().clone(),
            stylesheet: None,
            ignore_paths: HashSet::new(),
        }
    }
}

/// Deserializable configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// See [`Config::input_dir`].
    pub input_dir: Option<PathBuf>,

    /// See [`Config::output_dir`].
    pub output_dir: Option<PathBuf>,

    /// See [`Config::mode`].
    pub mode: Option<BuildMode>,

    /// See [`Config::max_css_bytes`].
    pub max_css_bytes: Option<usize>,

    /// Browserslist queries, see [`Config::browsers`].
    pub browsers: Option<Vec<String>>,

    /// See [`Config::stylesheet`].
    pub stylesheet: Option<PathBuf>,

    /// See [`Config::ignore_paths`].
    #[serde(default)]
    pub ignore_paths: HashSet<PathBuf>,
}

impl UserConfig {
    /// Read configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(content)
    }

    /// Read configuration from a TOML string.
    pub fn from_toml(content: impl AsRef<str>) -> Result<Self> {
        Ok(toml::from_str(content.as_ref())?)
    }
}

impl Config {
    /// Create a configuration from command line options.
    ///
    /// Values from the configuration file are overridden by command line
    /// options.
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        let config_path = opts.config.clone().or_else(|| {
            Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists())
        });

        let user_config = match &config_path {
            Some(path) => UserConfig::from_file(path)
                .with_context(|| format!("reading configuration file {path:?}"))?,
            None => UserConfig::default(),
        };

        let config = Self::from_user_config(user_config)?;

        let config = Self {
            config_path,
            input_dir: opts.input.clone().unwrap_or(config.input_dir),
            output_dir: opts.output.clone().unwrap_or(config.output_dir),
            mode: opts.mode.unwrap_or(config.mode),
            max_css_bytes: opts.max_css_bytes.unwrap_or(config.max_css_bytes),
            stylesheet: opts.stylesheet.clone().or(config.stylesheet),
            ..config
        };

        let config = config.normalize()?;

        config.check()?;

        Ok(config)
    }

    /// Create a configuration from deserialized values.
    pub fn from_user_config(user_config: UserConfig) -> Result<Self> {
        let browsers = match user_config.browsers {
            Some(queries) => BrowserTargetSet::new(queries)?,
            None => BrowserTargetSet::default_set().clone(),
        };

        Ok(Self {
            config_path: None,
            input_dir: user_config.input_dir.unwrap_or_else(default_input_dir),
            output_dir: user_config.output_dir.unwrap_or_else(default_output_dir),
            mode: user_config.mode.unwrap_or_default(),
            max_css_bytes: user_config.max_css_bytes.unwrap_or(MAX_CSS_SIZE_BYTES),
            browsers,
            stylesheet: user_config.stylesheet,
            ignore_paths: user_config.ignore_paths,
        })
    }

    /// Normalize configuration.
    ///
    /// Canonicalize all paths.
    pub fn normalize(self) -> Result<Self> {
        let current_dir = std::env::current_dir()?;

        let input_dir = self
            .input_dir
            .canonicalize()
            .with_context(|| format!("input directory {:?}", self.input_dir))?;

        let stylesheet = self
            .stylesheet
            .map(|path| {
                path.canonicalize()
                    .with_context(|| format!("stylesheet {path:?}"))
            })
            .transpose()?;

        Ok(Self {
            config_path: self
                .config_path
                .map(|path| current_dir.join(path).normalize()),
            input_dir,
            output_dir: current_dir.join(self.output_dir).normalize(),
            stylesheet,
            ignore_paths: self
                .ignore_paths
                .into_iter()
                .map(|path| current_dir.join(path).normalize())
                .collect(),
            ..self
        })
    }

    /// Check if configuration is valid.
    pub fn check(&self) -> Result<()> {
        debug_assert!(self.input_dir.is_absolute());
        debug_assert!(self.output_dir.is_absolute());

        // Prevent overwriting input files
        if self.input_dir.starts_with(&self.output_dir) {
            return Err(anyhow!("`input_dir` must be located outside `output_dir`"));
        }

        if self.max_css_bytes == 0 {
            return Err(anyhow!("`max_css_bytes` must be positive"));
        }

        Ok(())
    }
}

/// Default input directory.
pub fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default output directory.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("_site")
}

#[cfg(test)]
mod tests {
    use super::{BuildMode, Config, UserConfig};
    use crate::build::css_budget::MAX_CSS_SIZE_BYTES;

    #[test]
    fn load_config_str() {
        const CONTENT: &str = r#"
            input_dir = "rendered"
            output_dir = "public"
            mode = "development"
            max_css_bytes = 50000
            browsers = ["last 1 Chrome version"]
            stylesheet = "styles/main.scss"
            ignore_paths = ["drafts"]
        "#;

        let user_config = UserConfig::from_toml(CONTENT).unwrap();
        let config = Config::from_user_config(user_config).unwrap();

        assert_eq!(config.input_dir.to_str().unwrap(), "rendered");
        assert_eq!(config.output_dir.to_str().unwrap(), "public");
        assert_eq!(config.mode, BuildMode::Development);
        assert_eq!(config.max_css_bytes, 50000);
        assert_eq!(config.browsers.queries(), ["last 1 Chrome version"]);
        assert_eq!(
            config.stylesheet.unwrap().to_str().unwrap(),
            "styles/main.scss"
        );
        assert_eq!(config.ignore_paths.len(), 1);
    }

    #[test]
    fn load_config_empty() {
        let user_config = UserConfig::from_toml("").unwrap();
        let config = Config::from_user_config(user_config).unwrap();

        assert_eq!(config.input_dir, super::default_input_dir());
        assert_eq!(config.output_dir, super::default_output_dir());
        assert_eq!(config.mode, BuildMode::Production);
        assert_eq!(config.max_css_bytes, MAX_CSS_SIZE_BYTES);
        assert!(config.stylesheet.is_none());
    }

    #[test]
    fn reject_unknown_fields() {
        assert!(UserConfig::from_toml("minify = true").is_err());
    }

    #[test]
    fn reject_invalid_browsers() {
        let user_config = UserConfig::from_toml(r#"browsers = ["not a browser at all"]"#).unwrap();
        assert!(Config::from_user_config(user_config).is_err());
    }
}
