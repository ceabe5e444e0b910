use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::records::{CvColumns, ToolColumns};
use crate::tenure::Locale;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub google: GoogleConfig,
  #[serde(default)]
  pub profile: ProfileConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub display: DisplayConfig,
  /// Language of tenure strings and labels
  #[serde(default)]
  pub locale: Locale,
  /// Header names of the sheet columns, when they differ from the defaults
  #[serde(default)]
  pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
  pub spreadsheet_id: String,
  #[serde(default = "default_cv_range")]
  pub cv_range: String,
  #[serde(default = "default_tools_range")]
  pub tools_range: String,
  /// Path to a service-account JSON key, used when no key is given through the environment
  pub service_account_file: Option<PathBuf>,
  /// Drive file ids of the pictures
  #[serde(default)]
  pub images: ImageIds,
  /// API endpoint overrides, mostly useful for testing
  pub sheets_url: Option<String>,
  pub drive_url: Option<String>,
}

fn default_cv_range() -> String {
  "f_cv".to_string()
}

fn default_tools_range() -> String {
  "f_tools".to_string()
}

/// Drive file ids. A picture without an id is not fetched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageIds {
  pub photo: Option<String>,
  pub certificate: Option<String>,
  pub demo1: Option<String>,
  pub demo2: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileConfig {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub title: String,
  pub phone: Option<String>,
  pub email: Option<String>,
  #[serde(default)]
  pub links: Vec<LinkConfig>,
  pub certificate: Option<LinkConfig>,
  /// Demo projects; the first two are shown next to the demo1/demo2 pictures
  #[serde(default)]
  pub demos: Vec<LinkConfig>,
  /// Free-form lines for the "additional information" block
  #[serde(default)]
  pub notes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LinkConfig {
  pub label: String,
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Cache directory (defaults to $XDG_CACHE_HOME/cvdash)
  pub dir: Option<PathBuf>,
  /// Serve yesterday's files when Google cannot be reached
  #[serde(default)]
  pub stale_fallback: bool,
  #[serde(default)]
  pub files: CacheFiles,
}

/// File names of the cache entries inside the cache directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheFiles {
  pub cv: String,
  pub tools: String,
  pub photo: String,
  pub certificate: String,
  pub demo1: String,
  pub demo2: String,
}

impl Default for CacheFiles {
  fn default() -> Self {
    Self {
      cv: "f_cv.json".to_string(),
      tools: "f_tools.json".to_string(),
      photo: "photo_ava.jpg".to_string(),
      certificate: "ms_pl300.png".to_string(),
      demo1: "demo1.jpg".to_string(),
      demo2: "demo2.jpg".to_string(),
    }
  }
}

/// Picture widths in terminal columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
  pub photo_width: u16,
  pub certificate_width: u16,
  pub demo_width: u16,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      photo_width: 24,
      certificate_width: 12,
      demo_width: 20,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsConfig {
  #[serde(default)]
  pub cv: CvColumns,
  #[serde(default)]
  pub tools: ToolColumns,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cvdash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cvdash/config.yaml
  /// 4. ~/.config/cvdash/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/cvdash/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cvdash.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cvdash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Cache directory: the configured one or the platform cache dir.
  pub fn cache_dir(&self) -> PathBuf {
    self
      .cache
      .dir
      .clone()
      .unwrap_or_else(crate::cache::default_cache_dir)
  }

  /// Get a pre-issued OAuth2 access token from the environment.
  ///
  /// Checks CVDASH_ACCESS_TOKEN. When set, no service-account key is needed.
  pub fn get_access_token() -> Option<String> {
    std::env::var("CVDASH_ACCESS_TOKEN")
      .ok()
      .filter(|t| !t.trim().is_empty())
  }

  /// Get the service-account key JSON.
  ///
  /// Checks CVDASH_SERVICE_ACCOUNT (key contents) first, then
  /// CVDASH_SERVICE_ACCOUNT_FILE (path), then `google.service_account_file`.
  pub fn get_service_account_json(&self) -> Result<String> {
    self.service_account_json_from(
      std::env::var("CVDASH_SERVICE_ACCOUNT").ok(),
      std::env::var_os("CVDASH_SERVICE_ACCOUNT_FILE").map(PathBuf::from),
    )
  }

  fn service_account_json_from(
    &self,
    inline: Option<String>,
    file: Option<PathBuf>,
  ) -> Result<String> {
    if let Some(json) = inline.filter(|j| !j.trim().is_empty()) {
      return Ok(json);
    }

    let path = file
      .or_else(|| self.google.service_account_file.clone())
      .ok_or_else(|| {
        eyre!(
          "Google credentials not found. Set CVDASH_SERVICE_ACCOUNT, CVDASH_SERVICE_ACCOUNT_FILE \
           or google.service_account_file in the config."
        )
      })?;

    std::fs::read_to_string(&path).map_err(|e| {
      eyre!(
        "Failed to read service account key {}: {}",
        path.display(),
        e
      )
    })
  }
}
