// Configuration module: where the application keeps its files, how the
// key=value credential files are parsed, and the small writers used by the
// settings commands.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RULES_FILE: &str = "rules.txt";
pub const IMAGE_RULES_FILE: &str = "image_rules.txt";
pub const API_KEY_FILE: &str = "openai_api_key.txt";
pub const WP_CONFIG_FILE: &str = "wordpress_config.txt";
pub const IMAGE_FOLDER: &str = "generated_images";
pub const ARTICLES_FOLDER: &str = "generated_articles";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const WORDPRESS_URL: &str = "WORDPRESS_URL";
pub const WORDPRESS_USERNAME: &str = "WORDPRESS_USERNAME";
pub const WORDPRESS_PASSWORD: &str = "WORDPRESS_PASSWORD";

/// Filesystem layout rooted at a single base directory.
#[derive(Clone, Debug)]
pub struct AppPaths {
    base: PathBuf,
}

impl AppPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        AppPaths { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn rules_file(&self) -> PathBuf {
        self.base.join(RULES_FILE)
    }

    pub fn image_rules_file(&self) -> PathBuf {
        self.base.join(IMAGE_RULES_FILE)
    }

    pub fn api_key_file(&self) -> PathBuf {
        self.base.join(API_KEY_FILE)
    }

    pub fn wordpress_config_file(&self) -> PathBuf {
        self.base.join(WP_CONFIG_FILE)
    }

    pub fn image_folder(&self) -> PathBuf {
        self.base.join(IMAGE_FOLDER)
    }

    pub fn articles_folder(&self) -> PathBuf {
        self.base.join(ARTICLES_FOLDER)
    }

    /// Create the output folders if they are not there yet.
    pub fn ensure_folders_exist(&self) -> Result<()> {
        fs::create_dir_all(self.image_folder())?;
        fs::create_dir_all(self.articles_folder())?;
        Ok(())
    }
}

/// Everything the session needs to locate its files and remote services.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub paths: AppPaths,
    pub openai_base_url: String,
}

impl AppConfig {
    /// Build the configuration from `ARTICLE_STUDIO_HOME` and
    /// `OPENAI_BASE_URL`, falling back to `~/.article_studio` and the public
    /// OpenAI endpoint.
    pub fn from_env() -> Self {
        let base = std::env::var_os("ARTICLE_STUDIO_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".article_studio")
            });
        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.into());
        AppConfig {
            paths: AppPaths::new(base),
            openai_base_url,
        }
    }
}

/// Flat key/value store read from a `KEY=VALUE` text file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Credentials { values }
    }

    /// Read a credential file. A file that does not exist yields an empty
    /// store; any other read failure is returned.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Credentials::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "credential file not found");
                Ok(Credentials::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.trim().to_string());
    }

    /// Value for `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The subset of `keys` that has no usable value, in the order given.
    pub fn missing(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter(|k| self.get(k).is_none())
            .map(|k| k.to_string())
            .collect()
    }

    pub fn to_file_contents(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_file_contents())?;
        Ok(())
    }
}

/// Load the OpenAI key from its file, then from `OPENAI_API_KEY`.
pub fn load_api_key(paths: &AppPaths) -> Result<Option<String>> {
    let from_file = match fs::read_to_string(paths.api_key_file()) {
        Ok(text) => Some(text.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let key = from_file
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|k| !k.trim().is_empty());
    Ok(key)
}

pub fn save_api_key(paths: &AppPaths, key: &str) -> Result<()> {
    fs::create_dir_all(paths.base())?;
    fs::write(paths.api_key_file(), key.trim())?;
    Ok(())
}

/// Read a rules document; a missing file is an empty document.
pub fn read_rules(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}
