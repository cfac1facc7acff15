// Session context: owns the clients and the category cache for one run of
// the application. `refresh` re-reads the configuration files in place.

use crate::ai::ContentGenerator;
use crate::config::{load_api_key, AppConfig, AppPaths, Credentials};
use crate::error::{Result, StudioError};
use crate::wordpress::{Category, WordPressClient};
use tracing::{info, warn};

pub struct Session {
    config: AppConfig,
    generator: ContentGenerator,
    publisher: Option<WordPressClient>,
    missing_credentials: Vec<String>,
    categories: Vec<Category>,
}

impl Session {
    /// Bootstrap the folders and load everything once. A failed initial
    /// refresh (e.g. the blog is unreachable) is logged, not fatal.
    pub fn open(config: AppConfig) -> Result<Self> {
        config.paths.ensure_folders_exist()?;
        let generator = Self::build_generator(&config)?;
        let mut session = Session {
            config,
            generator,
            publisher: None,
            missing_credentials: Vec::new(),
            categories: Vec::new(),
        };
        if let Err(e) = session.refresh() {
            warn!(error = %e, "initial session refresh failed");
        }
        Ok(session)
    }

    fn build_generator(config: &AppConfig) -> Result<ContentGenerator> {
        let paths = &config.paths;
        ContentGenerator::new(
            &config.openai_base_url,
            load_api_key(paths)?,
            paths.rules_file(),
            paths.image_rules_file(),
        )
    }

    /// Reload the API key and WordPress credentials, then refetch the
    /// category list when a publishing client could be built. Nothing is
    /// replaced unless both configuration files could be read.
    pub fn refresh(&mut self) -> Result<()> {
        let generator = Self::build_generator(&self.config)?;
        let creds = Credentials::load(&self.config.paths.wordpress_config_file())?;
        let (publisher, missing) = match WordPressClient::from_credentials(&creds) {
            Ok(client) => (Some(client), Vec::new()),
            Err(StudioError::MissingCredentials(missing)) => {
                warn!(missing = ?missing, "publishing disabled until WordPress is configured");
                (None, missing)
            }
            Err(e) => return Err(e),
        };

        self.generator = generator;
        self.publisher = publisher;
        self.missing_credentials = missing;
        self.categories.clear();

        if let Some(client) = &self.publisher {
            self.categories = client.get_categories()?;
        }
        info!(
            api_key = self.generator.has_api_key(),
            publishing = self.publisher.is_some(),
            categories = self.categories.len(),
            "session refreshed"
        );
        Ok(())
    }

    pub fn paths(&self) -> &AppPaths {
        &self.config.paths
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    /// The publishing client, or the configuration error explaining why
    /// there is none.
    pub fn publisher(&self) -> Result<&WordPressClient> {
        match &self.publisher {
            Some(client) => Ok(client),
            None if self.missing_credentials.is_empty() => Err(StudioError::Configuration(
                "WordPress client is not available; refresh the session.".into(),
            )),
            None => Err(StudioError::MissingCredentials(
                self.missing_credentials.clone(),
            )),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
