// Content generation client: one blocking call for the article text and one
// for the illustration. Both calls decorate the operator prompt with the
// house-style rules kept next to the configuration files.

use crate::config::read_rules;
use crate::error::{check_status, Result, StudioError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const IMAGE_SIZE: &str = "512x512";
pub const THUMBNAIL_SIZE: u32 = 300;

const MISSING_KEY: &str = "OpenAI API key not found. Please set your API key first.";

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Serialize, Debug)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize, Debug)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    b64_json: Option<String>,
}

/// Decoded illustration held in memory until the operator saves or
/// publishes it.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    bitmap: DynamicImage,
}

impl GeneratedImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bitmap = image::load_from_memory(bytes)?;
        Ok(GeneratedImage { bitmap })
    }

    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.bitmap.width(), self.bitmap.height())
    }

    /// Downscaled copy for preview, aspect ratio preserved.
    pub fn thumbnail(&self) -> DynamicImage {
        self.bitmap.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.bitmap.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// System instruction sent ahead of the operator prompt.
pub fn system_message(rules: &str) -> String {
    format!("Follow these rules: {}", rules)
}

/// Prompt sent to the image endpoint; rules are appended only when present.
pub fn image_prompt(prompt: &str, rules: &str) -> String {
    if rules.is_empty() {
        prompt.to_string()
    } else {
        format!("{}. {}", prompt, rules)
    }
}

/// Blocking client for the text and image generation endpoints.
#[derive(Clone)]
pub struct ContentGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rules_file: PathBuf,
    image_rules_file: PathBuf,
}

impl ContentGenerator {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        rules_file: PathBuf,
        image_rules_file: PathBuf,
    ) -> Result<Self> {
        // Generation can take well over reqwest's default 30s.
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(ContentGenerator {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rules_file,
            image_rules_file,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| StudioError::Configuration(MISSING_KEY.into()))
    }

    /// The two chat messages that make up an article request.
    pub fn article_messages(&self, prompt: &str) -> Result<Vec<ChatMessage>> {
        let rules = read_rules(&self.rules_file)?;
        Ok(vec![
            ChatMessage {
                role: "system".into(),
                content: system_message(&rules),
            },
            ChatMessage {
                role: "user".into(),
                content: prompt.to_string(),
            },
        ])
    }

    /// Ask the chat endpoint for an article and return the first choice
    /// verbatim.
    pub fn generate_article(&self, prompt: &str) -> Result<String> {
        let key = self.api_key()?;
        let body = ChatRequest {
            model: CHAT_MODEL,
            messages: self.article_messages(prompt)?,
        };
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, "requesting article");
        let res = self.client.post(&url).bearer_auth(key).json(&body).send()?;
        let res = check_status("Article generation", res)?;
        let parsed: ChatResponse = res.json()?;
        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            StudioError::RemoteService("Article generation returned no choices".into())
        })?;
        info!(chars = choice.message.content.len(), "article generated");
        Ok(choice.message.content)
    }

    /// Request a single square image as base64 and decode it.
    pub fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let key = self.api_key()?;
        let rules = read_rules(&self.image_rules_file)?;
        let full_prompt = image_prompt(prompt, &rules);
        let body = ImageRequest {
            prompt: &full_prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };
        let url = format!("{}/images/generations", self.base_url);
        debug!(%url, "requesting image");
        let res = self.client.post(&url).bearer_auth(key).json(&body).send()?;
        let res = check_status("Image generation", res)?;
        let parsed: ImageResponse = res.json()?;
        let encoded = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| {
                StudioError::RemoteService("Image generation returned no image data".into())
            })?;
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            StudioError::RemoteService(format!("Image payload is not valid base64: {}", e))
        })?;
        let image = GeneratedImage::from_bytes(&bytes)?;
        let (w, h) = image.dimensions();
        info!(width = w, height = h, "image generated");
        Ok(image)
    }
}
