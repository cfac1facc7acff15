#![allow(dead_code)]

use article_studio::ai::GeneratedImage;
use article_studio::config::{AppConfig, AppPaths};
use article_studio::shell::Frontend;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Small PNG, base64-encoded the way the image endpoint returns it.
pub fn png_b64() -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 80, 20])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    STANDARD.encode(buf)
}

pub fn image_body() -> String {
    format!(r#"{{"created": 1, "data": [{{"b64_json": "{}"}}]}}"#, png_b64())
}

pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub fn write_wp_config(dir: &Path, url: &str) {
    std::fs::write(
        dir.join("wordpress_config.txt"),
        format!(
            "# test blog\nWORDPRESS_URL={}/\nWORDPRESS_USERNAME=editor\nWORDPRESS_PASSWORD=secret\n",
            url
        ),
    )
    .unwrap();
}

pub fn config_for(dir: &Path, openai_url: &str) -> AppConfig {
    AppConfig {
        paths: AppPaths::new(dir),
        openai_base_url: openai_url.to_string(),
    }
}

/// Basic auth header for editor:secret.
pub fn basic_auth() -> String {
    format!("Basic {}", STANDARD.encode("editor:secret"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Task(String),
    Status(String),
    Warn(String),
    Error(String),
    Info(String),
    Article(String),
    Image(u32, u32),
    Clear,
}

/// Frontend that records everything the shell tells it.
#[derive(Default)]
pub struct RecordingFrontend {
    pub events: Vec<Event>,
}

impl RecordingFrontend {
    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Warn(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Info(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            Event::Status(m) => Some(m.as_str()),
            _ => None,
        })
    }
}

impl Frontend for RecordingFrontend {
    fn begin_task(&mut self, message: &str) {
        self.events.push(Event::Task(message.to_string()));
    }

    fn set_status(&mut self, message: &str) {
        self.events.push(Event::Status(message.to_string()));
    }

    fn warn(&mut self, _title: &str, message: &str) {
        self.events.push(Event::Warn(message.to_string()));
    }

    fn error(&mut self, _title: &str, message: &str) {
        self.events.push(Event::Error(message.to_string()));
    }

    fn info(&mut self, _title: &str, message: &str) {
        self.events.push(Event::Info(message.to_string()));
    }

    fn show_article(&mut self, text: &str) {
        self.events.push(Event::Article(text.to_string()));
    }

    fn show_image(&mut self, image: &GeneratedImage) {
        let (w, h) = image.dimensions();
        self.events.push(Event::Image(w, h));
    }

    fn clear(&mut self) {
        self.events.push(Event::Clear);
    }
}
