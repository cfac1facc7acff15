// Publishing client: a small blocking client for the WordPress REST API.
// Credentials come from the key=value config file and are checked once, when
// the client is built.

use crate::config::{Credentials, WORDPRESS_PASSWORD, WORDPRESS_URL, WORDPRESS_USERNAME};
use crate::error::{check_status, Result, StudioError};
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

pub const CATEGORIES_PER_PAGE: u32 = 100;

/// Keys that must be present before anything can be published.
pub const REQUIRED_KEYS: [&str; 3] = [WORDPRESS_URL, WORDPRESS_USERNAME, WORDPRESS_PASSWORD];

#[derive(Clone)]
pub struct WordPressClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// The subset of the post resource the application looks at.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Media {
    id: u64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Future,
}

/// Everything needed to create (or schedule) a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_path: Option<std::path::PathBuf>,
    pub categories: Vec<u64>,
    /// ISO 8601 publish time; its presence turns the post into a scheduled one.
    pub schedule_time: Option<String>,
}

#[derive(Serialize, Debug)]
struct PostPayload<'a> {
    title: &'a str,
    content: &'a str,
    status: PostStatus,
    categories: &'a [u64],
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured_media: Option<u64>,
}

impl NewPost {
    pub fn status(&self) -> PostStatus {
        if self.schedule_time.is_some() {
            PostStatus::Future
        } else {
            PostStatus::Publish
        }
    }
}

/// Guess the upload MIME type from the file extension.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

impl WordPressClient {
    /// Build a client from the credential store. Fails with
    /// `MissingCredentials` naming every required key that is absent.
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        let missing = creds.missing(&REQUIRED_KEYS);
        if !missing.is_empty() {
            return Err(StudioError::MissingCredentials(missing));
        }
        let field = |key: &str| creds.get(key).unwrap_or_default().to_string();
        let client = Client::builder().build()?;
        Ok(WordPressClient {
            client,
            base_url: field(WORDPRESS_URL).trim_end_matches('/').to_string(),
            username: field(WORDPRESS_USERNAME),
            password: field(WORDPRESS_PASSWORD),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.base_url, resource)
    }

    /// Fetch every category, following the `X-WP-TotalPages` header.
    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let url = self.endpoint("categories");
        let mut categories = Vec::new();
        let mut page = 1u32;
        loop {
            let res = self
                .client
                .get(&url)
                .basic_auth(&self.username, Some(&self.password))
                .query(&[("per_page", CATEGORIES_PER_PAGE), ("page", page)])
                .send()?;
            let res = check_status("Fetching categories", res)?;
            let total_pages = res
                .headers()
                .get("x-wp-totalpages")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1);
            let batch: Vec<Category> = res.json()?;
            debug!(page, count = batch.len(), "fetched category page");
            categories.extend(batch);
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        info!(count = categories.len(), "categories loaded");
        Ok(categories)
    }

    /// Upload a local file to the media library as multipart/form-data and
    /// return the new media id.
    pub fn upload_media(&self, file_path: &Path) -> Result<u64> {
        let url = self.endpoint("media");
        let file = File::open(file_path)?;
        let len = file.metadata()?.len();
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("image.png")
            .to_string();

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name)
            .mime_str(mime_for(file_path))?;
        let form = multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .multipart(form)
            .send()?;
        let res = check_status("Media upload", res)?;
        let media: Media = res.json()?;
        info!(media_id = media.id, path = %file_path.display(), "media uploaded");
        Ok(media.id)
    }

    /// Create a post, uploading its featured image first when the path
    /// exists. A failed upload aborts before any post is created.
    pub fn create_post(&self, post: &NewPost) -> Result<Post> {
        let featured_media = match post.image_path.as_deref() {
            Some(path) if path.exists() => Some(self.upload_media(path)?),
            Some(path) => {
                debug!(path = %path.display(), "image path does not exist, skipping upload");
                None
            }
            None => None,
        };

        let payload = PostPayload {
            title: &post.title,
            content: &post.content,
            status: post.status(),
            categories: &post.categories,
            date: post.schedule_time.as_deref(),
            featured_media,
        };

        let res = self
            .client
            .post(self.endpoint("posts"))
            .basic_auth(&self.username, Some(&self.password))
            .json(&payload)
            .send()?;
        let res = check_status("Post creation", res)?;
        let created: Post = res.json()?;
        info!(post_id = created.id, status = ?payload.status, "post created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a/b.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("b.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn scheduling_decides_status() {
        let mut post = NewPost::default();
        assert_eq!(post.status(), PostStatus::Publish);
        post.schedule_time = Some("2026-11-01T09:30:00".into());
        assert_eq!(post.status(), PostStatus::Future);
    }

    #[test]
    fn url_trailing_slash_is_trimmed() {
        let creds = Credentials::parse(
            "WORDPRESS_URL=https://blog.example/\nWORDPRESS_USERNAME=u\nWORDPRESS_PASSWORD=p\n",
        );
        let client = WordPressClient::from_credentials(&creds).unwrap();
        assert_eq!(client.base_url(), "https://blog.example");
        assert_eq!(
            client.endpoint("posts"),
            "https://blog.example/wp-json/wp/v2/posts"
        );
    }
}
