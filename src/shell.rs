// Interactive shell: the generate -> review -> publish state machine, kept
// independent of any particular front end. A front end turns operator input
// into `Command`s and implements `Frontend` to render what the shell reports.

use crate::ai::GeneratedImage;
use crate::config::{save_api_key, Credentials};
use crate::error::{Result, StudioError};
use crate::session::Session;
use crate::wordpress::NewPost;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::PathBuf;
use tracing::{debug, info};

pub const READY: &str = "Ready";
pub const ERROR_STATUS: &str = "Error occurred";

/// Operator-facing view. Dialog methods are expected to block until the
/// operator has seen the message.
pub trait Frontend {
    /// A long-running call is about to start.
    fn begin_task(&mut self, message: &str);
    /// Settle the status line; ends any task indicator.
    fn set_status(&mut self, message: &str);
    fn warn(&mut self, title: &str, message: &str);
    fn error(&mut self, title: &str, message: &str);
    fn info(&mut self, title: &str, message: &str);
    fn show_article(&mut self, text: &str);
    fn show_image(&mut self, image: &GeneratedImage);
    /// Reset every form field and output area.
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    Generating,
    Reviewing,
    Publishing,
    Error,
}

/// Publish date picked in the form, in the server's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Schedule {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Schedule { date, time }
    }

    pub fn to_iso8601(&self) -> String {
        NaiveDateTime::new(self.date, self.time)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }
}

/// Time-of-day choices offered by the form: every quarter hour.
pub fn time_slots() -> Vec<NaiveTime> {
    (0..24)
        .flat_map(|h| [0, 15, 30, 45].into_iter().map(move |m| (h, m)))
        .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishForm {
    pub categories: Vec<u64>,
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Generate { prompt: String },
    Publish(PublishForm),
    AttachImage(PathBuf),
    SaveArticle,
    SaveImage,
    Clear,
    Refresh,
    SetApiKey(String),
    ConfigureWordPress(Credentials),
}

impl Command {
    /// Short label for logs; never includes keys or passwords.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Generate { .. } => "generate",
            Command::Publish(_) => "publish",
            Command::AttachImage(_) => "attach-image",
            Command::SaveArticle => "save-article",
            Command::SaveImage => "save-image",
            Command::Clear => "clear",
            Command::Refresh => "refresh",
            Command::SetApiKey(_) => "set-api-key",
            Command::ConfigureWordPress(_) => "configure-wordpress",
        }
    }
}

/// What the operator is currently looking at.
#[derive(Debug, Default)]
pub struct Draft {
    pub article: Option<String>,
    pub image: Option<GeneratedImage>,
    /// Local file attached by the operator; wins over the generated image.
    pub attachment: Option<PathBuf>,
    /// Where the generated image was written for upload, reused on retry.
    saved_image: Option<PathBuf>,
}

impl Draft {
    pub fn has_article(&self) -> bool {
        self.article
            .as_deref()
            .map_or(false, |a| !a.trim().is_empty())
    }
}

/// First line is the title, the rest is the body.
pub fn split_article(text: &str) -> (String, String) {
    let text = text.trim_start();
    match text.split_once('\n') {
        Some((title, body)) => (title.trim().to_string(), body.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub struct Shell {
    session: Session,
    state: ShellState,
    draft: Draft,
}

impl Shell {
    pub fn new(session: Session) -> Self {
        Shell {
            session,
            state: ShellState::Idle,
            draft: Draft::default(),
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one operator action. Errors never escape: they are shown to the
    /// operator and the draft is left untouched.
    pub fn dispatch(&mut self, command: Command, view: &mut dyn Frontend) {
        debug!(command = command.name(), "dispatch");
        // Any new action acknowledges the previous failure.
        if self.state == ShellState::Error {
            self.state = ShellState::Idle;
        }
        let outcome = match command {
            Command::Generate { prompt } => self.generate(&prompt, view),
            Command::Publish(form) => self.publish(&form, view),
            Command::AttachImage(path) => self.attach_image(path, view),
            Command::SaveArticle => self.save_article(view),
            Command::SaveImage => self.save_image(view),
            Command::Clear => {
                self.clear(view);
                Ok(())
            }
            Command::Refresh => self.refresh(view),
            Command::SetApiKey(key) => self.set_api_key(&key, view),
            Command::ConfigureWordPress(creds) => self.configure_wordpress(&creds, view),
        };
        if let Err(e) = outcome {
            self.report(e, view);
        }
    }

    /// Validation problems are warnings and leave the shell `Idle`; any
    /// other failure parks it in `Error` until the next command.
    fn report(&mut self, err: StudioError, view: &mut dyn Frontend) {
        match err {
            StudioError::Validation(msg) => {
                self.state = ShellState::Idle;
                view.warn("Warning", &msg);
                view.set_status(READY);
            }
            other => {
                self.state = ShellState::Error;
                info!(error = %other, "action failed");
                view.error("Error", &other.to_string());
                view.set_status(ERROR_STATUS);
            }
        }
    }

    fn generate(&mut self, prompt: &str, view: &mut dyn Frontend) -> Result<()> {
        if prompt.trim().is_empty() {
            return Err(StudioError::Validation("Please enter a prompt".into()));
        }
        self.state = ShellState::Generating;
        self.draft = Draft::default();

        view.begin_task("Generating article...");
        let article = self.session.generator().generate_article(prompt)?;
        view.show_article(&article);
        self.draft.article = Some(article);

        view.begin_task("Generating image...");
        let image = self.session.generator().generate_image(prompt)?;
        view.show_image(&image);
        self.draft.image = Some(image);

        self.state = ShellState::Reviewing;
        view.set_status(READY);
        Ok(())
    }

    /// Path of the image to attach to the post, writing the generated image
    /// to disk the first time it is needed.
    fn image_for_post(&mut self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.draft.attachment {
            return Ok(Some(path.clone()));
        }
        if let Some(path) = &self.draft.saved_image {
            return Ok(Some(path.clone()));
        }
        let Some(image) = &self.draft.image else {
            return Ok(None);
        };
        let path = self
            .session
            .paths()
            .image_folder()
            .join(format!("image_{}.png", timestamp()));
        image.save_png(&path)?;
        self.draft.saved_image = Some(path.clone());
        Ok(Some(path))
    }

    fn publish(&mut self, form: &PublishForm, view: &mut dyn Frontend) -> Result<()> {
        if !self.draft.has_article() {
            return Err(StudioError::Validation(
                "No content to publish. Generate an article first.".into(),
            ));
        }
        self.state = ShellState::Publishing;
        self.session.publisher()?;

        let (title, content) = split_article(self.draft.article.as_deref().unwrap_or_default());
        let post = NewPost {
            title,
            content,
            image_path: self.image_for_post()?,
            categories: form.categories.clone(),
            schedule_time: form.schedule.map(|s| s.to_iso8601()),
        };

        view.begin_task("Publishing post...");
        let created = self.session.publisher()?.create_post(&post)?;
        let message = match &post.schedule_time {
            Some(when) => format!("Post scheduled with ID: {} for {}", created.id, when),
            None => format!("Post created with ID: {}", created.id),
        };
        view.info("Success", &message);
        view.set_status(READY);
        self.state = ShellState::Idle;
        Ok(())
    }

    fn attach_image(&mut self, path: PathBuf, view: &mut dyn Frontend) -> Result<()> {
        if !path.is_file() {
            return Err(StudioError::Validation(format!(
                "Image file not found: {}",
                path.display()
            )));
        }
        view.info("Image attached", &path.display().to_string());
        self.draft.attachment = Some(path);
        Ok(())
    }

    fn save_article(&mut self, view: &mut dyn Frontend) -> Result<()> {
        let Some(article) = self.draft.article.as_deref().filter(|a| !a.trim().is_empty())
        else {
            return Err(StudioError::Validation("No article to save".into()));
        };
        let path = self
            .session
            .paths()
            .articles_folder()
            .join(format!("article_{}.txt", timestamp()));
        std::fs::write(&path, article)?;
        view.info("Saved", &format!("Article saved to {}", path.display()));
        Ok(())
    }

    fn save_image(&mut self, view: &mut dyn Frontend) -> Result<()> {
        let Some(image) = &self.draft.image else {
            return Err(StudioError::Validation("No image to save".into()));
        };
        let path = self
            .session
            .paths()
            .image_folder()
            .join(format!("image_{}.png", timestamp()));
        image.save_png(&path)?;
        self.draft.saved_image = Some(path.clone());
        view.info("Saved", &format!("Image saved to {}", path.display()));
        Ok(())
    }

    fn clear(&mut self, view: &mut dyn Frontend) {
        self.draft = Draft::default();
        self.state = ShellState::Idle;
        view.clear();
        view.set_status(READY);
    }

    fn refresh(&mut self, view: &mut dyn Frontend) -> Result<()> {
        view.begin_task("Reloading configuration...");
        self.session.refresh()?;
        let message = match self.session.publisher() {
            Ok(_) => format!("{} categories loaded", self.session.categories().len()),
            Err(e) => format!("Publishing unavailable: {}", e),
        };
        view.info("Session refreshed", &message);
        view.set_status(READY);
        Ok(())
    }

    fn set_api_key(&mut self, key: &str, view: &mut dyn Frontend) -> Result<()> {
        if key.trim().is_empty() {
            return Err(StudioError::Validation("API key cannot be empty".into()));
        }
        save_api_key(self.session.paths(), key)?;
        self.refresh(view)
    }

    fn configure_wordpress(&mut self, creds: &Credentials, view: &mut dyn Frontend) -> Result<()> {
        creds.save(&self.session.paths().wordpress_config_file())?;
        self.refresh(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_first_line() {
        let (title, body) = split_article("Alpine Dusk\n\nThe sun sets.\nThe end.");
        assert_eq!(title, "Alpine Dusk");
        assert_eq!(body, "The sun sets.\nThe end.");
    }

    #[test]
    fn single_line_article_has_empty_body() {
        assert_eq!(
            split_article("  Only a title  "),
            ("Only a title".to_string(), String::new())
        );
    }

    #[test]
    fn schedule_serializes_as_iso8601() {
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
        );
        assert_eq!(schedule.to_iso8601(), "2026-11-01T09:45:00");
    }

    #[test]
    fn time_slots_cover_the_day_in_quarter_hours() {
        let slots = time_slots();
        assert_eq!(slots.len(), 96);
        assert_eq!(slots[0], NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(slots[95], NaiveTime::from_hms_opt(23, 45, 0).unwrap());
    }
}
