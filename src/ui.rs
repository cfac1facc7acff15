// UI layer: a terminal front end built on `dialoguer` prompts and an
// `indicatif` spinner. The menu is a static table mapping each entry to the
// form that builds the matching shell `Command`.

use crate::ai::GeneratedImage;
use crate::config::{Credentials, WORDPRESS_PASSWORD, WORDPRESS_URL, WORDPRESS_USERNAME};
use crate::shell::{time_slots, Command, Frontend, PublishForm, Schedule, Shell};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Generate,
    Publish,
    AttachImage,
    SaveArticle,
    SaveImage,
    Clear,
    SetApiKey,
    ConfigureWordPress,
    Refresh,
    Exit,
}

const MENU: &[(&str, Action)] = &[
    ("Generate", Action::Generate),
    ("Post to WordPress", Action::Publish),
    ("Attach image file", Action::AttachImage),
    ("Save article", Action::SaveArticle),
    ("Save image", Action::SaveImage),
    ("Clear", Action::Clear),
    ("Settings: API key", Action::SetApiKey),
    ("Settings: WordPress config", Action::ConfigureWordPress),
    ("Refresh session", Action::Refresh),
    ("Exit", Action::Exit),
];

/// Terminal implementation of the shell's view. The spinner stands in for
/// the status bar while a remote call is running.
#[derive(Default)]
pub struct TerminalFrontend {
    spinner: Option<ProgressBar>,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    fn stop_spinner(&mut self) {
        if let Some(sp) = self.spinner.take() {
            sp.finish_and_clear();
        }
    }
}

impl Frontend for TerminalFrontend {
    fn begin_task(&mut self, message: &str) {
        let spinner = self.spinner.get_or_insert_with(|| {
            let sp = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            sp.set_style(style);
            sp.enable_steady_tick(Duration::from_millis(100));
            sp
        });
        spinner.set_message(message.to_string());
    }

    fn set_status(&mut self, message: &str) {
        self.stop_spinner();
        println!("[{}]", message);
    }

    fn warn(&mut self, title: &str, message: &str) {
        self.stop_spinner();
        println!("{}: {}", title, message);
    }

    fn error(&mut self, title: &str, message: &str) {
        self.stop_spinner();
        eprintln!("{}: {}", title, message);
    }

    fn info(&mut self, title: &str, message: &str) {
        self.stop_spinner();
        println!("{}: {}", title, message);
    }

    fn show_article(&mut self, text: &str) {
        if let Some(sp) = &self.spinner {
            sp.suspend(|| print_article(text));
        } else {
            print_article(text);
        }
    }

    fn show_image(&mut self, image: &GeneratedImage) {
        let (w, h) = image.dimensions();
        let thumb = image.thumbnail();
        let line = format!(
            "Generated image: {}x{} (preview {}x{}). Use \"Save image\" to keep a copy.",
            w,
            h,
            thumb.width(),
            thumb.height()
        );
        match &self.spinner {
            Some(sp) => sp.println(line),
            None => println!("{}", line),
        }
    }

    fn clear(&mut self) {
        self.stop_spinner();
        println!("\n--- cleared ---\n");
    }
}

fn print_article(text: &str) {
    println!("\n{}\n{}\n{}\n", "-".repeat(60), text, "-".repeat(60));
}

/// Main interactive menu. Runs until the operator picks "Exit".
pub fn main_menu(mut shell: Shell) -> Result<()> {
    let mut view = TerminalFrontend::new();
    let labels: Vec<&str> = MENU.iter().map(|(label, _)| *label).collect();
    view.set_status(crate::shell::READY);
    loop {
        let selection = Select::new()
            .with_prompt("Article Generator")
            .items(&labels)
            .default(0)
            .interact()?;
        let action = MENU[selection].1;
        if action == Action::Exit {
            break;
        }
        if let Some(command) = build_command(action, &shell)? {
            shell.dispatch(command, &mut view);
        }
    }
    Ok(())
}

/// Collect whatever input the action needs. `None` for `Exit`.
fn build_command(action: Action, shell: &Shell) -> Result<Option<Command>> {
    let command = match action {
        Action::Generate => {
            let prompt: String = Input::new()
                .with_prompt("Enter Prompt")
                .allow_empty(true)
                .interact_text()?;
            Command::Generate { prompt }
        }
        Action::Publish => {
            // Let the shell raise the warning instead of asking for a form
            // that cannot be used.
            if !shell.draft().has_article() {
                Command::Publish(PublishForm::default())
            } else {
                Command::Publish(publish_form(shell)?)
            }
        }
        Action::AttachImage => {
            let path: String = Input::new().with_prompt("Image file path").interact_text()?;
            Command::AttachImage(PathBuf::from(path.trim()))
        }
        Action::SaveArticle => Command::SaveArticle,
        Action::SaveImage => Command::SaveImage,
        Action::Clear => Command::Clear,
        Action::Refresh => Command::Refresh,
        Action::SetApiKey => {
            let key: String = Password::new().with_prompt("OpenAI API key").interact()?;
            Command::SetApiKey(key)
        }
        Action::ConfigureWordPress => Command::ConfigureWordPress(wordpress_form()?),
        Action::Exit => return Ok(None),
    };
    Ok(Some(command))
}

fn publish_form(shell: &Shell) -> Result<PublishForm> {
    let categories = shell.session().categories();
    let selected = if categories.is_empty() {
        Vec::new()
    } else {
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        let picks = MultiSelect::new()
            .with_prompt("Categories (space to toggle)")
            .items(&names)
            .interact()?;
        picks.into_iter().map(|i| categories[i].id).collect()
    };

    let schedule = if Confirm::new()
        .with_prompt("Schedule for later?")
        .default(false)
        .interact()?
    {
        Some(schedule_form()?)
    } else {
        None
    };

    Ok(PublishForm {
        categories: selected,
        schedule,
    })
}

fn schedule_form() -> Result<Schedule> {
    let today = Local::now().date_naive();
    let date: String = Input::new()
        .with_prompt("Publish Date (YYYY-MM-DD)")
        .default(today.format("%Y-%m-%d").to_string())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "expected YYYY-MM-DD".to_string())
        })
        .interact_text()?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?;

    let slots = time_slots();
    let labels: Vec<String> = slots.iter().map(|t| t.format("%H:%M").to_string()).collect();
    let pick = Select::new()
        .with_prompt("Time (Server Timezone)")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Schedule::new(date, slots[pick]))
}

fn wordpress_form() -> Result<Credentials> {
    let mut creds = Credentials::default();
    let url: String = Input::new().with_prompt("WordPress URL").interact_text()?;
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password: String = Password::new().with_prompt("Application password").interact()?;
    creds.set(WORDPRESS_URL, &url);
    creds.set(WORDPRESS_USERNAME, &username);
    creds.set(WORDPRESS_PASSWORD, &password);
    Ok(creds)
}
