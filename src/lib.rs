// Library root
// -----------
// The binary (`main.rs`) builds a `Session`, wraps it in a `Shell` and hands
// it to the terminal UI loop.
//
// Module responsibilities:
// - `config`: file locations and the key=value credential store.
// - `ai`: text and image generation calls.
// - `wordpress`: media upload, categories and post creation.
// - `session`: clients and cached categories for one run, with `refresh`.
// - `shell`: the generate/review/publish state machine and the `Frontend`
//   trait any UI implements.
// - `ui`: the terminal front end.
pub mod ai;
pub mod config;
pub mod error;
pub mod session;
pub mod shell;
pub mod ui;
pub mod wordpress;

pub use error::{Result, StudioError};
