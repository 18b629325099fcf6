// Library surface for the binary, integration tests and embedding in a UI shell.
pub mod animation;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod game;
pub mod geometry;
pub mod ids;
pub mod interaction;
pub mod item;
pub mod layout;
pub mod placement;
pub mod runtime;
pub mod schedule;
pub mod sequence;
pub mod session;
pub mod simulate;
pub mod state;
pub mod stats;

pub use config::Config;
pub use game::{GameKind, GameStrategy};
pub use session::SessionController;
