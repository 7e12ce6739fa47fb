//! Opening websites, applications, and arbitrary targets

pub mod apps;
pub mod desktop;
pub mod resolver;

pub use apps::{lookup_app, AppTarget, KNOWN_APPS};
pub use desktop::{Desktop, SystemDesktop};
pub use resolver::{
    looks_like_url, normalize_website, Attempt, AttemptOutcome, LaunchReport, LaunchResolver,
    Strategy,
};
