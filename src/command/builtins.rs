//! Canned replies: jokes, time, date

use chrono::Local;
use rand::seq::SliceRandom;

pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "Why did the function return early? Because it had commitment issues.",
    "I would tell you a UDP joke, but you might not get it.",
    "Why do Java developers wear glasses? Because they don't C sharp.",
];

/// Pick a random joke.
pub fn pick_joke() -> &'static str {
    JOKES.choose(&mut rand::thread_rng()).copied().unwrap_or(JOKES[0])
}

/// Clock time the way it is spoken, e.g. "03:42 PM".
pub fn current_time_phrase() -> String {
    Local::now().format("%I:%M %p").to_string()
}

/// Today's date the way it is spoken, e.g. "August 21, 2026".
pub fn current_date_phrase() -> String {
    Local::now().format("%B %d, %Y").to_string()
}
