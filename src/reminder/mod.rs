//! Reminder scheduling

pub mod scheduler;
pub mod timer;

pub use scheduler::{Reminder, ReminderScheduler, ReminderState};
pub use timer::TimerHandle;
