pub mod clock;
pub mod config;
pub mod notifications;
pub mod scheduler;
pub mod task;

pub use crate::config::SchedulerConfig;
pub use crate::scheduler::{
    NotificationScheduler, NotificationSchedulerBuilder, QuickAdd, ScheduleOutcome, SkipReason,
};
pub use crate::task::Task;
