pub mod scheduler;

pub use scheduler::{build_schedule, NotificationScheduler};
