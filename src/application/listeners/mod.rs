//! Lifecycle listeners that react to notifications.

mod schedule_on_create;

pub use schedule_on_create::ScheduleOnCreate;
