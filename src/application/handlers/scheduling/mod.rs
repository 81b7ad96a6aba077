//! Scheduling command handlers.

mod schedule_experiment;
mod schedule_task;

pub use schedule_experiment::{
    ScheduleExperimentCommand, ScheduleExperimentError, ScheduleExperimentHandler,
    ScheduleExperimentResult,
};
pub use schedule_task::ScheduleExperimentTask;
