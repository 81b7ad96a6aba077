//! Experiment Lifecycle - Experiment and job status tracking and scheduling
//!
//! This crate records append-only status ledgers for experiments and their
//! jobs, derives an experiment's status from its jobs, broadcasts lifecycle
//! notifications and schedules experiment builds through a task queue.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
