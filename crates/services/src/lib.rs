#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod dwell;
pub mod error;
pub mod ledger;
pub mod theory;

pub use learn_core::Clock;

pub use app_services::AppServices;
pub use config::{RetakePolicy, SessionConfig};
pub use error::{AppServicesError, SessionError};
pub use ledger::ModuleProgress;
pub use theory::{LessonView, Mode, TheorySession};
