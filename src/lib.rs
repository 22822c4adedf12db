//! MedRisk: length-of-stay risk prediction with per-feature attributions,
//! plus sentiment and topic analysis of patient feedback.

pub mod api;
pub mod config;
pub mod error;
pub mod feedback;
pub mod ml;
pub mod models;
pub mod state;

pub use error::{AppError, Result};
