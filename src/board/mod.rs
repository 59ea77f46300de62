//! Client for the external job board API.

mod client;
mod models;

pub use client::{HhJobBoard, JobBoard};
pub use models::{BoardSalary, BoardVacancy};
