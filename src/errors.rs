use thiserror::Error;

use crate::validate::Violation;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("provider error: {0}")] Provider(String),
    #[error("schema error: {0}")] Schema(String),
    #[error("response failed validation ({} violation(s))", .0.len())] Validation(Vec<Violation>),
    #[error("invalid input: {0}")] Input(String),
    #[error("config error: {0}")] Config(String),
}
