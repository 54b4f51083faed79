//! Validation & asset-state workflow engine.
//!
//! Field reports (visits, claimed payments) enter PENDING via [`submission`],
//! are decided by admins/managers via [`validation`], and approved decisions
//! feed the pure [`projector`] which may advance the parent asset's status.
//! [`dashboard`] computes read-only rollups over the same entities.

use thiserror::Error;

use crate::database::manager::DatabaseError;

pub mod dashboard;
pub mod projector;
pub mod submission;
pub mod validation;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
