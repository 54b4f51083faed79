pub mod assets;
pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod reports;
