pub mod assets;
pub mod assignments;
pub mod reports;
pub mod users;
