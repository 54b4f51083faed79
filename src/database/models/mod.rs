pub mod asset;
pub mod assignment;
pub mod report;
pub mod user;

pub use asset::{Asset, AssetStatus};
pub use assignment::{Assignment, AssignmentStatus};
pub use report::{PaymentReport, ReportStatus, VisitReport};
pub use user::User;
