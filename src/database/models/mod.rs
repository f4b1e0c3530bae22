pub mod report;
pub mod user;

pub use report::{NewReport, Report};
pub use user::User;
