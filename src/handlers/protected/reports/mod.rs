pub mod create;
pub mod list;
pub mod record;

pub use create::report_post;
pub use list::reports_get;
pub use record::{report_delete, report_get};
