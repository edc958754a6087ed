//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must share a
//! transaction take `&mut PgConnection` instead.

pub mod approval_action_repo;
pub mod clearance_repo;
pub mod notification_repo;
pub mod office_repo;
pub mod program_repo;
pub mod user_repo;
pub mod workflow_repo;

pub use approval_action_repo::ApprovalActionRepo;
pub use clearance_repo::ClearanceRepo;
pub use notification_repo::NotificationRepo;
pub use office_repo::OfficeRepo;
pub use program_repo::ProgramRepo;
pub use user_repo::UserRepo;
pub use workflow_repo::WorkflowRepo;
