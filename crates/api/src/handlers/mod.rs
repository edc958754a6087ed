pub mod clearance;
pub mod notification;
pub mod office;
pub mod program;
pub mod workflow;
