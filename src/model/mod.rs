pub mod attendance;
pub mod employee;
pub mod notification;
pub mod role;
