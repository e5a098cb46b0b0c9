pub mod rbac;
pub mod staff;
pub mod system;
