//! 领域层

pub mod module;
pub mod role;
pub mod unit_of_work;
