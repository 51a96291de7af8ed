use dfs_driver_error::DfsDriverError;

pub mod dfs_driver;
pub mod dfs_driver_error;
pub type DfsDriverResult<T> = Result<T, DfsDriverError>;
