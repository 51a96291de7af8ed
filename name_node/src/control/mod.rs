pub mod monitor;
pub mod registro;
