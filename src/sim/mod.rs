pub mod config;
pub mod report;
pub mod top;
pub mod trace;
