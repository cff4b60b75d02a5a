pub mod cache;
pub mod sim;
pub mod traffic;
pub mod ui;
