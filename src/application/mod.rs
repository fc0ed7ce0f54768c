pub mod navigation;
pub mod transaction;
