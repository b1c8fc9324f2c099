pub mod config;
pub mod error;
pub mod machine;
pub mod report;
