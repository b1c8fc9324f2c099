pub mod aggregator;
pub mod batch;
pub mod machine;
pub mod runner;
pub mod validator;
