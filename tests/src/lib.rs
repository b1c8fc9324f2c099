mod batch;
mod runner;
mod support;
