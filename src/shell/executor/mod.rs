mod executor;
pub mod sys;

pub use executor::run_cmd;
