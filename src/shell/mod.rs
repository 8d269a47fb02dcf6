mod executor;
mod parser;
mod readline;
mod shell;

pub use executor::sys::ensure_std_fds;
pub use shell::Shell;
