//! Embassy tasks

mod console;
mod monitor;

pub use console::run_console;
pub use monitor::monitor_task;
