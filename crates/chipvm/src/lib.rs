pub mod disasm;
pub mod driver;
pub mod screen;

pub use chipvm_core;
pub use driver::{Driver, DriverConfig, RunSummary, StopReason};
pub use screen::Color;
