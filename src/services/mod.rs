//! Services separating I/O and format concerns from the extraction pipeline

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
