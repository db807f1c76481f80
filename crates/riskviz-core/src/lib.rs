pub mod agent;
pub mod conversation;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod workbook;

// Re-export common error type
pub use error::RiskvizError;
