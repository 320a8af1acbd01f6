pub mod breakdown;
pub mod dashboard;
pub mod export;
pub mod init;
pub mod issues;
pub mod summary;
pub mod trend;
pub mod values;
