pub mod history;
pub mod import;
pub mod processing;
pub mod profile;
pub mod server;
pub mod stats;

pub use history::HistoryService;
pub use import::ImportService;
pub use processing::ProcessingService;
pub use profile::ProfileService;
pub use server::ServerService;
pub use stats::StatsService;
