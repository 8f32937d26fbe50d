// Command-line collaborator: CSV ingestion and report rendering around the
// rinkcap-core engine.

pub mod cli;
pub mod import;
pub mod report;
