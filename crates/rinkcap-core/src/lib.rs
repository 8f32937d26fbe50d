// Library root: the valuation and roster-optimization engine for a salary-cap
// fantasy hockey league.

pub mod config;
pub mod optimizer;
pub mod pool;
pub mod session;
pub mod valuation;
