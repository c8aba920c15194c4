pub mod serve;
pub mod snapshot;
