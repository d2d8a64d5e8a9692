//! backup-pruner application layer: ports, retention evaluation and
//! deletion orchestration.
pub mod ports;
pub mod services;
pub mod use_cases;
