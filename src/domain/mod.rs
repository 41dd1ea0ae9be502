// Domain layer - Core models with no external I/O
pub mod date_range;
pub mod reading;
pub mod telemetry;
pub mod view;
