// Application layer - Use cases over the reading store
pub mod chart_controller;
pub mod history_loader;
pub mod history_service;
pub mod live_buffer;
#[cfg(test)]
pub mod memory_repository;
pub mod streaming_service;
pub mod telemetry_repository;
pub mod view_service;
