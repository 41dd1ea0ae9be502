// Infrastructure layer - External dependencies and adapters
pub mod chart_mapper;
pub mod config;
pub mod event_stream;
pub mod firebase_repository;
pub mod json_response;
