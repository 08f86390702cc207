// Post archiver library: fetch a post feed, filter by author, archive to blob storage

pub mod config;
pub mod errors;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod schedule;
pub mod source;
pub mod storage;
pub mod telemetry;
