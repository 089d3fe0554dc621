//! Client code for pixcache.
//!
//! This crate provides the HTTP remote source for the Unsplash search API and
//! a TCP connectivity probe, both shared by the server.

pub mod probe;
pub mod unsplash;

pub use probe::TcpProbe;
pub use unsplash::{SearchRequest, SearchResponseDto, UnsplashClient, UnsplashConfig, UnsplashError};
