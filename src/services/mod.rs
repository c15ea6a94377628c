pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod m3u_parser;
pub mod metrics;
pub mod normalizer;
pub mod prober;
pub mod verifier;
