pub mod config;
pub mod espn_fetch;
pub mod highlights;
pub mod http_client;
pub mod identity_cache;
pub mod matcher;
pub mod model;
pub mod name_resolver;
pub mod name_tables;
pub mod pipeline;
pub mod render;
pub mod secondary_fetch;
pub mod stat_normalize;
pub mod teams;
pub mod telegram;
