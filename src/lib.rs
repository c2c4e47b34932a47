pub mod app_config;
pub mod comment;
pub mod db;
pub mod engagement;
pub mod error;
pub mod intake;
pub mod ip;
pub mod listing;
pub mod middleware;
pub mod moderation;
pub mod orm;
pub mod rate_limit;
pub mod sanitize;
pub mod store;
pub mod web;
