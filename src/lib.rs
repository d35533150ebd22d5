pub mod audit;
pub mod config;
pub mod crypto;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod media;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod order_status;
pub mod permissions;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
