pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod usecases;
