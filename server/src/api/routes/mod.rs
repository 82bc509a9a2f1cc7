//! API route modules

pub mod activity;
pub mod agreements;
pub mod auth;
pub mod employees;
pub mod health;
pub mod infra;
pub mod leads;
pub mod links;
pub mod projects;
pub mod proposals;
pub mod tasks;
pub mod team;
