// src/handlers/mod.rs

pub mod seed;
pub mod submission;
pub mod teams;
