// src/models/mod.rs

pub mod checkpoint;
pub mod submission;
pub mod team;
