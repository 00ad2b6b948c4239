// src/utils/mod.rs

pub mod lock;
