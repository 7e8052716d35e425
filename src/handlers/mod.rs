// src/handlers/mod.rs

pub mod course;
pub mod progress;
