// src/models/mod.rs

pub mod catalog;
pub mod completion;
pub mod course;
