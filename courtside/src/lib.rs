//! Natural-language questions about NBA player statistics, answered from
//! the stats provider and narrated by a language model.

pub mod chart;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod repository;
pub mod services;
pub mod stats;
