//! # abx-core
//!
//! The deterministic recommendation pipeline: classification, drug
//! selection, and dose calculation, composed by `RecommendationEngine`.
//!
//! This crate provides:
//! - The allergy and infection classifiers (`classify`)
//! - Weight selection and creatinine-clearance derivation (`weight`)
//! - Drug selection (`select`) and dose calculation (`dose`)
//! - Layered configuration (`config`)
//! - The `AuditWriter` trust boundary (`traits`) and the `RecommendationEngine`
//!   that wires everything together (`engine`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use abx_core::{RecommendationEngine, config::EngineConfig, traits::AuditWriter};
//! ```

pub mod classify;
pub mod config;
pub mod dose;
pub mod engine;
pub mod select;
pub mod traits;
pub mod weight;

pub use engine::RecommendationEngine;
