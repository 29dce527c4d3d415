//! Core types shared across the application.
//!
//! Currently this is configuration: file loading, defaults and environment
//! overrides.

mod config;

pub use config::{
    AiConfig, BrandingConfig, Config, DatabaseConfig, ImgbbConfig, LangfuseConfig, PdfConfig,
    PdfEngine, ServerConfig,
};
