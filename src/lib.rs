//! cabal-outdated - Outdated dependency reporter library
//!
//! This library finds declared dependencies that have newer versions in a
//! package index. Dependencies are read from one of:
//! - The legacy freeze file (cabal.config)
//! - The project freeze file (cabal.project.freeze)
//! - The package description (*.cabal), finalized for a compiler and platform

pub mod cli;
pub mod domain;
pub mod error;
pub mod index;
pub mod logging;
pub mod orchestrator;
pub mod outdated;
pub mod output;
pub mod source;
