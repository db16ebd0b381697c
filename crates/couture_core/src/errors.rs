//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every recoverable failure mode:
//! - Asset loading and decoding errors (mesh, texture, cube map)
//! - Material registry operations issued before a mesh was captured
//! - Unknown style preset names
//! - Property updates the active material family does not support
//!
//! None of these is fatal. The UI layer either offers a retry (asset
//! loads) or keeps the previous visual state on screen.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use couture_core::errors::{Error, Result};
//!
//! fn apply() -> Result<()> {
//!     Err(Error::NotReady("switch_family"))
//! }
//! ```

use thiserror::Error;

/// The main error type for the Couture viewer.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// A mesh or texture could not be fetched or parsed.
    ///
    /// The previously displayed state stays intact.
    #[error("Failed to load asset '{asset}': {reason}")]
    AssetLoad {
        /// Asset identifier (file name or URL)
        asset: String,
        /// Human readable cause
        reason: String,
    },

    /// Data was structurally invalid (e.g. cube faces of different sizes).
    #[error("Invalid asset data: {0}")]
    InvalidData(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration, measurement tables).
    #[error("Format error: {0}")]
    Format(String),

    /// A background decoding task failed to complete.
    #[error("Task join error: {0}")]
    TaskJoin(String),

    // ========================================================================
    // Material Registry Errors
    // ========================================================================
    /// A registry operation was issued before any mesh was captured.
    #[error("Material registry is not ready: '{0}' called before a mesh was captured")]
    NotReady(&'static str),

    /// The property is not part of the active material family's schema.
    #[error("Property '{property}' is not supported by the {family} family")]
    UnsupportedProperty {
        /// Property name as exposed to the UI
        property: &'static str,
        /// Family name
        family: &'static str,
    },

    /// The value kind does not match the property's schema.
    #[error("Property '{property}' expects a {expected} value")]
    PropertyType {
        /// Property name as exposed to the UI
        property: &'static str,
        /// Expected value kind
        expected: &'static str,
    },

    // ========================================================================
    // Style Preset Errors
    // ========================================================================
    /// No preset with the given name exists.
    #[error("Unknown style preset: {0}")]
    UnknownPreset(String),
}

impl Error {
    /// Shorthand for [`Error::AssetLoad`].
    pub fn asset_load(asset: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetLoad {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors the UI boundary should log and ignore.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(
            self,
            Self::NotReady(_) | Self::UnsupportedProperty { .. }
        )
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
