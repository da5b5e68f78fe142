//! Common test utilities and helper modules
//!
//! This module provides shared functionality for all test files,
//! including a scripted analysis engine and position helpers.
