//! # Burnlink Testkit
//!
//! Testing utilities for Burnlink.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a service over an inspectable store, driven by a manual
//!   clock and optionally scripted ids
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use burnlink_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let id = fixture.service.create(CreateOptions::new("hi")).await?;
//! fixture.advance_hours(25);
//! assert!(fixture.service.read(id.as_str()).await.is_err());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use burnlink_testkit::generators::CreateParams;
//!
//! proptest! {
//!     #[test]
//!     fn create_accepts_valid_params(params: CreateParams) {
//!         // params.to_options() always passes validation
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{codec_for, test_codec, ManualClock, ScriptedIds, TestFixture, TEST_SECRET};
pub use generators::{compound_document, CreateParams};
