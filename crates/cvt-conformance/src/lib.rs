//! Conformance harness for narrow <-> wide conversion facets.
//!
//! Given a codec, the reference table for its code page, and a [`SuiteConfig`], the
//! harness enumerates every byte value in `[0, charset_size)` (plus each multi-byte
//! sequence the reference lists under a lead byte) and every wide value in
//! `[0, max_wide]`, checks each conversion against the reference, and collects the
//! outcome in a [`TestVerdict`]. A failing case never stops the run.
//!
//! ```no_run
//! use cvt_conformance::SuiteSpec;
//!
//! let verdict = SuiteSpec::cp1258().run().expect("valid configuration");
//! assert!(verdict.all_passed(), "{verdict}");
//! ```

pub mod cli;
mod config;
mod error;
mod suite;
mod verdict;

pub use config::{
    CodecKind, Manifest, SuiteConfig, SuiteSpec, DEFAULT_CHARSET_SIZE, DEFAULT_MAX_WIDE,
};
pub use error::HarnessError;
pub use suite::{run_conversion_suite, ConversionSuite, RunState};
pub use verdict::{
    CaseInput, CaseOutcome, CaseRecord, CaseResult, Direction, Failure, FailureKind, TestVerdict,
};
