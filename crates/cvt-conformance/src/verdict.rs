use std::fmt;

use cvt_codec::ConversionResult;
use cvt_tables::{ByteClass, CodePageId};
use serde::Serialize;

use crate::SuiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    NarrowToWide,
    WideToNarrow,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::NarrowToWide => "narrow_to_wide",
            Direction::WideToNarrow => "wide_to_narrow",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enumerated input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CaseInput {
    Bytes(Vec<u8>),
    Wide(u32),
}

impl CaseInput {
    pub fn direction(&self) -> Direction {
        match self {
            CaseInput::Bytes(_) => Direction::NarrowToWide,
            CaseInput::Wide(_) => Direction::WideToNarrow,
        }
    }
}

impl fmt::Display for CaseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseInput::Bytes(bytes) => f.write_str(&hex_bytes(bytes)),
            CaseInput::Wide(wide) => write!(f, "U+{wide:04X}"),
        }
    }
}

/// What the codec under test returned for a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CaseResult {
    Narrow(ConversionResult<u32>),
    Wide(ConversionResult<Vec<u8>>),
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseResult::Narrow(result) => f.write_str(&describe_decoded(result)),
            CaseResult::Wide(result) => f.write_str(&describe_encoded(result)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    /// Decoding matched; the reverse leg was not checked because the input is a
    /// non-canonical member of a many-to-one mapping.
    ForwardOnly,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    pub input: CaseInput,
    pub result: CaseResult,
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Decoded or encoded value differs from the reference.
    ConversionMismatch,
    /// A truncated lead byte was not reported as partial, or a complete character was.
    PartialSequence,
    /// Input without a mapping did not produce the unmappable sentinel.
    UnmappableInput,
    /// The value converted correctly but did not convert back to the original input.
    RoundTripMismatch,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ConversionMismatch => "conversion_mismatch",
            FailureKind::PartialSequence => "partial_sequence",
            FailureKind::UnmappableInput => "unmappable_input",
            FailureKind::RoundTripMismatch => "round_trip_mismatch",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub direction: Direction,
    pub kind: FailureKind,
    pub input: CaseInput,
    pub expected: String,
    pub actual: String,
}

impl Failure {
    pub fn new(
        kind: FailureKind,
        input: CaseInput,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            direction: input.direction(),
            kind,
            input,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[FAIL] {} {}", self.direction, self.input)?;
        writeln!(f, "  kind: {}", self.kind)?;
        writeln!(f, "  expected: {}", self.expected)?;
        writeln!(f, "  actual:   {}", self.actual)
    }
}

/// Accumulated result of one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestVerdict {
    pub code_page: CodePageId,
    pub charset_size: usize,
    pub max_wide: u32,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Class observed for each byte value in `[0, charset_size)`, indexed by byte.
    pub classifications: Vec<ByteClass>,
    pub failures: Vec<Failure>,
    #[serde(skip)]
    pub cases: Vec<CaseRecord>,
}

impl TestVerdict {
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            code_page: config.code_page.clone(),
            charset_size: config.charset_size,
            max_wide: config.max_wide,
            passed: 0,
            failed: 0,
            skipped: 0,
            classifications: Vec::with_capacity(config.charset_size),
            failures: Vec::new(),
            cases: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, record: CaseRecord, failure: Option<Failure>) {
        match record.outcome {
            CaseOutcome::Passed => self.passed += 1,
            CaseOutcome::ForwardOnly => self.skipped += 1,
            CaseOutcome::Failed => self.failed += 1,
        }
        if let Some(failure) = failure {
            log::debug!(
                "{}: {} {} failed ({}): expected {}, got {}",
                self.code_page,
                failure.direction,
                failure.input,
                failure.kind,
                failure.expected,
                failure.actual
            );
            self.failures.push(failure);
        }
        self.cases.push(record);
    }

    pub(crate) fn classify(&mut self, byte: u8, class: ByteClass) {
        debug_assert_eq!(usize::from(byte), self.classifications.len());
        self.classifications.push(class);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&Failure> {
        self.failures.first()
    }

    pub fn class_count(&self, class: ByteClass) -> usize {
        self.classifications.iter().filter(|&&c| c == class).count()
    }

    pub fn failure_count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Record for an input, if it was enumerated.
    pub fn case(&self, input: &CaseInput) -> Option<&CaseRecord> {
        self.cases.iter().find(|case| &case.input == input)
    }
}

impl fmt::Display for TestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} (passed={} failed={} skipped={})",
            self.code_page,
            if self.all_passed() { "PASS" } else { "FAIL" },
            self.passed,
            self.failed,
            self.skipped
        )?;
        writeln!(
            f,
            "  bytes: single_byte={} lead_byte={} invalid={}",
            self.class_count(ByteClass::SingleByte),
            self.class_count(ByteClass::LeadByte),
            self.class_count(ByteClass::Invalid)
        )
    }
}

pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

pub(crate) fn describe_decoded(result: &ConversionResult<u32>) -> String {
    match result {
        ConversionResult::Success { output, consumed } => {
            format!("U+{output:04X} ({consumed} byte(s))")
        }
        ConversionResult::Partial { reason } => format!("partial: {reason}"),
        ConversionResult::Error { error } => format!("error: {error}"),
    }
}

pub(crate) fn describe_encoded(result: &ConversionResult<Vec<u8>>) -> String {
    match result {
        ConversionResult::Success { output, .. } => hex_bytes(output),
        ConversionResult::Partial { reason } => format!("partial: {reason}"),
        ConversionResult::Error { error } => format!("error: {error}"),
    }
}
