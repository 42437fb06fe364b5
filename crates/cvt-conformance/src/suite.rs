use cvt_codec::{Codec, ConversionError, ConversionResult};
use cvt_tables::{ByteClass, ReferenceTable};

use crate::verdict::{describe_decoded, describe_encoded, hex_bytes};
use crate::{
    CaseInput, CaseOutcome, CaseRecord, CaseResult, Failure, FailureKind, HarnessError,
    SuiteConfig, TestVerdict,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

type CaseCheck = (CaseOutcome, Option<Failure>);

/// One run of the conversion suite against a codec and its reference table.
///
/// A suite runs at most once. Configuration errors leave it in
/// [`RunState::NotStarted`]; a finished run moves it to [`RunState::Completed`].
pub struct ConversionSuite<'a> {
    codec: &'a dyn Codec,
    reference: &'a dyn ReferenceTable,
    config: SuiteConfig,
    state: RunState,
}

impl<'a> ConversionSuite<'a> {
    pub fn new(
        codec: &'a dyn Codec,
        reference: &'a dyn ReferenceTable,
        config: SuiteConfig,
    ) -> Self {
        Self {
            codec,
            reference,
            config,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn run(&mut self) -> Result<TestVerdict, HarnessError> {
        if self.state != RunState::NotStarted {
            return Err(HarnessError::AlreadyCompleted(self.config.code_page.clone()));
        }
        self.config.validate(self.codec, self.reference)?;

        self.state = RunState::Running;
        let mut verdict = TestVerdict::new(&self.config);
        self.run_narrow(&mut verdict);
        self.run_wide(&mut verdict);
        self.state = RunState::Completed;

        log::info!(
            "{}: passed={} failed={} skipped={}",
            verdict.code_page,
            verdict.passed,
            verdict.failed,
            verdict.skipped
        );
        Ok(verdict)
    }

    fn run_narrow(&self, verdict: &mut TestVerdict) {
        for value in 0..self.config.charset_size {
            // `validate` caps charset_size at 256.
            let byte = value as u8;
            let input = [byte];
            let result = self.codec.decode(&input);
            verdict.classify(byte, observed_class(&result));

            let is_lead = self.reference.classify_byte(byte) == ByteClass::LeadByte;
            let (outcome, failure) = if is_lead {
                self.check_lead(byte, &result)
            } else {
                match self.reference.decode(&input) {
                    Some(wide) => self.check_decoded(&input, wide, &result),
                    None => check_unmapped_bytes(&input, &result),
                }
            };
            verdict.record(
                CaseRecord {
                    input: CaseInput::Bytes(input.to_vec()),
                    result: CaseResult::Narrow(result),
                    outcome,
                },
                failure,
            );

            if is_lead {
                for (sequence, wide) in self.reference.sequences_with_lead(byte) {
                    let result = self.codec.decode(&sequence);
                    let (outcome, failure) = match wide {
                        Some(wide) => self.check_decoded(&sequence, wide, &result),
                        None => check_unmapped_bytes(&sequence, &result),
                    };
                    verdict.record(
                        CaseRecord {
                            input: CaseInput::Bytes(sequence),
                            result: CaseResult::Narrow(result),
                            outcome,
                        },
                        failure,
                    );
                }
            }
        }
    }

    fn run_wide(&self, verdict: &mut TestVerdict) {
        for wide in 0..=self.config.max_wide {
            let result = self.codec.encode(wide);
            let (outcome, failure) = match self.reference.encode(wide) {
                Some(expected) => self.check_encoded(wide, expected, &result),
                None => check_unmapped_wide(wide, &result),
            };
            verdict.record(
                CaseRecord {
                    input: CaseInput::Wide(wide),
                    result: CaseResult::Wide(result),
                    outcome,
                },
                failure,
            );
        }
    }

    /// A lone lead byte at the end of the buffer must be reported as partial.
    fn check_lead(&self, byte: u8, result: &ConversionResult<u32>) -> CaseCheck {
        if result.is_partial() {
            return (CaseOutcome::Passed, None);
        }
        failed(Failure::new(
            FailureKind::PartialSequence,
            CaseInput::Bytes(vec![byte]),
            "partial (truncated lead byte)",
            describe_decoded(result),
        ))
    }

    fn check_decoded(&self, bytes: &[u8], wide: u32, result: &ConversionResult<u32>) -> CaseCheck {
        let input = || CaseInput::Bytes(bytes.to_vec());
        let expected = || format!("U+{wide:04X} ({} byte(s))", bytes.len());

        match result {
            ConversionResult::Success { output, consumed }
                if *output == wide && *consumed == bytes.len() => {}
            ConversionResult::Partial { .. } => {
                return failed(Failure::new(
                    FailureKind::PartialSequence,
                    input(),
                    expected(),
                    describe_decoded(result),
                ))
            }
            _ => {
                return failed(Failure::new(
                    FailureKind::ConversionMismatch,
                    input(),
                    expected(),
                    describe_decoded(result),
                ))
            }
        }

        // Non-canonical members of a many-to-one mapping are only checked forward.
        if !self.reference.is_canonical(bytes) {
            return (CaseOutcome::ForwardOnly, None);
        }

        let encoded = self.codec.encode(wide);
        match &encoded {
            ConversionResult::Success { output, .. } if output.as_slice() == bytes => {
                (CaseOutcome::Passed, None)
            }
            _ => failed(Failure::new(
                FailureKind::RoundTripMismatch,
                input(),
                format!("U+{wide:04X} re-encodes to {}", hex_bytes(bytes)),
                format!("U+{wide:04X} re-encodes to {}", describe_encoded(&encoded)),
            )),
        }
    }

    fn check_encoded(
        &self,
        wide: u32,
        expected: &[u8],
        result: &ConversionResult<Vec<u8>>,
    ) -> CaseCheck {
        let output = match result {
            ConversionResult::Success { output, .. } if output.as_slice() == expected => output,
            _ => {
                return failed(Failure::new(
                    FailureKind::ConversionMismatch,
                    CaseInput::Wide(wide),
                    hex_bytes(expected),
                    describe_encoded(result),
                ))
            }
        };

        let decoded = self.codec.decode(output);
        match decoded {
            ConversionResult::Success {
                output: back,
                consumed,
            } if back == wide && consumed == output.len() => (CaseOutcome::Passed, None),
            _ => failed(Failure::new(
                FailureKind::RoundTripMismatch,
                CaseInput::Wide(wide),
                format!("{} decodes to U+{wide:04X}", hex_bytes(output)),
                format!("{} decodes to {}", hex_bytes(output), describe_decoded(&decoded)),
            )),
        }
    }
}

/// Run one suite to completion.
pub fn run_conversion_suite(
    codec: &dyn Codec,
    reference: &dyn ReferenceTable,
    config: &SuiteConfig,
) -> Result<TestVerdict, HarnessError> {
    ConversionSuite::new(codec, reference, config.clone()).run()
}

fn observed_class(result: &ConversionResult<u32>) -> ByteClass {
    match result {
        ConversionResult::Success { .. } => ByteClass::SingleByte,
        ConversionResult::Partial { .. } => ByteClass::LeadByte,
        ConversionResult::Error { .. } => ByteClass::Invalid,
    }
}

fn failed(failure: Failure) -> CaseCheck {
    (CaseOutcome::Failed, Some(failure))
}

fn is_narrow_sentinel(result: &ConversionResult<u32>) -> bool {
    matches!(
        result,
        ConversionResult::Error {
            error: ConversionError::Unmappable | ConversionError::InvalidSequence
        }
    )
}

fn check_unmapped_bytes(bytes: &[u8], result: &ConversionResult<u32>) -> CaseCheck {
    if is_narrow_sentinel(result) {
        return (CaseOutcome::Passed, None);
    }
    failed(Failure::new(
        FailureKind::UnmappableInput,
        CaseInput::Bytes(bytes.to_vec()),
        format!("error: {}", ConversionError::Unmappable),
        describe_decoded(result),
    ))
}

fn check_unmapped_wide(wide: u32, result: &ConversionResult<Vec<u8>>) -> CaseCheck {
    if let ConversionResult::Error {
        error: ConversionError::Unmappable,
    } = result
    {
        return (CaseOutcome::Passed, None);
    }
    failed(Failure::new(
        FailureKind::UnmappableInput,
        CaseInput::Wide(wide),
        format!("error: {}", ConversionError::Unmappable),
        describe_encoded(result),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvt_codec::Cp1258;
    use cvt_tables::{CodePageId, MappingTable};

    #[test]
    fn state_moves_from_not_started_to_completed() {
        let codec = Cp1258::<u16>::new();
        let reference = MappingTable::bundled(&CodePageId::from_number(1258)).unwrap();
        let config = SuiteConfig::new(CodePageId::from_number(1258), 0x80, 0x7F);
        let mut suite = ConversionSuite::new(&codec, &reference, config);
        assert_eq!(suite.state(), RunState::NotStarted);

        let verdict = suite.run().unwrap();
        assert_eq!(suite.state(), RunState::Completed);
        assert!(verdict.all_passed());
        assert_eq!(verdict.total(), 0x80 + 0x80);

        assert!(matches!(
            suite.run(),
            Err(HarnessError::AlreadyCompleted(_))
        ));
    }

    #[test]
    fn setup_errors_leave_the_suite_unstarted() {
        let codec = Cp1258::<u16>::new();
        let reference = MappingTable::bundled(&CodePageId::from_number(1258)).unwrap();
        let config = SuiteConfig::new(CodePageId::from_number(1258), 0, 0xFF);
        let mut suite = ConversionSuite::new(&codec, &reference, config);
        assert!(matches!(
            suite.run(),
            Err(HarnessError::InvalidCharsetSize(0))
        ));
        assert_eq!(suite.state(), RunState::NotStarted);
    }

    #[test]
    fn observed_classes_follow_result_shape() {
        assert_eq!(
            observed_class(&ConversionResult::success(0x41, 1)),
            ByteClass::SingleByte
        );
        assert_eq!(
            observed_class(&ConversionResult::truncated(0x81, 1)),
            ByteClass::LeadByte
        );
        assert_eq!(
            observed_class(&ConversionResult::error(ConversionError::Unmappable)),
            ByteClass::Invalid
        );
    }
}
