//! Action stream interpreter
//!
//! Replays a patch's action stream against a source buffer to rebuild the
//! target. A pass moves through [`ApplyState`]s in order:
//!
//! `Idle -> ValidatingSource -> InterpretingActions -> ValidatingTarget -> Done`
//!
//! and lands in `Failed` from whichever step returns an error. Three cursors
//! thread through the pass: the output position, the source copy position
//! and the target copy position. Every cursor update is checked; nothing
//! wraps.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::checksum::verify_checksum;
use crate::error::{BpsError, Field, Result};
use crate::format::Action;
use crate::patch::Patch;
use crate::validation::{checked_span, displace, to_usize};

/// Where an interpretation pass is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    /// Not started
    Idle,
    /// Checking the source size and checksum
    ValidatingSource,
    /// Executing actions
    InterpretingActions,
    /// Checking the target checksum
    ValidatingTarget,
    /// Target rebuilt and verified
    Done,
    /// Stopped with an error
    Failed(BpsError),
}

/// The three cursors of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursors {
    /// Next target byte to write
    pub output: u64,
    /// Read position of source copies
    pub source: u64,
    /// Read position of target copies
    pub target: u64,
}

/// Executes one patch against one source
#[derive(Debug, Clone)]
pub struct Interpreter<'a> {
    patch: Patch<'a>,
    source: &'a [u8],
    cursors: Cursors,
    state: ApplyState,
    actions_executed: u64,
}

impl<'a> Interpreter<'a> {
    /// Prepare a pass; `source` may be longer than the patch's source size
    pub const fn new(patch: Patch<'a>, source: &'a [u8]) -> Self {
        Self {
            patch,
            source,
            cursors: Cursors {
                output: 0,
                source: 0,
                target: 0,
            },
            state: ApplyState::Idle,
            actions_executed: 0,
        }
    }

    pub const fn state(&self) -> ApplyState {
        self.state
    }

    pub const fn cursors(&self) -> Cursors {
        self.cursors
    }

    /// Actions completed in the last pass
    pub const fn actions_executed(&self) -> u64 {
        self.actions_executed
    }

    /// Run a full pass writing into `target`
    ///
    /// `target` must be exactly the patch's target size. It is zero-filled
    /// before the first action. On `TargetChecksumMismatch` it holds the
    /// complete, unverified result; after any other error its content is
    /// unspecified.
    pub fn run(&mut self, target: &mut [u8]) -> Result<()> {
        self.reset();
        let result = self.run_pass(target);
        self.settle(result)
    }

    /// Run a full pass into a newly allocated target
    ///
    /// The target is allocated only once the source has been validated, and
    /// an allocation failure is reported instead of aborting. A target
    /// checksum mismatch still yields the buffer, flagged as unverified.
    #[cfg(feature = "alloc")]
    pub fn run_to_vec(&mut self) -> Result<Applied> {
        self.reset();
        let mut target = Vec::new();
        let result = self.run_owned_pass(&mut target);
        match self.settle(result) {
            Ok(()) => Ok(Applied {
                target,
                checksum_mismatch: None,
            }),
            Err(err @ BpsError::TargetChecksumMismatch { .. }) => Ok(Applied {
                target,
                checksum_mismatch: Some(err),
            }),
            Err(err) => Err(err),
        }
    }

    fn reset(&mut self) {
        self.cursors = Cursors::default();
        self.actions_executed = 0;
    }

    fn settle(&mut self, result: Result<()>) -> Result<()> {
        self.state = match result {
            Ok(()) => ApplyState::Done,
            Err(err) => ApplyState::Failed(err),
        };
        result
    }

    fn run_pass(&mut self, target: &mut [u8]) -> Result<()> {
        self.state = ApplyState::ValidatingSource;
        let source = self.validated_source()?;
        self.interpret(source, target)
    }

    #[cfg(feature = "alloc")]
    fn run_owned_pass(&mut self, target: &mut Vec<u8>) -> Result<()> {
        self.state = ApplyState::ValidatingSource;
        let source = self.validated_source()?;
        *target = zeroed_target(self.patch.target_size())?;
        self.interpret(source, target)
    }

    fn interpret(&mut self, source: &[u8], target: &mut [u8]) -> Result<()> {
        let target_size = self.patch.target_size();
        if target.len() as u64 != target_size {
            return Err(BpsError::TargetSizeMismatch {
                expected: target_size,
                actual: target.len() as u64,
            });
        }
        target.fill(0);

        self.state = ApplyState::InterpretingActions;
        for action in self.patch.actions() {
            self.execute(action?, source, target)?;
            self.actions_executed += 1;
        }

        self.state = ApplyState::ValidatingTarget;
        let expected = self.patch.target_checksum();
        verify_checksum(target, expected)
            .map_err(|actual| BpsError::TargetChecksumMismatch { expected, actual })
    }

    fn validated_source(&self) -> Result<&'a [u8]> {
        let expected = self.patch.source_size();
        let len = to_usize(expected, Field::SourceSize)?;
        let source = self
            .source
            .get(..len)
            .ok_or(BpsError::SourceSizeMismatch {
                expected,
                actual: self.source.len() as u64,
            })?;

        let expected = self.patch.source_checksum();
        verify_checksum(source, expected)
            .map_err(|actual| BpsError::SourceChecksumMismatch { expected, actual })?;
        Ok(source)
    }

    fn execute(&mut self, action: Action<'_>, source: &[u8], target: &mut [u8]) -> Result<()> {
        let kind = action.kind();
        let out_of_bounds = || BpsError::CursorOutOfBounds(kind);
        let length = action.length();
        let output =
            checked_span(self.cursors.output, length, target.len()).ok_or_else(out_of_bounds)?;

        match action {
            Action::SourceRead { .. } => {
                let input = checked_span(self.cursors.output, length, source.len())
                    .ok_or_else(out_of_bounds)?;
                target[output].copy_from_slice(&source[input]);
            }
            Action::TargetRead { data } => {
                target[output].copy_from_slice(data);
            }
            Action::SourceCopy { displacement, .. } => {
                let cursor =
                    displace(self.cursors.source, displacement).ok_or_else(out_of_bounds)?;
                let input = checked_span(cursor, length, source.len()).ok_or_else(out_of_bounds)?;
                target[output].copy_from_slice(&source[input]);
                self.cursors.source = cursor + length;
            }
            Action::TargetCopy { displacement, .. } => {
                let cursor =
                    displace(self.cursors.target, displacement).ok_or_else(out_of_bounds)?;
                let input = checked_span(cursor, length, target.len()).ok_or_else(out_of_bounds)?;
                // Byte at a time: the input may overlap bytes written by this
                // same action, which is how runs are expanded.
                for (dst, src) in output.zip(input) {
                    target[dst] = target[src];
                }
                self.cursors.target = cursor + length;
            }
        }

        self.cursors.output += length;
        Ok(())
    }
}

impl Patch<'_> {
    /// Rebuild the target into a caller-owned buffer
    ///
    /// See [`Interpreter::run`] for the buffer contract.
    pub fn apply_into(&self, source: &[u8], target: &mut [u8]) -> Result<()> {
        Interpreter::new(*self, source).run(target)
    }

    /// Rebuild the target, failing on any checksum mismatch
    #[cfg(feature = "alloc")]
    pub fn apply(&self, source: &[u8]) -> Result<Vec<u8>> {
        let applied = self.apply_advisory(source)?;
        match applied.checksum_mismatch {
            None => Ok(applied.target),
            Some(err) => Err(err),
        }
    }

    /// Rebuild the target, returning it even if its checksum does not match
    ///
    /// A target checksum mismatch points at a corrupted action stream or an
    /// interpreter defect rather than bad input; the buffer is advisory only.
    #[cfg(feature = "alloc")]
    pub fn apply_advisory(&self, source: &[u8]) -> Result<Applied> {
        Interpreter::new(*self, source).run_to_vec()
    }
}

/// Zero-filled buffer of `size` bytes, or an error if it cannot be allocated
#[cfg(feature = "alloc")]
fn zeroed_target(size: u64) -> Result<Vec<u8>> {
    let len = to_usize(size, Field::TargetSize)?;
    let mut target = Vec::new();
    target
        .try_reserve_exact(len)
        .map_err(|_| BpsError::TargetAllocation { size })?;
    target.resize(len, 0);
    Ok(target)
}

/// Target buffer with its checksum verdict
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub target: Vec<u8>,
    /// The `TargetChecksumMismatch` error, if the checksum failed
    pub checksum_mismatch: Option<BpsError>,
}

#[cfg(feature = "alloc")]
impl Applied {
    pub const fn is_verified(&self) -> bool {
        self.checksum_mismatch.is_none()
    }

    /// Checksum of the produced target
    pub fn target_checksum(&self) -> u32 {
        crate::checksum::compute_checksum(&self.target)
    }
}
