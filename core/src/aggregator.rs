//! # Result Aggregation
//!
//! Re-sorts settled results into original descriptor order and seals them
//! into a [`BatchResult`]. Completion order is whatever the scheduler made
//! of it; output order is deterministic and equals input order.

use diagr_common::error::InvariantViolation;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::{BatchEntry, BatchResult};

use crate::runner::SettledResult;

/// Builds the sealed, input-ordered report from unordered settled results.
///
/// Fails only on a broken runner contract: an index outside the descriptor
/// range, a machine that settled twice, or one that never settled.
pub fn aggregate(
    descriptors: Vec<MachineDescriptor>,
    settled: Vec<SettledResult>,
) -> Result<BatchResult, InvariantViolation> {
    let len = descriptors.len();
    let mut slots: Vec<Option<_>> = Vec::with_capacity(len);
    slots.resize_with(len, || None);

    for (index, result) in settled {
        if index >= len {
            return Err(InvariantViolation::IndexOutOfRange { index, len });
        }
        if slots[index].is_some() {
            return Err(InvariantViolation::DuplicateResult(index));
        }
        slots[index] = Some(result);
    }

    let mut entries = Vec::with_capacity(len);
    for (index, (descriptor, slot)) in descriptors.into_iter().zip(slots).enumerate() {
        let result = slot.ok_or(InvariantViolation::MissingResult(index))?;
        entries.push(BatchEntry { descriptor, result });
    }
    Ok(BatchResult::new(entries))
}
