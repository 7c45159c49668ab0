use crate::MAX_PROGRAM_SIZE;

/// Errors surfaced by the machine.
///
/// `ProgramTooLarge` and `InvalidKeyIndex` reject a call and leave the machine
/// untouched. The remaining variants are fatal for the step that raised them;
/// the machine state is left exactly as it was before that step.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("invalid key index {0}, keys are 0x0..=0xF")]
    InvalidKeyIndex(usize),

    #[error("instruction fetch out of range at address {address:#06X}")]
    AddressOutOfRange { address: u16 },

    #[error("stack overflow: call at {address:#06X} exceeds the call depth")]
    StackOverflow { address: u16 },

    #[error("stack underflow: return at {address:#06X} with an empty call stack")]
    StackUnderflow { address: u16 },
}

impl MachineError {
    pub(crate) fn program_too_large(size: usize) -> Self {
        MachineError::ProgramTooLarge {
            size,
            max: MAX_PROGRAM_SIZE,
        }
    }

    /// Whether the error stops the current step (as opposed to rejecting a
    /// host call such as a load or a key update).
    pub fn is_step_fatal(&self) -> bool {
        matches!(
            self,
            MachineError::AddressOutOfRange { .. }
                | MachineError::StackOverflow { .. }
                | MachineError::StackUnderflow { .. }
        )
    }
}

pub type Result<T, E = MachineError> = std::result::Result<T, E>;
