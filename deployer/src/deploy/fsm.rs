//! Finite State Machine for a deployment run

/// Sync state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing started yet
    Idle,

    /// Uploading the changed file at this index
    ProcessingFile(usize),

    /// All uploads attempted, batch compile in progress
    Compiling,

    /// Batch delete in progress
    Deleting,

    /// Phase finished
    Done,
}

/// Sync event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Start uploading `total` files
    BeginUpload { total: usize },

    /// Current file finished, whatever its outcome
    FileProcessed,

    /// Batch compile answered
    CompileFinished,

    /// Start the batch delete
    BeginDelete,

    /// Batch delete answered
    DeleteFinished,
}

/// Sync FSM
#[derive(Debug, Clone)]
pub struct SyncFsm {
    state: SyncState,
    total: usize,
}

impl SyncFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            total: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Index of the file being processed, if any
    pub fn current_file(&self) -> Option<usize> {
        match self.state {
            SyncState::ProcessingFile(index) => Some(index),
            _ => None,
        }
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: SyncEvent) -> Result<(), String> {
        let new_state = match (self.state, event) {
            // From Idle
            (SyncState::Idle, SyncEvent::BeginUpload { total: 0 }) => SyncState::Done,
            (SyncState::Idle, SyncEvent::BeginUpload { total }) => {
                self.total = total;
                SyncState::ProcessingFile(0)
            }
            (SyncState::Idle, SyncEvent::BeginDelete) => SyncState::Deleting,

            // From ProcessingFile
            (SyncState::ProcessingFile(index), SyncEvent::FileProcessed) => {
                if index + 1 < self.total {
                    SyncState::ProcessingFile(index + 1)
                } else {
                    SyncState::Compiling
                }
            }

            // From Compiling
            (SyncState::Compiling, SyncEvent::CompileFinished) => SyncState::Done,

            // From Deleting
            (SyncState::Deleting, SyncEvent::DeleteFinished) => SyncState::Done,

            // From Done
            (SyncState::Done, SyncEvent::BeginDelete) => SyncState::Deleting,

            // Invalid transitions
            (state, event) => {
                return Err(format!(
                    "Invalid transition: {:?} -> {:?}",
                    state, event
                ));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for SyncFsm {
    fn default() -> Self {
        Self::new()
    }
}
