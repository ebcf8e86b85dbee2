// Per-player reasons for leaving a player out of a batch.

use thiserror::Error;

/// Why a player produced no score. These are not pipeline failures: the batch
/// driver logs them and leaves the player out of the write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unsupported position `{0}`")]
    UnsupportedPosition(String),

    #[error("no valid college seasons")]
    NoValidSeasons,
}
