//! CLI Exit Code Registry
//!
//! Single source of truth for `polrec` exit codes. Scheduled jobs branch on
//! them, so a code never changes meaning once released.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Success                                                     |
//! | 1    | General error (unspecified)                                 |
//! | 2    | Usage error (bad arguments, bad `--today`)                  |
//! | 60   | Lookup tables failed to parse or validate                   |
//! | 61   | Runtime error (unreadable input, missing driver key column) |
//! | 62   | Report written, but warnings were raised and `--strict` set |

use polrecon_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (60-69)
// =============================================================================

/// Lookup tables could not be parsed or failed validation.
pub const EXIT_LOOKUP_INVALID: u8 = 60;

/// A source could not be located or read, or a stage hit a fatal column gap.
pub const EXIT_RUNTIME: u8 = 61;

/// Reports were written but carry warnings (only with `--strict`).
pub const EXIT_WARNINGS: u8 = 62;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_LOOKUP_INVALID,
        ReconError::MissingDriverKey { .. } | ReconError::MissingColumn { .. } | ReconError::Io(_) => {
            EXIT_RUNTIME
        }
    }
}
