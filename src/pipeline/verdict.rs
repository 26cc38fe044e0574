use log::{error, info, warn};

use crate::Verdict;
use crate::utils::config::NORMAL_ERROR_RATE;

/// Classify a finished run. `errors / (lines - errors)` against [`NORMAL_ERROR_RATE`];
/// `lines <= errors` means nothing was loaded.
pub fn evaluate(lines: u64, errors: u64) -> Verdict {
    if lines <= errors {
        return Verdict::NothingSucceeded;
    }
    let error_rate = errors as f64 / (lines - errors) as f64;
    if error_rate < NORMAL_ERROR_RATE {
        Verdict::Acceptable { error_rate }
    } else {
        Verdict::HighErrorRate { error_rate }
    }
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Acceptable { .. })
    }

    /// Process exit status for the verdict.
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Acceptable { .. } => 0,
            Verdict::HighErrorRate { .. } => 2,
            Verdict::NothingSucceeded => 3,
        }
    }
}

pub fn log_verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Acceptable { error_rate } => {
            info!("Acceptable error rate {:.4}. Successful load", error_rate)
        }
        Verdict::HighErrorRate { error_rate } => {
            error!("High error rate {:.4}. Failed load", error_rate)
        }
        Verdict::NothingSucceeded => warn!("Nothing succeeded: every line failed"),
    }
}
