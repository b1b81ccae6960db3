// Error types for ellipse-racer

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RaceError {
    // Construction-time validation
    #[snafu(display("Invalid track: {reason}"))]
    InvalidTrack { reason: String },
    #[snafu(display("Invalid tuning: {reason}"))]
    InvalidTuning { reason: String },

    // Tuning file errors
    #[snafu(display("Unable to read tuning file {}", path.display()))]
    ConfigRead { path: PathBuf, source: io::Error },
    #[snafu(display("Unable to parse tuning file {}", path.display()))]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Stats ledger errors
    #[snafu(display("Error writing stats file {}", path.display()))]
    StatsWrite { path: PathBuf, source: io::Error },
    #[snafu(display("Error serializing stats"))]
    StatsSerialize { source: serde_json::Error },
}
