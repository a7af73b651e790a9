mod fs;
mod path;
pub mod pattern;
mod scan;
pub mod sweep;
pub mod utils;

pub use fs::{
    directory_size,
    file_size,
};
pub use path::*;
pub use pattern::{
    match_file,
    match_folder,
    PatternMatcher,
    PatternSet,
};
pub use scan::*;
pub use sweep::{
    SweepError,
    SweepOptions,
    SweepReport,
    SweepReportConsumer,
    SweepSummary,
};
pub use utils::{
    format_file_size,
    CancelToken,
};
