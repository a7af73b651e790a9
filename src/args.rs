use std::path::PathBuf;

use clap::Parser;
use dirsweep::PatternSet;

pub const DEFAULT_FOLDER_PATTERNS: &str = "node_modules, __pycache__, .venv, dist, build";
pub const DEFAULT_FILE_PATTERNS: &str = ".pyc, .pyo, .DS_Store, .log";

/// Find and remove left over folders and files by name
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Specify a root directory which should be searched.
    /// Can be given multiple times. Note: This can be a relative path.
    #[arg(short, long, verbatim_doc_comment)]
    pub root: Vec<PathBuf>,

    /// Comma separated list of folder names to find.
    /// Glob wildcards (*, ?, [...]) are supported.
    ///
    /// Example:
    /// --folders "node_modules, cmake-build-*"
    #[arg(long, default_value = DEFAULT_FOLDER_PATTERNS, verbatim_doc_comment)]
    pub folders: String,

    /// Comma separated list of file extensions or file names to find.
    /// The leading dot is optional.
    #[arg(long, default_value = DEFAULT_FILE_PATTERNS, verbatim_doc_comment)]
    pub files: String,

    /// Do not calculate the size of the found targets.
    #[arg(long)]
    pub no_sizes: bool,

    /// Only print the found targets instead of opening the interactive view.
    #[arg(short, long)]
    pub list: bool,

    /// Display the log in the terminal as a split screen.
    #[arg(long)]
    pub ui_logger: bool,

    /// Do not actually delete anything. Just simulate it.
    #[arg(short, long)]
    pub dry_run: bool,
}

impl Args {
    pub fn patterns(&self) -> PatternSet {
        PatternSet::parse(&self.folders, &self.files)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["dirsweep"]);
        assert!(args.root.is_empty());

        let patterns = args.patterns();
        assert_eq!(
            patterns.folders,
            ["node_modules", "__pycache__", ".venv", "dist", "build"]
        );
        assert_eq!(patterns.files, [".pyc", ".pyo", ".DS_Store", ".log"]);
    }

    #[test]
    fn multiple_roots_and_patterns() {
        let args = Args::parse_from([
            "dirsweep",
            "-r",
            "a",
            "--root",
            "b",
            "--folders",
            "target",
            "--files",
            "",
            "--no-sizes",
        ]);

        assert_eq!(args.root.len(), 2);
        assert!(args.no_sizes);

        let patterns = args.patterns();
        assert_eq!(patterns.folders, ["target"]);
        assert!(patterns.files.is_empty());
    }
}
