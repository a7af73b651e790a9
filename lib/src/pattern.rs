use glob::Pattern;

/// Folder name and file name/extension patterns a scan is looking for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl PatternSet {
    pub fn new(folders: Vec<String>, files: Vec<String>) -> Self {
        Self { folders, files }
    }

    /// Parse both pattern lists from their comma separated form.
    pub fn parse(folders: &str, files: &str) -> Self {
        Self::new(parse_patterns(folders), parse_patterns(files))
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Split a comma separated pattern list.
/// Entries are trimmed and empty entries are dropped.
pub fn parse_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the first pattern which either equals the folder name or matches it as glob.
pub fn match_folder<'a>(name: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns
        .iter()
        .map(String::as_str)
        .find(|pattern| FolderPattern::new(pattern).matches(name))
}

/// Returns the first pattern the file name ends with, when read as extension.
///
/// Patterns without a leading dot are treated as extension (`log` equals `.log`).
/// A pattern also matches the bare file name it names, so `Makefile` or
/// `.DS_Store` match files with exactly that name.
pub fn match_file<'a>(name: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns
        .iter()
        .map(String::as_str)
        .find(|pattern| FilePattern::new(pattern).matches(name))
}

/// A [PatternSet] with every folder glob compiled once.
///
/// Matches exactly like [match_folder] and [match_file].
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    folders: Vec<FolderPattern>,
    files: Vec<FilePattern>,
}

impl PatternMatcher {
    pub fn new(patterns: &PatternSet) -> Self {
        Self {
            folders: patterns
                .folders
                .iter()
                .map(|pattern| FolderPattern::new(pattern))
                .collect(),
            files: patterns
                .files
                .iter()
                .map(|pattern| FilePattern::new(pattern))
                .collect(),
        }
    }

    pub fn match_folder(&self, name: &str) -> Option<&str> {
        self.folders
            .iter()
            .find(|pattern| pattern.matches(name))
            .map(|pattern| pattern.source.as_str())
    }

    pub fn match_file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|pattern| pattern.matches(name))
            .map(|pattern| pattern.source.as_str())
    }
}

#[derive(Debug, Clone)]
struct FolderPattern {
    source: String,
    /* None if the pattern is no valid glob, even after normalization */
    glob: Option<Pattern>,
}

impl FolderPattern {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            glob: Pattern::new(&normalize_glob(source)).ok(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.source == name || self.glob.as_ref().map_or(false, |glob| glob.matches(name))
    }
}

#[derive(Debug, Clone)]
struct FilePattern {
    source: String,
    extension: String,
}

impl FilePattern {
    fn new(source: &str) -> Self {
        let extension = if source.starts_with('.') {
            source.to_string()
        } else {
            format!(".{}", source)
        };

        Self {
            source: source.to_string(),
            extension,
        }
    }

    fn matches(&self, name: &str) -> bool {
        name.ends_with(&self.extension) || name == self.source.trim_start_matches('.')
    }
}

/// Rewrite a shell style folder glob into the dialect of the `glob` crate.
///
/// Folder names never contain a separator, so a run of `*` means the same as a
/// single one. A `[` without a closing `]` stands for itself.
fn normalize_glob(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut result = String::with_capacity(pattern.len());

    let mut index = 0;
    while index < chars.len() {
        match chars[index] {
            '*' => {
                if !result.ends_with('*') {
                    result.push('*');
                }
                index += 1;
            }
            '[' => match class_end(&chars, index) {
                Some(end) => {
                    result.extend(&chars[index..=end]);
                    index = end + 1;
                }
                None => {
                    result.push_str("[[]");
                    index += 1;
                }
            },
            other => {
                result.push(other);
                index += 1;
            }
        }
    }

    result
}

/// Index of the `]` closing the character class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut index = start + 1;
    if chars.get(index) == Some(&'!') {
        index += 1;
    }

    /* a leading "]" is part of the class */
    if chars.get(index) == Some(&']') {
        index += 1;
    }

    chars[index..]
        .iter()
        .position(|value| *value == ']')
        .map(|offset| index + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_patterns(" node_modules, __pycache__ ,, .venv ,"),
            patterns(&["node_modules", "__pycache__", ".venv"])
        );
        assert!(parse_patterns("   ").is_empty());
        assert!(parse_patterns("").is_empty());
    }

    #[test]
    fn pattern_set_emptiness() {
        assert!(PatternSet::parse(" , ", "").is_empty());
        assert!(!PatternSet::parse("", "log").is_empty());
    }

    #[test]
    fn folder_exact_and_glob() {
        let list = patterns(&["node_modules", "cmake-build-*", "build?", "[ab]in"]);

        assert_eq!(match_folder("node_modules", &list), Some("node_modules"));
        assert_eq!(
            match_folder("cmake-build-debug", &list),
            Some("cmake-build-*")
        );
        assert_eq!(match_folder("build2", &list), Some("build?"));
        assert_eq!(match_folder("bin", &list), Some("[ab]in"));
        assert_eq!(match_folder("ain", &list), Some("[ab]in"));

        assert_eq!(match_folder("build", &list), None);
        assert_eq!(match_folder("src", &list), None);
        assert_eq!(match_folder("Node_Modules", &list), None);
    }

    #[test]
    fn folder_first_pattern_wins() {
        let list = patterns(&["*", "node_modules"]);
        assert_eq!(match_folder("node_modules", &list), Some("*"));

        let list = patterns(&["node_modules", "*"]);
        assert_eq!(match_folder("node_modules", &list), Some("node_modules"));
    }

    #[test]
    fn folder_unclosed_bracket_is_literal() {
        let list = patterns(&["[broken"]);
        assert_eq!(match_folder("[broken", &list), Some("[broken"));
        assert_eq!(match_folder("broken", &list), None);

        let list = patterns(&["[tmp*"]);
        assert_eq!(match_folder("[tmpdir", &list), Some("[tmp*"));
        assert_eq!(match_folder("[tmp", &list), Some("[tmp*"));
        assert_eq!(match_folder("tmpdir", &list), None);
    }

    #[test]
    fn folder_double_star_acts_like_single_star() {
        let list = patterns(&["cache**"]);
        assert_eq!(match_folder("cache_x", &list), Some("cache**"));
        assert_eq!(match_folder("cache", &list), Some("cache**"));
        assert_eq!(match_folder("my_cache", &list), None);

        let list = patterns(&["**"]);
        assert_eq!(match_folder("anything", &list), Some("**"));
    }

    #[test]
    fn folder_bracket_class_is_kept() {
        let list = patterns(&["[*]", "[!a]x", "[]]y"]);
        assert_eq!(match_folder("*", &list), Some("[*]"));
        assert_eq!(match_folder("a", &list), None);
        assert_eq!(match_folder("bx", &list), Some("[!a]x"));
        assert_eq!(match_folder("ax", &list), None);
        assert_eq!(match_folder("]y", &list), Some("[]]y"));
    }

    #[test]
    fn normalize_glob_rewrites() {
        assert_eq!(normalize_glob("cache**"), "cache*");
        assert_eq!(normalize_glob("a***b*"), "a*b*");
        assert_eq!(normalize_glob("[tmp*"), "[[]tmp*");
        assert_eq!(normalize_glob("[ab]in"), "[ab]in");
        assert_eq!(normalize_glob("[**]"), "[**]");
        assert_eq!(normalize_glob("[!]"), "[[]!]");
    }

    #[test]
    fn matcher_agrees_with_free_functions() {
        let set = PatternSet::parse(
            "node_modules,cmake-build-*,build?,[ab]in,cache**,[tmp*,*",
            "log,.pyc,Makefile,.DS_Store,tar.gz",
        );
        let matcher = PatternMatcher::new(&set);

        for name in [
            "node_modules",
            "cmake-build-debug",
            "build2",
            "bin",
            "cache_x",
            "[tmpdir",
            "src",
            "a.log",
            "x.pyc",
            "Makefile",
            "DS_Store",
            "backup.tar.gz",
            "catalog",
        ] {
            assert_eq!(matcher.match_folder(name), match_folder(name, &set.folders), "{}", name);
            assert_eq!(matcher.match_file(name), match_file(name, &set.files), "{}", name);
        }
    }

    #[test]
    fn empty_pattern_lists_never_match() {
        assert_eq!(match_folder("node_modules", &[]), None);
        assert_eq!(match_file("debug.log", &[]), None);
    }

    #[test]
    fn file_extension_is_normalized() {
        let bare = patterns(&["log"]);
        let dotted = patterns(&[".log"]);

        assert_eq!(match_file("a.log", &bare), Some("log"));
        assert_eq!(match_file("a.log", &dotted), Some(".log"));
        assert_eq!(
            match_file("a.log", &bare).is_some(),
            match_file("a.log", &dotted).is_some()
        );

        assert_eq!(match_file("catalog", &bare), None);
        assert_eq!(match_file("a.logs", &dotted), None);
    }

    #[test]
    fn file_bare_names() {
        let list = patterns(&["Makefile", ".DS_Store"]);

        assert_eq!(match_file("Makefile", &list), Some("Makefile"));
        assert_eq!(match_file(".DS_Store", &list), Some(".DS_Store"));
        assert_eq!(match_file("DS_Store", &list), Some(".DS_Store"));
        assert_eq!(match_file("Makefile.am", &list), None);
    }

    #[test]
    fn file_multi_dot_pattern_is_one_token() {
        let list = patterns(&["tar.gz"]);

        assert_eq!(match_file("backup.tar.gz", &list), Some("tar.gz"));
        assert_eq!(match_file("tar.gz", &list), Some("tar.gz"));
        assert_eq!(match_file("backup.gz", &list), None);
    }

    #[test]
    fn file_returns_original_pattern_in_list_order() {
        let list = patterns(&["pyc", ".pyc"]);
        assert_eq!(match_file("x.pyc", &list), Some("pyc"));
    }
}
