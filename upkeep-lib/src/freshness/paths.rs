use super::LOG_TARGET;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs;

/// Expands configured path entries into the set of candidate files to check.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: Utf8PathBuf,
    extension: String,
    excluded_file_names: Vec<String>,
}

impl PathResolver {
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, extension: impl Into<String>, excluded_file_names: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            excluded_file_names,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolve glob patterns, directories and single files into a sorted, deduplicated list.
    ///
    /// Relative entries are taken relative to the repository root. Entries that match nothing
    /// are logged and skipped.
    pub fn resolve<S: AsRef<str>>(&self, entries: &[S]) -> Vec<Utf8PathBuf> {
        let mut files = BTreeSet::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }

            let path = self.absolute(entry);

            if is_glob(entry) {
                self.expand_glob(&path, &mut files);
            } else if path.is_dir() {
                self.expand_dir(&path, &mut files);
            } else if path.exists() && self.is_candidate(&path) {
                let _ = files.insert(path);
            } else {
                log::warn!(target: LOG_TARGET, "File does not exist or is not a .{} file: {path}", self.extension);
            }
        }

        files.into_iter().collect()
    }

    /// Path relative to the repository root, or the path itself when it lies outside of it.
    #[must_use]
    pub fn relative<'a>(&self, path: &'a Utf8Path) -> &'a Utf8Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn absolute(&self, entry: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(entry);
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }

    fn expand_glob(&self, pattern: &Utf8Path, files: &mut BTreeSet<Utf8PathBuf>) {
        let paths = match glob::glob(pattern.as_str()) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Invalid glob pattern '{pattern}': {e}");
                return;
            }
        };

        for entry in paths {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not read glob entry: {e}");
                    continue;
                }
            };

            match Utf8PathBuf::from_path_buf(path) {
                Ok(path) if self.is_candidate(&path) => {
                    let _ = files.insert(path);
                }
                Ok(_) => {}
                Err(path) => log::warn!(target: LOG_TARGET, "Skipping non UTF-8 path '{}'", path.display()),
            }
        }
    }

    fn expand_dir(&self, dir: &Utf8Path, files: &mut BTreeSet<Utf8PathBuf>) {
        let entries = match dir.read_dir_utf8() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not read directory '{dir}': {e}");
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) if self.is_candidate(entry.path()) => {
                    let _ = files.insert(entry.path().to_path_buf());
                }
                Ok(_) => {}
                Err(e) => log::warn!(target: LOG_TARGET, "Could not read entry in '{dir}': {e}"),
            }
        }
    }

    fn is_candidate(&self, path: &Utf8Path) -> bool {
        let is_file = fs::metadata(path).is_ok_and(|m| m.is_file());
        let has_extension = path.extension().is_some_and(|ext| ext == self.extension);
        let excluded = path
            .file_name()
            .is_some_and(|name| self.excluded_file_names.iter().any(|excluded| excluded == name));

        is_file && has_extension && !excluded
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let countries = root.join("holidays").join("countries");
        fs::create_dir_all(&countries).unwrap();
        for name in ["__init__.py", "japan.py", "south_korea.py", "notes.txt"] {
            fs::write(countries.join(name), "").unwrap();
        }
        fs::create_dir_all(countries.join("nested.py")).unwrap();

        let financial = root.join("holidays").join("financial");
        fs::create_dir_all(&financial).unwrap();
        fs::write(financial.join("ny_stock_exchange.py"), "").unwrap();

        (tmp, root)
    }

    fn resolver(root: &Utf8Path) -> PathResolver {
        PathResolver::new(root, "py", vec!["__init__.py".to_string()])
    }

    fn names(root: &Utf8Path, files: &[Utf8PathBuf]) -> Vec<String> {
        files.iter().map(|f| f.strip_prefix(root).unwrap().as_str().replace('\\', "/")).collect()
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_resolve_glob_excludes_init_and_other_extensions() {
        let (_tmp, root) = setup();
        let files = resolver(&root).resolve(&["holidays/countries/*.py"]);

        assert_eq!(names(&root, &files), vec!["holidays/countries/japan.py", "holidays/countries/south_korea.py"]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_resolve_directory() {
        let (_tmp, root) = setup();
        let files = resolver(&root).resolve(&["holidays/countries"]);

        assert_eq!(names(&root, &files), vec!["holidays/countries/japan.py", "holidays/countries/south_korea.py"]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_resolve_single_files_and_missing_entries() {
        let (_tmp, root) = setup();
        let files = resolver(&root).resolve(&[
            "holidays/financial/ny_stock_exchange.py",
            "holidays/countries/notes.txt",
            "holidays/countries/missing.py",
            "holidays/countries/__init__.py",
            "   ",
        ]);

        assert_eq!(names(&root, &files), vec!["holidays/financial/ny_stock_exchange.py"]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_resolve_deduplicates_and_sorts() {
        let (_tmp, root) = setup();
        let absolute = root.join("holidays/countries/japan.py");
        let files = resolver(&root).resolve(&[
            "holidays/financial",
            "holidays/countries/*.py",
            "holidays/countries",
            absolute.as_str(),
        ]);

        assert_eq!(
            names(&root, &files),
            vec![
                "holidays/countries/japan.py",
                "holidays/countries/south_korea.py",
                "holidays/financial/ny_stock_exchange.py",
            ]
        );
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_resolve_nothing() {
        let (_tmp, root) = setup();
        assert!(resolver(&root).resolve(&["does/not/exist/*.py"]).is_empty());
        assert!(resolver(&root).resolve::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_extension_leading_dot_is_ignored() {
        let resolver = PathResolver::new("/repo", ".py", Vec::new());
        assert_eq!(resolver.extension, "py");
    }

    #[test]
    fn test_relative() {
        let resolver = PathResolver::new("/repo", "py", Vec::new());
        assert_eq!(resolver.relative(Utf8Path::new("/repo/a/b.py")), Utf8Path::new("a/b.py"));
        assert_eq!(resolver.relative(Utf8Path::new("/elsewhere/b.py")), Utf8Path::new("/elsewhere/b.py"));
    }

    #[test]
    fn test_is_glob() {
        assert!(is_glob("holidays/*.py"));
        assert!(is_glob("holidays/?.py"));
        assert!(is_glob("holidays/[ab].py"));
        assert!(!is_glob("holidays/countries"));
    }
}
