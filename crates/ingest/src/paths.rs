use std::path::{Path, PathBuf};

pub const LOG_EXTENSION: &str = "jsonl";

pub fn default_claude_data_path() -> PathBuf {
    if let Ok(path) = std::env::var("CLAUDE_DATA_PATH") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".claude");
    }
    PathBuf::from(".claude")
}

/// Directory holding per-project session logs.
pub fn projects_dir(claude_data_path: &Path) -> PathBuf {
    claude_data_path.join("projects")
}

pub fn is_log_path(path: &Path) -> bool {
    path.extension().and_then(|value| value.to_str()) == Some(LOG_EXTENSION)
}

pub(crate) fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

/// True when neither `path` nor any directory between it and `root` is a
/// symlink. Paths reported outside `root` (some backends resolve the watch
/// root) only have the file itself checked.
pub(crate) fn reachable_without_links(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return !is_symlink(path);
    };
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        if is_symlink(&current) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_jsonl_files_are_logs() {
        assert!(is_log_path(Path::new("/tmp/a/session.jsonl")));
        assert!(!is_log_path(Path::new("/tmp/a/session.json")));
        assert!(!is_log_path(Path::new("/tmp/a/session")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parents_are_not_reachable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("projects");
        let real = dir.path().join("elsewhere");
        std::fs::create_dir_all(root.join("demo")).expect("create root");
        std::fs::create_dir_all(&real).expect("create target");
        std::os::unix::fs::symlink(&real, root.join("linked")).expect("symlink");

        assert!(reachable_without_links(&root, &root.join("demo/a.jsonl")));
        assert!(!reachable_without_links(&root, &root.join("linked/a.jsonl")));
        assert!(reachable_without_links(&root, &real.join("a.jsonl")));
        std::os::unix::fs::symlink(root.join("demo/a.jsonl"), real.join("b.jsonl"))
            .expect("file symlink");
        assert!(!reachable_without_links(&root, &real.join("b.jsonl")));
    }

    #[test]
    fn projects_dir_is_nested_under_data_path() {
        assert_eq!(
            projects_dir(Path::new("/home/me/.claude")),
            PathBuf::from("/home/me/.claude/projects")
        );
    }
}
