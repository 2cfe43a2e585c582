//! Git repository discovery.
//!
//! Resolved once before evaluation; the `in-git-repo`, `git-branch`,
//! `git-root`, and `git-dir` builtins read the cached result.  Every miss
//! here degrades to "no repo" — prompt templates branch on it, nothing is
//! fatal.

use std::path::Path;

/// A discovered repository: its root path and, when readable, the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    pub root: String,
    pub branch: Option<String>,
}

/// Walk ancestors of `start` looking for a `.git` directory.
///
/// Only a real directory counts (gitfile worktree pointers do not); the
/// deepest ancestor containing one wins.
pub fn discover(start: &Path) -> Option<GitInfo> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        if d.join(".git").is_dir() {
            return Some(GitInfo {
                root: d.to_string_lossy().into_owned(),
                branch: read_branch(d),
            });
        }
        dir = d.parent();
    }
    None
}

/// Read the checked-out branch from `<root>/.git/HEAD`.
///
/// The branch is the text after the last `/`, trimmed.  A HEAD with no
/// slash (detached) yields `None`.
pub fn read_branch(root: &Path) -> Option<String> {
    let head = std::fs::read_to_string(root.join(".git").join("HEAD")).ok()?;
    let (_, tail) = head.rsplit_once('/')?;
    let branch = tail.trim();
    if branch.is_empty() {
        None
    } else {
        Some(branch.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_repo(branch_line: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), branch_line).unwrap();
        dir
    }

    #[test]
    fn discovers_repo_at_start() {
        let repo = fake_repo("ref: refs/heads/main\n");
        let info = discover(repo.path()).unwrap();
        assert_eq!(info.root, repo.path().to_string_lossy());
        assert_eq!(info.branch.as_deref(), Some("main"));
    }

    #[test]
    fn discovers_repo_from_subdirectory() {
        let repo = fake_repo("ref: refs/heads/main\n");
        let sub = repo.path().join("a/b");
        fs::create_dir_all(&sub).unwrap();
        let info = discover(&sub).unwrap();
        assert_eq!(info.root, repo.path().to_string_lossy());
    }

    #[test]
    fn nested_repo_wins_over_outer() {
        let outer = fake_repo("ref: refs/heads/outer\n");
        let inner = outer.path().join("sub");
        fs::create_dir_all(inner.join(".git")).unwrap();
        fs::write(inner.join(".git/HEAD"), "ref: refs/heads/inner\n").unwrap();
        let info = discover(&inner).unwrap();
        assert_eq!(info.branch.as_deref(), Some("inner"));
    }

    #[test]
    fn no_repo_found() {
        let dir = tempfile::tempdir().unwrap();
        // tempdirs live under /tmp, which has no .git ancestor.
        assert_eq!(discover(dir.path()), None);
    }

    #[test]
    fn gitfile_does_not_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".git"), "gitdir: ../elsewhere\n").unwrap();
        assert_eq!(discover(dir.path()), None);
    }

    #[test]
    fn branch_keeps_text_after_last_slash() {
        let repo = fake_repo("ref: refs/heads/feature/login\n");
        assert_eq!(read_branch(repo.path()).as_deref(), Some("login"));
    }

    #[test]
    fn detached_head_yields_no_branch() {
        let repo = fake_repo("4f2a9c1d8e3b5a7f6c0d2e4a8b1c3d5e7f9a0b2c\n");
        assert_eq!(read_branch(repo.path()), None);
        let info = discover(repo.path()).unwrap();
        assert_eq!(info.branch, None);
    }

    #[test]
    fn missing_head_yields_no_branch() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let info = discover(dir.path()).unwrap();
        assert_eq!(info.branch, None);
    }
}
