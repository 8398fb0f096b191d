//! Tests for the libgit2-backed queries of [`GitCli`].

use crate::git::{GitCli, Vcs};
use crate::tools::{PatchCli, Patcher};
use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn init_repo_with_commit(path: &std::path::Path) -> Repository {
    let repo = Repository::init(path).unwrap();
    {
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }
    repo
}

#[test]
fn test_short_commit_of_repository() {
    let temp = TempDir::new().unwrap();
    let repo = init_repo_with_commit(temp.path());
    let full = repo.head().unwrap().target().unwrap().to_string();

    let short = GitCli.short_commit(temp.path()).unwrap();

    assert!(short.len() >= 7);
    assert!(full.starts_with(&short));
}

#[test]
fn test_short_commit_ignores_parent_repository() {
    let temp = TempDir::new().unwrap();
    init_repo_with_commit(temp.path());
    let vendored = temp.path().join("src/champ");
    fs::create_dir_all(&vendored).unwrap();

    assert_eq!(GitCli.short_commit(&vendored), None);
}

#[test]
fn test_short_commit_of_empty_repository() {
    let temp = TempDir::new().unwrap();
    Repository::init(temp.path()).unwrap();

    assert_eq!(GitCli.short_commit(temp.path()), None);
}

#[test]
fn test_has_remote() {
    let temp = TempDir::new().unwrap();
    let repo = init_repo_with_commit(temp.path());
    repo.remote("upstream", "https://example.com/ws.git").unwrap();

    assert!(GitCli.has_remote(temp.path(), "upstream"));
    assert!(!GitCli.has_remote(temp.path(), "origin"));
}

#[test]
fn test_has_remote_outside_repository() {
    let temp = TempDir::new().unwrap();
    assert!(!GitCli.has_remote(temp.path(), "upstream"));
}

#[test]
fn test_current_branch() {
    let temp = TempDir::new().unwrap();
    let repo = init_repo_with_commit(temp.path());
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("ros2", &head, false).unwrap();
    repo.set_head("refs/heads/ros2").unwrap();

    assert_eq!(GitCli.current_branch(temp.path()).unwrap(), "ros2");
}

fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn commit_file(repo: &Repository, name: &str, contents: &str) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    fs::write(workdir.join(name), contents).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parent = repo.head().unwrap().peel_to_commit().unwrap();
    let sig = Signature::now("Test", "test@test.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "Add file", &tree, &[&parent])
        .unwrap();
}

#[test]
fn test_diff_reapplies_with_trailing_whitespace() {
    if !tool_available("git") || !tool_available("patch") {
        eprintln!("git or patch not installed, skipping");
        return;
    }

    let temp = TempDir::new().unwrap();
    let vendored = temp.path().join("champ");
    let repo = init_repo_with_commit(&vendored);
    commit_file(&repo, "gait.yaml", "x\ny\n");
    fs::write(vendored.join("gait.yaml"), "x\ny\nz   \n").unwrap();

    let diff = GitCli.diff(&vendored).unwrap();
    assert!(diff.ends_with("+z   \n"));

    fs::write(vendored.join("gait.yaml"), "x\ny\n").unwrap();
    let patch_file = temp.path().join("champ-local.patch");
    fs::write(&patch_file, &diff).unwrap();
    PatchCli.apply(&vendored, &patch_file).unwrap();

    assert_eq!(
        fs::read_to_string(vendored.join("gait.yaml")).unwrap(),
        "x\ny\nz   \n"
    );
}

#[test]
fn test_diff_of_clean_tree_is_empty() {
    if !tool_available("git") {
        eprintln!("git not installed, skipping");
        return;
    }

    let temp = TempDir::new().unwrap();
    let repo = init_repo_with_commit(temp.path());
    commit_file(&repo, "gait.yaml", "x\n");

    assert_eq!(GitCli.diff(temp.path()).unwrap(), "");
}
