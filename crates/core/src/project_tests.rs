// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn project_id_roundtrips_through_json() {
    let p = Project {
        project_id: ProjectId::new("p1"),
        repo_root: PathBuf::from("/repo"),
        display_name: "Demo".to_string(),
        is_git_repo: true,
    };
    let json = serde_json::to_string(&p).unwrap();
    let back: Project = serde_json::from_str(&json).unwrap();
    assert_eq!(back.project_id, p.project_id);
    assert_eq!(back.repo_root, p.repo_root);
}
