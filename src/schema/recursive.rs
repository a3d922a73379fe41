//! schema::recursive
//!
//! Queries for endpoints that expose reads through `branch.tree`.
//!
//! `get_tree` returns a nested tree object whose
//! `list_contents_recursively` field holds every leaf as `{path, value,
//! metadata}`. `list` returns the direct children, with `value` only
//! present on contents. Tree reads take a nullable `Key`, and the whole
//! tree is requested with `null`.

use super::{Operation, OperationKind, RootKey};

pub(super) fn operation(kind: OperationKind) -> Operation {
    use RootKey::{Null, Token};

    match kind {
        OperationKind::Get => op("Get", GET, &["branch", "tree", "get"], Token),
        OperationKind::GetContents => op(
            "GetContents",
            GET_CONTENTS,
            &["branch", "tree", "get_contents"],
            Token,
        ),
        OperationKind::GetTree => op(
            "GetTree",
            GET_TREE,
            &["branch", "tree", "get_tree", "list_contents_recursively"],
            Null,
        ),
        OperationKind::Set => op("Set", SET, &["set"], Token),
        OperationKind::SetContents => op("SetAll", SET_ALL, &["set_all"], Token),
        OperationKind::SetTree => op("SetTree", SET_TREE, &["set_tree"], Token),
        OperationKind::UpdateTree => op("UpdateTree", UPDATE_TREE, &["update_tree"], Token),
        OperationKind::Remove => op("Remove", REMOVE, &["remove"], Token),
        OperationKind::Merge => op("Merge", MERGE, &["merge"], Token),
        OperationKind::Push => op("Push", PUSH, &["push"], Token),
        OperationKind::Pull => op("Pull", PULL, &["pull"], Token),
        OperationKind::Revert => op("Revert", REVERT, &["revert"], Token),
        OperationKind::Clone => op("Clone", CLONE, &["clone"], Token),
        OperationKind::BranchInfo => op("GetBranch", BRANCH_INFO, &["branch"], Token),
        OperationKind::List => op(
            "List",
            LIST,
            &["branch", "tree", "get_tree", "list"],
            Null,
        ),
        OperationKind::Branches => op("Branches", BRANCHES, &["branches"], Token),
    }
}

fn op(
    name: &'static str,
    text: &'static str,
    result_path: &'static [&'static str],
    root_key: RootKey,
) -> Operation {
    Operation {
        name,
        text,
        result_path,
        root_key,
    }
}

const GET: &str = r#"
query Get($branch: String!, $key: Key!) {
    branch(name: $branch) {
        tree {
            get(key: $key)
        }
    }
}
"#;

const GET_CONTENTS: &str = r#"
query GetContents($branch: String!, $key: Key!) {
    branch(name: $branch) {
        tree {
            get_contents(key: $key) {
                value
                metadata
            }
        }
    }
}
"#;

const GET_TREE: &str = r#"
query GetTree($branch: String!, $key: Key) {
    branch(name: $branch) {
        tree {
            get_tree(key: $key) {
                list_contents_recursively {
                    path
                    value
                    metadata
                }
            }
        }
    }
}
"#;

const SET: &str = r#"
mutation Set($branch: BranchName, $key: Key!, $value: Value!, $info: InfoInput) {
    set(branch: $branch, key: $key, value: $value, info: $info) {
        hash
    }
}
"#;

const SET_ALL: &str = r#"
mutation SetAll($branch: BranchName, $key: Key!, $value: Value!, $metadata: Metadata, $info: InfoInput) {
    set_all(branch: $branch, key: $key, value: $value, metadata: $metadata, info: $info) {
        hash
    }
}
"#;

const SET_TREE: &str = r#"
mutation SetTree($branch: BranchName, $key: Key!, $tree: [TreeItem!]!, $info: InfoInput) {
    set_tree(branch: $branch, key: $key, tree: $tree, info: $info) {
        hash
    }
}
"#;

const UPDATE_TREE: &str = r#"
mutation UpdateTree($branch: BranchName, $key: Key!, $tree: [TreeItem!]!, $info: InfoInput) {
    update_tree(branch: $branch, key: $key, tree: $tree, info: $info) {
        hash
    }
}
"#;

const REMOVE: &str = r#"
mutation Remove($branch: BranchName, $key: Key!, $info: InfoInput) {
    remove(branch: $branch, key: $key, info: $info) {
        hash
    }
}
"#;

const MERGE: &str = r#"
mutation Merge($branch: BranchName, $from: BranchName!, $info: InfoInput) {
    merge(branch: $branch, from: $from, info: $info) {
        hash
    }
}
"#;

const PUSH: &str = r#"
mutation Push($branch: BranchName, $remote: Remote!) {
    push(branch: $branch, remote: $remote)
}
"#;

const PULL: &str = r#"
mutation Pull($branch: BranchName, $remote: Remote!, $info: InfoInput) {
    pull(branch: $branch, remote: $remote, info: $info) {
        hash
    }
}
"#;

const CLONE: &str = r#"
mutation Clone($branch: BranchName, $remote: Remote!) {
    clone(branch: $branch, remote: $remote) {
        hash
    }
}
"#;

const REVERT: &str = r#"
mutation Revert($branch: BranchName, $commit: CommitHash!) {
    revert(branch: $branch, commit: $commit) {
        hash
    }
}
"#;

const BRANCH_INFO: &str = r#"
query GetBranch($branch: String!) {
    branch(name: $branch) {
        name
        head {
            hash
            info {
                message
                author
                date
            }
            parents {
                hash
            }
        }
    }
}
"#;

const LIST: &str = r#"
query List($branch: String!, $key: Key) {
    branch(name: $branch) {
        tree {
            get_tree(key: $key) {
                list {
                    __typename
                    ... on Contents {
                        path
                        value
                    }
                    ... on Tree {
                        path
                    }
                }
            }
        }
    }
}
"#;

const BRANCHES: &str = r#"
query Branches {
    branches
}
"#;
