//! schema::flat
//!
//! Queries for endpoints whose `get_tree` returns a flat leaf list on the
//! branch and whose directory listing goes through `head.node`.
//!
//! Keys are `String!` throughout, so the root is always sent as `"/"`.

use super::{Operation, OperationKind, RootKey};

pub(super) fn operation(kind: OperationKind) -> Operation {
    match kind {
        OperationKind::Get => op("Get", GET, &["branch", "get"]),
        OperationKind::GetContents => op("GetAll", GET_ALL, &["branch", "get_all"]),
        OperationKind::GetTree => op("GetTree", GET_TREE, &["branch", "get_tree"]),
        OperationKind::Set => op("Set", SET, &["set"]),
        OperationKind::SetContents => op("SetAll", SET_ALL, &["set_all"]),
        OperationKind::SetTree => op("SetTree", SET_TREE, &["set_tree"]),
        OperationKind::UpdateTree => op("UpdateTree", UPDATE_TREE, &["update_tree"]),
        OperationKind::Remove => op("Remove", REMOVE, &["remove"]),
        OperationKind::Merge => op("Merge", MERGE, &["merge"]),
        OperationKind::Push => op("Push", PUSH, &["push"]),
        OperationKind::Pull => op("Pull", PULL, &["pull"]),
        OperationKind::Revert => op("Revert", REVERT, &["revert"]),
        OperationKind::Clone => op("Clone", CLONE, &["clone"]),
        OperationKind::BranchInfo => op("GetBranch", BRANCH_INFO, &["branch"]),
        OperationKind::List => op("List", LIST, &["branch", "head", "node", "get", "tree"]),
        OperationKind::Branches => op("Branches", BRANCHES, &["branches"]),
    }
}

fn op(name: &'static str, text: &'static str, result_path: &'static [&'static str]) -> Operation {
    Operation {
        name,
        text,
        result_path,
        root_key: RootKey::Token,
    }
}

const GET: &str = r#"
query Get($branch: String!, $key: String!) {
    branch(name: $branch) {
        get(key: $key) {
            value
        }
    }
}
"#;

const GET_ALL: &str = r#"
query GetAll($branch: String!, $key: String!) {
    branch(name: $branch) {
        get_all(key: $key) {
            value
            metadata
        }
    }
}
"#;

const GET_TREE: &str = r#"
query GetTree($branch: String!, $key: String!) {
    branch(name: $branch) {
        get_tree(key: $key) {
            key
            value
            metadata
        }
    }
}
"#;

const SET: &str = r#"
mutation Set($branch: String, $key: String!, $value: String!, $info: InfoInput) {
    set(branch: $branch, key: $key, value: $value, info: $info) {
        hash
    }
}
"#;

const SET_ALL: &str = r#"
mutation SetAll($branch: String, $key: String!, $value: String!, $metadata: String, $info: InfoInput) {
    set_all(branch: $branch, key: $key, value: $value, metadata: $metadata, info: $info) {
        hash
    }
}
"#;

const SET_TREE: &str = r#"
mutation SetTree($branch: String, $key: String!, $tree: [TreeInput!]!, $info: InfoInput) {
    set_tree(branch: $branch, key: $key, tree: $tree, info: $info) {
        hash
    }
}
"#;

const UPDATE_TREE: &str = r#"
mutation UpdateTree($branch: String, $key: String!, $tree: [TreeInput!]!, $info: InfoInput) {
    update_tree(branch: $branch, key: $key, tree: $tree, info: $info) {
        hash
    }
}
"#;

const REMOVE: &str = r#"
mutation Remove($branch: String, $key: String!, $info: InfoInput) {
    remove(branch: $branch, key: $key, info: $info) {
        hash
    }
}
"#;

const MERGE: &str = r#"
mutation Merge($branch: String, $from: String!, $info: InfoInput) {
    merge(branch: $branch, from: $from, info: $info) {
        hash
    }
}
"#;

const PUSH: &str = r#"
mutation Push($branch: String, $remote: String!) {
    push(branch: $branch, remote: $remote)
}
"#;

const PULL: &str = r#"
mutation Pull($branch: String, $remote: String!, $info: InfoInput) {
    pull(branch: $branch, remote: $remote, info: $info) {
        hash
    }
}
"#;

const CLONE: &str = r#"
mutation Clone($branch: String, $remote: String!) {
    clone(branch: $branch, remote: $remote) {
        hash
    }
}
"#;

const REVERT: &str = r#"
mutation Revert($branch: String, $commit: String!) {
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
query List($branch: String!, $key: String!) {
    branch(name: $branch) {
        head {
            node {
                get(key: $key) {
                    tree {
                        key
                        value
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
