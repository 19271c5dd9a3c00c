//! Meta-command formatters.
//!
//! Meta commands start with `.` and manipulate the store rather than the
//! data: knowledge-graph lifecycle, schema drops, rule and index
//! management, session control, and account administration. Every
//! function here is a pure one-line formatter.

// Knowledge graphs

#[must_use]
pub fn kg_list() -> String {
    String::from(".kg list")
}

#[must_use]
pub fn kg_create(name: &str) -> String {
    format!(".kg create {name}")
}

#[must_use]
pub fn kg_use(name: &str) -> String {
    format!(".kg use {name}")
}

#[must_use]
pub fn kg_drop(name: &str) -> String {
    format!(".kg drop {name}")
}

// Relations

#[must_use]
pub fn rel_list() -> String {
    String::from(".rel")
}

#[must_use]
pub fn rel_describe(name: &str) -> String {
    format!(".rel {name}")
}

#[must_use]
pub fn rel_drop(name: &str) -> String {
    format!(".rel drop {name}")
}

// Rules

#[must_use]
pub fn rule_list() -> String {
    String::from(".rule list")
}

#[must_use]
pub fn rule_show(name: &str) -> String {
    format!(".rule show {name}")
}

#[must_use]
pub fn rule_drop(name: &str) -> String {
    format!(".rule drop {name}")
}

#[must_use]
pub fn rule_remove_clause(name: &str, index: usize) -> String {
    format!(".rule remove {name} {index}")
}

#[must_use]
pub fn rule_clear(name: &str) -> String {
    format!(".rule clear {name}")
}

#[must_use]
pub fn rule_drop_prefix(prefix: &str) -> String {
    format!(".rule drop prefix {prefix}")
}

// Indexes

#[must_use]
pub fn index_list() -> String {
    String::from(".index list")
}

#[must_use]
pub fn index_stats(name: &str) -> String {
    format!(".index stats {name}")
}

#[must_use]
pub fn index_drop(name: &str) -> String {
    format!(".index drop {name}")
}

#[must_use]
pub fn index_rebuild(name: &str) -> String {
    format!(".index rebuild {name}")
}

// Sessions

#[must_use]
pub fn session_list() -> String {
    String::from(".session list")
}

#[must_use]
pub fn session_drop(name: &str) -> String {
    format!(".session drop {name}")
}

#[must_use]
pub fn session_remove(name: &str, index: usize) -> String {
    format!(".session remove {name} {index}")
}

#[must_use]
pub fn session_clear() -> String {
    String::from(".session clear")
}

// Store utilities

#[must_use]
pub fn explain(datalog: &str) -> String {
    format!(".explain {datalog}")
}

#[must_use]
pub fn compact() -> String {
    String::from(".compact")
}

#[must_use]
pub fn status() -> String {
    String::from(".status")
}

#[must_use]
pub fn load(path: &str) -> String {
    format!(".load {path}")
}

#[must_use]
pub fn clear_prefix(prefix: &str) -> String {
    format!(".clear prefix {prefix}")
}

// Users and API keys

#[must_use]
pub fn user_create(username: &str, password: &str, role: &str) -> String {
    format!(".user create {username} {password} {role}")
}

#[must_use]
pub fn user_drop(username: &str) -> String {
    format!(".user drop {username}")
}

#[must_use]
pub fn user_password(username: &str, new_password: &str) -> String {
    format!(".user password {username} {new_password}")
}

#[must_use]
pub fn user_role(username: &str, role: &str) -> String {
    format!(".user role {username} {role}")
}

#[must_use]
pub fn user_list() -> String {
    String::from(".user list")
}

#[must_use]
pub fn apikey_create(label: &str) -> String {
    format!(".apikey create {label}")
}

#[must_use]
pub fn apikey_list() -> String {
    String::from(".apikey list")
}

#[must_use]
pub fn apikey_revoke(label: &str) -> String {
    format!(".apikey revoke {label}")
}

// Access control

#[must_use]
pub fn acl_grant(kg: &str, username: &str, role: &str) -> String {
    format!(".kg acl grant {kg} {username} {role}")
}

#[must_use]
pub fn acl_revoke(kg: &str, username: &str) -> String {
    format!(".kg acl revoke {kg} {username}")
}

#[must_use]
pub fn acl_list(kg: &str) -> String {
    format!(".kg acl list {kg}")
}
