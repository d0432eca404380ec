//! Shared fixtures: a small 0.x database and an empty 1.x database, both in
//! memory.

#![allow(dead_code)]

use drone_migrate::drivers::SqliteStore;
use drone_migrate::{schema, Statement, Store};

const LEGACY_SCHEMA: &[&str] = &[
    "CREATE TABLE users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_login TEXT,
        user_token TEXT,
        user_secret TEXT,
        user_expiry INTEGER,
        user_email TEXT,
        user_avatar TEXT,
        user_active BOOLEAN,
        user_admin BOOLEAN,
        user_hash TEXT,
        UNIQUE(user_login)
    )",
    "CREATE TABLE repos (
        repo_id INTEGER PRIMARY KEY AUTOINCREMENT,
        repo_user_id INTEGER,
        repo_owner TEXT,
        repo_name TEXT,
        repo_full_name TEXT,
        repo_avatar TEXT,
        repo_link TEXT,
        repo_clone TEXT,
        repo_branch TEXT,
        repo_timeout INTEGER,
        repo_private BOOLEAN,
        repo_trusted BOOLEAN,
        repo_allow_pr BOOLEAN,
        repo_allow_push BOOLEAN,
        repo_visibility TEXT,
        repo_gated BOOLEAN,
        repo_active BOOLEAN,
        repo_counter INTEGER,
        repo_config_path TEXT,
        repo_hash TEXT,
        UNIQUE(repo_full_name)
    )",
    "CREATE TABLE builds (
        build_id INTEGER PRIMARY KEY AUTOINCREMENT,
        build_repo_id INTEGER,
        build_number INTEGER,
        build_parent INTEGER,
        build_event TEXT,
        build_status TEXT,
        build_error TEXT,
        build_enqueued INTEGER,
        build_created INTEGER,
        build_started INTEGER,
        build_finished INTEGER,
        build_deploy TEXT,
        build_commit TEXT,
        build_branch TEXT,
        build_ref TEXT,
        build_refspec TEXT,
        build_remote TEXT,
        build_title TEXT,
        build_message TEXT,
        build_timestamp INTEGER,
        build_sender TEXT,
        build_author TEXT,
        build_avatar TEXT,
        build_email TEXT,
        build_link TEXT,
        UNIQUE(build_number, build_repo_id)
    )",
    "CREATE TABLE procs (
        proc_id INTEGER PRIMARY KEY AUTOINCREMENT,
        proc_build_id INTEGER,
        proc_pid INTEGER,
        proc_ppid INTEGER,
        proc_pgid INTEGER,
        proc_name TEXT,
        proc_state TEXT,
        proc_error TEXT,
        proc_exit_code INTEGER,
        proc_started INTEGER,
        proc_stopped INTEGER,
        proc_machine TEXT,
        proc_platform TEXT,
        proc_environ TEXT,
        UNIQUE(proc_build_id, proc_pid)
    )",
    "CREATE TABLE logs (
        log_id INTEGER PRIMARY KEY AUTOINCREMENT,
        log_job_id INTEGER,
        log_data BLOB,
        UNIQUE(log_job_id)
    )",
    "CREATE TABLE secrets (
        secret_id INTEGER PRIMARY KEY AUTOINCREMENT,
        secret_repo_id INTEGER,
        secret_name TEXT,
        secret_value TEXT,
        secret_images TEXT,
        secret_events TEXT,
        secret_skip_verify BOOLEAN,
        secret_conceal BOOLEAN,
        UNIQUE(secret_name, secret_repo_id)
    )",
    "CREATE TABLE registry (
        registry_id INTEGER PRIMARY KEY AUTOINCREMENT,
        registry_repo_id INTEGER,
        registry_addr TEXT,
        registry_username TEXT,
        registry_password TEXT,
        registry_email TEXT,
        registry_token TEXT,
        UNIQUE(registry_addr, registry_repo_id)
    )",
];

/// Rows of the standard fixture.
///
/// - users 1 (octocat) and 2 (hubot)
/// - repos 5 (octocat/hello-world), 9 (hubot/spoon-knife) and the system
///   repo 3 owned by user 0
/// - builds 20 (repo 5), 21 (repo 9), 22 (repo 3)
/// - build 20: stage 100 with steps 101 and 102
/// - build 21: stage 110 with step 111; build 22: stage 120 with step 121
/// - logs for steps 101, 111 and 121; step 102 has none
/// - secrets 30 (repo 5), 31 (repo 9), 32 (repo 3)
/// - registries: two for repo 5, one for repo 3
const LEGACY_ROWS: &[&str] = &[
    "INSERT INTO users (user_id, user_login, user_token, user_secret, user_expiry, user_email, user_avatar, user_active, user_admin, user_hash)
     VALUES (1, 'octocat', 'token-1', 'refresh-1', 1700000000, 'octocat@github.com', 'https://avatars/1', 1, 1, 'h1'),
            (2, 'hubot', 'token-2', 'refresh-2', 0, 'hubot@github.com', 'https://avatars/2', 1, 0, 'h2')",
    "INSERT INTO repos (repo_id, repo_user_id, repo_owner, repo_name, repo_full_name, repo_link, repo_clone, repo_branch, repo_timeout, repo_private, repo_trusted, repo_visibility, repo_gated, repo_active, repo_counter, repo_config_path)
     VALUES (5, 1, 'octocat', 'hello-world', 'octocat/hello-world', 'https://github.com/octocat/hello-world', 'https://github.com/octocat/hello-world.git', 'master', 60, 0, 1, 'public', 1, 1, 42, '.drone.yml'),
            (9, 2, 'hubot', 'spoon-knife', 'hubot/spoon-knife', 'https://github.com/hubot/spoon-knife', 'https://github.com/hubot/spoon-knife.git', 'main', 90, 1, 0, 'private', 0, 1, 3, '.drone.yml'),
            (3, 0, 'drone', 'system', 'drone/system', '', '', 'master', 60, 0, 0, 'public', 0, 0, 0, '.drone.yml')",
    "INSERT INTO builds (build_id, build_repo_id, build_number, build_parent, build_event, build_status, build_error, build_created, build_started, build_finished, build_deploy, build_commit, build_branch, build_ref, build_title, build_message, build_timestamp, build_sender, build_author, build_avatar, build_email, build_link)
     VALUES (20, 5, 42, 0, 'push', 'success', NULL, 1000, 1001, 1100, '', 'abc123', 'master', 'refs/heads/master', '', 'update readme', 999, 'octocat', 'octocat', 'https://avatars/1', 'octocat@github.com', 'https://github.com/octocat/hello-world/commit/abc123'),
            (21, 9, 3, 0, 'pull_request', 'failure', 'exit 1', 2000, 2001, 2100, '', 'def456', 'main', 'refs/pull/1/head', 'fix', 'fix build', 1999, 'hubot', 'hubot', 'https://avatars/2', 'hubot@github.com', ''),
            (22, 3, 1, 0, 'push', 'success', NULL, 3000, 3001, 3100, '', 'fff000', 'master', 'refs/heads/master', '', 'system', 2999, '', '', '', '', '')",
    "INSERT INTO procs (proc_id, proc_build_id, proc_pid, proc_ppid, proc_pgid, proc_name, proc_state, proc_error, proc_exit_code, proc_started, proc_stopped, proc_machine)
     VALUES (100, 20, 1, 0, 1, '', 'success', NULL, 0, 1001, 1100, 'agent-1'),
            (101, 20, 2, 1, 2, 'clone', 'success', NULL, 0, 1002, 1010, 'agent-1'),
            (102, 20, 3, 1, 3, 'test', 'success', NULL, 0, 1011, 1099, 'agent-1'),
            (110, 21, 1, 0, 1, 'backend', 'failure', NULL, 1, 2001, 2100, 'agent-2'),
            (111, 21, 2, 1, 2, 'test', 'failure', 'exit 1', 1, 2002, 2099, 'agent-2'),
            (120, 22, 1, 0, 1, '', 'success', NULL, 0, 3001, 3100, 'agent-1'),
            (121, 22, 2, 1, 2, 'clone', 'success', NULL, 0, 3002, 3099, 'agent-1')",
    "INSERT INTO logs (log_id, log_job_id, log_data)
     VALUES (1, 101, X'2b2067697420636c6f6e65'),
            (2, 111, X'2b20676f2074657374'),
            (3, 121, X'2b20676974')",
    "INSERT INTO secrets (secret_id, secret_repo_id, secret_name, secret_value, secret_events)
     VALUES (30, 5, 'docker_password', 'correct-horse', '[\"push\",\"pull_request\"]'),
            (31, 9, 'slack_webhook', 'https://hooks.slack.com/x', ''),
            (32, 3, 'system_token', 'system', '[\"push\"]')",
    "INSERT INTO registry (registry_id, registry_repo_id, registry_addr, registry_username, registry_password, registry_email)
     VALUES (1, 5, 'index.docker.io', 'octocat', 'hunter2', 'octocat@github.com'),
            (2, 5, 'gcr.io', '_json_key', '{}', ''),
            (3, 3, 'quay.io', 'robot', 'secret', '')",
];

pub async fn exec(store: &dyn Store, sql: &str) {
    store
        .execute(&Statement::new(sql))
        .await
        .unwrap_or_else(|e| panic!("{sql}: {e}"));
}

/// Empty 0.x database.
pub async fn empty_source() -> SqliteStore {
    let store = SqliteStore::memory().await.unwrap();
    for stmt in LEGACY_SCHEMA {
        exec(&store, stmt).await;
    }
    store
}

/// 0.x database with the standard fixture.
pub async fn source() -> SqliteStore {
    let store = empty_source().await;
    for stmt in LEGACY_ROWS {
        exec(&store, stmt).await;
    }
    store
}

/// 1.x database with the full schema.
pub async fn target() -> SqliteStore {
    let store = SqliteStore::memory().await.unwrap();
    schema::setup(&store).await.unwrap();
    store
}

pub async fn count(store: &dyn Store, table: &str) -> i64 {
    let rows = store
        .query(&Statement::new(format!("SELECT COUNT(*) AS n FROM {table}")))
        .await
        .unwrap();
    rows[0].i64("n").unwrap()
}

/// Single-column query returning one value per row.
pub async fn column(store: &dyn Store, sql: &str, name: &str) -> Vec<String> {
    store
        .query(&Statement::new(sql))
        .await
        .unwrap()
        .iter()
        .map(|row| row.string(name).unwrap())
        .collect()
}
