//! Whole migration steps against in-memory SQLite databases.

mod common;

use std::sync::Mutex;

use async_trait::async_trait;
use drone_migrate::migrate;
use drone_migrate::{BlobStore, MigrateError, Result, Statement, Store};

use common::{column, count, exec};

async fn migrate_core(source: &dyn Store, target: &dyn Store) {
    migrate::migrate_users(source, target).await.unwrap();
    migrate::migrate_repos(source, target).await.unwrap();
    migrate::migrate_builds(source, target).await.unwrap();
}

#[tokio::test]
async fn test_users_keep_ids_and_get_defaults() {
    let source = common::source().await;
    let target = common::target().await;

    let summary = migrate::migrate_users(&source, &target).await.unwrap();
    assert_eq!(summary.resource, "users");
    assert_eq!((summary.extracted, summary.loaded, summary.skipped), (2, 2, 0));

    let rows = target
        .query(&Statement::new("SELECT * FROM users ORDER BY user_id"))
        .await
        .unwrap();
    assert_eq!(rows[0].i64("user_id").unwrap(), 1);
    assert_eq!(rows[0].string("user_login").unwrap(), "octocat");
    assert_eq!(rows[0].string("user_oauth_refresh").unwrap(), "refresh-1");
    assert!(rows[0].bool("user_active").unwrap());
    // 0.x admins are not carried over.
    assert!(!rows[0].bool("user_admin").unwrap());
    assert_eq!(rows[0].string("user_hash").unwrap().len(), 32);
    assert_ne!(
        rows[0].string("user_hash").unwrap(),
        rows[1].string("user_hash").unwrap()
    );
}

#[tokio::test]
async fn test_generated_ids_continue_after_migrated_users() {
    let source = common::source().await;
    let target = common::target().await;
    migrate::migrate_users(&source, &target).await.unwrap();

    exec(
        &target,
        "INSERT INTO users (user_login, user_email, user_machine, user_admin, user_active, \
         user_avatar, user_syncing, user_synced, user_created, user_updated, user_last_login, \
         user_oauth_token, user_oauth_refresh, user_oauth_expiry, user_hash) \
         VALUES ('new', '', 0, 0, 1, '', 0, 0, 0, 0, 0, '', '', 0, 'fresh-hash')",
    )
    .await;
    let ids = column(&target, "SELECT user_id FROM users WHERE user_login = 'new'", "user_id").await;
    assert_eq!(ids, vec!["3"]);
}

#[tokio::test]
async fn test_repos_skip_system_rows_and_get_placeholders() {
    let source = common::source().await;
    let target = common::target().await;

    let summary = migrate::migrate_repos(&source, &target).await.unwrap();
    assert_eq!(summary.loaded, 2);

    let rows = target
        .query(&Statement::new("SELECT * FROM repos ORDER BY repo_id"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].i64("repo_id").unwrap(), 5);
    assert_eq!(rows[0].string("repo_uid").unwrap(), "temp_5");
    assert_eq!(rows[0].string("repo_slug").unwrap(), "octocat/hello-world");
    assert_eq!(rows[0].string("repo_scm").unwrap(), "git");
    assert!(rows[0].bool("repo_protected").unwrap());
    assert_eq!(rows[0].i64("repo_counter").unwrap(), 42);
    assert_eq!(rows[1].i64("repo_id").unwrap(), 9);
    assert_eq!(rows[1].string("repo_uid").unwrap(), "temp_9");
}

#[tokio::test]
async fn test_builds_of_owned_repos_only() {
    let source = common::source().await;
    let target = common::target().await;
    exec(
        &source,
        &format!(
            "UPDATE builds SET build_title = '{}' WHERE build_id = 20",
            "x".repeat(1200)
        ),
    )
    .await;

    migrate_core(&source, &target).await;

    let ids = column(&target, "SELECT build_id FROM builds ORDER BY build_id", "build_id").await;
    assert_eq!(ids, vec!["20", "21"]);

    let rows = target
        .query(&Statement::new("SELECT * FROM builds WHERE build_id = 20"))
        .await
        .unwrap();
    let build = &rows[0];
    assert_eq!(build.string("build_title").unwrap().len(), 1000);
    assert_eq!(build.string("build_message").unwrap(), "update readme");
    assert_eq!(build.string("build_trigger").unwrap(), "@hook");
    assert_eq!(build.string("build_before").unwrap(), "abc123");
    assert_eq!(build.string("build_after").unwrap(), "abc123");
    assert_eq!(build.string("build_params").unwrap(), "{}");
}

#[tokio::test]
async fn test_stages_and_steps_are_linked_per_build() {
    let source = common::source().await;
    let target = common::target().await;
    migrate_core(&source, &target).await;

    let summary = migrate::migrate_stages(&source, &target).await.unwrap();
    // Build 22 belongs to the system repository.
    assert_eq!(summary.extracted, 5);
    assert_eq!(summary.loaded, 5);

    let stages = target
        .query(&Statement::new("SELECT * FROM stages ORDER BY stage_id"))
        .await
        .unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].i64("stage_id").unwrap(), 100);
    assert_eq!(stages[0].i64("stage_build_id").unwrap(), 20);
    assert_eq!(stages[0].i64("stage_repo_id").unwrap(), 5);
    assert_eq!(stages[0].i64("stage_number").unwrap(), 1);
    assert_eq!(stages[0].string("stage_name").unwrap(), "default");
    assert_eq!(stages[1].string("stage_name").unwrap(), "backend");

    let links = column(
        &target,
        "SELECT step_id || ':' || step_stage_id AS link FROM steps ORDER BY step_id",
        "link",
    )
    .await;
    assert_eq!(links, vec!["101:100", "102:100", "111:110"]);
}

#[tokio::test]
async fn test_orphan_step_commits_nothing() {
    let source = common::source().await;
    let target = common::target().await;
    migrate_core(&source, &target).await;

    // Step of build 21 pointing at a stage pid that only exists in build 20.
    exec(
        &source,
        "INSERT INTO procs (proc_id, proc_build_id, proc_pid, proc_ppid, proc_name, proc_state) \
         VALUES (112, 21, 3, 7, 'orphan', 'success')",
    )
    .await;

    let err = migrate::migrate_stages(&source, &target).await.unwrap_err();
    assert!(matches!(err, MigrateError::Transform { .. }));
    assert_eq!(count(&target, "stages").await, 0);
    assert_eq!(count(&target, "steps").await, 0);
}

#[tokio::test]
async fn test_logs_copied_by_step_id() {
    let source = common::source().await;
    let target = common::target().await;
    migrate_core(&source, &target).await;
    migrate::migrate_stages(&source, &target).await.unwrap();

    let summary = migrate::migrate_logs(&source, &target).await.unwrap();
    assert_eq!(summary.extracted, 3);
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 1);

    let rows = target
        .query(&Statement::new("SELECT log_id, log_data FROM logs ORDER BY log_id"))
        .await
        .unwrap();
    assert_eq!(rows[0].i64("log_id").unwrap(), 101);
    assert_eq!(rows[0].bytes("log_data").unwrap(), b"+ git clone");
    assert_eq!(rows[1].i64("log_id").unwrap(), 111);
}

#[tokio::test]
async fn test_log_insert_failure_commits_nothing() {
    let source = common::source().await;
    let target = common::target().await;
    migrate_core(&source, &target).await;
    migrate::migrate_stages(&source, &target).await.unwrap();

    // Step 101 is inserted first, then 111 collides with this row.
    exec(&target, "INSERT INTO logs (log_id, log_data) VALUES (111, x'00')").await;

    let err = migrate::migrate_logs(&source, &target).await.unwrap_err();
    assert!(matches!(err, MigrateError::Sqlx(_)));
    let ids = column(&target, "SELECT log_id FROM logs ORDER BY log_id", "log_id").await;
    assert_eq!(ids, vec!["111"]);
}

#[derive(Default)]
struct MemoryBlobStore {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        if self.fail_on == Some(key) {
            return Err(MigrateError::Storage("access denied".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), data.to_vec()));
        Ok(())
    }
}

#[tokio::test]
async fn test_logs_uploaded_under_prefix() {
    let source = common::source().await;
    let storage = MemoryBlobStore::default();

    let summary = migrate::migrate_logs_to_storage(&source, &storage, "drone/logs")
        .await
        .unwrap();
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 1);

    let objects = storage.objects.lock().unwrap();
    assert_eq!(objects[0].0, "/drone/logs/101");
    assert_eq!(objects[0].1, b"+ git clone");
    assert_eq!(objects[1].0, "/drone/logs/111");
}

#[tokio::test]
async fn test_log_upload_failure_stops_step() {
    let source = common::source().await;
    let storage = MemoryBlobStore {
        fail_on: Some("/101"),
        ..Default::default()
    };

    let err = migrate::migrate_logs_to_storage(&source, &storage, "")
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::Storage(_)));
    assert!(storage.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_secrets_follow_repositories_by_slug() {
    let source = common::source().await;
    let target = common::target().await;
    migrate::migrate_repos(&source, &target).await.unwrap();

    let summary = migrate::migrate_secrets(&source, &target).await.unwrap();
    assert_eq!(summary.extracted, 3);
    assert_eq!(summary.loaded, 2);
    // drone/system was never migrated.
    assert_eq!(summary.skipped, 1);

    let rows = target
        .query(&Statement::new("SELECT * FROM secrets ORDER BY secret_id"))
        .await
        .unwrap();
    assert_eq!(rows[0].i64("secret_id").unwrap(), 30);
    assert_eq!(rows[0].i64("secret_repo_id").unwrap(), 5);
    assert_eq!(rows[0].bytes("secret_data").unwrap(), b"correct-horse");
    assert!(rows[0].bool("secret_pull_request").unwrap());
    assert!(!rows[0].bool("secret_pull_request_push").unwrap());
    assert_eq!(rows[1].i64("secret_id").unwrap(), 31);
    assert!(!rows[1].bool("secret_pull_request").unwrap());
}

#[tokio::test]
async fn test_registries_become_docker_config_secret() {
    let source = common::source().await;
    let target = common::target().await;
    migrate::migrate_repos(&source, &target).await.unwrap();

    let summary = migrate::migrate_registries(&source, &target).await.unwrap();
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.loaded, 1);

    let rows = target
        .query(&Statement::new(
            "SELECT * FROM secrets WHERE secret_name = '.dockerconfigjson'",
        ))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].i64("secret_repo_id").unwrap(), 5);
    assert!(rows[0].bool("secret_pull_request").unwrap());

    let doc: serde_json::Value =
        serde_json::from_slice(&rows[0].bytes("secret_data").unwrap()).unwrap();
    assert_eq!(doc["auths"]["index.docker.io"]["email"], "octocat@github.com");
    assert!(doc["auths"]["gcr.io"]["auth"].is_string());
}

#[tokio::test]
async fn test_empty_source_loads_nothing() {
    let source = common::empty_source().await;
    let target = common::target().await;

    let summary = migrate::migrate_users(&source, &target).await.unwrap();
    assert_eq!((summary.extracted, summary.loaded), (0, 0));
    let summary = migrate::migrate_stages(&source, &target).await.unwrap();
    assert_eq!(summary.loaded, 0);
}
