//! 1.x schema for MySQL/MariaDB.
//!
//! MySQL has neither partial indexes nor `CREATE INDEX IF NOT EXISTS`; the
//! ledger keeps the plain index statements from running twice.

use super::Migration;

pub(super) const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create-table-users",
        stmt: CREATE_TABLE_USERS,
    },
    Migration {
        name: "create-table-repos",
        stmt: CREATE_TABLE_REPOS,
    },
    Migration {
        name: "create-table-perms",
        stmt: CREATE_TABLE_PERMS,
    },
    Migration {
        name: "create-index-perms-user",
        stmt: "CREATE INDEX ix_perms_user ON perms (perm_user_id)",
    },
    Migration {
        name: "create-index-perms-repo",
        stmt: "CREATE INDEX ix_perms_repo ON perms (perm_repo_uid)",
    },
    Migration {
        name: "create-table-builds",
        stmt: CREATE_TABLE_BUILDS,
    },
    Migration {
        name: "create-index-builds-in-progress",
        stmt: "CREATE INDEX ix_build_in_progress ON builds (build_status)",
    },
    Migration {
        name: "create-index-builds-repo",
        stmt: "CREATE INDEX ix_build_repo ON builds (build_repo_id)",
    },
    Migration {
        name: "create-index-builds-author",
        stmt: "CREATE INDEX ix_build_author ON builds (build_author)",
    },
    Migration {
        name: "create-index-builds-sender",
        stmt: "CREATE INDEX ix_build_sender ON builds (build_sender)",
    },
    Migration {
        name: "create-index-builds-ref",
        stmt: "CREATE INDEX ix_build_ref ON builds (build_repo_id, build_ref)",
    },
    Migration {
        name: "create-index-build-incomplete",
        stmt: "CREATE INDEX ix_build_incomplete ON builds (build_status)",
    },
    Migration {
        name: "create-table-stages",
        stmt: CREATE_TABLE_STAGES,
    },
    Migration {
        name: "create-index-stages-build",
        stmt: "CREATE INDEX ix_stages_build ON stages (stage_build_id)",
    },
    Migration {
        name: "create-index-stages-status",
        stmt: "CREATE INDEX ix_stages_status ON stages (stage_status)",
    },
    Migration {
        name: "create-table-steps",
        stmt: CREATE_TABLE_STEPS,
    },
    Migration {
        name: "create-index-steps-stage",
        stmt: "CREATE INDEX ix_steps_stage ON steps (step_stage_id)",
    },
    Migration {
        name: "create-table-logs",
        stmt: CREATE_TABLE_LOGS,
    },
    Migration {
        name: "create-table-cron",
        stmt: CREATE_TABLE_CRON,
    },
    Migration {
        name: "create-index-cron-repo",
        stmt: "CREATE INDEX ix_cron_repo ON cron (cron_repo_id)",
    },
    Migration {
        name: "create-index-cron-next",
        stmt: "CREATE INDEX ix_cron_next ON cron (cron_next)",
    },
    Migration {
        name: "create-table-secrets",
        stmt: CREATE_TABLE_SECRETS,
    },
    Migration {
        name: "create-index-secrets-repo",
        stmt: "CREATE INDEX ix_secret_repo ON secrets (secret_repo_id)",
    },
    Migration {
        name: "create-index-secrets-repo-name",
        stmt: "CREATE INDEX ix_secret_repo_name ON secrets (secret_repo_id, secret_name)",
    },
    Migration {
        name: "create-table-nodes",
        stmt: CREATE_TABLE_NODES,
    },
];

const CREATE_TABLE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
 user_id            INTEGER PRIMARY KEY AUTO_INCREMENT
,user_login         VARCHAR(250)
,user_email         VARCHAR(500)
,user_admin         BOOLEAN
,user_machine       BOOLEAN
,user_active        BOOLEAN
,user_avatar        VARCHAR(2000)
,user_syncing       BOOLEAN
,user_synced        INTEGER
,user_created       INTEGER
,user_updated       INTEGER
,user_last_login    INTEGER
,user_oauth_token   VARCHAR(500)
,user_oauth_refresh VARCHAR(500)
,user_oauth_expiry  INTEGER
,user_hash          VARCHAR(500)
,UNIQUE(user_login)
,UNIQUE(user_hash)
)";

const CREATE_TABLE_REPOS: &str = "
CREATE TABLE IF NOT EXISTS repos (
 repo_id                    INTEGER PRIMARY KEY AUTO_INCREMENT
,repo_uid                   VARCHAR(250)
,repo_user_id               INTEGER
,repo_namespace             VARCHAR(250)
,repo_name                  VARCHAR(250)
,repo_slug                  VARCHAR(250)
,repo_scm                   VARCHAR(50)
,repo_clone_url             VARCHAR(2000)
,repo_ssh_url               VARCHAR(2000)
,repo_html_url              VARCHAR(2000)
,repo_active                BOOLEAN
,repo_private               BOOLEAN
,repo_visibility            VARCHAR(50)
,repo_branch                VARCHAR(250)
,repo_counter               INTEGER
,repo_config                VARCHAR(500)
,repo_timeout               INTEGER
,repo_trusted               BOOLEAN
,repo_protected             BOOLEAN
,repo_synced                INTEGER
,repo_created               INTEGER
,repo_updated               INTEGER
,repo_version               INTEGER
,repo_signer                VARCHAR(50)
,repo_secret                VARCHAR(50)
,UNIQUE(repo_slug)
,UNIQUE(repo_uid)
)";

const CREATE_TABLE_PERMS: &str = "
CREATE TABLE IF NOT EXISTS perms (
 perm_user_id  INTEGER
,perm_repo_uid VARCHAR(250)
,perm_read     BOOLEAN
,perm_write    BOOLEAN
,perm_admin    BOOLEAN
,perm_synced   INTEGER
,perm_created  INTEGER
,perm_updated  INTEGER
,PRIMARY KEY(perm_user_id, perm_repo_uid)
)";

const CREATE_TABLE_BUILDS: &str = "
CREATE TABLE IF NOT EXISTS builds (
 build_id            INTEGER PRIMARY KEY AUTO_INCREMENT
,build_repo_id       INTEGER
,build_trigger       VARCHAR(250)
,build_number        INTEGER
,build_parent        INTEGER
,build_status        VARCHAR(50)
,build_error         VARCHAR(500)
,build_event         VARCHAR(50)
,build_action        VARCHAR(50)
,build_link          VARCHAR(1000)
,build_timestamp     INTEGER
,build_title         VARCHAR(2000)
,build_message       VARCHAR(2000)
,build_before        VARCHAR(50)
,build_after         VARCHAR(50)
,build_ref           VARCHAR(500)
,build_source_repo   VARCHAR(250)
,build_source        VARCHAR(500)
,build_target        VARCHAR(500)
,build_author        VARCHAR(500)
,build_author_name   VARCHAR(500)
,build_author_email  VARCHAR(500)
,build_author_avatar VARCHAR(1000)
,build_sender        VARCHAR(500)
,build_deploy        VARCHAR(500)
,build_params        TEXT
,build_started       INTEGER
,build_finished      INTEGER
,build_created       INTEGER
,build_updated       INTEGER
,build_version       INTEGER
,UNIQUE(build_repo_id, build_number)
)";

const CREATE_TABLE_STAGES: &str = "
CREATE TABLE IF NOT EXISTS stages (
 stage_id          INTEGER PRIMARY KEY AUTO_INCREMENT
,stage_repo_id     INTEGER
,stage_build_id    INTEGER
,stage_number      INTEGER
,stage_kind        VARCHAR(50)
,stage_type        VARCHAR(50)
,stage_name        VARCHAR(100)
,stage_status      VARCHAR(50)
,stage_error       VARCHAR(500)
,stage_errignore   BOOLEAN
,stage_exit_code   INTEGER
,stage_limit       INTEGER
,stage_os          VARCHAR(50)
,stage_arch        VARCHAR(50)
,stage_variant     VARCHAR(10)
,stage_kernel      VARCHAR(50)
,stage_machine     VARCHAR(500)
,stage_started     INTEGER
,stage_stopped     INTEGER
,stage_created     INTEGER
,stage_updated     INTEGER
,stage_version     INTEGER
,stage_on_success  BOOLEAN
,stage_on_failure  BOOLEAN
,stage_depends_on  TEXT
,stage_labels      TEXT
,UNIQUE(stage_build_id, stage_number)
)";

const CREATE_TABLE_STEPS: &str = "
CREATE TABLE IF NOT EXISTS steps (
 step_id          INTEGER PRIMARY KEY AUTO_INCREMENT
,step_stage_id    INTEGER
,step_number      INTEGER
,step_name        VARCHAR(100)
,step_status      VARCHAR(50)
,step_error       VARCHAR(500)
,step_errignore   BOOLEAN
,step_exit_code   INTEGER
,step_started     INTEGER
,step_stopped     INTEGER
,step_version     INTEGER
,UNIQUE(step_stage_id, step_number)
)";

const CREATE_TABLE_LOGS: &str = "
CREATE TABLE IF NOT EXISTS logs (
 log_id    INTEGER PRIMARY KEY
,log_data  MEDIUMBLOB
)";

const CREATE_TABLE_CRON: &str = "
CREATE TABLE IF NOT EXISTS cron (
 cron_id          INTEGER PRIMARY KEY AUTO_INCREMENT
,cron_repo_id     INTEGER
,cron_name        VARCHAR(50)
,cron_expr        VARCHAR(50)
,cron_next        INTEGER
,cron_prev        INTEGER
,cron_event       VARCHAR(50)
,cron_branch      VARCHAR(250)
,cron_target      VARCHAR(250)
,cron_disabled    BOOLEAN
,cron_created     INTEGER
,cron_updated     INTEGER
,cron_version     INTEGER
,UNIQUE(cron_repo_id, cron_name)
)";

const CREATE_TABLE_SECRETS: &str = "
CREATE TABLE IF NOT EXISTS secrets (
 secret_id                INTEGER PRIMARY KEY AUTO_INCREMENT
,secret_repo_id           INTEGER
,secret_name              VARCHAR(500)
,secret_data              BLOB
,secret_pull_request      BOOLEAN
,secret_pull_request_push BOOLEAN
,UNIQUE(secret_repo_id, secret_name)
)";

const CREATE_TABLE_NODES: &str = "
CREATE TABLE IF NOT EXISTS nodes (
 node_id         INTEGER PRIMARY KEY AUTO_INCREMENT
,node_uid        VARCHAR(500)
,node_provider   VARCHAR(50)
,node_state      VARCHAR(50)
,node_name       VARCHAR(50)
,node_image      VARCHAR(500)
,node_region     VARCHAR(100)
,node_size       VARCHAR(100)
,node_os         VARCHAR(50)
,node_arch       VARCHAR(50)
,node_kernel     VARCHAR(50)
,node_variant    VARCHAR(50)
,node_address    VARCHAR(500)
,node_capacity   INTEGER
,node_filter     VARCHAR(2000)
,node_labels     VARCHAR(2000)
,node_error      VARCHAR(2000)
,node_ca_key     BLOB
,node_ca_cert    BLOB
,node_tls_key    BLOB
,node_tls_cert   BLOB
,node_tls_name   VARCHAR(500)
,node_paused     BOOLEAN
,node_protected  BOOLEAN
,node_created    INTEGER
,node_updated    INTEGER
,node_pulled     INTEGER
,UNIQUE(node_name)
)";
