//! 1.x schema for SQLite.

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
        stmt: "CREATE INDEX IF NOT EXISTS ix_perms_user ON perms (perm_user_id)",
    },
    Migration {
        name: "create-index-perms-repo",
        stmt: "CREATE INDEX IF NOT EXISTS ix_perms_repo ON perms (perm_repo_uid)",
    },
    Migration {
        name: "create-table-builds",
        stmt: CREATE_TABLE_BUILDS,
    },
    Migration {
        name: "create-index-builds-in-progress",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_in_progress ON builds (build_status) \
               WHERE build_status IN ('pending', 'running')",
    },
    Migration {
        name: "create-index-builds-repo",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_repo ON builds (build_repo_id)",
    },
    Migration {
        name: "create-index-builds-author",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_author ON builds (build_author)",
    },
    Migration {
        name: "create-index-builds-sender",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_sender ON builds (build_sender)",
    },
    Migration {
        name: "create-index-builds-ref",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_ref ON builds (build_repo_id, build_ref)",
    },
    Migration {
        name: "create-index-build-incomplete",
        stmt: "CREATE INDEX IF NOT EXISTS ix_build_incomplete ON builds (build_status) \
               WHERE build_status IN ('pending', 'running')",
    },
    Migration {
        name: "create-table-stages",
        stmt: CREATE_TABLE_STAGES,
    },
    Migration {
        name: "create-index-stages-build",
        stmt: "CREATE INDEX IF NOT EXISTS ix_stages_build ON stages (stage_build_id)",
    },
    Migration {
        name: "create-index-stages-status",
        stmt: "CREATE INDEX IF NOT EXISTS ix_stage_in_progress ON stages (stage_status) \
               WHERE stage_status IN ('pending', 'running')",
    },
    Migration {
        name: "create-table-steps",
        stmt: CREATE_TABLE_STEPS,
    },
    Migration {
        name: "create-index-steps-stage",
        stmt: "CREATE INDEX IF NOT EXISTS ix_steps_stage ON steps (step_stage_id)",
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
        stmt: "CREATE INDEX IF NOT EXISTS ix_cron_repo ON cron (cron_repo_id)",
    },
    Migration {
        name: "create-index-cron-next",
        stmt: "CREATE INDEX IF NOT EXISTS ix_cron_next ON cron (cron_next)",
    },
    Migration {
        name: "create-table-secrets",
        stmt: CREATE_TABLE_SECRETS,
    },
    Migration {
        name: "create-index-secrets-repo",
        stmt: "CREATE INDEX IF NOT EXISTS ix_secret_repo ON secrets (secret_repo_id)",
    },
    Migration {
        name: "create-index-secrets-repo-name",
        stmt: "CREATE INDEX IF NOT EXISTS ix_secret_repo_name ON secrets (secret_repo_id, secret_name)",
    },
    Migration {
        name: "create-table-nodes",
        stmt: CREATE_TABLE_NODES,
    },
];

const CREATE_TABLE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
 user_id            INTEGER PRIMARY KEY AUTOINCREMENT
,user_login         TEXT
,user_email         TEXT
,user_admin         BOOLEAN
,user_machine       BOOLEAN
,user_active        BOOLEAN
,user_avatar        TEXT
,user_syncing       BOOLEAN
,user_synced        INTEGER
,user_created       INTEGER
,user_updated       INTEGER
,user_last_login    INTEGER
,user_oauth_token   TEXT
,user_oauth_refresh TEXT
,user_oauth_expiry  INTEGER
,user_hash          TEXT
,UNIQUE(user_login COLLATE NOCASE)
,UNIQUE(user_hash)
)";

const CREATE_TABLE_REPOS: &str = "
CREATE TABLE IF NOT EXISTS repos (
 repo_id                    INTEGER PRIMARY KEY AUTOINCREMENT
,repo_uid                   TEXT
,repo_user_id               INTEGER
,repo_namespace             TEXT
,repo_name                  TEXT
,repo_slug                  TEXT
,repo_scm                   TEXT
,repo_clone_url             TEXT
,repo_ssh_url               TEXT
,repo_html_url              TEXT
,repo_active                BOOLEAN
,repo_private               BOOLEAN
,repo_visibility            TEXT
,repo_branch                TEXT
,repo_counter               INTEGER
,repo_config                TEXT
,repo_timeout               INTEGER
,repo_trusted               BOOLEAN
,repo_protected             BOOLEAN
,repo_synced                INTEGER
,repo_created               INTEGER
,repo_updated               INTEGER
,repo_version               INTEGER
,repo_signer                TEXT
,repo_secret                TEXT
,UNIQUE(repo_slug)
,UNIQUE(repo_uid)
)";

const CREATE_TABLE_PERMS: &str = "
CREATE TABLE IF NOT EXISTS perms (
 perm_user_id  INTEGER
,perm_repo_uid TEXT
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
 build_id            INTEGER PRIMARY KEY AUTOINCREMENT
,build_repo_id       INTEGER
,build_trigger       TEXT
,build_number        INTEGER
,build_parent        INTEGER
,build_status        TEXT
,build_error         TEXT
,build_event         TEXT
,build_action        TEXT
,build_link          TEXT
,build_timestamp     INTEGER
,build_title         TEXT
,build_message       TEXT
,build_before        TEXT
,build_after         TEXT
,build_ref           TEXT
,build_source_repo   TEXT
,build_source        TEXT
,build_target        TEXT
,build_author        TEXT
,build_author_name   TEXT
,build_author_email  TEXT
,build_author_avatar TEXT
,build_sender        TEXT
,build_deploy        TEXT
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
 stage_id          INTEGER PRIMARY KEY AUTOINCREMENT
,stage_repo_id     INTEGER
,stage_build_id    INTEGER
,stage_number      INTEGER
,stage_kind        TEXT
,stage_type        TEXT
,stage_name        TEXT
,stage_status      TEXT
,stage_error       TEXT
,stage_errignore   BOOLEAN
,stage_exit_code   INTEGER
,stage_limit       INTEGER
,stage_os          TEXT
,stage_arch        TEXT
,stage_variant     TEXT
,stage_kernel      TEXT
,stage_machine     TEXT
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
,FOREIGN KEY(stage_build_id) REFERENCES builds(build_id) ON DELETE CASCADE
)";

const CREATE_TABLE_STEPS: &str = "
CREATE TABLE IF NOT EXISTS steps (
 step_id          INTEGER PRIMARY KEY AUTOINCREMENT
,step_stage_id    INTEGER
,step_number      INTEGER
,step_name        TEXT
,step_status      TEXT
,step_error       TEXT
,step_errignore   BOOLEAN
,step_exit_code   INTEGER
,step_started     INTEGER
,step_stopped     INTEGER
,step_version     INTEGER
,UNIQUE(step_stage_id, step_number)
,FOREIGN KEY(step_stage_id) REFERENCES stages(stage_id) ON DELETE CASCADE
)";

const CREATE_TABLE_LOGS: &str = "
CREATE TABLE IF NOT EXISTS logs (
 log_id    INTEGER PRIMARY KEY
,log_data  BLOB
,FOREIGN KEY(log_id) REFERENCES steps(step_id) ON DELETE CASCADE
)";

const CREATE_TABLE_CRON: &str = "
CREATE TABLE IF NOT EXISTS cron (
 cron_id          INTEGER PRIMARY KEY AUTOINCREMENT
,cron_repo_id     INTEGER
,cron_name        TEXT
,cron_expr        TEXT
,cron_next        INTEGER
,cron_prev        INTEGER
,cron_event       TEXT
,cron_branch      TEXT
,cron_target      TEXT
,cron_disabled    BOOLEAN
,cron_created     INTEGER
,cron_updated     INTEGER
,cron_version     INTEGER
,UNIQUE(cron_repo_id, cron_name)
,FOREIGN KEY(cron_repo_id) REFERENCES repos(repo_id) ON DELETE CASCADE
)";

const CREATE_TABLE_SECRETS: &str = "
CREATE TABLE IF NOT EXISTS secrets (
 secret_id                INTEGER PRIMARY KEY AUTOINCREMENT
,secret_repo_id           INTEGER
,secret_name              TEXT
,secret_data              BLOB
,secret_pull_request      BOOLEAN
,secret_pull_request_push BOOLEAN
,UNIQUE(secret_repo_id, secret_name)
,FOREIGN KEY(secret_repo_id) REFERENCES repos(repo_id) ON DELETE CASCADE
)";

const CREATE_TABLE_NODES: &str = "
CREATE TABLE IF NOT EXISTS nodes (
 node_id         INTEGER PRIMARY KEY AUTOINCREMENT
,node_uid        TEXT
,node_provider   TEXT
,node_state      TEXT
,node_name       TEXT
,node_image      TEXT
,node_region     TEXT
,node_size       TEXT
,node_os         TEXT
,node_arch       TEXT
,node_kernel     TEXT
,node_variant    TEXT
,node_address    TEXT
,node_capacity   INTEGER
,node_filter     TEXT
,node_labels     TEXT
,node_error      TEXT
,node_ca_key     TEXT
,node_ca_cert    TEXT
,node_tls_key    TEXT
,node_tls_cert   TEXT
,node_tls_name   TEXT
,node_paused     BOOLEAN
,node_protected  BOOLEAN
,node_created    INTEGER
,node_updated    INTEGER
,node_pulled     INTEGER
,UNIQUE(node_name)
)";
