//! Drone 1.x records as written to the target database.

use crate::core::traits::Record;
use crate::core::value::SqlValue;

/// A 1.x user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserV1 {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub machine: bool,
    pub admin: bool,
    pub active: bool,
    pub avatar: String,
    pub syncing: bool,
    pub synced: i64,
    pub created: i64,
    pub updated: i64,
    pub last_login: i64,
    pub token: String,
    pub refresh: String,
    pub expiry: i64,
    pub hash: String,
}

impl Record for UserV1 {
    const TABLE: &'static str = "users";
    const ID_COLUMN: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] = &[
        "user_login",
        "user_email",
        "user_machine",
        "user_admin",
        "user_active",
        "user_avatar",
        "user_syncing",
        "user_synced",
        "user_created",
        "user_updated",
        "user_last_login",
        "user_oauth_token",
        "user_oauth_refresh",
        "user_oauth_expiry",
        "user_hash",
    ];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.login.as_str().into(),
            self.email.as_str().into(),
            self.machine.into(),
            self.admin.into(),
            self.active.into(),
            self.avatar.as_str().into(),
            self.syncing.into(),
            self.synced.into(),
            self.created.into(),
            self.updated.into(),
            self.last_login.into(),
            self.token.as_str().into(),
            self.refresh.as_str().into(),
            self.expiry.into(),
            self.hash.as_str().into(),
        ]
    }
}

/// A 1.x repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoV1 {
    pub id: i64,
    pub uid: String,
    pub user_id: i64,
    pub namespace: String,
    pub name: String,
    pub slug: String,
    pub scm: String,
    pub http_url: String,
    pub ssh_url: String,
    pub link: String,
    pub branch: String,
    pub private: bool,
    pub visibility: String,
    pub active: bool,
    pub config: String,
    pub trusted: bool,
    pub protected: bool,
    pub timeout: i64,
    pub counter: i64,
    pub synced: i64,
    pub created: i64,
    pub updated: i64,
    pub version: i64,
    pub signer: String,
    pub secret: String,
}

impl Record for RepoV1 {
    const TABLE: &'static str = "repos";
    const ID_COLUMN: &'static str = "repo_id";
    const COLUMNS: &'static [&'static str] = &[
        "repo_uid",
        "repo_user_id",
        "repo_namespace",
        "repo_name",
        "repo_slug",
        "repo_scm",
        "repo_clone_url",
        "repo_ssh_url",
        "repo_html_url",
        "repo_branch",
        "repo_private",
        "repo_visibility",
        "repo_active",
        "repo_config",
        "repo_trusted",
        "repo_protected",
        "repo_timeout",
        "repo_counter",
        "repo_synced",
        "repo_created",
        "repo_updated",
        "repo_version",
        "repo_signer",
        "repo_secret",
    ];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.uid.as_str().into(),
            self.user_id.into(),
            self.namespace.as_str().into(),
            self.name.as_str().into(),
            self.slug.as_str().into(),
            self.scm.as_str().into(),
            self.http_url.as_str().into(),
            self.ssh_url.as_str().into(),
            self.link.as_str().into(),
            self.branch.as_str().into(),
            self.private.into(),
            self.visibility.as_str().into(),
            self.active.into(),
            self.config.as_str().into(),
            self.trusted.into(),
            self.protected.into(),
            self.timeout.into(),
            self.counter.into(),
            self.synced.into(),
            self.created.into(),
            self.updated.into(),
            self.version.into(),
            self.signer.as_str().into(),
            self.secret.as_str().into(),
        ]
    }
}

/// A 1.x build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildV1 {
    pub id: i64,
    pub repo_id: i64,
    pub trigger: String,
    pub number: i64,
    pub parent: i64,
    pub status: String,
    pub error: String,
    pub event: String,
    pub action: String,
    pub link: String,
    pub timestamp: i64,
    pub title: String,
    pub message: String,
    pub before: String,
    pub after: String,
    pub git_ref: String,
    pub source_repo: String,
    pub source: String,
    pub target: String,
    pub author: String,
    pub author_name: String,
    pub author_email: String,
    pub author_avatar: String,
    pub sender: String,
    /// JSON encoded parameter map.
    pub params: String,
    pub deploy: String,
    pub started: i64,
    pub finished: i64,
    pub created: i64,
    pub updated: i64,
    pub version: i64,
}

impl Record for BuildV1 {
    const TABLE: &'static str = "builds";
    const ID_COLUMN: &'static str = "build_id";
    const COLUMNS: &'static [&'static str] = &[
        "build_repo_id",
        "build_trigger",
        "build_number",
        "build_parent",
        "build_status",
        "build_error",
        "build_event",
        "build_action",
        "build_link",
        "build_timestamp",
        "build_title",
        "build_message",
        "build_before",
        "build_after",
        "build_ref",
        "build_source_repo",
        "build_source",
        "build_target",
        "build_author",
        "build_author_name",
        "build_author_email",
        "build_author_avatar",
        "build_sender",
        "build_params",
        "build_deploy",
        "build_started",
        "build_finished",
        "build_created",
        "build_updated",
        "build_version",
    ];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.repo_id.into(),
            self.trigger.as_str().into(),
            self.number.into(),
            self.parent.into(),
            self.status.as_str().into(),
            self.error.as_str().into(),
            self.event.as_str().into(),
            self.action.as_str().into(),
            self.link.as_str().into(),
            self.timestamp.into(),
            self.title.as_str().into(),
            self.message.as_str().into(),
            self.before.as_str().into(),
            self.after.as_str().into(),
            self.git_ref.as_str().into(),
            self.source_repo.as_str().into(),
            self.source.as_str().into(),
            self.target.as_str().into(),
            self.author.as_str().into(),
            self.author_name.as_str().into(),
            self.author_email.as_str().into(),
            self.author_avatar.as_str().into(),
            self.sender.as_str().into(),
            self.params.as_str().into(),
            self.deploy.as_str().into(),
            self.started.into(),
            self.finished.into(),
            self.created.into(),
            self.updated.into(),
            self.version.into(),
        ]
    }
}

/// A 1.x stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageV1 {
    pub id: i64,
    pub repo_id: i64,
    pub build_id: i64,
    pub number: i64,
    pub name: String,
    pub kind: String,
    pub stage_type: String,
    pub status: String,
    pub error: String,
    pub err_ignore: bool,
    pub exit_code: i64,
    pub machine: String,
    pub os: String,
    pub arch: String,
    pub variant: String,
    pub kernel: String,
    pub limit: i64,
    pub started: i64,
    pub stopped: i64,
    pub created: i64,
    pub updated: i64,
    pub version: i64,
    pub on_success: bool,
    pub on_failure: bool,
    /// JSON encoded list of stage names.
    pub depends_on: String,
    /// JSON encoded label map.
    pub labels: String,
}

impl Record for StageV1 {
    const TABLE: &'static str = "stages";
    const ID_COLUMN: &'static str = "stage_id";
    const COLUMNS: &'static [&'static str] = &[
        "stage_repo_id",
        "stage_build_id",
        "stage_number",
        "stage_name",
        "stage_kind",
        "stage_type",
        "stage_status",
        "stage_error",
        "stage_errignore",
        "stage_exit_code",
        "stage_machine",
        "stage_os",
        "stage_arch",
        "stage_variant",
        "stage_kernel",
        "stage_limit",
        "stage_started",
        "stage_stopped",
        "stage_created",
        "stage_updated",
        "stage_version",
        "stage_on_success",
        "stage_on_failure",
        "stage_depends_on",
        "stage_labels",
    ];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.repo_id.into(),
            self.build_id.into(),
            self.number.into(),
            self.name.as_str().into(),
            self.kind.as_str().into(),
            self.stage_type.as_str().into(),
            self.status.as_str().into(),
            self.error.as_str().into(),
            self.err_ignore.into(),
            self.exit_code.into(),
            self.machine.as_str().into(),
            self.os.as_str().into(),
            self.arch.as_str().into(),
            self.variant.as_str().into(),
            self.kernel.as_str().into(),
            self.limit.into(),
            self.started.into(),
            self.stopped.into(),
            self.created.into(),
            self.updated.into(),
            self.version.into(),
            self.on_success.into(),
            self.on_failure.into(),
            self.depends_on.as_str().into(),
            self.labels.as_str().into(),
        ]
    }
}

/// A 1.x step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepV1 {
    pub id: i64,
    pub stage_id: i64,
    pub number: i64,
    pub name: String,
    pub status: String,
    pub error: String,
    pub err_ignore: bool,
    pub exit_code: i64,
    pub started: i64,
    pub stopped: i64,
    pub version: i64,
}

impl Record for StepV1 {
    const TABLE: &'static str = "steps";
    const ID_COLUMN: &'static str = "step_id";
    const COLUMNS: &'static [&'static str] = &[
        "step_stage_id",
        "step_number",
        "step_name",
        "step_status",
        "step_error",
        "step_errignore",
        "step_exit_code",
        "step_started",
        "step_stopped",
        "step_version",
    ];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.stage_id.into(),
            self.number.into(),
            self.name.as_str().into(),
            self.status.as_str().into(),
            self.error.as_str().into(),
            self.err_ignore.into(),
            self.exit_code.into(),
            self.started.into(),
            self.stopped.into(),
            self.version.into(),
        ]
    }
}

/// A 1.x log, keyed by step id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogV1 {
    pub id: i64,
    pub data: Vec<u8>,
}

impl Record for LogV1 {
    const TABLE: &'static str = "logs";
    const ID_COLUMN: &'static str = "log_id";
    const COLUMNS: &'static [&'static str] = &["log_data"];

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![SqlValue::Bytes(self.data.clone())]
    }
}

/// A 1.x secret. Registry credentials are stored as secrets too and leave
/// the id to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretV1 {
    pub id: Option<i64>,
    pub repo_id: i64,
    pub name: String,
    pub data: String,
    pub pull_request: bool,
    pub pull_request_push: bool,
}

impl Record for SecretV1 {
    const TABLE: &'static str = "secrets";
    const ID_COLUMN: &'static str = "secret_id";
    const COLUMNS: &'static [&'static str] = &[
        "secret_repo_id",
        "secret_name",
        "secret_data",
        "secret_pull_request",
        "secret_pull_request_push",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.repo_id.into(),
            self.name.as_str().into(),
            SqlValue::Bytes(self.data.as_bytes().to_vec()),
            self.pull_request.into(),
            self.pull_request_push.into(),
        ]
    }
}
