//! Drone 0.x records as read from the source database.

use crate::core::traits::FromRow;
use crate::core::value::Row;
use crate::error::Result;

/// A 0.x user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserV0 {
    pub id: i64,
    pub login: String,
    pub token: String,
    pub secret: String,
    pub expiry: i64,
    pub email: String,
    pub avatar: String,
}

impl FromRow for UserV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("user_id")?,
            login: row.string("user_login")?,
            token: row.string("user_token")?,
            secret: row.string("user_secret")?,
            expiry: row.i64("user_expiry")?,
            email: row.string("user_email")?,
            avatar: row.string("user_avatar")?,
        })
    }
}

/// A 0.x repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoV0 {
    pub id: i64,
    pub user_id: i64,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub link: String,
    pub clone: String,
    pub branch: String,
    pub timeout: i64,
    pub visibility: String,
    pub private: bool,
    pub trusted: bool,
    pub gated: bool,
    pub active: bool,
    pub counter: i64,
    pub config_path: String,
}

impl FromRow for RepoV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("repo_id")?,
            user_id: row.i64("repo_user_id")?,
            owner: row.string("repo_owner")?,
            name: row.string("repo_name")?,
            full_name: row.string("repo_full_name")?,
            link: row.string("repo_link")?,
            clone: row.string("repo_clone")?,
            branch: row.string("repo_branch")?,
            timeout: row.i64("repo_timeout")?,
            visibility: row.string("repo_visibility")?,
            private: row.bool("repo_private")?,
            trusted: row.bool("repo_trusted")?,
            gated: row.bool("repo_gated")?,
            active: row.bool("repo_active")?,
            counter: row.i64("repo_counter")?,
            config_path: row.string("repo_config_path")?,
        })
    }
}

/// A 0.x build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildV0 {
    pub id: i64,
    pub repo_id: i64,
    pub number: i64,
    pub parent: i64,
    pub event: String,
    pub status: String,
    pub error: String,
    pub created: i64,
    pub started: i64,
    pub finished: i64,
    pub deploy: String,
    pub commit: String,
    pub branch: String,
    pub git_ref: String,
    pub link: String,
    pub title: String,
    pub message: String,
    pub timestamp: i64,
    pub sender: String,
    pub author: String,
    pub avatar: String,
    pub email: String,
}

impl FromRow for BuildV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("build_id")?,
            repo_id: row.i64("build_repo_id")?,
            number: row.i64("build_number")?,
            parent: row.i64("build_parent")?,
            event: row.string("build_event")?,
            status: row.string("build_status")?,
            error: row.string("build_error")?,
            created: row.i64("build_created")?,
            started: row.i64("build_started")?,
            finished: row.i64("build_finished")?,
            deploy: row.string("build_deploy")?,
            commit: row.string("build_commit")?,
            branch: row.string("build_branch")?,
            git_ref: row.string("build_ref")?,
            link: row.string("build_link")?,
            title: row.string("build_title")?,
            message: row.string("build_message")?,
            timestamp: row.i64("build_timestamp")?,
            sender: row.string("build_sender")?,
            author: row.string("build_author")?,
            avatar: row.string("build_avatar")?,
            email: row.string("build_email")?,
        })
    }
}

/// A row of the 0.x `procs` table.
///
/// `ppid == 0` marks a stage; any other value is the `pid` of the stage a
/// step belongs to within the same build. `repo_id` comes from the joined
/// build row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessV0 {
    pub id: i64,
    pub build_id: i64,
    pub repo_id: i64,
    pub pid: i64,
    pub ppid: i64,
    pub name: String,
    pub state: String,
    pub error: String,
    pub exit_code: i64,
    pub started: i64,
    pub stopped: i64,
    pub machine: String,
}

impl FromRow for ProcessV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("proc_id")?,
            build_id: row.i64("proc_build_id")?,
            repo_id: row.i64("build_repo_id")?,
            pid: row.i64("proc_pid")?,
            ppid: row.i64("proc_ppid")?,
            name: row.string("proc_name")?,
            state: row.string("proc_state")?,
            error: row.string("proc_error")?,
            exit_code: row.i64("proc_exit_code")?,
            started: row.i64("proc_started")?,
            stopped: row.i64("proc_stopped")?,
            machine: row.string("proc_machine")?,
        })
    }
}

/// A 0.x secret joined with the slug of its repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretV0 {
    pub id: i64,
    pub repo_id: i64,
    pub repo_full_name: String,
    pub name: String,
    pub value: String,
    /// JSON encoded list of event names, possibly empty.
    pub events: String,
}

impl FromRow for SecretV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("secret_id")?,
            repo_id: row.i64("secret_repo_id")?,
            repo_full_name: row.string("repo_full_name")?,
            name: row.string("secret_name")?,
            value: row.string("secret_value")?,
            events: row.string("secret_events")?,
        })
    }
}

/// A 0.x registry credential joined with the slug of its repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryV0 {
    pub id: i64,
    pub repo_id: i64,
    pub repo_full_name: String,
    pub addr: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl FromRow for RegistryV0 {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("registry_id")?,
            repo_id: row.i64("registry_repo_id")?,
            repo_full_name: row.string("repo_full_name")?,
            addr: row.string("registry_addr")?,
            email: row.string("registry_email")?,
            username: row.string("registry_username")?,
            password: row.string("registry_password")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::SqlValue;

    #[test]
    fn test_process_from_row_with_nulls() {
        let row = Row::default()
            .with("proc_id", 11i64)
            .with("proc_build_id", 3i64)
            .with("build_repo_id", 1i64)
            .with("proc_pid", 2i64)
            .with("proc_ppid", 1i64)
            .with("proc_name", "clone")
            .with("proc_state", "success")
            .with("proc_error", SqlValue::Null)
            .with("proc_exit_code", 0i64)
            .with("proc_started", 100i64)
            .with("proc_stopped", 160i64)
            .with("proc_machine", SqlValue::Null);

        let process = ProcessV0::from_row(&row).unwrap();
        assert_eq!(process.id, 11);
        assert_eq!(process.ppid, 1);
        assert_eq!(process.error, "");
        assert_eq!(process.machine, "");
    }

    #[test]
    fn test_repo_from_row_integer_booleans() {
        let row = Row::default()
            .with("repo_id", 5i64)
            .with("repo_user_id", 1i64)
            .with("repo_owner", "octocat")
            .with("repo_name", "hello-world")
            .with("repo_full_name", "octocat/hello-world")
            .with("repo_link", "https://github.com/octocat/hello-world")
            .with("repo_clone", "https://github.com/octocat/hello-world.git")
            .with("repo_branch", "master")
            .with("repo_timeout", 60i64)
            .with("repo_visibility", "public")
            .with("repo_private", 0i64)
            .with("repo_trusted", 1i64)
            .with("repo_gated", 1i64)
            .with("repo_active", 1i64)
            .with("repo_counter", 42i64)
            .with("repo_config_path", ".drone.yml");

        let repo = RepoV0::from_row(&row).unwrap();
        assert!(!repo.private);
        assert!(repo.trusted);
        assert!(repo.gated);
        assert_eq!(repo.counter, 42);
    }
}
