//! Pure 0.x to 1.x record transformations.
//!
//! - [`hierarchy`]: splits the 0.x process tree into stages and steps
//! - [`registry`]: folds registry credentials into `.dockerconfigjson` secrets
//!
//! Transformations that fill in new timestamps take the migration time as
//! `now`, so a whole run stamps its records with the same wall-clock time.

pub mod hierarchy;
pub mod registry;

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use crate::model::{BuildV0, BuildV1, RepoV0, RepoV1, SecretV0, SecretV1, UserV0, UserV1};

/// Maximum length, in characters, of build titles and messages.
pub const MAX_TEXT_LEN: usize = 1000;

/// Length of generated hashes, signers and repository secrets.
pub const RANDOM_LEN: usize = 32;

/// Prefix of the placeholder `repo_uid` assigned at load time.
pub const PLACEHOLDER_PREFIX: &str = "temp_";

/// Legacy event name that enables a secret for pull requests.
const PULL_REQUEST_EVENT: &str = "pull_request";

/// Random alphanumeric string.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Cut `text` down to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Placeholder `repo_uid` for a repository id.
pub fn placeholder_uid(repo_id: i64) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, repo_id)
}

/// Returns true if `uid` is a placeholder assigned by [`placeholder_uid`].
pub fn is_placeholder_uid(uid: &str) -> bool {
    uid.strip_prefix(PLACEHOLDER_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.parse::<i64>().is_ok())
}

pub fn user(user: &UserV0, now: i64) -> UserV1 {
    UserV1 {
        id: user.id,
        login: user.login.clone(),
        email: user.email.clone(),
        machine: false,
        admin: false,
        active: true,
        avatar: user.avatar.clone(),
        syncing: false,
        synced: 0,
        created: now,
        updated: now,
        last_login: 0,
        token: user.token.clone(),
        refresh: user.secret.clone(),
        expiry: user.expiry,
        hash: random_string(RANDOM_LEN),
    }
}

/// The `uid` of the result is a placeholder until the identifier resolver
/// fetches the real one from the source control provider.
pub fn repo(repo: &RepoV0, now: i64) -> RepoV1 {
    RepoV1 {
        id: repo.id,
        uid: placeholder_uid(repo.id),
        user_id: repo.user_id,
        namespace: repo.owner.clone(),
        name: repo.name.clone(),
        slug: repo.full_name.clone(),
        scm: "git".to_string(),
        http_url: repo.clone.clone(),
        ssh_url: String::new(),
        link: repo.link.clone(),
        branch: repo.branch.clone(),
        private: repo.private,
        visibility: repo.visibility.clone(),
        active: repo.active,
        config: repo.config_path.clone(),
        trusted: repo.trusted,
        protected: repo.gated,
        timeout: repo.timeout,
        counter: repo.counter,
        synced: now,
        created: now,
        updated: now,
        version: 1,
        signer: random_string(RANDOM_LEN),
        secret: random_string(RANDOM_LEN),
    }
}

pub fn build(build: &BuildV0) -> crate::error::Result<BuildV1> {
    let params = serde_json::to_string(&BTreeMap::<String, String>::new())?;

    Ok(BuildV1 {
        id: build.id,
        repo_id: build.repo_id,
        trigger: "@hook".to_string(),
        number: build.number,
        parent: build.parent,
        status: build.status.clone(),
        error: build.error.clone(),
        event: build.event.clone(),
        action: String::new(),
        link: build.link.clone(),
        timestamp: build.timestamp,
        title: truncate(&build.title, MAX_TEXT_LEN),
        message: truncate(&build.message, MAX_TEXT_LEN),
        before: build.commit.clone(),
        after: build.commit.clone(),
        git_ref: build.git_ref.clone(),
        source_repo: String::new(),
        source: build.branch.clone(),
        target: build.branch.clone(),
        author: build.author.clone(),
        author_name: build.author.clone(),
        author_email: build.email.clone(),
        author_avatar: build.avatar.clone(),
        sender: build.sender.clone(),
        params,
        deploy: build.deploy.clone(),
        started: build.started,
        finished: build.finished,
        created: build.created,
        updated: build.created,
        version: 1,
    })
}

/// Whether a legacy event list enables pull requests.
///
/// An empty list means no events.
pub fn pull_request_enabled(events: &str) -> std::result::Result<bool, serde_json::Error> {
    if events.trim().is_empty() {
        return Ok(false);
    }
    let events: Vec<String> = serde_json::from_str(events)?;
    Ok(events.iter().any(|e| e == PULL_REQUEST_EVENT))
}

/// `repo_id` is the id of the owning repository in the 1.x database.
///
/// 0.x has no notion of pull request push events, so `pull_request_push`
/// is always false.
pub fn secret(secret: &SecretV0, repo_id: i64) -> SecretV1 {
    let pull_request = pull_request_enabled(&secret.events).unwrap_or_else(|e| {
        warn!(
            secret = %secret.name,
            repository = %secret.repo_full_name,
            error = %e,
            "Unreadable secret events, treating as none"
        );
        false
    });

    SecretV1 {
        id: Some(secret.id),
        repo_id,
        name: secret.name.clone(),
        data: secret.value.clone(),
        pull_request,
        pull_request_push: false,
    }
}
