//! GitHub REST implementation of [`RepositoryContext`].
//!
//! A context is bound to one pull request: the author is read once when the
//! context is created. Collaborator and team listings are memoized because
//! the selection core asks for them once per pending rule.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{PermissionMap, RepositoryContext};
use crate::errors::LookupError;
use crate::policy::Permission;

const PER_PAGE: usize = 100;

/// Connection settings for the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// API root, e.g. `https://api.github.com`.
    pub api_url: String,
    pub token: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    user: ApiUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiPermissions {
    admin: bool,
    maintain: bool,
    push: bool,
    triage: bool,
    pull: bool,
}

#[derive(Debug, Deserialize)]
struct ApiCollaborator {
    login: String,
    role_name: Option<String>,
    permissions: Option<ApiPermissions>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    slug: String,
    permission: String,
}

/// Permission of a collaborator entry. `role_name` wins when it names a
/// built-in role; custom roles fall back to the highest permission flag.
fn collaborator_permission(collaborator: &ApiCollaborator) -> Option<Permission> {
    if let Some(role) = collaborator.role_name.as_deref()
        && let Ok(permission) = role.parse::<Permission>()
    {
        return Some(permission);
    }

    let flags = collaborator.permissions.as_ref()?;
    if flags.admin {
        Some(Permission::Admin)
    } else if flags.maintain {
        Some(Permission::Maintain)
    } else if flags.push {
        Some(Permission::Write)
    } else if flags.triage {
        Some(Permission::Triage)
    } else if flags.pull {
        Some(Permission::Read)
    } else {
        None
    }
}

fn collaborator_map(collaborators: Vec<ApiCollaborator>) -> PermissionMap {
    collaborators
        .into_iter()
        .filter_map(|c| collaborator_permission(&c).map(|p| (c.login, p)))
        .collect()
}

fn team_map(teams: Vec<ApiTeam>) -> PermissionMap {
    teams
        .into_iter()
        .filter_map(|t| t.permission.parse::<Permission>().ok().map(|p| (t.slug, p)))
        .collect()
}

/// Split `org/slug`; an unqualified slug belongs to `default_org`.
fn split_team<'a>(team: &'a str, default_org: &'a str) -> (&'a str, &'a str) {
    team.split_once('/').unwrap_or((default_org, team))
}

/// Parse an `owner/name` repository slug.
pub fn parse_repo_slug(slug: &str) -> Option<(String, String)> {
    let (owner, name) = slug.trim().split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

/// Repository context backed by the GitHub REST API.
#[derive(Debug)]
pub struct GitHubContext {
    http: reqwest::Client,
    settings: GitHubSettings,
    owner: String,
    name: String,
    author: String,
    direct_collaborators: OnceCell<PermissionMap>,
    collaborators: OnceCell<PermissionMap>,
    teams: OnceCell<PermissionMap>,
}

impl GitHubContext {
    /// Build a context for pull request `number`, reading its author.
    pub async fn for_pull_request(
        settings: GitHubSettings,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<Self, LookupError> {
        let mut ctx = Self {
            http: reqwest::Client::new(),
            settings,
            owner: owner.to_string(),
            name: name.to_string(),
            author: String::new(),
            direct_collaborators: OnceCell::new(),
            collaborators: OnceCell::new(),
            teams: OnceCell::new(),
        };

        let url = ctx.repo_url(&format!("pulls/{}", number));
        let pr: ApiPullRequest = ctx.get_json(&url, &[]).await?;
        debug!(pr = number, author = %pr.user.login, "Loaded pull request author");
        ctx.author = pr.user.login;
        Ok(ctx)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.owner,
            self.name,
            path
        )
    }

    fn org_url(&self, org: &str, path: &str) -> String {
        format!(
            "{}/orgs/{}/{}",
            self.settings.api_url.trim_end_matches('/'),
            org,
            path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", &self.settings.user_agent)
            .query(query);
        if let Some(token) = &self.settings.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let resp = request
            .send()
            .await
            .map_err(|source| LookupError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>().await.map_err(|source| LookupError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch every page of a listing endpoint.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, LookupError> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let mut params: Vec<(&str, String)> =
                query.iter().map(|(k, v)| (*k, v.to_string())).collect();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let items: Vec<T> = self.get_json(url, &params).await?;
            let count = items.len();
            all.extend(items);

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn list_collaborators(&self, affiliation: &str) -> Result<PermissionMap, LookupError> {
        let url = self.repo_url("collaborators");
        let collaborators: Vec<ApiCollaborator> = self
            .get_all_pages(&url, &[("affiliation", affiliation)])
            .await?;
        debug!(
            affiliation,
            count = collaborators.len(),
            "Listed repository collaborators"
        );
        Ok(collaborator_map(collaborators))
    }

    async fn list_logins(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<String>, LookupError> {
        let users: Vec<ApiUser> = self.get_all_pages(url, query).await?;
        Ok(users.into_iter().map(|u| u.login).collect())
    }
}

#[async_trait]
impl RepositoryContext for GitHubContext {
    fn author(&self) -> &str {
        &self.author
    }

    fn repository_owner(&self) -> &str {
        &self.owner
    }

    fn repository_name(&self) -> &str {
        &self.name
    }

    async fn direct_repository_collaborators(&self) -> Result<PermissionMap, LookupError> {
        self.direct_collaborators
            .get_or_try_init(|| self.list_collaborators("direct"))
            .await
            .cloned()
    }

    async fn repository_collaborators(&self) -> Result<PermissionMap, LookupError> {
        self.collaborators
            .get_or_try_init(|| self.list_collaborators("all"))
            .await
            .cloned()
    }

    async fn teams(&self) -> Result<PermissionMap, LookupError> {
        self.teams
            .get_or_try_init(|| async {
                let url = self.repo_url("teams");
                let teams: Vec<ApiTeam> = self.get_all_pages(&url, &[]).await?;
                Ok::<_, LookupError>(team_map(teams))
            })
            .await
            .cloned()
    }

    async fn team_members(&self, team: &str) -> Result<Vec<String>, LookupError> {
        let (org, slug) = split_team(team, &self.owner);
        let url = self.org_url(org, &format!("teams/{}/members", slug));
        self.list_logins(&url, &[]).await
    }

    async fn organization_members(&self, org: &str) -> Result<Vec<String>, LookupError> {
        let url = self.org_url(org, "members");
        self.list_logins(&url, &[]).await
    }

    async fn organization_owners(&self, org: &str) -> Result<Vec<String>, LookupError> {
        let url = self.org_url(org, "members");
        self.list_logins(&url, &[("role", "admin")]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── collaborator permissions ─────────────────────────────────────

    #[test]
    fn test_collaborator_map_prefers_role_name() {
        let json = r#"[
            {"login": "carol", "role_name": "admin", "permissions": {"admin": true, "push": true, "pull": true}},
            {"login": "bob", "role_name": "write", "permissions": {"push": true, "pull": true}},
            {"login": "erin", "role_name": "maintain"}
        ]"#;
        let collaborators: Vec<ApiCollaborator> = serde_json::from_str(json).unwrap();
        let map = collaborator_map(collaborators);
        assert_eq!(map.get("carol"), Some(&Permission::Admin));
        assert_eq!(map.get("bob"), Some(&Permission::Write));
        assert_eq!(map.get("erin"), Some(&Permission::Maintain));
    }

    #[test]
    fn test_custom_role_falls_back_to_flags() {
        let json = r#"[
            {"login": "dave", "role_name": "security-reviewer", "permissions": {"triage": true, "pull": true}},
            {"login": "frank", "permissions": {"push": true, "pull": true}},
            {"login": "ghost"}
        ]"#;
        let collaborators: Vec<ApiCollaborator> = serde_json::from_str(json).unwrap();
        let map = collaborator_map(collaborators);
        assert_eq!(map.get("dave"), Some(&Permission::Triage));
        assert_eq!(map.get("frank"), Some(&Permission::Write));
        assert!(!map.contains_key("ghost"));
    }

    #[test]
    fn test_team_map_translates_legacy_permissions() {
        let json = r#"[
            {"slug": "platform", "permission": "admin"},
            {"slug": "devs", "permission": "push"},
            {"slug": "readers", "permission": "pull"}
        ]"#;
        let teams: Vec<ApiTeam> = serde_json::from_str(json).unwrap();
        let map = team_map(teams);
        assert_eq!(map.get("platform"), Some(&Permission::Admin));
        assert_eq!(map.get("devs"), Some(&Permission::Write));
        assert_eq!(map.get("readers"), Some(&Permission::Read));
    }

    // ── identifiers ──────────────────────────────────────────────────

    #[test]
    fn test_split_team_qualified() {
        assert_eq!(split_team("acme/platform", "other"), ("acme", "platform"));
    }

    #[test]
    fn test_split_team_unqualified_uses_default_org() {
        assert_eq!(split_team("platform", "acme"), ("acme", "platform"));
    }

    #[test]
    fn test_parse_repo_slug() {
        assert_eq!(
            parse_repo_slug("acme/widgets"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(parse_repo_slug("acme"), None);
        assert_eq!(parse_repo_slug("/widgets"), None);
        assert_eq!(parse_repo_slug("acme/"), None);
        assert_eq!(parse_repo_slug("acme/widgets/extra"), None);
    }

    // ── against a local server ───────────────────────────────────────

    mod server {
        use super::*;
        use axum::extract::{Query, State};
        use axum::http::HeaderMap;
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::{Value, json};
        use std::collections::HashMap;
        use std::sync::{Arc, Mutex};
        use tokio::net::TcpListener;

        type Params = HashMap<String, String>;

        /// Every request the server answered, as (route, query parameters).
        #[derive(Clone, Default)]
        struct RequestLog(Arc<Mutex<Vec<(&'static str, Params)>>>);

        impl RequestLog {
            fn record(&self, route: &'static str, params: Params) {
                self.0.lock().unwrap().push((route, params));
            }

            fn for_route(&self, route: &str) -> Vec<Params> {
                self.0
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|(r, _)| *r == route)
                    .map(|(_, params)| params.clone())
                    .collect()
            }
        }

        async fn pull_request(
            State(log): State<RequestLog>,
            headers: HeaderMap,
            Query(mut params): Query<Params>,
        ) -> Json<Value> {
            if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
                params.insert("authorization".to_string(), auth.to_string());
            }
            log.record("pull", params);
            Json(json!({"user": {"login": "alice"}}))
        }

        async fn collaborators(
            State(log): State<RequestLog>,
            Query(params): Query<Params>,
        ) -> Json<Value> {
            let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
            log.record("collaborators", params);
            let logins = match page {
                1 => 0..100,
                2 => 100..103,
                _ => 0..0,
            };
            Json(Value::Array(
                logins
                    .map(|i| json!({"login": format!("user{}", i), "role_name": "write"}))
                    .collect(),
            ))
        }

        async fn teams(State(log): State<RequestLog>, Query(params): Query<Params>) -> Json<Value> {
            log.record("teams", params);
            Json(json!([
                {"slug": "core", "permission": "admin"},
                {"slug": "docs", "permission": "pull"}
            ]))
        }

        async fn team_members(
            State(log): State<RequestLog>,
            Query(params): Query<Params>,
        ) -> Json<Value> {
            log.record("team_members", params);
            Json(json!([{"login": "dave"}]))
        }

        async fn org_members(
            State(log): State<RequestLog>,
            Query(params): Query<Params>,
        ) -> Json<Value> {
            let owners = params.get("role").map(String::as_str) == Some("admin");
            log.record("org_members", params);
            if owners {
                Json(json!([{"login": "olivia"}]))
            } else {
                Json(json!([{"login": "bob"}, {"login": "erin"}]))
            }
        }

        async fn start(log: RequestLog) -> String {
            let app = Router::new()
                .route("/repos/acme/widgets/pulls/7", get(pull_request))
                .route("/repos/acme/widgets/collaborators", get(collaborators))
                .route("/repos/acme/widgets/teams", get(teams))
                .route("/orgs/acme/teams/core/members", get(team_members))
                .route("/orgs/acme/members", get(org_members))
                .with_state(log);

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{}", addr)
        }

        async fn context(log: &RequestLog) -> GitHubContext {
            let settings = GitHubSettings {
                api_url: start(log.clone()).await,
                token: Some("ghs_test".to_string()),
                user_agent: "policy-reviewers-tests".to_string(),
            };
            GitHubContext::for_pull_request(settings, "acme", "widgets", 7)
                .await
                .unwrap()
        }

        #[tokio::test]
        async fn test_author_read_from_pull_request() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            assert_eq!(ctx.author(), "alice");
            let pulls = log.for_route("pull");
            assert_eq!(pulls.len(), 1);
            assert_eq!(
                pulls[0].get("authorization").map(String::as_str),
                Some("Bearer ghs_test")
            );
        }

        #[tokio::test]
        async fn test_collaborators_follow_pages_until_short_page() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            let collaborators = ctx.repository_collaborators().await.unwrap();
            assert_eq!(collaborators.len(), 103);
            assert_eq!(collaborators.get("user102"), Some(&Permission::Write));

            let requests = log.for_route("collaborators");
            assert_eq!(requests.len(), 2);
            for (params, page) in requests.iter().zip(["1", "2"]) {
                assert_eq!(params.get("page").map(String::as_str), Some(page));
                assert_eq!(params.get("per_page").map(String::as_str), Some("100"));
                assert_eq!(params.get("affiliation").map(String::as_str), Some("all"));
            }
        }

        #[tokio::test]
        async fn test_collaborator_listings_are_memoized() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            ctx.repository_collaborators().await.unwrap();
            ctx.repository_collaborators().await.unwrap();
            assert_eq!(log.for_route("collaborators").len(), 2);

            ctx.direct_repository_collaborators().await.unwrap();
            ctx.direct_repository_collaborators().await.unwrap();
            let requests = log.for_route("collaborators");
            assert_eq!(requests.len(), 4);
            assert_eq!(
                requests[2].get("affiliation").map(String::as_str),
                Some("direct")
            );
        }

        #[tokio::test]
        async fn test_teams_are_mapped_and_memoized() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            let teams = ctx.teams().await.unwrap();
            assert_eq!(teams.get("core"), Some(&Permission::Admin));
            assert_eq!(teams.get("docs"), Some(&Permission::Read));
            ctx.teams().await.unwrap();
            assert_eq!(log.for_route("teams").len(), 1);
        }

        #[tokio::test]
        async fn test_team_members_use_org_and_slug() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            assert_eq!(ctx.team_members("acme/core").await.unwrap(), vec!["dave"]);
            assert_eq!(ctx.team_members("core").await.unwrap(), vec!["dave"]);
            assert_eq!(log.for_route("team_members").len(), 2);

            let err = ctx.team_members("acme/ghosts").await.unwrap_err();
            assert!(matches!(err, LookupError::Status { status: 404, .. }));
        }

        #[tokio::test]
        async fn test_org_owners_request_admin_role() {
            let log = RequestLog::default();
            let ctx = context(&log).await;

            assert_eq!(ctx.organization_owners("acme").await.unwrap(), vec!["olivia"]);
            assert_eq!(
                ctx.organization_members("acme").await.unwrap(),
                vec!["bob", "erin"]
            );

            let requests = log.for_route("org_members");
            assert_eq!(requests.len(), 2);
            assert_eq!(requests[0].get("role").map(String::as_str), Some("admin"));
            assert!(!requests[1].contains_key("role"));
        }
    }
}
