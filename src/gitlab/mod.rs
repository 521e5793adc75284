//! Thin GitLab REST collaborator.
//!
//! One client covers the three surfaces the review needs: fetching an
//! MR's changed files, scoped blob search (the [`CodeSearch`] impl),
//! and posting discussions and notes (the [`CommentSink`] impl).
//!
//! API:
//! - GET  /projects/:id/merge_requests/:iid/changes
//! - GET  /projects/:id/search?scope=blobs
//! - POST /projects/:id/merge_requests/:iid/discussions   (inline)
//! - POST /projects/:id/merge_requests/:iid/notes         (general)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GitLabConfig;
use crate::models::comment::LineComment;
use crate::models::diff::{ChangedFile, DiffRefs};
use crate::models::symbol::SearchHit;
use crate::publish::{render_comment_body, CommentSink, PublishError};
use crate::resolve::{CodeSearch, SearchError};

/// Errors from the GitLab API client.
#[derive(Error, Debug)]
pub enum GitLabError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("GitLab returned status {0}: {1}")]
    Status(u16, String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// An MR's changed files plus the diff refs needed for line-anchored
/// comment positions.
#[derive(Debug, Clone)]
pub struct MergeRequestChanges {
    pub files: Vec<ChangedFile>,
    pub diff_refs: Option<DiffRefs>,
}

/// GitLab REST client scoped to one project and one merge request.
pub struct GitLabClient {
    http: reqwest::Client,
    headers: HeaderMap,
    base_api: String,
    project: String,
    mr_iid: u64,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig, mr_iid: u64) -> Result<Self, GitLabError> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| GitLabError::NotConfigured("missing GitLab token".into()))?;
        let project = config
            .project
            .as_deref()
            .ok_or_else(|| GitLabError::NotConfigured("missing GitLab project".into()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GitLabError::Request(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ripplecheck/0.1"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "PRIVATE-TOKEN",
            HeaderValue::from_str(token)
                .map_err(|e| GitLabError::NotConfigured(format!("bad token: {e}")))?,
        );

        Ok(Self {
            http,
            headers,
            base_api: format!("{}/api/v4", config.base_url.trim_end_matches('/')),
            // Project paths go into a URL path segment, so `/` and any
            // other reserved characters must be percent-encoded.
            project: urlencoding::encode(project).into_owned(),
            mr_iid,
        })
    }

    /// Fetch the MR's changed files and diff refs.
    pub async fn fetch_changes(&self) -> Result<MergeRequestChanges, GitLabError> {
        #[derive(Deserialize)]
        struct Change {
            old_path: String,
            new_path: String,
            diff: String,
            #[serde(default)]
            new_file: bool,
            #[serde(default)]
            deleted_file: bool,
            #[serde(default)]
            renamed_file: bool,
        }
        #[derive(Deserialize)]
        struct RawRefs {
            base_sha: String,
            start_sha: String,
            head_sha: String,
        }
        #[derive(Deserialize)]
        struct Response {
            changes: Vec<Change>,
            diff_refs: Option<RawRefs>,
        }

        let url = format!(
            "{}/projects/{}/merge_requests/{}/changes",
            self.base_api, self.project, self.mr_iid
        );
        let body: Response = self.get_json(&url).await?;

        let files = body
            .changes
            .into_iter()
            .map(|c| ChangedFile {
                old_path: c.old_path,
                new_path: c.new_path,
                diff: c.diff,
                is_new: c.new_file,
                is_deleted: c.deleted_file,
                is_renamed: c.renamed_file,
            })
            .collect();
        let diff_refs = body.diff_refs.map(|r| DiffRefs {
            base_sha: r.base_sha,
            start_sha: r.start_sha,
            head_sha: r.head_sha,
        });

        Ok(MergeRequestChanges { files, diff_refs })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GitLabError> {
        debug!(url, "GET");
        let resp = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| GitLabError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitLabError::Status(status.as_u16(), body));
        }
        resp.json()
            .await
            .map_err(|e| GitLabError::Request(e.to_string()))
    }
}

#[async_trait]
impl CodeSearch for GitLabClient {
    async fn search(&self, query: &str, branch_ref: &str) -> Result<Vec<SearchHit>, SearchError> {
        #[derive(Deserialize)]
        struct Blob {
            path: String,
            data: String,
            startline: u32,
        }

        let url = format!(
            "{}/projects/{}/search?scope=blobs&search={}&ref={}",
            self.base_api,
            self.project,
            urlencoding::encode(query),
            urlencoding::encode(branch_ref)
        );
        let blobs: Vec<Blob> = self.get_json(&url).await.map_err(|e| match e {
            GitLabError::Status(code, body) => {
                debug!(body, "search error detail");
                SearchError::Status(code)
            }
            GitLabError::NotConfigured(msg) => SearchError::NotConfigured(msg),
            GitLabError::Request(msg) => SearchError::Request(msg),
        })?;

        Ok(blobs
            .into_iter()
            .map(|b| SearchHit {
                file_path: b.path,
                snippet: b.data,
                line: b.startline,
            })
            .collect())
    }
}

#[async_trait]
impl CommentSink for GitLabClient {
    async fn post_line_comment(
        &self,
        comment: &LineComment,
        refs: &DiffRefs,
    ) -> Result<(), PublishError> {
        // GitLab "text" position needs new_path + new_line + shas.
        #[derive(Serialize)]
        struct Position<'a> {
            position_type: &'a str,
            new_path: &'a str,
            new_line: u32,
            head_sha: &'a str,
            base_sha: &'a str,
            start_sha: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            body: String,
            position: Position<'a>,
        }

        let url = format!(
            "{}/projects/{}/merge_requests/{}/discussions",
            self.base_api, self.project, self.mr_iid
        );
        let req = Req {
            body: render_comment_body(comment),
            position: Position {
                position_type: "text",
                new_path: &comment.file_path,
                new_line: comment.new_line,
                head_sha: &refs.head_sha,
                base_sha: &refs.base_sha,
                start_sha: &refs.start_sha,
            },
        };

        self.post_checked(&url, &req).await
    }

    async fn post_summary_note(&self, body: &str) -> Result<(), PublishError> {
        #[derive(Serialize)]
        struct Req<'a> {
            body: &'a str,
        }

        let url = format!(
            "{}/projects/{}/merge_requests/{}/notes",
            self.base_api, self.project, self.mr_iid
        );
        self.post_checked(&url, &Req { body }).await
    }
}

impl GitLabClient {
    async fn post_checked<T: Serialize>(&self, url: &str, req: &T) -> Result<(), PublishError> {
        debug!(url, "POST");
        let resp = self
            .http
            .post(url)
            .headers(self.headers.clone())
            .json(req)
            .send()
            .await
            .map_err(|e| PublishError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PublishError::Status(status.as_u16(), body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_paths_are_fully_percent_encoded() {
        let config = GitLabConfig {
            base_url: "https://gitlab.example.com".into(),
            token: Some("glpat-test".into()),
            project: Some("my group/app".into()),
        };
        let client = GitLabClient::new(&config, 1).unwrap();
        assert_eq!(client.project, "my%20group%2Fapp");

        let config = GitLabConfig {
            project: Some("12345".into()),
            ..config
        };
        assert_eq!(GitLabClient::new(&config, 1).unwrap().project, "12345");
    }

    #[test]
    fn client_requires_token_and_project() {
        let config = GitLabConfig {
            base_url: "https://gitlab.example.com".into(),
            token: None,
            project: Some("group/app".into()),
        };
        assert!(matches!(
            GitLabClient::new(&config, 1),
            Err(GitLabError::NotConfigured(_))
        ));

        let config = GitLabConfig {
            base_url: "https://gitlab.example.com".into(),
            token: Some("glpat-test".into()),
            project: None,
        };
        assert!(matches!(
            GitLabClient::new(&config, 1),
            Err(GitLabError::NotConfigured(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = GitLabConfig {
            base_url: "https://gitlab.example.com/".into(),
            token: Some("glpat-test".into()),
            project: Some("group/app".into()),
        };
        let client = GitLabClient::new(&config, 7).unwrap();
        assert_eq!(client.base_api, "https://gitlab.example.com/api/v4");
        assert_eq!(client.project, "group%2Fapp");
    }
}
