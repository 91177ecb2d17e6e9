use anyhow::Result;
use octocrab::params::State;
use octocrab::Octocrab;
use tracing::{debug, info};

use super::types::{MergedPull, ReleaseEvent};

/// GitHub fetch collaborator. Walks paginated collections and normalizes
/// them into dated event records; all aggregation happens elsewhere.
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// The token is optional; unauthenticated requests work but are
    /// rate-limited more aggressively.
    pub fn new(token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }

    /// All published releases for the repository. Drafts and releases
    /// without a publication date are skipped.
    pub async fn fetch_releases(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseEvent>> {
        let mut events = Vec::new();

        let mut page = self
            .client
            .repos(owner, repo)
            .releases()
            .list()
            .per_page(100)
            .send()
            .await?;

        loop {
            for release in &page.items {
                if let Some(published_at) = release.published_at {
                    events.push(ReleaseEvent {
                        tag: release.tag_name.clone(),
                        timestamp: published_at,
                    });
                }
            }
            debug!(collected = events.len(), "fetched release page");

            match self.client.get_page(&page.next).await? {
                Some(next) => page = next,
                None => break,
            }
        }

        info!(releases = events.len(), "fetched published releases");
        Ok(events)
    }

    /// All merged pull requests, optionally restricted to a single
    /// author login (matched case-insensitively). Closed-but-unmerged
    /// PRs are dropped.
    pub async fn fetch_merged_pulls(
        &self,
        owner: &str,
        repo: &str,
        author: Option<&str>,
    ) -> Result<Vec<MergedPull>> {
        let author_lower = author.map(|a| a.to_lowercase());
        let mut pulls = Vec::new();

        let mut page = self
            .client
            .pulls(owner, repo)
            .list()
            .state(State::Closed)
            .per_page(100)
            .send()
            .await?;

        loop {
            for pr in &page.items {
                let merged_at = match pr.merged_at {
                    Some(merged_at) => merged_at,
                    None => continue,
                };

                let login = pr.user.as_ref().map(|u| u.login.clone());
                if let Some(wanted) = &author_lower {
                    let matches = login
                        .as_deref()
                        .map(|l| l.to_lowercase() == *wanted)
                        .unwrap_or(false);
                    if !matches {
                        continue;
                    }
                }

                pulls.push(MergedPull {
                    number: pr.number,
                    title: pr.title.clone().unwrap_or_default(),
                    author: login,
                    timestamp: merged_at,
                });
            }
            debug!(collected = pulls.len(), "fetched pull request page");

            match self.client.get_page(&page.next).await? {
                Some(next) => page = next,
                None => break,
            }
        }

        info!(merged = pulls.len(), "fetched merged pull requests");
        Ok(pulls)
    }
}
