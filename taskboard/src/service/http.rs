//! HTTP implementation of [`TaskService`] backed by `reqwest`.

use std::time::Duration;

use taskboard_proto::dashboard::Dashboard;
use taskboard_proto::task::{Comment, Task, TaskId};
use taskboard_proto::wire::{ErrorBody, NewComment, NewTask, TaskPatch};
use url::Url;

use super::{ServiceError, TaskService};

/// JSON client for the `taskboard-server` REST API.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpService {
    /// Creates a client for the server at `base_url`.
    ///
    /// With `timeout` set to `None` requests use the transport defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the URL is not an absolute
    /// `http`/`https` URL or the client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::Transport(format!("invalid server url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ServiceError::Transport(format!(
                "server url must be http or https: {base_url}"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    /// The server base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `base_url/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn owner_endpoint(&self, segment: &str, owner: &str) -> Url {
        let mut url = self.endpoint(&[segment]);
        url.query_pairs_mut().append_pair("owner", owner);
        url
    }

    /// Turns a non-success response into a [`ServiceError`].
    ///
    /// A 404 on a task-scoped request becomes [`ServiceError::NotFound`].
    async fn check(
        response: reqwest::Response,
        id: Option<&TaskId>,
    ) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let (reqwest::StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(ServiceError::NotFound(id.clone()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl TaskService for HttpService {
    async fn list(&self, owner: &str) -> Result<Vec<Task>, ServiceError> {
        let url = self.owner_endpoint("tasks", owner);
        tracing::debug!(%url, "GET tasks");
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response, None).await?.json().await?)
    }

    async fn create(&self, req: &NewTask) -> Result<Task, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(&["tasks"]))
            .json(req)
            .send()
            .await?;
        Ok(Self::check(response, None).await?.json().await?)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ServiceError> {
        let response = self
            .client
            .patch(self.endpoint(&["tasks", id.as_str()]))
            .json(patch)
            .send()
            .await?;
        Ok(Self::check(response, Some(id)).await?.json().await?)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.endpoint(&["tasks", id.as_str()]))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn add_comment(&self, id: &TaskId, req: &NewComment) -> Result<Comment, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(&["tasks", id.as_str(), "comment"]))
            .json(req)
            .send()
            .await?;
        Ok(Self::check(response, Some(id)).await?.json().await?)
    }

    async fn dashboard(&self, owner: &str) -> Result<Dashboard, ServiceError> {
        let response = self
            .client
            .get(self.owner_endpoint("dashboard", owner))
            .send()
            .await?;
        Ok(Self::check(response, None).await?.json().await?)
    }
}
