//! Rundeck HTTP API client.
//!
//! Every request carries the `X-Rundeck-Auth-Token` header and asks for JSON.
//! Paths are built as `{base}/api/{version}/...`.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, Response,
};
use tracing::debug;
use url::Url;

use super::{Execution, JobRunner, JobTrigger};
use crate::{config::RundeckConfig, Error, Result};

const AUTH_TOKEN_HEADER: &str = "x-rundeck-auth-token";

#[derive(Debug, Clone)]
pub struct RundeckClient {
    base: Url,
    api_version: String,
    client: Client,
}

impl RundeckClient {
    pub fn new(config: &RundeckConfig) -> Result<Self> {
        let base = Url::parse(&config.url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "RUNDECK_URL {} cannot be used as a base URL",
                config.url
            )));
        }

        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|_| Error::Config("RUNDECK_TOKEN is not a valid header value".to_string()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base,
            api_version: config.api_version.clone(),
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be used as a base URL", self.base)))?
            .pop_if_empty()
            .push("api")
            .push(&self.api_version)
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Rundeck {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl JobRunner for RundeckClient {
    async fn ping(&self) -> Result<()> {
        let url = self.endpoint(&["metrics", "ping"])?;
        debug!(%url, "Pinging rundeck");
        let response = self.client.get(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn run_job(&self, trigger: &JobTrigger) -> Result<Execution> {
        let url = self.endpoint(&["job", trigger.job_id.as_str(), "run"])?;
        debug!(%url, "Running rundeck job");
        let response = self.client.post(url).json(trigger).send().await?;
        let execution = Self::check(response).await?.json::<Execution>().await?;
        Ok(execution)
    }
}
