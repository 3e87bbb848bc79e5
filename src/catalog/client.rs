use failure::Error;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::settings::CatalogSettings;

use super::retry::{RetryPolicy, Sleep, ThreadSleeper};

/// A blocking JSON client for catalogue APIs that retries failed requests.
pub struct CatalogClient {
    http: Client,
    access_token: Option<String>,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleep>,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings, policy: RetryPolicy) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            access_token: settings.access_token.clone(),
            policy,
            sleeper: Box::new(ThreadSleeper),
        })
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleep>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// GET `url` with `params` and decode the JSON response.
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies are retried;
    /// `None` means every attempt failed.
    pub fn query<T>(&self, url: &str, params: &[(&str, String)]) -> Option<T>
    where
        T: DeserializeOwned,
    {
        debug!("Querying {} with {:?}", url, params);

        self.policy
            .run(self.sleeper.as_ref(), &format!("GET {}", url), || {
                self.get(url, params)
            })
    }

    fn get<T>(&self, url: &str, params: &[(&str, String)]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(url).query(params);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        request
            .send()?
            .error_for_status()?
            .json::<T>()
            .map_err(|e| e.into())
    }
}
