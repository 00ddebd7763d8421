use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// How a provider expects its credentials.
pub enum ProviderAuth {
    Bearer(SecretString),
    Header {
        name: &'static str,
        value: SecretString,
    },
    /// HTTP Basic with the key as username.
    Basic {
        username: SecretString,
        password: &'static str,
    },
    QueryKey(SecretString),
}

impl ProviderAuth {
    pub fn bearer(key: impl Into<String>) -> Self {
        ProviderAuth::Bearer(SecretString::new(key.into().into()))
    }

    pub fn header(name: &'static str, value: impl Into<String>) -> Self {
        ProviderAuth::Header {
            name,
            value: SecretString::new(value.into().into()),
        }
    }

    pub fn basic(username: impl Into<String>, password: &'static str) -> Self {
        ProviderAuth::Basic {
            username: SecretString::new(username.into().into()),
            password,
        }
    }

    pub fn query_key(key: impl Into<String>) -> Self {
        ProviderAuth::QueryKey(SecretString::new(key.into().into()))
    }
}

pub fn build_http_client(timeout_secs: u64) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Thin HTTP client shared by the provider integrations.
pub struct ProviderClient {
    client: Client,
    base_url: String,
    auth: ProviderAuth,
}

impl ProviderClient {
    pub fn new(client: Client, base_url: impl Into<String>, auth: ProviderAuth) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            ProviderAuth::Bearer(key) => builder.bearer_auth(key.expose_secret()),
            ProviderAuth::Header { name, value } => builder.header(*name, value.expose_secret()),
            ProviderAuth::Basic { username, password } => {
                builder.basic_auth(username.expose_secret(), Some(*password))
            }
            ProviderAuth::QueryKey(key) => builder.query(&[("key", key.expose_secret())]),
        }
    }

    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> reqwest::Result<Response> {
        self.authorize(self.client.get(self.url(path)))
            .query(query)
            .send()
            .await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<Response> {
        self.authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
    }

    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<Response> {
        self.authorize(self.client.patch(self.url(path)))
            .json(body)
            .send()
            .await
    }

    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<Response> {
        self.authorize(self.client.post(self.url(path)))
            .form(body)
            .send()
            .await
    }
}
