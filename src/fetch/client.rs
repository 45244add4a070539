use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared HTTP request. Lets the loader run against a stub in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
