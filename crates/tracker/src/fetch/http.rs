//! HTTP lookup against the `dark-jedis` record service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use sithwatch_core::{Entity, EntityId};
use url::Url;

use super::EntityFetcher;
use crate::config::FetchConfig;
use crate::error::{ConfigResult, FetchError};

/// Fetches `GET {base_url}/dark-jedis/{id}`.
///
/// Only a success status with a decodable body yields an entity; everything
/// else is a [`FetchError`].
#[derive(Debug, Clone)]
pub struct HttpEntityFetcher {
	client: Client,
	base_url: Url,
	timeout: Duration,
}

impl HttpEntityFetcher {
	pub fn new(config: &FetchConfig) -> ConfigResult<Self> {
		Ok(Self {
			client: Client::new(),
			base_url: config.base_url()?,
			timeout: config.timeout(),
		})
	}

	/// Record URL for `id`. A base path is kept whether or not it ends in `/`.
	pub fn entity_url(&self, id: EntityId) -> Url {
		let mut url = self.base_url.clone();
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push("dark-jedis").push(&id.to_string());
		}
		url
	}
}

#[async_trait]
impl EntityFetcher for HttpEntityFetcher {
	async fn fetch(&self, id: EntityId) -> Result<Entity, FetchError> {
		let response = self
			.client
			.get(self.entity_url(id))
			.header(ACCEPT, "application/json")
			.timeout(self.timeout)
			.send()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::Status(status.as_u16()));
		}

		response.json::<Entity>().await.map_err(|e| {
			if e.is_decode() {
				FetchError::Decode(e.to_string())
			} else {
				FetchError::Transport(e.to_string())
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;

	use super::*;

	/// Serves one connection on a loopback port. The request head is read and
	/// `response` written back; `None` holds the socket open without replying.
	async fn serve_once(response: Option<String>) -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("loopback bind");
		let addr = listener.local_addr().expect("bound address");
		tokio::spawn(async move {
			let Ok((mut socket, _)) = listener.accept().await else {
				return;
			};
			let mut head = Vec::new();
			let mut buf = [0u8; 1024];
			while !head.windows(4).any(|w| w == b"\r\n\r\n") {
				match socket.read(&mut buf).await {
					Ok(0) | Err(_) => return,
					Ok(n) => head.extend_from_slice(&buf[..n]),
				}
			}
			match response {
				Some(response) => {
					let _ = socket.write_all(response.as_bytes()).await;
					let _ = socket.shutdown().await;
				}
				None => std::future::pending::<()>().await,
			}
		});
		format!("http://{addr}")
	}

	fn fetcher_for(base_url: String, timeout_ms: u64) -> HttpEntityFetcher {
		HttpEntityFetcher::new(&FetchConfig { base_url, timeout_ms }).expect("valid base url")
	}

	#[rstest]
	#[case("http://localhost:3000", "http://localhost:3000/dark-jedis/3616")]
	#[case("http://localhost:3000/", "http://localhost:3000/dark-jedis/3616")]
	#[case("https://records.example/api", "https://records.example/api/dark-jedis/3616")]
	#[case("https://records.example/api/", "https://records.example/api/dark-jedis/3616")]
	fn builds_record_urls(#[case] base: &str, #[case] expected: &str) {
		let fetcher = HttpEntityFetcher::new(&FetchConfig {
			base_url: base.to_string(),
			timeout_ms: 1_000,
		})
		.expect("valid base url");
		assert_eq!(fetcher.entity_url(3616).as_str(), expected);
	}

	#[tokio::test]
	async fn unreachable_service_is_a_transport_error() {
		let fetcher = HttpEntityFetcher::new(&FetchConfig {
			base_url: "http://127.0.0.1:1".to_string(),
			timeout_ms: 500,
		})
		.expect("valid base url");
		assert!(matches!(fetcher.fetch(1).await, Err(FetchError::Transport(_))));
	}

	#[rstest]
	#[case("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", 404)]
	#[case("HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", 500)]
	#[tokio::test]
	async fn error_status_is_a_status_failure(#[case] response: &'static str, #[case] expected: u16) {
		let fetcher = fetcher_for(serve_once(Some(response.to_string())).await, 2_000);
		assert!(matches!(fetcher.fetch(3616).await, Err(FetchError::Status(code)) if code == expected));
	}

	#[tokio::test]
	async fn undecodable_body_is_a_decode_failure() {
		let response = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}";
		let fetcher = fetcher_for(serve_once(Some(response.to_string())).await, 2_000);
		assert!(matches!(fetcher.fetch(3616).await, Err(FetchError::Decode(_))));
	}

	#[tokio::test]
	async fn silent_service_times_out_as_a_transport_error() {
		let fetcher = fetcher_for(serve_once(None).await, 100);
		let outcome = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(3616)).await.expect("request timeout fires first");
		assert!(matches!(outcome, Err(FetchError::Transport(_))));
	}

	#[tokio::test]
	async fn success_body_decodes_into_an_entity() {
		let body = r#"{"id":3616,"name":"Darth Sidious","homeworld":{"id":7,"name":"Naboo"},"master":{"url":null,"id":null},"apprentice":{"url":"http://localhost:3000/dark-jedis/1489","id":1489}}"#;
		let response = format!("HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}", body.len());
		let fetcher = fetcher_for(serve_once(Some(response)).await, 2_000);
		let entity = fetcher.fetch(3616).await.expect("decodable record");
		assert_eq!(entity.id, 3616);
		assert_eq!(entity.homeworld.id, 7);
		assert_eq!(entity.apprentice.id, Some(1489));
	}
}
