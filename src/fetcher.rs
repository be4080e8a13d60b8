use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tracing::debug;

use crate::error::{ReportError, Result};

// async fn in traits is not object-safe yet, so async_trait it is
#[async_trait]
pub trait Fetch {
    type Error;
    async fn fetch(&self) -> std::result::Result<String, Self::Error>;
}

/// Read the raw text behind `source`, either over http(s) or from a `file://` path.
pub async fn retrieve_data(client: &Client, source: impl AsRef<str>) -> Result<String> {
    let name = source.as_ref();
    if name.starts_with("http://") || name.starts_with("https://") {
        UrlFetcher(client, name).fetch().await
    } else if name.starts_with("file://") {
        FileFetcher(name).fetch().await
    } else {
        Err(ReportError::UnsupportedSource(format!(
            "{name}: only http/https/file are supported"
        )))
    }
}

struct UrlFetcher<'a>(pub(crate) &'a Client, pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    type Error = ReportError;

    async fn fetch(&self) -> Result<String> {
        let response = self.0.get(self.1).send().await?.error_for_status()?;
        debug!(status = %response.status(), url = self.1, "fetched");
        Ok(response.text().await?)
    }
}

struct FileFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    type Error = ReportError;

    async fn fetch(&self) -> Result<String> {
        let path = &self.0["file://".len()..];
        Ok(fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve every connection on a local port with `respond`, returning the base url.
    async fn serve<F, Fut>(respond: F) -> String
    where
        F: Fn(tokio::net::TcpStream) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(respond(stream));
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let client = Client::new();
        let err = retrieve_data(&client, "ftp://example.org/data.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedSource(_)));
    }

    #[tokio::test]
    async fn http_lookalike_scheme_is_rejected() {
        let client = Client::new();
        let err = retrieve_data(&client, "httpx://example.org/data.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedSource(_)), "{err}");
    }

    #[tokio::test]
    async fn short_source_does_not_panic() {
        let client = Client::new();
        let err = retrieve_data(&client, "ab").await.unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedSource(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let client = Client::new();
        let path = dir.path().join("01-01-1999.csv");
        let err = retrieve_data(&client, format!("file://{}", path.display()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempdir().expect("tempdir");
        let client = Client::new();
        let path = dir.path().join("codes.csv");
        std::fs::write(&path, "COUNTRY,CODE\nIndia,IND\n").unwrap();
        let text = retrieve_data(&client, format!("file://{}", path.display()))
            .await
            .unwrap();
        assert!(text.contains("India,IND"));
    }

    #[tokio::test]
    async fn local_file_with_invalid_utf8_is_a_parse_error() {
        let dir = tempdir().expect("tempdir");
        let client = Client::new();
        let path = dir.path().join("03-09-2023.csv");
        std::fs::write(&path, b"Country_Region,Confirmed\n\xff\xfe,1\n").unwrap();
        let err = retrieve_data(&client, format!("file://{}", path.display()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Parse(_)), "{err}");
    }

    #[tokio::test]
    async fn http_404_is_not_found() {
        let base = serve(|mut stream| async move {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
        })
        .await;

        let client = Client::new();
        let err = retrieve_data(&client, format!("{base}/01-01-2021.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn http_body_is_returned() {
        let base = serve(|mut stream| async move {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let body = "COUNTRY,CODE\nIndia,IND\n";
            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(body.as_bytes()).await;
        })
        .await;

        let client = Client::new();
        let text = retrieve_data(&client, format!("{base}/codes.csv"))
            .await
            .unwrap();
        assert_eq!(text, "COUNTRY,CODE\nIndia,IND\n");
    }

    #[tokio::test]
    async fn stalled_server_times_out_as_network() {
        let base = serve(|mut stream| async move {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        })
        .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let err = retrieve_data(&client, format!("{base}/01-01-2021.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Network(_)), "{err}");
    }
}
