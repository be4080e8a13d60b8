use std::time::Duration;

use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tollmap::{ReportError, ReportLoader, SourceConfig};

/// Local http server answering each request with `reply` after `delay`.
async fn server(reply: &'static str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let _ = stream.write_all(reply.as_bytes()).await;
            });
        }
    });
    format!("http://{addr}")
}

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

const REPORT: &str = "HTTP/1.1 200 OK\r\ncontent-length: 49\r\nconnection: close\r\n\r\n\
                      Country_Region,Confirmed,Deaths,Recovered,Active\n";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn missing_remote_report_is_not_found_for_that_date() {
    let base = server(NOT_FOUND, Duration::ZERO).await;
    let loader = ReportLoader::new(SourceConfig::default().with_snapshot_base(base)).unwrap();

    let err = loader.fetch_snapshot(day(2021, 1, 1)).await.unwrap_err();
    match err {
        ReportError::NotFound(msg) => assert!(msg.contains("2021-01-01"), "{msg}"),
        other => panic!("expected NotFound, got {other}"),
    }
}

#[tokio::test]
async fn slow_remote_report_times_out_as_network() {
    let base = server(REPORT, Duration::from_secs(5)).await;
    let config = SourceConfig::default()
        .with_snapshot_base(base)
        .with_timeout(Duration::from_millis(300));
    let loader = ReportLoader::new(config).unwrap();

    let err = loader.fetch_snapshot(day(2021, 1, 1)).await.unwrap_err();
    assert!(matches!(err, ReportError::Network(_)), "{err}");
}

#[tokio::test]
async fn missing_remote_code_table_is_not_found() {
    let base = server(NOT_FOUND, Duration::ZERO).await;
    let config = SourceConfig::default().with_code_reference(format!("{base}/codes.csv"));
    let loader = ReportLoader::new(config).unwrap();

    let err = loader.fetch_code_reference().await.unwrap_err();
    assert!(matches!(err, ReportError::NotFound(_)), "{err}");
}
