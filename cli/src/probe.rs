// Scan endpoint probe
//
// Fetches a scan payload (from the mock service or a real peripheral) and
// prints it the way a developer wants to eyeball it.

use anyhow::{Context, Result};
use colored::*;
use hyper::{Body, Method, Request};
use peekblock_core::ScanResultEntry;

pub const DEFAULT_URL: &str = "http://localhost:3000/scan";

#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

pub async fn get(url: &str) -> Result<RawResponse> {
    let client = hyper::Client::new();
    let req = Request::builder()
        .method(Method::GET)
        .uri(url)
        .body(Body::empty())
        .with_context(|| format!("Invalid URL: {}", url))?;

    let resp = client
        .request(req)
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_bytes = hyper::body::to_bytes(resp.into_body()).await?;

    Ok(RawResponse {
        status,
        content_type,
        body: String::from_utf8_lossy(&body_bytes).into_owned(),
    })
}

/// GET `url` and decode the scan result array.
pub async fn fetch_scan(url: &str) -> Result<Vec<ScanResultEntry>> {
    let response = get(url).await?;

    if response.status != 200 {
        anyhow::bail!(
            "Scan request failed with status {}: {}",
            response.status,
            response.body
        );
    }

    serde_json::from_str(&response.body).context("Failed to parse scan response")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBand {
    Strong,
    Fair,
    Weak,
}

impl SignalBand {
    pub fn of(rssi: i32) -> Self {
        if rssi >= -50 {
            SignalBand::Strong
        } else if rssi >= -70 {
            SignalBand::Fair
        } else {
            SignalBand::Weak
        }
    }
}

pub fn print_entries(url: &str, entries: &[ScanResultEntry]) {
    println!("{} {}", "Scan results from".bold(), url.bright_cyan());
    println!();

    if entries.is_empty() {
        println!("  {}", "(no devices)".dimmed());
        return;
    }

    for entry in entries {
        let rssi = format!("{:>4} dBm", entry.rssi);
        let rssi = match SignalBand::of(entry.rssi) {
            SignalBand::Strong => rssi.green(),
            SignalBand::Fair => rssi.yellow(),
            SignalBand::Weak => rssi.red(),
        };
        println!("  {}  {}", entry.mac.bright_white(), rssi);
    }

    println!();
    println!("  {} device(s)", entries.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_bands() {
        assert_eq!(SignalBand::of(-30), SignalBand::Strong);
        assert_eq!(SignalBand::of(-50), SignalBand::Strong);
        assert_eq!(SignalBand::of(-60), SignalBand::Fair);
        assert_eq!(SignalBand::of(-71), SignalBand::Weak);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let addr = crate::server::tests::free_addr();
        let err = fetch_scan(&format!("http://{}/scan", addr)).await.unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_error() {
        assert!(get("not a url").await.is_err());
    }
}
