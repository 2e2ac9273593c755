//! External Lighthouse audit integration
//!
//! Lighthouse is an optional collaborator: any failure (missing binary,
//! crash, timeout, unparseable output) downgrades the run to "lighthouse
//! data unavailable" and validation proceeds on web-vitals-only data.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

/// Category scores from a Lighthouse run, 0..=100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseScores {
    pub performance: f64,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
}

/// Runs the `lighthouse` CLI against a URL
pub struct LighthouseRunner {
    binary: String,
    timeout: Duration,
}

impl LighthouseRunner {
    pub fn new() -> Self {
        Self {
            binary: "lighthouse".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Audit `url`, returning `None` on any failure
    pub async fn audit(&self, url: &str) -> Option<LighthouseScores> {
        debug!(url, binary = %self.binary, "starting lighthouse audit");

        let output = Command::new(&self.binary)
            .arg(url)
            .args(["--output=json", "--quiet", "--chrome-flags=--headless"])
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(error = %err, "lighthouse failed to start, continuing without audit data");
                return None;
            }
            Err(_) => {
                warn!(timeout_s = self.timeout.as_secs(), "lighthouse timed out");
                return None;
            }
        };

        if !output.status.success() {
            warn!(status = %output.status, "lighthouse exited with failure");
            return None;
        }

        match parse_scores(&String::from_utf8_lossy(&output.stdout)) {
            Some(scores) => Some(scores),
            None => {
                warn!("lighthouse output could not be parsed");
                None
            }
        }
    }
}

impl Default for LighthouseRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract category scores from Lighthouse's JSON report
fn parse_scores(json: &str) -> Option<LighthouseScores> {
    let report: serde_json::Value = serde_json::from_str(json).ok()?;
    let categories = report.get("categories")?;
    let score = |name: &str| -> Option<f64> {
        categories
            .get(name)?
            .get("score")?
            .as_f64()
            .map(|s| s * 100.0)
    };

    Some(LighthouseScores {
        performance: score("performance")?,
        accessibility: score("accessibility")?,
        best_practices: score("best-practices")?,
        seo: score("seo")?,
    })
}
