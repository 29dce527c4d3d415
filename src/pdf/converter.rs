//! HTML to PDF conversion backends.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::PdfError;
use crate::core::{PdfConfig, PdfEngine};

/// Converts a complete HTML document into PDF bytes.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, PdfError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Pipes HTML into an external program and reads the PDF from its stdout.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, timeout: Duration::from_secs(60) }
    }

    /// Build from `[program, args...]`.
    pub fn from_command_line(command: &[String]) -> Result<Self, PdfError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| PdfError::NotConfigured("pdf.command is empty".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PdfError::Spawn { program: self.program.clone(), source: e })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(html.as_bytes()).await {
                Ok(()) => {}
                // The exit status below says what went wrong.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(PdfError::Io(e)),
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(PdfError::EngineFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(PdfError::EmptyOutput);
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl PdfConverter for CommandConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        tracing::debug!(program = %self.program, bytes = html.len(), "Converting HTML to PDF");
        tokio::time::timeout(self.timeout, self.run(html))
            .await
            .map_err(|_| PdfError::Timeout(self.timeout.as_secs()))?
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Posts HTML to a PDF microservice (`POST {base}/api/generate-pdf`).
#[derive(Debug, Clone)]
pub struct ServiceConverter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ServiceConverter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate-pdf", self.base_url)
    }
}

#[async_trait]
impl PdfConverter for ServiceConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&serde_json::json!({ "htmlTemplate": html }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PdfError::Service { status: status.as_u16(), message });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(PdfError::EmptyOutput);
        }
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "pdf-service"
    }
}

/// Build the converter selected by the configuration.
pub fn converter_from_config(config: &PdfConfig) -> Result<Arc<dyn PdfConverter>, PdfError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.engine {
        PdfEngine::Command => Ok(Arc::new(
            CommandConverter::from_command_line(&config.command)?.with_timeout(timeout),
        )),
        PdfEngine::Service => {
            let url = config
                .service_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| PdfError::NotConfigured("pdf.service_url is not set".to_string()))?;
            Ok(Arc::new(ServiceConverter::new(url).with_timeout(timeout)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandConverter {
        CommandConverter::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_command_pipes_stdin_to_stdout() {
        let converter = CommandConverter::new("cat", Vec::new());
        let bytes = converter.convert("<html>%PDF</html>").await.unwrap();
        assert_eq!(bytes, b"<html>%PDF</html>");
    }

    #[tokio::test]
    async fn test_command_failure_carries_stderr() {
        let err = sh("cat >/dev/null; echo 'bad html' >&2; exit 3").convert("<html/>").await.unwrap_err();
        match err {
            PdfError::EngineFailed { status, stderr } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "bad html");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_command_empty_output() {
        let err = sh("cat >/dev/null").convert("<html/>").await.unwrap_err();
        assert!(matches!(err, PdfError::EmptyOutput));
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let converter = sh("sleep 5").with_timeout(Duration::from_millis(100));
        assert!(matches!(converter.convert("<html/>").await, Err(PdfError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let converter = CommandConverter::new("definitely-not-a-pdf-engine", Vec::new());
        assert!(matches!(converter.convert("<html/>").await, Err(PdfError::Spawn { .. })));
    }

    #[test]
    fn test_converter_from_config() {
        let config = PdfConfig::default();
        assert_eq!(converter_from_config(&config).unwrap().name(), "weasyprint");

        let config = PdfConfig { engine: PdfEngine::Service, service_url: None, ..Default::default() };
        assert!(matches!(converter_from_config(&config), Err(PdfError::NotConfigured(_))));

        let config = PdfConfig { command: Vec::new(), ..Default::default() };
        assert!(converter_from_config(&config).is_err());
    }

    #[test]
    fn test_service_endpoint() {
        assert_eq!(
            ServiceConverter::new("http://localhost:5000/").endpoint(),
            "http://localhost:5000/api/generate-pdf"
        );
    }
}
