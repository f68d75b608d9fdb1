//! External preset parser.
//!
//! The parser is a separate process: it receives a sound-bank path and
//! prints a JSON array of `{name?, preset, bank}` objects on stdout, or a
//! diagnostic on stderr with a non-zero exit status.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use autobank_shared::{AutoBankError, ParserConfig, PresetRecord, Result};

/// Something that turns one input file into its preset records.
///
/// Implementations report per-file failures as [`AutoBankError::Parse`].
pub trait PresetParser {
    fn parse(&self, file: &str) -> impl Future<Output = Result<Vec<PresetRecord>>> + Send;
}

/// [`PresetParser`] backed by a subprocess, run in the working directory.
#[derive(Debug, Clone)]
pub struct ExternalParser {
    config: ParserConfig,
    work_dir: PathBuf,
}

impl ExternalParser {
    pub fn new(config: ParserConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            work_dir: work_dir.into(),
        }
    }

    fn command(&self, file: &str) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args);
        if !self.config.file_flag.is_empty() {
            cmd.arg(&self.config.file_flag);
        }
        cmd.arg(file)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl PresetParser for ExternalParser {
    #[instrument(skip(self), fields(cmd = %self.config.command))]
    async fn parse(&self, file: &str) -> Result<Vec<PresetRecord>> {
        let output = self.command(file).output().await.map_err(|e| {
            AutoBankError::parse(format!(
                "failed to spawn parser `{}`: {e}",
                self.config.command
            ))
        })?;

        if !output.status.success() {
            debug!(status = ?output.status, "parser exited with failure");
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            return Err(AutoBankError::parse(if message.is_empty() {
                format!("Failed to parse {file}")
            } else {
                message.to_string()
            }));
        }

        decode_presets(&output.stdout)
    }
}

/// Decode parser stdout. A literal `null` counts as no presets.
pub fn decode_presets(stdout: &[u8]) -> Result<Vec<PresetRecord>> {
    serde_json::from_slice::<Option<Vec<PresetRecord>>>(stdout)
        .map(Option::unwrap_or_default)
        .map_err(|e| AutoBankError::parse(format!("invalid parser output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_array() {
        let presets =
            decode_presets(br#"[{"name":"Piano","preset":0,"bank":0},{"preset":5,"bank":128}]"#)
                .expect("decode");
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[1].reference("x.sf2"), "x.sf2:005:128");
    }

    #[test]
    fn decode_null_and_empty_array() {
        assert!(decode_presets(b"null\n").expect("null").is_empty());
        assert!(decode_presets(b"[]\n").expect("empty").is_empty());
    }

    #[test]
    fn decode_garbage_is_parse_error() {
        let err = decode_presets(b"Traceback (most recent call last)").unwrap_err();
        assert!(matches!(err, AutoBankError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid parser output"));
    }

    #[tokio::test]
    async fn missing_program_is_parse_error() {
        let config = ParserConfig {
            command: format!("ab-no-such-parser-{}", uuid::Uuid::now_v7()),
            args: vec![],
            file_flag: String::new(),
        };
        let parser = ExternalParser::new(config, std::env::temp_dir());
        let err = parser.parse("a.sf2").await.unwrap_err();
        assert!(matches!(err, AutoBankError::Parse { .. }));
        assert!(err.to_string().contains("failed to spawn parser"));
    }

    #[cfg(unix)]
    fn shell_parser(script: &str) -> ExternalParser {
        let config = ParserConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script.into(), "sh".into()],
            file_flag: String::new(),
        };
        ExternalParser::new(config, std::env::temp_dir())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_returns_records() {
        let parser = shell_parser(
            r#"printf '[{"name":"%s","preset":1,"bank":0}]' "$1""#,
        );
        let presets = parser.parse("organ.sf2").await.expect("parse");
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].effective_name(), "organ.sf2");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_carries_trimmed_stderr() {
        let parser = shell_parser("echo '  bad header ' >&2; exit 1");
        let err = parser.parse("c.sf2").await.unwrap_err();
        assert_eq!(err.to_string(), "bad header");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_failure_uses_generic_message() {
        let parser = shell_parser("exit 2");
        let err = parser.parse("c.sf2").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse c.sf2");
    }
}
