//! Extraction oracle seam.
//!
//! An oracle turns raw Chinese text into candidate extraction JSON of the form
//! `{ sentences: [ { text, words: [ { word, meaning, pinyin? } ] } ] }`.
//! Its output is never trusted: callers pass it through [`crate::validate`].

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use serde_json::Value;
use tracing::{debug, debug_span};

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("oracle exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("oracle returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("oracle error: {0}")]
    Other(String),
}

pub trait ExtractionOracle {
    fn extract(&self, text: &str) -> Result<Value, OracleError>;
}

impl<F> ExtractionOracle for F
where
    F: Fn(&str) -> Result<Value, OracleError>,
{
    fn extract(&self, text: &str) -> Result<Value, OracleError> {
        self(text)
    }
}

/// Parse an oracle reply, tolerating a surrounding ```` ```json ```` fence.
pub fn parse_oracle_response(reply: &str) -> Result<Value, OracleError> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(body.trim())?)
}

/// Runs an external program: text on stdin, extraction JSON on stdout.
///
/// The program is executed directly, never through a shell.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl ExtractionOracle for CommandOracle {
    fn extract(&self, text: &str) -> Result<Value, OracleError> {
        let _span = debug_span!("oracle", program = %self.program).entered();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin is written from its own thread while stdout and stderr drain.
        // Dropping it closes the pipe so the child sees EOF. A child that exits
        // without reading is judged by its exit status below.
        let stdin = child.stdin.take();
        let input = text.as_bytes().to_vec();
        let writer = thread::spawn(move || -> io::Result<()> {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&input) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        });
        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| OracleError::Other("stdin writer panicked".to_string()))??;

        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let reply = String::from_utf8(output.stdout)
            .map_err(|e| OracleError::Other(format!("non UTF-8 output: {e}")))?;
        debug!(bytes = reply.len(), "oracle replied");
        parse_oracle_response(&reply)
    }
}
