//! Line-by-line stdin to stdout driver

use secfetch_secrets::{SecretError, SecretResolver};
use std::process::ExitCode;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

/// Totals for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines written to the output
    pub lines: usize,
    /// Placeholders left unresolved
    pub unresolved: usize,
    /// Input ended with a read error
    pub read_failed: bool,
    /// Processing stopped at the first failing line
    pub stopped_early: bool,
    ignore_errors: bool,
}

impl RunSummary {
    fn new(ignore_errors: bool) -> Self {
        Self {
            ignore_errors,
            ..Self::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        self.unresolved > 0 || self.read_failed
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() && !self.ignore_errors {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Resolve every line of `reader` into `writer`
///
/// Each output line is newline-terminated and flushed before the next line
/// is read. Without `ignore_errors`, the first line with an unresolved
/// placeholder is written and then processing stops.
pub async fn process<R, W>(
    resolver: &SecretResolver,
    mut reader: R,
    mut writer: W,
    ignore_errors: bool,
) -> std::io::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = RunSummary::new(ignore_errors);
    let mut buf = String::new();

    loop {
        buf.clear();
        match reader.read_line(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("{}", SecretError::InputRead(e));
                summary.read_failed = true;
                break;
            }
        }

        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        let resolution = resolver.resolve_line(line).await;

        writer.write_all(resolution.line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        summary.lines += 1;
        summary.unresolved += resolution.unresolved.len();

        if !resolution.is_complete() && !ignore_errors {
            summary.stopped_early = true;
            break;
        }
    }

    debug!(
        lines = summary.lines,
        unresolved = summary.unresolved,
        "input processed"
    );
    Ok(summary)
}
