//! Background task that drains the server's stdout and stderr.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::SplitStream;
use tokio_stream::{Stream, StreamExt};

use super::channel::{LineOrigin, LineSender};
use super::exit::ExitSignal;

/// Diagnostic pushed once the output has closed and the process has exited.
pub const SERVER_STOPPED: &str = "Server stopped.";

/// Handle to a running pipe reader task.
///
/// The task ends on its own once both pipes reach end-of-stream and the process
/// exit has been observed. The run state is left to the exit watcher.
#[derive(Debug)]
pub struct PipeReader {
    handle: JoinHandle<()>,
    generation: u64,
}

impl PipeReader {
    /// Spawn the reader on the current tokio runtime.
    ///
    /// Lines are pushed to `sender` in the order each pipe produced them.
    /// After end-of-stream the reader waits for `exit` and then pushes a final
    /// [`SERVER_STOPPED`] line.
    pub fn spawn<O, E>(
        stdout: O,
        stderr: E,
        sender: LineSender,
        mut exit: ExitSignal,
        generation: u64,
    ) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut merged =
                lines(stdout, LineOrigin::Stdout).merge(lines(stderr, LineOrigin::Stderr));

            let mut count: u64 = 0;
            while let Some((origin, text)) = merged.next().await {
                count += 1;
                sender.push_output(text, origin);
            }

            tracing::debug!(generation, lines = count, "Server output closed");
            exit.wait().await;
            sender.push_diagnostic(SERVER_STOPPED);
        });

        Self { handle, generation }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the task has observed end-of-stream and finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the reader to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked or was aborted.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.handle.await
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Newline-delimited lines of `reader`, decoded lossily, without line endings.
///
/// A read error ends the stream for that pipe.
fn lines<R>(reader: R, origin: LineOrigin) -> impl Stream<Item = (LineOrigin, String)>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    SplitStream::new(BufReader::new(reader).split(b'\n'))
        .take_while(move |segment| {
            if let Err(e) = segment {
                tracing::warn!(?origin, error = %e, "Failed to read server output");
            }
            segment.is_ok()
        })
        .filter_map(Result::ok)
        .map(move |segment| (origin, decode_line(&segment)))
}

fn decode_line(segment: &[u8]) -> String {
    let segment = segment.strip_suffix(b"\r").unwrap_or(segment);
    String::from_utf8_lossy(segment).into_owned()
}
