use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Per-session resource bounds
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// largest line the session will buffer before failing with `LineTooLong`
    pub max_line_bytes: usize,
    /// how long a read may sit idle before the session is dropped
    pub idle_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_bytes: 8 * 1024,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("line exceeded the {0} byte limit")]
    LineTooLong(usize),

    #[error("no data received for {0:?}")]
    IdleTimeout(Duration),
}

/// The server side of a single connection: reads newline-delimited lines and
/// writes them back unchanged until the peer closes the stream.
///
/// Generic over the stream so it can run against an in-memory duplex in tests.
pub struct Session<S> {
    stream: BufReader<S>,
    limits: Limits,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, limits: Limits) -> Self {
        Self {
            stream: BufReader::new(stream),
            limits,
        }
    }

    /// Run the echo loop to completion.
    ///
    /// Returns Ok(()) when the peer closes the stream; any I/O failure or
    /// limit violation terminates only this session.
    pub async fn run(mut self) -> Result<(), SessionError> {
        while let Some(line) = self.read_line().await? {
            // echo the exact bytes, terminator included
            self.stream.write_all(&line).await?;
            self.stream.flush().await?;
        }

        Ok(())
    }

    // Read one line, the terminator included.
    //
    // Returns None on a clean EOF. A final line the peer never terminated is
    // returned as-is; the EOF is then observed by the next call.
    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        let mut line = Vec::new();

        // cap the read so an unterminated stream can't grow the buffer unbounded
        let mut limited = (&mut self.stream).take(self.limits.max_line_bytes as u64 + 1);
        let read = tokio::time::timeout(self.limits.idle_timeout, limited.read_until(b'\n', &mut line));
        let rcount = read
            .await
            .map_err(|_| SessionError::IdleTimeout(self.limits.idle_timeout))??;

        if rcount == 0 {
            return Ok(None); // reached EOF
        }

        if !line.ends_with(b"\n") && line.len() > self.limits.max_line_bytes {
            return Err(SessionError::LineTooLong(self.limits.max_line_bytes));
        }

        Ok(Some(line))
    }
}
