use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(thiserror::Error, Debug)]
#[error("failed to connect to {host}:{port}: {source}")]
pub struct ConnectError {
    host: String,
    port: u16,
    source: tokio::io::Error,
}

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("the server closed the connection before echoing")]
    ServerClosed,
}

pub async fn connect(host: &str, port: u16) -> Result<TcpStream, ConnectError> {
    TcpStream::connect((host, port))
        .await
        .map_err(|source| ConnectError {
            host: host.to_owned(),
            port,
            source,
        })
}

/// Relay console lines to the server in lock-step.
///
/// Each console line is sent and its echo read back and printed before the
/// next console line is touched. Console EOF ends the relay normally; the
/// server closing mid-exchange is an error.
///
/// Generic over the three streams so the sequencing is testable in memory.
pub async fn relay<C, S, O>(mut console: C, stream: S, mut output: O) -> Result<(), RelayError>
where
    C: AsyncBufRead + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);

    loop {
        let mut line = String::new();
        let rcount = console.read_line(&mut line).await?;
        if rcount == 0 {
            return Ok(()); // no more input
        }
        if !line.ends_with('\n') {
            line.push('\n');
        }

        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;

        let mut echo = String::new();
        let rcount = stream.read_line(&mut echo).await?;
        if rcount == 0 {
            return Err(RelayError::ServerClosed);
        }

        // redisplay without the terminator
        if echo.ends_with('\n') {
            echo.pop();
        }
        output.write_all(format!("echo: {echo}\n").as_bytes()).await?;
        output.flush().await?;
    }
}
