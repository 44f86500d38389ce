use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

use crate::session::{Limits, Session};

#[derive(thiserror::Error, Debug)]
#[error("failed to bind {addr}: {source}")]
pub struct BindError {
    addr: SocketAddr,
    source: tokio::io::Error,
}

/// Accepts connections and dispatches each to its own session task.
#[derive(Debug)]
pub struct Listener {
    listener: TcpListener,
    limits: Limits,
}

impl Listener {
    pub async fn bind(addr: SocketAddr, limits: Limits) -> Result<Self, BindError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BindError { addr, source })?;

        Ok(Self { listener, limits })
    }

    pub fn local_addr(&self) -> tokio::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one spawned session per connection.
    ///
    /// Accept failures are transient: they are logged and the loop keeps
    /// going. Dropping this future stops accepting; sessions already running
    /// are unaffected and terminate with their own connections.
    pub async fn run(self) {
        loop {
            let (conn, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!("failed to accept a connection: {err}");
                    continue;
                }
            };

            tokio::spawn(handle_connection(conn, peer, self.limits));
        }
    }
}

async fn handle_connection(conn: TcpStream, peer: SocketAddr, limits: Limits) {
    tracing::debug!("accepted connection from {peer}");

    // session errors are local to the connection, report and move on
    match Session::new(conn, limits).run().await {
        Ok(()) => tracing::debug!("{peer} disconnected"),
        Err(err) => tracing::warn!("session with {peer} failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::session::Limits;

    use super::Listener;

    #[tokio::test]
    async fn serves_concurrent_clients_without_crosstalk() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), Limits::default())
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listener.run());

        let mut clients = Vec::new();
        for id in 0..8 {
            clients.push(tokio::spawn(async move {
                let mut conn = TcpStream::connect(addr).await.unwrap();
                for n in 0..20 {
                    let line = format!("client {id} line {n}\n");
                    conn.write_all(line.as_bytes()).await.unwrap();

                    let mut echo = vec![0; line.len()];
                    conn.read_exact(&mut echo).await.unwrap();
                    assert_eq!(echo, line.as_bytes());
                }
            }));
        }

        for client in clients {
            client.await.unwrap();
        }
    }

    #[tokio::test]
    async fn bind_fails_on_a_taken_port() {
        let first = Listener::bind("127.0.0.1:0".parse().unwrap(), Limits::default())
            .await
            .unwrap();
        let addr = first.local_addr().unwrap();

        let err = Listener::bind(addr, Limits::default()).await.unwrap_err();
        assert!(err.to_string().contains(&addr.to_string()));
    }
}
