//! Shared test support: a minimal HTTP server for streaming behaviors
//! wiremock cannot express, such as a response body that stalls between
//! events.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one request with a chunked SSE response, sleeping `stall` between
/// successive event blocks. Returns the base URL to point a generator at.
pub async fn serve_trickled_sse(stall: Duration, blocks: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Drain the request fully before responding, so closing this end
        // afterwards cannot reset the connection under the response.
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let content_length = String::from_utf8_lossy(&request[..header_end])
            .to_lowercase()
            .lines()
            .find_map(|line| line.strip_prefix("content-length:").map(str::to_owned))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while request.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed mid-request");
            request.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(
                concat!(
                    "HTTP/1.1 200 OK\r\n",
                    "content-type: text/event-stream\r\n",
                    "cache-control: no-cache\r\n",
                    "transfer-encoding: chunked\r\n",
                    "\r\n"
                )
                .as_bytes(),
            )
            .await
            .unwrap();

        let mut first = true;
        for block in blocks {
            if !first {
                tokio::time::sleep(stall).await;
            }
            first = false;
            let chunk = format!("{len:x}\r\n{block}\r\n", len = block.len());
            socket.write_all(chunk.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.flush().await.unwrap();
    });

    base_url
}
