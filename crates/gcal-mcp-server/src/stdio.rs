//! Stdio transport.
//!
//! Lines are read in order and each is handled on its own task. Responses go
//! through a channel to a single writer task so output lines never interleave.
//! A line is never buffered past the message size limit; the rest of an
//! oversized line is discarded and answered with an invalid request error.

use std::sync::Arc;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use gcal_mcp_protocol::{
    JsonRpcResponse, MAX_MESSAGE_SIZE, ProtocolError, RpcError, encode_message,
};
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::handler::McpHandler;

const RESPONSE_QUEUE: usize = 64;

/// Serves requests from `reader` until EOF, writing responses to `writer`.
///
/// Returns the writer once every in-flight request has been answered.
pub async fn serve<R, W>(handler: Arc<McpHandler>, reader: R, writer: W) -> ServerResult<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    serve_with_limit(handler, reader, writer, MAX_MESSAGE_SIZE).await
}

async fn serve_with_limit<R, W>(
    handler: Arc<McpHandler>,
    reader: R,
    writer: W,
    limit: usize,
) -> ServerResult<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_QUEUE);
    let writer_task = tokio::spawn(write_responses(rx, writer));

    let mut reader = BufReader::new(reader);
    let mut in_flight = JoinSet::new();

    loop {
        let line = match read_frame(&mut reader, limit).await? {
            Frame::Eof => break,
            Frame::Line(line) => line,
            Frame::Oversized(size) => {
                let e = ProtocolError::MessageTooLarge { size, max: limit };
                warn!(error = %e, "rejecting oversized request");
                let response =
                    JsonRpcResponse::error(Value::Null, RpcError::invalid_request(e.to_string()));
                if tx.send(response).await.is_err() {
                    debug!("response dropped, writer is gone");
                }
                continue;
            }
        };

        let handler = Arc::clone(&handler);
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = handler.handle_line(&line).await
                && tx.send(response).await.is_err()
            {
                debug!("response dropped, writer is gone");
            }
        });

        while let Some(joined) = in_flight.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "request task failed");
            }
        }
    }

    debug!("input closed, draining in-flight requests");
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "request task failed");
        }
    }
    drop(tx);

    writer_task.await.map_err(|_| ServerError::WriterStopped)?
}

/// One unit of input.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// A line without its terminator.
    Line(Vec<u8>),
    /// A line longer than the limit; carries its length.
    Oversized(usize),
    Eof,
}

/// Reads the next line, holding at most `limit + 1` bytes of it in memory.
async fn read_frame<R>(reader: &mut R, limit: usize) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut line)
        .await?;
    if read == 0 {
        return Ok(Frame::Eof);
    }

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        return Ok(Frame::Line(line));
    }
    if line.len() <= limit {
        return Ok(Frame::Line(line));
    }

    let skipped = skip_line(reader).await?;
    Ok(Frame::Oversized(line.len() + skipped))
}

/// Discards input up to and including the next newline; returns the bytes
/// dropped before it.
async fn skip_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let (used, newline) = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(skipped);
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(at) => (at + 1, Some(at)),
                None => (chunk.len(), None),
            }
        };
        reader.consume(used);
        match newline {
            Some(at) => return Ok(skipped + at),
            None => skipped += used,
        }
    }
}

/// Serves on the process stdin and stdout.
pub async fn serve_stdio(handler: Arc<McpHandler>) -> ServerResult<()> {
    info!("serving on stdio");
    serve(handler, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("stdin closed, shutting down");
    Ok(())
}

async fn write_responses<W>(mut rx: mpsc::Receiver<JsonRpcResponse>, mut writer: W) -> ServerResult<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let bytes = match encode_message(&response) {
            Ok(bytes) => bytes,
            Err(e @ ProtocolError::MessageTooLarge { .. }) => {
                error!(error = %e, "response too large");
                encode_message(&JsonRpcResponse::error(
                    response.id.clone(),
                    RpcError::internal(e.to_string()),
                ))?
            }
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&bytes).await?;
        writer.flush().await?;
    }
    Ok(writer)
}
