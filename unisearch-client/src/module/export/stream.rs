use bytes::Bytes;
use futures::{Stream, StreamExt};

/// Drain a chunked body, keeping chunks in arrival order, and join them once
/// the stream ends. Empty chunks are kept and contribute nothing.
///
/// The first error ends the transfer.
pub async fn assemble_chunks<S, E>(mut stream: S) -> Result<Vec<u8>, E>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    let mut chunks: Vec<Bytes> = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?);
    }

    let body: Vec<u8> = chunks.concat();
    tracing::debug!("Assembled {} chunks into {} bytes", chunks.len(), body.len());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[tokio::test]
    async fn test_chunks_keep_order_including_empty() {
        let first: Vec<u8> = (0..10).collect();
        let third: Vec<u8> = (100..107).collect();
        let chunks = vec![
            Ok::<_, Infallible>(Bytes::from(first.clone())),
            Ok(Bytes::new()),
            Ok(Bytes::from(third.clone())),
        ];

        let body = assemble_chunks(futures::stream::iter(chunks)).await.unwrap();

        assert_eq!(body.len(), 17);
        assert_eq!(&body[..10], first.as_slice());
        assert_eq!(&body[10..], third.as_slice());
    }

    #[tokio::test]
    async fn test_error_ends_transfer() {
        let chunks = vec![
            Ok(Bytes::from_static(b"Name")),
            Err("connection reset"),
            Ok(Bytes::from_static(b"never read")),
        ];

        let err = assemble_chunks(futures::stream::iter(chunks)).await.unwrap_err();
        assert_eq!(err, "connection reset");
    }

    #[tokio::test]
    async fn test_empty_stream_is_empty_body() {
        let chunks: Vec<Result<Bytes, Infallible>> = Vec::new();
        assert!(assemble_chunks(futures::stream::iter(chunks)).await.unwrap().is_empty());
    }
}
