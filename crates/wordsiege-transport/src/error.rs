/// Errors that can occur in the transport layer.
///
/// Protocol-library errors are wrapped in `std::io::Error` so the error
/// type stays the same with the `websocket` feature off.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a connection (TCP or protocol handshake) failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),
}
