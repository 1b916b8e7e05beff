/// Email delivery
///
/// Confirmation and password-reset codes go out by email. Delivery is
/// fire-and-forget from the caller's perspective: handlers log a failed
/// send and carry on. The [`EmailSender`] trait is the seam; production
/// uses the SMTP implementation, development and tests use the
/// tracing-backed one.

use async_trait::async_trait;
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Error type for email operations
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Address could not be parsed into a mailbox
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Transport-level failure (connection, auth, rejection)
    #[error("Email transport error: {0}")]
    Transport(String),
}

/// Delivers a subject + body message to an address
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// SMTP-backed sender using lettre's async transport
pub struct SmtpEmailSender {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    /// Creates an SMTP sender
    ///
    /// Empty username/password means unauthenticated relay. `insecure`
    /// skips TLS and is only meant for local development mail catchers.
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        from_address: String,
        insecure: bool,
    ) -> Result<Self, EmailError> {
        let transport = if insecure {
            tracing::warn!(host, port, "Using unencrypted SMTP transport");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port)
                .build()
        } else {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| EmailError::Transport(format!("Failed to create transport: {}", e)))?
                .port(port);

            if username.is_empty() {
                builder.build()
            } else {
                builder
                    .credentials(Credentials::new(username.to_owned(), password.to_owned()))
                    .build()
            }
        };

        Ok(Self {
            from_address,
            transport,
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("from address: {}", e)))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("recipient: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_owned())
            .map_err(|e| EmailError::Transport(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(format!("Send failed: {}", e)))?;

        tracing::debug!(to, subject, "Email sent");
        Ok(())
    }
}

/// Development sender: logs the message instead of delivering it
pub struct TracingEmailSender;

#[async_trait]
impl EmailSender for TracingEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(to, subject, body, "Email (not delivered; tracing sender)");
        Ok(())
    }
}
