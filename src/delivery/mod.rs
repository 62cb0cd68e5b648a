use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::app::Result;

/// Sends one message back to the user who triggered a request.
///
/// Failures are returned to the caller; nothing here retries.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Writes each message to stdout, separated by a blank line.
pub struct ConsoleDelivery {
    out: Mutex<Stdout>,
}

impl ConsoleDelivery {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Delivery for ConsoleDelivery {
    async fn send(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n\n").await?;
        out.flush().await?;
        Ok(())
    }
}
