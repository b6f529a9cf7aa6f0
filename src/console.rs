use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

/// Line oriented user interaction.
#[async_trait]
pub trait Console: Send {
    /// Shows `message` and waits for one line of input.
    ///
    /// The returned line has its terminator removed. `None` means the input
    /// was closed.
    async fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    async fn emit(&mut self, line: &str) -> Result<()>;
}

pub struct Terminal {
    input: Lines<BufReader<Stdin>>,
    output: Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            input: BufReader::new(io::stdin()).lines(),
            output: io::stdout(),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for Terminal {
    async fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        self.output.write_all(message.as_bytes()).await?;
        self.output.flush().await?;
        self.input
            .next_line()
            .await
            .context("failed to read from stdin")
    }

    async fn emit(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
