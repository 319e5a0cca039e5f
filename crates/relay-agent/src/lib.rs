//! Agent client abstraction and response aggregation.
//!
//! - [`AgentClient`]: Anything that turns a prompt into a [`MessageStream`]
//! - [`AnthropicAgent`]: Tool-using agent over the Anthropic Messages API
//! - [`collect_reply`] / [`chat`]: Drain a stream into the assistant's text
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use relay_agent::{chat, AnthropicAgent};
//! use relay_core::AgentOptions;
//!
//! let agent = AnthropicAgent::new(api_key, std::env::current_dir()?);
//! let reply = chat(&agent, "你好", &AgentOptions::default()).await?;
//! println!("{}", reply);
//! ```
//!
//! # Consuming Messages
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use relay_core::ResponseMessage;
//!
//! let mut stream = agent.query("List the files here", &options);
//! while let Some(message) = stream.next().await {
//!     match message? {
//!         ResponseMessage::Assistant(a) => print!("{}", a.message.text()),
//!         ResponseMessage::Result(r) => println!("\n{} turns", r.num_turns),
//!         _ => {}
//!     }
//! }
//! ```

mod aggregate;
mod anthropic;

use std::pin::Pin;

use futures::Stream;
use relay_core::{AgentError, AgentOptions, ResponseMessage};

pub use aggregate::{chat, collect_reply};
pub use anthropic::AnthropicAgent;

/// A lazy, finite sequence of agent messages. Consumed once.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<ResponseMessage, AgentError>> + Send>>;

/// Produces agent message streams for prompts.
///
/// Nothing happens until the returned stream is polled; dropping it stops
/// the agent.
pub trait AgentClient: Send + Sync {
    fn query(&self, prompt: &str, options: &AgentOptions) -> MessageStream;
}
