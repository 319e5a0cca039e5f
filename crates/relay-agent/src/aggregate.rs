//! Reply aggregation: folds an agent message stream into plain text.

use futures::{Stream, StreamExt};
use relay_core::{AgentError, AgentOptions, ContentBlock, ResponseMessage};

use crate::AgentClient;

/// Drains a message stream and concatenates the text blocks of every
/// assistant message, in arrival order.
///
/// The first error aborts the drain; no partial text is returned.
pub async fn collect_reply<S>(mut stream: S) -> Result<String, AgentError>
where
    S: Stream<Item = Result<ResponseMessage, AgentError>> + Unpin,
{
    let mut reply = String::new();

    while let Some(message) = stream.next().await {
        let ResponseMessage::Assistant(assistant) = message? else {
            continue;
        };
        for block in &assistant.message.content {
            if let ContentBlock::Text { text } = block {
                reply.push_str(text);
            }
        }
    }

    Ok(reply)
}

/// Runs one prompt through the agent and returns the aggregated reply.
pub async fn chat(
    agent: &dyn AgentClient,
    prompt: &str,
    options: &AgentOptions,
) -> Result<String, AgentError> {
    collect_reply(agent.query(prompt, options)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use relay_core::{AssistantMessage, AssistantPayload, UserMessage, Usage};

    use crate::MessageStream;

    fn assistant(content: Vec<ContentBlock>) -> ResponseMessage {
        ResponseMessage::Assistant(AssistantMessage {
            session_id: "s".into(),
            message: AssistantPayload {
                id: "msg".into(),
                model: "m".into(),
                content,
                stop_reason: None,
                usage: Usage::default(),
            },
        })
    }

    fn text(t: &str) -> ContentBlock {
        ContentBlock::Text { text: t.into() }
    }

    struct Scripted(Vec<Result<ResponseMessage, String>>);

    impl AgentClient for Scripted {
        fn query(&self, _prompt: &str, _options: &AgentOptions) -> MessageStream {
            let items: Vec<_> = self
                .0
                .iter()
                .map(|r| r.clone().map_err(AgentError::LlmError))
                .collect();
            Box::pin(stream::iter(items))
        }
    }

    #[tokio::test]
    async fn test_only_assistant_text_blocks_are_collected() {
        let messages: Vec<Result<ResponseMessage, AgentError>> = vec![
            Ok(assistant(vec![text("Hello, "), text("world")])),
            Ok(ResponseMessage::User(UserMessage {
                session_id: "s".into(),
                content: vec![text("ignored")],
            })),
            Ok(assistant(vec![ContentBlock::ToolUse {
                id: "t1".into(),
                name: "read_file".into(),
                input: serde_json::json!({}),
            }])),
        ];

        let reply = collect_reply(stream::iter(messages)).await.unwrap();
        assert_eq!(reply, "Hello, world");
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_reply() {
        let reply = collect_reply(stream::iter(Vec::<Result<ResponseMessage, AgentError>>::new()))
            .await
            .unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_error_discards_partial_text() {
        let agent = Scripted(vec![
            Ok(assistant(vec![text("partial")])),
            Err("connection reset".into()),
            Ok(assistant(vec![text("never read")])),
        ]);

        let err = chat(&agent, "hi", &AgentOptions::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM request failed: connection reset");
    }
}
