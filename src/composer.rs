//! Prompt composition for retrieval-augmented answering.
//!
//! Every backend receives the same composed message list: a fixed system
//! persona, the prior conversation verbatim, and a closing user message that
//! embeds the queries and the retrieved context in a fixed template.

use crate::types::Message;

/// System persona prepended to every composed prompt.
pub const SYSTEM_PROMPT: &str = "You are a Retrieval Augmented Generation chatbot. \
You will receive a user query and context pieces that were retrieved for that query. \
Answer the query only with the provided context. \
If the provided context does not contain the answer, say so explicitly. \
If the user asks about you as an assistant, answer the question naturally. \
Answer the query in the same language it was asked in. \
Always wrap code examples in fences with the name of the programming language, and never produce pseudo-code.";

/// Compose the full message list sent to a backend.
///
/// Queries and context passages are each joined with single spaces before
/// being substituted into the user template, so multi-query and multi-passage
/// calls collapse into one user turn. Conversation turns are passed through
/// unmodified, in order, between the system message and that user turn.
pub fn compose(queries: &[String], context: &[String], conversation: &[Message]) -> Vec<Message> {
    let query = queries.join(" ");
    let passages = context.join(" ");

    let mut messages = Vec::with_capacity(conversation.len() + 2);
    messages.push(Message::system(SYSTEM_PROMPT));
    messages.extend(conversation.iter().cloned());
    messages.push(Message::user(format!(
        "Please answer this query: '{query}' with this provided context: {passages}"
    )));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_prompt_has_fixed_shape() {
        let queries = vec!["What is X?".to_string()];
        let context = vec!["X is a protocol.".to_string()];

        let messages = compose(&queries, &context, &[]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Please answer this query: 'What is X?' with this provided context: X is a protocol."
        );
    }

    #[test]
    fn test_queries_and_context_are_space_joined() {
        let queries = vec!["What is X?".to_string(), "Why does it matter?".to_string()];
        let context = vec!["X is a protocol.".to_string(), "It routes packets.".to_string()];

        let messages = compose(&queries, &context, &[]);

        assert_eq!(
            messages.last().unwrap().content,
            "Please answer this query: 'What is X? Why does it matter?' \
             with this provided context: X is a protocol. It routes packets."
        );
    }

    #[test]
    fn test_conversation_history_is_passed_through_verbatim() {
        let conversation = vec![
            Message::user("hello"),
            Message::assistant("Hello! Ask me about the docs."),
        ];

        let messages = compose(
            &["What is X?".to_string()],
            &["X is a protocol.".to_string()],
            &conversation,
        );

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1], conversation[0]);
        assert_eq!(messages[2], conversation[1]);
        assert_eq!(messages[3].role, Role::User);
    }

    #[test]
    fn test_empty_inputs_compose_cleanly() {
        let messages = compose(&[], &[], &[]);

        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].content,
            "Please answer this query: '' with this provided context: "
        );
    }

    #[test]
    fn test_system_message_always_leads() {
        let conversation = vec![Message::assistant("earlier answer")];
        let messages = compose(&["q".to_string()], &[], &conversation);

        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages.len(), 3);
    }
}
