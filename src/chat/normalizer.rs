use log::debug;

use crate::chat::{HistoryRole, HistoryTurn, Message, NormalizedRequest};
use crate::error::ChatError;

/// Split a client transcript into the provider's seed history and the
/// message to send next.
///
/// Everything but the last message becomes history, with `assistant`
/// renamed to `model`. Leading model turns are trimmed so the history
/// opens with a user turn: all of them when a user turn follows, only the
/// first one otherwise. The last message is always sent as-is, whatever
/// its role.
pub fn normalize(messages: &[Message]) -> Result<NormalizedRequest, ChatError> {
    let (latest, earlier) = messages
        .split_last()
        .ok_or_else(|| ChatError::invalid_input("messages must not be empty"))?;

    let candidate: Vec<HistoryTurn> = earlier
        .iter()
        .map(|msg| HistoryTurn {
            role: msg.role.into(),
            content: msg.content.clone(),
        })
        .collect();

    let history = trim_leading_model_turns(candidate);
    debug!(
        "Normalized {} messages into {} history turns",
        messages.len(),
        history.len()
    );

    Ok(NormalizedRequest {
        history,
        latest_message: latest.content.clone(),
    })
}

fn trim_leading_model_turns(mut turns: Vec<HistoryTurn>) -> Vec<HistoryTurn> {
    match turns.iter().position(|turn| turn.role == HistoryRole::User) {
        Some(first_user) if first_user > 0 => {
            turns.drain(..first_user);
        }
        // No user turn at all: only the first model turn goes, no re-scan.
        None if turns.first().map(|turn| turn.role) == Some(HistoryRole::Model) => {
            turns.remove(0);
        }
        _ => {}
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_roles_and_keeps_last_message_out_of_history() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("bye"),
        ];

        let request = normalize(&messages).unwrap();

        assert_eq!(
            request.history,
            vec![HistoryTurn::user("hi"), HistoryTurn::model("hello")]
        );
        assert_eq!(request.latest_message, "bye");
    }

    #[test]
    fn test_single_message_yields_empty_history() {
        let request = normalize(&[Message::user("only")]).unwrap();

        assert!(request.history.is_empty());
        assert_eq!(request.latest_message, "only");
    }

    #[test]
    fn test_lone_assistant_message_is_sent_as_latest() {
        let request = normalize(&[Message::assistant("stray")]).unwrap();

        assert!(request.history.is_empty());
        assert_eq!(request.latest_message, "stray");
    }

    #[test]
    fn test_empty_transcript_is_invalid_input() {
        let err = normalize(&[]).unwrap_err();

        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[test]
    fn test_drops_every_model_turn_before_first_user_turn() {
        let messages = vec![
            Message::assistant("Hello! How can I help you today?"),
            Message::assistant("Still there?"),
            Message::user("yes"),
            Message::assistant("great"),
            Message::user("next"),
        ];

        let request = normalize(&messages).unwrap();

        assert_eq!(
            request.history,
            vec![HistoryTurn::user("yes"), HistoryTurn::model("great")]
        );
        assert_eq!(request.latest_message, "next");
    }

    #[test]
    fn test_without_user_turn_only_first_model_turn_is_dropped() {
        let messages = vec![
            Message::assistant("a"),
            Message::assistant("b"),
            Message::user("c"),
        ];

        let request = normalize(&messages).unwrap();

        assert_eq!(request.history, vec![HistoryTurn::model("b")]);
        assert_eq!(request.latest_message, "c");
    }

    #[test]
    fn test_greeting_then_user_message_sends_without_history() {
        let messages = vec![
            Message::assistant("Hello! I'm your AI assistant."),
            Message::user("What is Rust?"),
        ];

        let request = normalize(&messages).unwrap();

        assert!(request.history.is_empty());
        assert_eq!(request.latest_message, "What is Rust?");
    }

    #[test]
    fn test_history_starting_with_user_is_untouched() {
        let messages = vec![
            Message::user("one"),
            Message::user("two"),
            Message::assistant("three"),
            Message::assistant("last"),
        ];

        let request = normalize(&messages).unwrap();

        assert_eq!(
            request.history,
            vec![
                HistoryTurn::user("one"),
                HistoryTurn::user("two"),
                HistoryTurn::model("three"),
            ]
        );
        assert_eq!(request.latest_message, "last");
    }

    #[test]
    fn test_history_length_accounts_for_dropped_turns() {
        let transcripts = vec![
            vec![Message::user("x")],
            vec![Message::assistant("x"), Message::user("y")],
            vec![
                Message::assistant("a"),
                Message::user("b"),
                Message::assistant("c"),
                Message::user("d"),
            ],
            vec![
                Message::assistant("a"),
                Message::assistant("b"),
                Message::assistant("c"),
                Message::user("d"),
            ],
        ];
        let expected_dropped = [0, 1, 1, 1];

        for (messages, dropped) in transcripts.iter().zip(expected_dropped) {
            let request = normalize(messages).unwrap();
            assert_eq!(request.history.len(), messages.len() - 1 - dropped);
            assert_eq!(
                request.latest_message,
                messages.last().unwrap().content.as_str()
            );
        }
    }

    #[test]
    fn test_content_is_preserved_verbatim() {
        let messages = vec![
            Message::user("  spaced\n\tout  "),
            Message::assistant(""),
            Message::user("ünïcödé ✓"),
        ];

        let request = normalize(&messages).unwrap();

        assert_eq!(request.history[0].content, "  spaced\n\tout  ");
        assert_eq!(request.history[1].content, "");
        assert_eq!(request.latest_message, "ünïcödé ✓");
    }
}
