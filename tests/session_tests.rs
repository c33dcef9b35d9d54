use std::time::Duration;

use pagegist::{
    Error, ResolvedContent, Source,
    retry::RetryPolicy,
    session::{ChatSession, Role, SessionState, Turn},
};
use spectral::prelude::*;
use url::Url;

use crate::summarize_extras::{Reply, StubLlmProvider};

mod summarize_extras;

fn url(input: &str) -> Url {
    Url::parse(input).expect("test URL should parse")
}

fn content(page: &str, text: &str) -> ResolvedContent {
    ResolvedContent {
        source: Source::Webpage(url(page)),
        text: text.to_owned(),
    }
}

fn loaded(page: &str, text: &str) -> ChatSession {
    let mut session = ChatSession::default();
    session.begin_load(url(page)).expect("idle session should start loading");
    session
        .finish_load(Ok(content(page, text)))
        .expect("loading session should finish");
    session
}

fn no_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        delay: Duration::ZERO,
        rate_limit_delay: Duration::ZERO,
    }
}

#[test]
fn load_transitions() {
    let mut session = ChatSession::default();
    assert_that(session.state()).is_equal_to(&SessionState::Idle);

    session.begin_load(url("https://example.com/a")).expect("should start loading");
    assert_that(session.state()).is_equal_to(&SessionState::Loading {
        url: url("https://example.com/a"),
    });

    assert!(matches!(
        session.begin_load(url("https://example.com/b")),
        Err(Error::Session(_))
    ));
    assert_that(session.state()).is_equal_to(&SessionState::Loading {
        url: url("https://example.com/a"),
    });

    session
        .finish_load(Ok(content("https://example.com/a", "Page A")))
        .expect("should finish loading");
    assert_that(session.state()).is_equal_to(&SessionState::Loaded {
        url: url("https://example.com/a"),
        content: content("https://example.com/a", "Page A"),
    });

    assert!(matches!(
        session.finish_load(Ok(content("https://example.com/a", "again"))),
        Err(Error::Session(_))
    ));

    session.begin_load(url("https://example.com/b")).expect("loaded session may reload");
    session
        .finish_load(Err(Error::NoContent(
            "https://example.com/b has no readable text".to_owned(),
        )))
        .expect("should finish loading");
    match session.state() {
        SessionState::Failed { url: failed, reason } => {
            assert_that(failed).is_equal_to(&url("https://example.com/b"));
            assert_that(reason).contains("has no readable text");
        }
        other => panic!("expected a failed session, got {other:?}"),
    }

    session.reset();
    assert_that(session.state()).is_equal_to(&SessionState::Idle);
}

#[tokio::test]
async fn asking_requires_loaded_content() {
    let mut session = ChatSession::default();
    let model = StubLlmProvider::answering("unused");

    let result = session.ask("What is this about?", &model, &no_retry()).await;

    assert!(matches!(result, Err(Error::Session(_))));
    assert_that(&model.calls()).is_equal_to(0);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let mut session = loaded("https://example.com/", "Cats purr.");
    let model = StubLlmProvider::answering("unused");

    let result = session.ask("   ", &model, &no_retry()).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_that(&model.calls()).is_equal_to(0);
}

#[tokio::test]
async fn answers_build_up_history() {
    let mut session = loaded("https://example.com/cats", "Cats purr when content.");
    let model = StubLlmProvider::new(vec![
        Reply::Text("<think>easy</think>They purr.".to_owned()),
        Reply::Text("When content.".to_owned()),
    ]);

    let first = session
        .ask("What do cats do?", &model, &no_retry())
        .await
        .expect("first question should be answered");
    let second = session
        .ask(" When? ", &model, &no_retry())
        .await
        .expect("second question should be answered");

    assert_that(&first.as_str()).is_equal_to("They purr.");
    assert_that(&second.as_str()).is_equal_to("When content.");
    assert_that(&session.history().to_vec()).is_equal_to(vec![
        Turn {
            role: Role::User,
            content: "What do cats do?".to_owned(),
        },
        Turn {
            role: Role::Assistant,
            content: "They purr.".to_owned(),
        },
        Turn {
            role: Role::User,
            content: "When?".to_owned(),
        },
        Turn {
            role: Role::Assistant,
            content: "When content.".to_owned(),
        },
    ]);

    let request = model.request(1);
    let speakers: Vec<bool> = request.iter().map(|message| message.from_user).collect();
    assert_that(&speakers).is_equal_to(vec![true, false, true, false, true]);
    assert_that(&request[0].content).contains("https://example.com/cats");
    assert_that(&request[0].content).contains("Cats purr when content.");
    assert_that(&request[2].content.as_str()).is_equal_to("What do cats do?");
    assert_that(&request[3].content.as_str()).is_equal_to("They purr.");
    assert_that(&request[4].content.as_str()).is_equal_to("When?");
}

#[tokio::test]
async fn failed_answer_leaves_history_untouched() {
    let mut session = loaded("https://example.com/", "Cats purr.");
    let model = StubLlmProvider::new(vec![Reply::Unauthorized]);

    let result = session.ask("Why?", &model, &no_retry()).await;

    assert!(matches!(result, Err(Error::Service(_))));
    assert_that(&session.history().len()).is_equal_to(0);
    assert!(matches!(session.state(), SessionState::Loaded { .. }));
}

#[tokio::test]
async fn network_failure_is_retried() {
    let mut session = loaded("https://example.com/", "Cats purr.");
    let model = StubLlmProvider::new(vec![Reply::Network, Reply::Text("Because.".to_owned())]);
    let retry = RetryPolicy {
        max_attempts: 2,
        ..no_retry()
    };

    let answer = session
        .ask("Why?", &model, &retry)
        .await
        .expect("second attempt should answer");

    assert_that(&answer.as_str()).is_equal_to("Because.");
    assert_that(&model.calls()).is_equal_to(2);
    assert_that(&session.history().len()).is_equal_to(2);
}

#[tokio::test]
async fn reloading_clears_history() {
    let mut session = loaded("https://example.com/a", "Page A");
    let model = StubLlmProvider::answering("Sure.");
    session
        .ask("Anything?", &model, &no_retry())
        .await
        .expect("question should be answered");
    assert_that(&session.history().len()).is_equal_to(2);

    session.begin_load(url("https://example.com/b")).expect("should start loading");
    assert_that(&session.history().len()).is_equal_to(2);
    session
        .finish_load(Ok(content("https://example.com/b", "Page B")))
        .expect("should finish loading");

    assert_that(&session.history().len()).is_equal_to(0);
}

#[tokio::test]
async fn embedded_content_is_capped() {
    let mut session = ChatSession::new(10);
    session.begin_load(url("https://example.com/")).expect("should start loading");
    session
        .finish_load(Ok(content("https://example.com/", "abcdefghijklmnop")))
        .expect("should finish loading");
    let model = StubLlmProvider::answering("ok");

    session
        .ask("Letters?", &model, &no_retry())
        .await
        .expect("question should be answered");

    let request = model.request(0);
    let instructions = &request[0].content;
    assert_that(instructions).contains("abcdefghij");
    assert!(!instructions.contains("abcdefghijk"));
}
