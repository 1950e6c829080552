use std::collections::HashSet;
use std::sync::Arc;

use exam_core::model::{Question, QuestionId, TopicId, VehicleId};
use exam_core::session::{FailSignal, SessionStatus, SubmitOutcome};
use exam_services::{ExamFlowError, ExamFlowService, FetchError, InMemoryExamApi, PoolError};

fn question(id: u32, topic: &str, vehicle: &str) -> Question {
    Question::new(
        QuestionId::new(format!("q{id}")),
        format!("Question {id}"),
        None,
        vec!["right".into(), "wrong".into(), "other".into()],
        "right",
        TopicId::new(topic),
        HashSet::from([VehicleId::new(vehicle)]),
    )
    .unwrap()
}

fn fixture_api() -> InMemoryExamApi {
    InMemoryExamApi::new()
        .with_vehicle(VehicleId::new("v-light"), "B sedan")
        .with_vehicle(VehicleId::new("v-heavy"), "C1 truck")
        .with_questions((1..=5).map(|i| question(i, "t1", "v-light")).collect())
}

fn flow(api: InMemoryExamApi) -> ExamFlowService {
    let api = Arc::new(api);
    ExamFlowService::new(api.clone(), api).with_seed(42)
}

#[tokio::test(start_paused = true)]
async fn light_exam_runs_to_too_many_wrong() {
    let flow = flow(fixture_api());
    let vehicle = VehicleId::new("v-light");
    let topics = HashSet::from([TopicId::new("t1")]);

    let mut exam = flow.start_exam(&vehicle, &topics).await.unwrap();

    // Light category caps at 30 but only 5 candidates exist.
    let snapshot = exam.snapshot();
    assert_eq!(snapshot.total_questions, 5);
    assert_eq!(snapshot.answers, vec![None; 5]);
    assert_eq!(snapshot.remaining_secs, 1800);

    // Wrong answers on the first three indices raise nothing.
    for _ in 0..3 {
        let outcome = exam.submit_answer("wrong").unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Recorded {
                correct: false,
                signal: None
            }
        );
        exam.advance().unwrap();
    }

    // The fourth wrong submission hits the light-category limit.
    let outcome = exam.submit_answer("wrong").unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Recorded {
            correct: false,
            signal: Some(FailSignal::TooManyWrong)
        }
    );

    let snapshot = exam.snapshot();
    assert_eq!(snapshot.wrong_count, 4);
    assert_eq!(snapshot.fail_signal, Some(FailSignal::TooManyWrong));
    // Advisory: still active until the user restarts or terminates.
    assert_eq!(snapshot.status, SessionStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn perfect_run_completes_with_a_pass() {
    let flow = flow(fixture_api());
    let vehicle = VehicleId::new("v-light");
    let topics = HashSet::from([TopicId::new("t1")]);

    let mut exam = flow.start_exam(&vehicle, &topics).await.unwrap();

    loop {
        let answer = exam
            .snapshot()
            .current_question
            .expect("active session has a current question")
            .correct_answer()
            .to_string();
        exam.submit_answer(&answer).unwrap();
        if let exam_core::session::AdvanceOutcome::Finalized { passed } = exam.advance().unwrap() {
            assert!(passed);
            break;
        }
    }

    let snapshot = exam.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Completed { passed: true });
    assert_eq!(snapshot.correct_count, 5);
    assert_eq!(snapshot.score_percent(), 100);
}

#[tokio::test(start_paused = true)]
async fn heavy_vehicle_gets_heavy_parameters() {
    let api = fixture_api()
        .with_questions((1..=50).map(|i| question(i, "t1", "v-heavy")).collect());
    let flow = flow(api);
    let vehicle = VehicleId::new("v-heavy");
    let topics = HashSet::from([TopicId::new("t1")]);

    let mut exam = flow.start_exam(&vehicle, &topics).await.unwrap();

    let snapshot = exam.snapshot();
    assert_eq!(snapshot.total_questions, 40);
    assert_eq!(snapshot.remaining_secs, 2400);
}

#[tokio::test(start_paused = true)]
async fn same_seed_reproduces_the_same_exam() {
    let vehicle = VehicleId::new("v-light");
    let topics = HashSet::from([TopicId::new("t1")]);

    let first = flow(fixture_api())
        .start_exam(&vehicle, &topics)
        .await
        .unwrap();
    let second = flow(fixture_api())
        .start_exam(&vehicle, &topics)
        .await
        .unwrap();

    let ids = |exam: &exam_services::ExamController| -> Vec<String> {
        exam.session()
            .questions()
            .iter()
            .map(|q| q.id().value().to_string())
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test(start_paused = true)]
async fn restart_new_replaces_the_session() {
    let flow = flow(fixture_api());
    let vehicle = VehicleId::new("v-light");
    let topics = HashSet::from([TopicId::new("t1")]);

    let mut exam = flow.start_exam(&vehicle, &topics).await.unwrap();
    exam.submit_answer("wrong").unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(9)).await;

    let mut fresh = flow.restart_exam(exam, &vehicle, &topics).await.unwrap();

    let snapshot = fresh.snapshot();
    assert_eq!(snapshot.answers, vec![None; 5]);
    assert_eq!(snapshot.elapsed_secs, 0);
    assert_eq!(snapshot.wrong_count, 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_vehicle_surfaces_a_fetch_error() {
    let flow = flow(fixture_api());
    let vehicle = VehicleId::new("ghost");
    let topics = HashSet::from([TopicId::new("t1")]);

    let err = flow.start_exam(&vehicle, &topics).await.unwrap_err();
    assert!(matches!(
        err,
        ExamFlowError::Fetch(FetchError::VehicleNotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn unmatched_topics_surface_an_empty_pool() {
    let flow = flow(fixture_api());
    let vehicle = VehicleId::new("v-light");
    let topics = HashSet::from([TopicId::new("no-such-topic")]);

    let err = flow.start_exam(&vehicle, &topics).await.unwrap_err();
    assert!(matches!(err, ExamFlowError::Pool(PoolError::Empty)));
}
