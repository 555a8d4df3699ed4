use std::time::Duration;

use form_engine::feedback::{
    CHANGES_SAVED, ENTRY_DELETED, FIX_ERRORS, FORM_SUBMITTED, SCHEMA_LOAD_FAILED,
};
use form_engine::{
    EditingState, EngineError, FeedbackKind, FormEngine, MockSchemaProvider, SelectOutcome,
    SubmitOutcome,
};
use form_spec::FieldValues;

fn instant_provider() -> MockSchemaProvider {
    MockSchemaProvider::default().with_latency(Duration::ZERO)
}

async fn engine_on(form_type: &str) -> FormEngine {
    let engine = FormEngine::with_provider(instant_provider());
    let outcome = engine.select_form_type(Some(form_type)).await;
    assert!(matches!(outcome, SelectOutcome::Loaded { .. }), "{outcome:?}");
    engine
}

fn fill(engine: &FormEngine, pairs: &[(&str, &str)]) {
    for (name, value) in pairs {
        engine.set_field_value(name, *value).expect("known field");
    }
}

fn submit_user(engine: &FormEngine, first: &str, last: &str) {
    fill(engine, &[("firstName", first), ("lastName", last)]);
    let outcome = engine.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Created { .. }), "{outcome:?}");
}

fn expected(pairs: &[(&str, &str)]) -> FieldValues {
    pairs.iter().copied().collect()
}

#[tokio::test]
async fn missing_first_name_blocks_submission() {
    let engine = engine_on("userInfo").await;
    fill(&engine, &[("firstName", ""), ("lastName", "Doe")]);

    let outcome = engine.submit().expect("submit");
    let SubmitOutcome::Rejected { errors } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("firstName"), Some("First Name is required"));
    assert_eq!(engine.errors(), errors);
    assert!(engine.records().is_empty());

    let feedback = engine.feedback().expect("feedback");
    assert_eq!(feedback.message, FIX_ERRORS);
    assert_eq!(feedback.kind, FeedbackKind::Error);
    assert_eq!(engine.values().get("lastName"), Some("Doe"));
}

#[tokio::test]
async fn non_numeric_age_is_reported() {
    let engine = engine_on("userInfo").await;
    fill(
        &engine,
        &[("firstName", "Jane"), ("lastName", "Doe"), ("age", "abc")],
    );
    let outcome = engine.submit().expect("submit");
    let SubmitOutcome::Rejected { errors } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("age"), Some("Age must be a valid number"));
}

#[tokio::test]
async fn valid_submission_creates_record_and_resets_form() {
    let engine = engine_on("userInfo").await;
    fill(&engine, &[("firstName", "Jane"), ("lastName", "Doe")]);

    let outcome = engine.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Created { index: 0, .. }));

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].values(),
        &expected(&[("firstName", "Jane"), ("lastName", "Doe")])
    );
    let feedback = engine.feedback().expect("feedback");
    assert_eq!(feedback.message, FORM_SUBMITTED);
    assert_eq!(feedback.kind, FeedbackKind::Success);
    assert!(engine.values().is_empty());
    assert_eq!(engine.editing(), EditingState::NotEditing);
}

#[tokio::test]
async fn editing_replaces_record_in_place() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Jane", "Doe");
    let original_id = engine.records()[0].id();

    engine.begin_edit(0).expect("edit");
    assert_eq!(engine.values().get("firstName"), Some("Jane"));
    assert_eq!(engine.editing().index(), Some(0));
    assert_eq!(engine.editing().submit_label(), "Save Changes");

    engine.set_field_value("lastName", "Smith").expect("set");
    let outcome = engine.submit().expect("submit");
    assert_eq!(
        outcome,
        SubmitOutcome::Updated {
            index: 0,
            id: original_id
        }
    );

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("lastName"), Some("Smith"));
    assert_eq!(records[0].id(), original_id);
    assert_eq!(
        engine.feedback().map(|f| f.message),
        Some(CHANGES_SAVED.to_string())
    );
    assert_eq!(engine.editing(), EditingState::NotEditing);
    assert_eq!(engine.editing().submit_label(), "Submit");
}

#[tokio::test]
async fn editing_leaves_other_records_alone() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    submit_user(&engine, "Cid", "C");
    let before = engine.records();

    engine.begin_edit(1).expect("edit");
    engine.set_field_value("firstName", "Robert").expect("set");
    engine.submit().expect("submit");

    let after = engine.records();
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].get("firstName"), Some("Robert"));
    assert_eq!(after[1].id(), before[1].id());
}

#[tokio::test]
async fn rejected_edit_keeps_edit_mode() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Jane", "Doe");
    engine.begin_edit(0).expect("edit");
    engine.set_field_value("firstName", " ").expect("set");

    let outcome = engine.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
    assert_eq!(engine.editing().index(), Some(0));
    assert_eq!(engine.values().get("lastName"), Some("Doe"));
    assert_eq!(engine.records()[0].get("firstName"), Some("Jane"));
}

#[tokio::test]
async fn deleting_shifts_later_records() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    let second = engine.records()[1].clone();

    let removed = engine.delete_record(0).expect("delete");
    assert_eq!(removed.get("firstName"), Some("Ann"));

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], second);
    let feedback = engine.feedback().expect("feedback");
    assert_eq!(feedback.message, ENTRY_DELETED);
    assert_eq!(feedback.kind, FeedbackKind::Success);
}

#[tokio::test]
async fn deleting_a_middle_record_keeps_earlier_and_shifts_later() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    submit_user(&engine, "Cid", "C");
    let before = engine.records();

    let removed = engine.delete_record(1).expect("delete");
    assert_eq!(removed, before[1]);

    let after = engine.records();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[2]);
    assert_eq!(after[1].id(), before[2].id());
}

#[tokio::test]
async fn deleting_the_edited_record_by_id_ends_edit_mode() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    let bob = engine.records()[1].id();

    engine.begin_edit_record(bob).expect("edit");
    let removed = engine.delete_record_by_id(bob).expect("delete");
    assert_eq!(removed.id(), bob);
    assert_eq!(engine.editing(), EditingState::NotEditing);
    assert_eq!(
        engine.delete_record_by_id(bob),
        Err(EngineError::UnknownRecord(bob))
    );
    assert_eq!(engine.records().len(), 1);
}

#[tokio::test]
async fn deleting_the_edited_record_ends_edit_mode() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");

    engine.begin_edit(1).expect("edit");
    engine.delete_record(1).expect("delete");
    assert_eq!(engine.editing(), EditingState::NotEditing);
}

#[tokio::test]
async fn deleting_an_earlier_record_keeps_edit_on_the_same_record() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    submit_user(&engine, "Cid", "C");
    let cid = engine.records()[2].id();

    engine.begin_edit(2).expect("edit");
    engine.delete_record(0).expect("delete");
    assert_eq!(
        engine.editing(),
        EditingState::Editing {
            index: 1,
            record: cid
        }
    );

    engine.set_field_value("lastName", "Changed").expect("set");
    engine.submit().expect("submit");
    let records = engine.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id(), cid);
    assert_eq!(records[1].get("lastName"), Some("Changed"));
    assert_eq!(records[0].get("firstName"), Some("Bob"));
}

#[tokio::test]
async fn out_of_range_indices_are_rejected() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");

    assert_eq!(
        engine.begin_edit(4),
        Err(EngineError::InvalidIndex { index: 4, len: 1 })
    );
    assert_eq!(
        engine.delete_record(1).expect_err("range"),
        EngineError::InvalidIndex { index: 1, len: 1 }
    );
    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.editing(), EditingState::NotEditing);
}

#[tokio::test]
async fn record_ids_address_records_independently_of_position() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Ann", "A");
    submit_user(&engine, "Bob", "B");
    let ann = engine.records()[0].id();
    let bob = engine.records()[1].id();

    engine.delete_record_by_id(ann).expect("delete");
    engine.begin_edit_record(bob).expect("edit");
    assert_eq!(engine.editing().index(), Some(0));

    assert_eq!(
        engine.begin_edit_record(ann),
        Err(EngineError::UnknownRecord(ann))
    );
}

#[tokio::test]
async fn switching_form_type_resets_form_but_keeps_records() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Jane", "Doe");
    engine.begin_edit(0).expect("edit");
    engine.set_field_value("firstName", "").expect("set");
    engine.validate();
    assert!(!engine.errors().is_empty());

    engine.select_form_type(Some("addressInfo")).await;
    assert_eq!(engine.active_form_type().as_deref(), Some("addressInfo"));
    assert!(engine.values().is_empty());
    assert!(engine.errors().is_empty());
    assert!(engine.feedback().is_none());
    assert_eq!(engine.editing(), EditingState::NotEditing);
    assert!(engine.records().is_empty());
    assert_eq!(engine.records_for("userInfo").len(), 1);

    engine.select_form_type(Some("userInfo")).await;
    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.records()[0].get("firstName"), Some("Jane"));
}

#[tokio::test]
async fn selecting_nothing_clears_the_form() {
    let engine = engine_on("paymentInfo").await;
    assert_eq!(engine.schema().len(), 4);

    let outcome = engine.select_form_type(Some("  ")).await;
    assert!(matches!(outcome, SelectOutcome::Cleared));
    assert_eq!(engine.active_form_type(), None);
    assert!(engine.schema().is_empty());
    assert!(!engine.is_loading());
    assert_eq!(engine.submit(), Err(EngineError::NoActiveForm));
}

#[tokio::test]
async fn schema_failure_surfaces_error_feedback() {
    let engine = FormEngine::with_provider(instant_provider().with_failure("paymentInfo"));
    let outcome = engine.select_form_type(Some("paymentInfo")).await;
    assert!(matches!(outcome, SelectOutcome::Failed(_)));

    assert_eq!(engine.active_form_type().as_deref(), Some("paymentInfo"));
    assert!(engine.schema().is_empty());
    assert!(!engine.is_loading());
    let feedback = engine.feedback().expect("feedback");
    assert_eq!(feedback.message, SCHEMA_LOAD_FAILED);
    assert_eq!(feedback.kind, FeedbackKind::Error);
    assert_eq!(engine.submit(), Err(EngineError::NoActiveForm));
}

#[tokio::test]
async fn unknown_form_type_is_a_fetch_failure() {
    let engine = FormEngine::with_provider(instant_provider());
    let outcome = engine.select_form_type(Some("shippingInfo")).await;
    assert!(matches!(outcome, SelectOutcome::Failed(_)));
    assert_eq!(
        engine.feedback().map(|f| f.message),
        Some(SCHEMA_LOAD_FAILED.to_string())
    );
}

#[tokio::test]
async fn writes_to_unknown_fields_are_rejected() {
    let engine = engine_on("userInfo").await;
    engine.set_field_value("firstName", "Jane").expect("set");
    assert_eq!(
        engine.set_field_value("street", "Main"),
        Err(EngineError::UnknownField("street".into()))
    );
    assert_eq!(engine.values(), expected(&[("firstName", "Jane")]));
}

#[tokio::test]
async fn editing_a_field_clears_only_its_error() {
    let engine = engine_on("userInfo").await;
    assert!(!engine.validate());
    assert_eq!(engine.errors().len(), 2);

    engine.set_field_value("firstName", "   ").expect("set");
    let errors = engine.errors();
    assert!(!errors.contains("firstName"));
    assert_eq!(errors.get("lastName"), Some("Last Name is required"));
}

#[tokio::test]
async fn progress_tracks_required_fields() {
    let engine = engine_on("addressInfo").await;
    assert_eq!(engine.progress(), 0);
    fill(&engine, &[("street", "1 Main St"), ("zipCode", "12345")]);
    assert_eq!(engine.progress(), 33);
    fill(&engine, &[("city", "Austin"), ("state", "Texas")]);
    assert_eq!(engine.progress(), 100);
    assert_eq!(engine.snapshot().progress.percent, 100);
}

#[tokio::test]
async fn cancel_edit_returns_to_create_mode() {
    let engine = engine_on("userInfo").await;
    submit_user(&engine, "Jane", "Doe");
    engine.begin_edit(0).expect("edit");
    engine.cancel_edit();
    assert_eq!(engine.editing(), EditingState::NotEditing);
    assert!(engine.values().is_empty());

    submit_user(&engine, "John", "Roe");
    assert_eq!(engine.records().len(), 2);
}
