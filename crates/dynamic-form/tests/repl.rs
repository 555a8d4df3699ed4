use std::time::Duration;

use dynamic_form::cmd::run::{RunArgs, run_session};
use form_engine::{FormEngine, MockSchemaProvider};

async fn session(script: &str) -> (FormEngine, String) {
    let engine =
        FormEngine::with_provider(MockSchemaProvider::default().with_latency(Duration::ZERO));
    let args = RunArgs {
        form_type: None,
        quiet: true,
    };
    let mut out = Vec::new();
    run_session(&engine, &args, script.as_bytes(), &mut out)
        .await
        .expect("session");
    (engine, String::from_utf8(out).expect("utf8"))
}

#[tokio::test(start_paused = true)]
async fn create_edit_and_delete() {
    let (engine, out) = session(
        "type userInfo
set firstName Jane
set lastName Doe
submit
set firstName John
set lastName Roe
submit
edit 0
set lastName Smith
submit
delete 1
quit
set firstName ignored
",
    )
    .await;

    assert!(out.contains("[ok] Form submitted successfully!"));
    assert!(out.contains("[ok] Changes saved successfully!"));
    assert!(out.contains("[ok] Entry deleted successfully!"));
    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("lastName"), Some("Smith"));
    assert!(engine.values().is_empty());
}

#[tokio::test(start_paused = true)]
async fn errors_are_reported_and_the_session_continues() {
    let (engine, out) = session(
        "type userInfo
set street Main
edit 3
bogus
submit
",
    )
    .await;

    assert!(out.contains("error: field 'street' is not part of the active form"));
    assert!(out.contains("error: record index 3 is out of range (0 records)"));
    assert!(out.contains("error: unknown command `bogus`"));
    assert!(out.contains("     ! First Name is required"));
    assert_eq!(engine.active_form_type().as_deref(), Some("userInfo"));
}

#[tokio::test(start_paused = true)]
async fn records_survive_switching_forms() {
    let (engine, out) = session(
        "type userInfo
set firstName Jane
set lastName Doe
submit
type addressInfo
type none
type userInfo
show
",
    )
    .await;

    assert!(out.contains("No form type selected."));
    assert!(out.contains(" [0] firstName=Jane, lastName=Doe"));
    assert_eq!(engine.records().len(), 1);
}
