mod common;

use common::{MockFieldSource, MockOptionSource, init_tracing};
use jobfill_engine::applier::FieldApplier;
use jobfill_engine::applier::classify::WidgetKind;
use jobfill_engine::applier::report::{FieldStatus, ResumeOutcome};
use jobfill_engine::config::JobfillConfig;
use jobfill_engine::dom::DomEvent;
use jobfill_engine::memory::MemoryPage;
use jobfill_engine::protocol::{FieldInstruction, FieldInstructionSet};

const APPLICATION: &str = r#"
<html><body>
  <form id="application">
    <input id="first" type="text">
    <input id="email" type="EMAIL">
    <input id="phone" type="tel">
    <input id="plain">
    <textarea id="cover"></textarea>
    <input id="agree" type="checkbox">
    <input id="sponsor-yes" type="radio" name="sponsor" checked>
    <input id="sponsor-no" type="radio" name="sponsor">
    <select id="degree">
      <option value="">Select...</option>
      <option value="bs">Bachelor's</option>
      <option value="ms">Master's</option>
      <option value="Master's">Other master's</option>
    </select>
    <select id="skills" multiple>
      <option value="a">Alpha</option>
      <option value="b">Beta</option>
      <option value="c" selected>Gamma</option>
    </select>
    <input id="start" type="date">
    <div id="note">Tell us about you</div>
  </form>
</body></html>
"#;

const WITH_FILE_INPUT: &str = r#"
<html><body>
  <input id="first" type="text">
  <input id="resume" type="file" name="resume">
</body></html>
"#;

fn page(html: &str) -> MemoryPage {
    MemoryPage::new("https://boards.greenhouse.io/acme/jobs/1", html)
}

fn set(fields: Vec<FieldInstruction>) -> FieldInstructionSet {
    FieldInstructionSet::new(fields)
}

#[tokio::test]
async fn text_input_gets_value_and_one_input_event() {
    init_tracing();
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(&mut page, &set(vec![FieldInstruction::new("#first", "Jane")]))
        .await;

    assert_eq!(page.value("#first").as_deref(), Some("Jane"));
    assert_eq!(page.events_for("#first"), vec![DomEvent::Input]);
    assert_eq!(report.applied(), 1);
    assert_eq!(
        report.status_of("#first"),
        Some(&FieldStatus::Applied {
            widget: WidgetKind::TextLike
        })
    );
}

#[tokio::test]
async fn text_like_variants_and_textarea() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![
                FieldInstruction::new("#email", "jane@example.com"),
                FieldInstruction::new("#phone", "+1 555 0100"),
                FieldInstruction::new("#plain", "no type attribute"),
                FieldInstruction::new("#cover", "Dear hiring team"),
            ]),
        )
        .await;

    assert_eq!(report.applied(), 4);
    assert_eq!(page.value("#email").as_deref(), Some("jane@example.com"));
    assert_eq!(page.value("#phone").as_deref(), Some("+1 555 0100"));
    assert_eq!(page.value("#plain").as_deref(), Some("no type attribute"));
    assert_eq!(page.value("#cover").as_deref(), Some("Dear hiring team"));
    assert_eq!(page.events_for("#cover"), vec![DomEvent::Input]);
    assert_eq!(
        report.status_of("#cover"),
        Some(&FieldStatus::Applied {
            widget: WidgetKind::TextArea
        })
    );
}

#[tokio::test]
async fn checkboxes_and_radios_use_truthiness() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    applier
        .apply_fields(
            &mut page,
            &set(vec![
                FieldInstruction::new("#agree", true),
                FieldInstruction::new("#sponsor-no", "yes"),
            ]),
        )
        .await;

    assert_eq!(page.is_checked("#agree"), Some(true));
    assert_eq!(page.is_checked("#sponsor-no"), Some(true));
    assert_eq!(page.is_checked("#sponsor-yes"), Some(false));
    assert_eq!(page.events_for("#agree"), vec![DomEvent::Change]);

    applier
        .apply_fields(&mut page, &set(vec![FieldInstruction::new("#agree", "")]))
        .await;
    assert_eq!(page.is_checked("#agree"), Some(false));
}

#[tokio::test]
async fn single_select_matches_value_or_text_first_in_document_order() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);

    let mut by_value = page(APPLICATION);
    applier
        .apply_fields(&mut by_value, &set(vec![FieldInstruction::new("#degree", "bs")]))
        .await;
    assert_eq!(by_value.value("#degree").as_deref(), Some("bs"));
    assert_eq!(by_value.events_for("#degree"), vec![DomEvent::Change]);

    // "Master's" is the text of option 3 and the value of option 4; option 3 wins.
    let mut by_text = page(APPLICATION);
    applier
        .apply_fields(
            &mut by_text,
            &set(vec![FieldInstruction::new("#degree", "Master's")]),
        )
        .await;
    assert_eq!(by_text.value("#degree").as_deref(), Some("ms"));
}

#[tokio::test]
async fn single_select_without_match_is_left_alone() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![FieldInstruction::new("#degree", "bachelor's")]),
        )
        .await;

    assert_eq!(page.value("#degree").as_deref(), Some(""));
    assert!(page.events_for("#degree").is_empty());
    assert_eq!(report.unmatched(), 1);
    assert_eq!(
        report.status_of("#degree"),
        Some(&FieldStatus::Unmatched {
            widget: WidgetKind::NativeSelect,
            wanted: "bachelor's".into()
        })
    );
}

#[tokio::test]
async fn multi_select_unions_text_and_value_matches() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![FieldInstruction::new("#skills", "Alpha, b")]),
        )
        .await;

    assert_eq!(page.selected_values("#skills"), vec!["a", "b"]);
    assert_eq!(page.events_for("#skills"), vec![DomEvent::Change]);
    assert_eq!(
        report.status_of("#skills"),
        Some(&FieldStatus::Applied {
            widget: WidgetKind::NativeMultiSelect
        })
    );
}

#[tokio::test]
async fn multi_select_without_any_match_keeps_selection() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![FieldInstruction::new("#skills", "Delta, , Epsilon")]),
        )
        .await;

    assert_eq!(page.selected_values("#skills"), vec!["c"]);
    assert!(page.events_for("#skills").is_empty());
    assert_eq!(report.unmatched(), 1);
}

#[tokio::test]
async fn misses_and_unhandled_elements_do_not_stop_the_batch() {
    init_tracing();
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![
                FieldInstruction::new("#does-not-exist", "x"),
                FieldInstruction::new("#note", "x"),
                FieldInstruction::new("#start", "2025-01-01"),
                FieldInstruction::new("input[", "x"),
                FieldInstruction::new("#first", "Jane"),
            ]),
        )
        .await;

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.missing(), 1);
    assert_eq!(report.unhandled(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.applied(), 1);
    assert_eq!(report.skipped(), 4);
    assert_eq!(
        report.status_of("#note"),
        Some(&FieldStatus::Unhandled { tag: "div".into() })
    );
    assert_eq!(page.value("#first").as_deref(), Some("Jane"));
    assert!(page.events_for("#note").is_empty());
}

#[tokio::test]
async fn instructions_apply_in_delivery_order() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(
            &mut page,
            &set(vec![
                FieldInstruction::new("#cover", "first"),
                FieldInstruction::new("#agree", true),
                FieldInstruction::new("#first", "Jane"),
                FieldInstruction::new("#first", "Janet"),
            ]),
        )
        .await;

    let order: Vec<&str> = page.events().iter().map(|e| e.selector.as_str()).collect();
    assert_eq!(order, vec!["#cover", "#agree", "#first", "#first"]);
    let reported: Vec<&str> = report.outcomes.iter().map(|o| o.selector.as_str()).collect();
    assert_eq!(reported, vec!["#cover", "#agree", "#first", "#first"]);
    assert_eq!(page.value("#first").as_deref(), Some("Janet"));
}

#[tokio::test]
async fn resume_is_not_fetched_without_file_input() {
    let config = JobfillConfig::default();
    let options = MockOptionSource::numbered(0);
    let resumes = MockFieldSource::with_resume(b"%PDF-1.7");
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    let report = applier
        .apply_fields(&mut page, &set(vec![FieldInstruction::new("#first", "Jane")]))
        .await;

    assert_eq!(report.resume, ResumeOutcome::NotPresent);
    assert_eq!(resumes.resume_calls(), 0);
}

#[tokio::test]
async fn resume_is_attached_once_even_with_no_instructions() {
    let config = JobfillConfig::default();
    let options = MockOptionSource::numbered(0);
    let resumes = MockFieldSource::with_resume(b"%PDF-1.7 resume");
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(WITH_FILE_INPUT);

    let report = applier.apply_fields(&mut page, &set(vec![])).await;

    assert_eq!(report.resume, ResumeOutcome::Attached { bytes: 15 });
    assert_eq!(resumes.resume_calls(), 1);
    let files = page.files("input[type=\"file\"]");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "resume.pdf");
    assert_eq!(files[0].content_type, "application/pdf");
    assert_eq!(files[0].bytes, b"%PDF-1.7 resume".to_vec());
    assert_eq!(
        page.events_for("input[type=\"file\"]"),
        vec![DomEvent::Change]
    );
}

#[tokio::test]
async fn failed_resume_download_leaves_input_untouched() {
    let config = JobfillConfig::default();
    let options = MockOptionSource::numbered(0);
    let resumes = MockFieldSource::default();
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(WITH_FILE_INPUT);

    let report = applier
        .apply_fields(&mut page, &set(vec![FieldInstruction::new("#first", "Jane")]))
        .await;

    assert!(matches!(report.resume, ResumeOutcome::Failed { .. }));
    assert_eq!(report.applied(), 1);
    assert!(page.files("#resume").is_empty());
    assert!(page.events_for("input[type=\"file\"]").is_empty());
}

#[tokio::test]
async fn disabled_resume_upload_skips_download() {
    let mut config = JobfillConfig::default();
    config.resume.enabled = false;
    let options = MockOptionSource::numbered(0);
    let resumes = MockFieldSource::with_resume(b"%PDF");
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(WITH_FILE_INPUT);

    let report = applier.apply_fields(&mut page, &set(vec![])).await;

    assert_eq!(report.resume, ResumeOutcome::Disabled);
    assert_eq!(resumes.resume_calls(), 0);
}

#[tokio::test]
async fn boolean_value_in_text_input_is_stringified() {
    let config = JobfillConfig::default();
    let (options, resumes) = (MockOptionSource::numbered(0), MockFieldSource::default());
    let applier = FieldApplier::new(&options, &resumes, &config);
    let mut page = page(APPLICATION);

    applier
        .apply_fields(&mut page, &set(vec![FieldInstruction::new("#first", false)]))
        .await;

    assert_eq!(page.value("#first").as_deref(), Some("false"));
}
