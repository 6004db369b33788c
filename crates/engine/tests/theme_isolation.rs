use arffsplit_engine::UploadWorkflow;
use arffsplit_types::{SelectedFile, SubmissionState};
use arffsplit_util::{ColorScheme, ColorSchemeSignal, ThemePreference};
use tokio::sync::mpsc;

#[tokio::test]
async fn host_scheme_change_leaves_submission_state_alone() {
    let signal = ColorSchemeSignal::new(Some(ColorScheme::Light));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let preference = ThemePreference::subscribe(&signal, move |dark| {
        let _ = tx.send(dark);
    });

    let mut workflow = UploadWorkflow::default();
    let effects = workflow.pick_file(SelectedFile::from_path("notes.txt").unwrap());
    assert!(effects.is_empty());
    let before = workflow.state().clone();
    assert!(matches!(before, SubmissionState::Failed { .. }));

    signal.publish(Some(ColorScheme::Dark));
    assert_eq!(rx.recv().await, Some(true));

    assert!(preference.is_dark());
    assert_eq!(workflow.state(), &before);
    assert_eq!(workflow.artifacts().live_count(), 0);
}

#[tokio::test]
async fn idle_workflow_stays_idle_across_theme_flips() {
    let signal = ColorSchemeSignal::new(None);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let preference = ThemePreference::subscribe(&signal, move |dark| {
        let _ = tx.send(dark);
    });
    let workflow = UploadWorkflow::default();

    for (scheme, dark) in [(ColorScheme::Dark, true), (ColorScheme::Light, false), (ColorScheme::Dark, true)] {
        signal.publish(Some(scheme));
        assert_eq!(rx.recv().await, Some(dark));
        assert_eq!(preference.is_dark(), dark);
        assert_eq!(workflow.state(), &SubmissionState::Idle);
        assert!(!workflow.is_loading());
    }
}
