// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::engine::{EngineRuntime, TransformEngine, TransformInputs};
use crate::error::ErrorKind;
use crate::types::{EnvironmentStep, Stage};
use crate::upload::FileHandle;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Scripted engine behavior for one test
#[derive(Clone)]
struct StubLauncher {
    fail_at: Option<EnvironmentStep>,
    output: std::result::Result<Vec<u8>, String>,
    gate: Option<Arc<Notify>>,
    boots: Arc<AtomicU32>,
    seen: Arc<Mutex<Option<TransformInputs>>>,
}

impl StubLauncher {
    fn returning(bytes: &[u8]) -> Self {
        Self {
            fail_at: None,
            output: Ok(bytes.to_vec()),
            gate: None,
            boots: Arc::new(AtomicU32::new(0)),
            seen: Arc::new(Mutex::new(None)),
        }
    }

    fn failing_transform(reason: &str) -> Self {
        Self {
            output: Err(reason.to_string()),
            ..Self::returning(b"")
        }
    }

    fn failing_at(step: EnvironmentStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::returning(b"unused")
        }
    }

    fn fail_if(&self, step: EnvironmentStep) -> crate::Result<()> {
        if self.fail_at == Some(step) {
            Err(Error::ExternalTool(format!("stub failure at {step}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EngineLauncher for StubLauncher {
    async fn boot(&self) -> crate::Result<Box<dyn EngineRuntime>> {
        self.boots.fetch_add(1, Ordering::SeqCst);
        self.fail_if(EnvironmentStep::Boot)?;
        Ok(Box::new(self.clone()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[async_trait]
impl EngineRuntime for StubLauncher {
    async fn load_packages(&mut self, _packages: &[String]) -> crate::Result<()> {
        self.fail_if(EnvironmentStep::LoadPackages)
    }

    async fn install_packages(&mut self, _packages: &[String]) -> crate::Result<()> {
        self.fail_if(EnvironmentStep::InstallPackages)
    }

    async fn load_script(&mut self, source: &str) -> crate::Result<()> {
        assert!(source.contains("def main"));
        self.fail_if(EnvironmentStep::LoadScript)
    }

    fn into_engine(self: Box<Self>) -> crate::Result<Box<dyn TransformEngine>> {
        Ok(self)
    }
}

#[async_trait]
impl TransformEngine for StubLauncher {
    async fn transform(&self, inputs: TransformInputs) -> crate::Result<Vec<u8>> {
        *self.seen.lock().unwrap() = Some(inputs);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.output
            .clone()
            .map_err(|reason| Error::Transform { reason })
    }
}

fn export(label: &str) -> String {
    let mut html = format!(
        "<html><body><h1>{label}</h1><table><tr><th>Name</th><th>Position</th><th>Age</th><th>Club</th></tr>"
    );
    while html.len() < 6000 {
        html.push_str("<tr><td>J. Doe</td><td>D (C)</td><td>24</td><td>Example FC</td></tr>");
    }
    html.push_str("</table></body></html>");
    html
}

fn test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("fm_processor.py");
    std::fs::write(&script, "def main(signed, loans, universal):\n    return b''\n").unwrap();

    let mut config = Config::default();
    config.engine.script = crate::config::ScriptSource::Path(script);
    (config, temp_dir)
}

fn complete_batch(orchestrator: &Orchestrator) -> UploadBatch {
    let mut batch = orchestrator.new_batch();
    for role in Role::ALL {
        let violations = batch.assign(
            role,
            FileHandle::from_text(format!("{role}.html"), export(role.label())),
        );
        assert!(violations.is_empty(), "{role}: {violations:?}");
    }
    batch
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn percents_for(events: &[Event], wanted: Stage) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { stage, percent, .. } if *stage == wanted => Some(*percent),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn successful_session_produces_artifact() {
    let (config, _temp_dir) = test_config();
    let launcher = StubLauncher::returning(b"PK\x03\x04spreadsheet");
    let orchestrator = Orchestrator::new(config, Arc::new(launcher.clone())).unwrap();
    let batch = complete_batch(&orchestrator);

    let session = orchestrator.submit(&batch).await.unwrap();

    assert!(session.is_success());
    assert_eq!(session.stage(), Stage::Finalize);
    assert_eq!(session.progress_percent(), 100);
    assert!(session.error().is_none());
    assert_eq!(
        session.completed_stages().iter().copied().collect::<Vec<_>>(),
        Stage::PIPELINE.to_vec()
    );
    let artifact = session.artifact().unwrap();
    assert_eq!(artifact.file_name(), "FM24_Moneyball_Analysis.xlsx");
    assert_eq!(artifact.bytes(), b"PK\x03\x04spreadsheet");
}

#[tokio::test]
async fn engine_receives_texts_in_role_order() {
    let (config, _temp_dir) = test_config();
    let launcher = StubLauncher::returning(b"xlsx");
    let orchestrator = Orchestrator::new(config, Arc::new(launcher.clone())).unwrap();
    let batch = complete_batch(&orchestrator);

    orchestrator.submit(&batch).await.unwrap();

    let seen = launcher.seen.lock().unwrap().clone().unwrap();
    assert!(seen.primary.contains("<h1>primary</h1>"));
    assert!(seen.secondary.contains("<h1>secondary</h1>"));
    assert!(seen.universal.contains("<h1>universal</h1>"));
}

#[tokio::test]
async fn progress_milestones_per_stage() {
    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(config, Arc::new(StubLauncher::returning(b"x"))).unwrap();
    let mut rx = orchestrator.subscribe();
    let batch = complete_batch(&orchestrator);

    orchestrator.submit(&batch).await.unwrap();
    let events = drain(&mut rx);

    assert_eq!(percents_for(&events, Stage::EnvironmentInit), vec![10, 30, 60, 90, 100]);
    assert_eq!(percents_for(&events, Stage::Ingest), vec![0, 33, 66, 100]);
    assert_eq!(percents_for(&events, Stage::Transform), vec![0, 90]);
    assert_eq!(percents_for(&events, Stage::Finalize), vec![100]);

    let completions: Vec<Stage> = events
        .iter()
        .filter_map(|e| match e {
            Event::StageComplete { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(completions, Stage::PIPELINE.to_vec());

    assert!(matches!(events.first(), Some(Event::SessionStarted { .. })));
    assert!(matches!(
        events.last(),
        Some(Event::Complete { size_bytes: 1, .. })
    ));
}

#[tokio::test]
async fn stage_completes_before_next_stage_starts() {
    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(config, Arc::new(StubLauncher::returning(b"x"))).unwrap();
    let mut rx = orchestrator.subscribe();
    let batch = complete_batch(&orchestrator);

    orchestrator.submit(&batch).await.unwrap();
    let events = drain(&mut rx);

    let position = |wanted: &Event| events.iter().position(|e| e == wanted).unwrap();
    let session = SessionId(1);
    for pair in Stage::PIPELINE.windows(2) {
        let completed = position(&Event::StageComplete {
            session,
            stage: pair[0],
        });
        let started = position(&Event::StageStarted {
            session,
            stage: pair[1],
        });
        assert!(completed < started, "{:?} must complete before {:?} starts", pair[0], pair[1]);
    }
}

#[tokio::test]
async fn incomplete_batch_is_rejected_without_session() {
    let (config, _temp_dir) = test_config();
    let launcher = StubLauncher::returning(b"x");
    let orchestrator = Orchestrator::new(config, Arc::new(launcher.clone())).unwrap();
    let mut rx = orchestrator.subscribe();

    let mut batch = complete_batch(&orchestrator);
    batch.clear(Role::Secondary);

    match orchestrator.submit(&batch).await {
        Err(Error::IncompleteBatch { missing }) => assert_eq!(missing, vec![Role::Secondary]),
        other => panic!("expected IncompleteBatch, got {:?}", other.map(|s| s.stage())),
    }
    assert_eq!(launcher.boots.load(Ordering::SeqCst), 0);
    assert!(drain(&mut rx).is_empty());
    assert_eq!(orchestrator.watch_progress().borrow().session, None);
}

#[tokio::test]
async fn each_environment_step_failure_is_environment_kind() {
    for step in [
        EnvironmentStep::Boot,
        EnvironmentStep::LoadPackages,
        EnvironmentStep::InstallPackages,
        EnvironmentStep::LoadScript,
    ] {
        let (config, _temp_dir) = test_config();
        let orchestrator =
            Orchestrator::new(config, Arc::new(StubLauncher::failing_at(step))).unwrap();
        let batch = complete_batch(&orchestrator);

        let session = orchestrator.submit(&batch).await.unwrap();

        assert_eq!(session.stage(), Stage::Failed);
        assert_eq!(session.progress_percent(), 0);
        assert!(session.artifact().is_none());
        assert!(session.completed_stages().is_empty());
        let error = session.error().unwrap();
        assert_eq!(error.kind, ErrorKind::Environment, "step {step}");
        assert_eq!(
            error.details.as_ref().unwrap()["step"],
            serde_json::to_value(step).unwrap()
        );
    }
}

#[tokio::test]
async fn missing_script_fails_environment_stage() {
    let mut config = Config::default();
    config.engine.script =
        crate::config::ScriptSource::Path("/nonexistent/scripts/fm_processor.py".into());
    let orchestrator = Orchestrator::new(config, Arc::new(StubLauncher::returning(b"x"))).unwrap();
    let batch = complete_batch(&orchestrator);

    let session = orchestrator.submit(&batch).await.unwrap();

    let error = session.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Environment);
    assert_eq!(error.details.as_ref().unwrap()["step"], "load_script");
}

#[tokio::test]
async fn unreadable_file_fails_ingest_with_validation_kind() {
    struct Vanishing;

    #[async_trait]
    impl crate::upload::ContentSource for Vanishing {
        async fn read_text(&self) -> crate::Result<String> {
            Err(Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound)))
        }
    }

    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(config, Arc::new(StubLauncher::returning(b"x"))).unwrap();
    let mut rx = orchestrator.subscribe();
    let mut batch = complete_batch(&orchestrator);
    batch.assign(
        Role::Universal,
        FileHandle::new("universal.html", 8000, Arc::new(Vanishing)),
    );

    let session = orchestrator.submit(&batch).await.unwrap();

    let error = session.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Validation);
    assert_eq!(error.details.as_ref().unwrap()["role"], "universal");
    assert_eq!(
        session.completed_stages().iter().copied().collect::<Vec<_>>(),
        vec![Stage::EnvironmentInit]
    );

    let failed = drain(&mut rx)
        .into_iter()
        .find(|e| matches!(e, Event::Failed { .. }))
        .unwrap();
    assert!(matches!(
        failed,
        Event::Failed {
            stage: Stage::Ingest,
            kind: ErrorKind::Validation,
            ..
        }
    ));
}

#[tokio::test]
async fn engine_error_is_transformation_kind_with_raw_reason() {
    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(
        config,
        Arc::new(StubLauncher::failing_transform("processing failed: KeyError 'Club'")),
    )
    .unwrap();
    let batch = complete_batch(&orchestrator);

    let session = orchestrator.submit(&batch).await.unwrap();

    assert_eq!(session.stage(), Stage::Failed);
    let error = session.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Transformation);
    assert_eq!(
        error.details.as_ref().unwrap()["reason"],
        "processing failed: KeyError 'Club'"
    );
    assert_eq!(
        session.recovery_action(),
        Some(crate::error::RESTART_SUBMISSION)
    );
}

#[tokio::test]
async fn failed_engine_call_skips_near_completion_marker() {
    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(
        config,
        Arc::new(StubLauncher::failing_transform("processing failed")),
    )
    .unwrap();
    let mut rx = orchestrator.subscribe();
    let batch = complete_batch(&orchestrator);

    orchestrator.submit(&batch).await.unwrap();
    let events = drain(&mut rx);

    assert_eq!(percents_for(&events, Stage::Transform), vec![0]);
    assert!(matches!(
        events.last(),
        Some(Event::Failed {
            stage: Stage::Transform,
            ..
        })
    ));
}

#[tokio::test]
async fn empty_engine_output_fails_transform() {
    let (config, _temp_dir) = test_config();
    let orchestrator = Orchestrator::new(config, Arc::new(StubLauncher::returning(b""))).unwrap();
    let batch = complete_batch(&orchestrator);

    let session = orchestrator.submit(&batch).await.unwrap();

    assert_eq!(session.error().unwrap().kind, ErrorKind::Transformation);
    assert!(session.artifact().is_none());
    assert!(!session.completed_stages().contains(&Stage::Transform));
}

#[tokio::test]
async fn resubmission_starts_fresh_with_new_engine() {
    let (config, _temp_dir) = test_config();
    let launcher = StubLauncher::returning(b"x");
    let orchestrator = Orchestrator::new(config, Arc::new(launcher.clone())).unwrap();
    let batch = complete_batch(&orchestrator);

    let first = orchestrator.submit(&batch).await.unwrap();
    let second = orchestrator.submit(&batch).await.unwrap();

    assert_eq!(first.id(), SessionId(1));
    assert_eq!(second.id(), SessionId(2));
    assert_eq!(launcher.boots.load(Ordering::SeqCst), 2);
    assert_eq!(orchestrator.watch_progress().borrow().session, Some(SessionId(2)));
}

#[tokio::test]
async fn abandoned_session_publishes_nothing_further() {
    let (config, _temp_dir) = test_config();
    let gate = Arc::new(Notify::new());
    let launcher = StubLauncher {
        gate: Some(gate.clone()),
        ..StubLauncher::returning(b"x")
    };
    let orchestrator = Arc::new(Orchestrator::new(config, Arc::new(launcher)).unwrap());
    let batch = complete_batch(&orchestrator);
    let mut progress = orchestrator.watch_progress();

    let task = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.submit(&batch).await })
    };

    // wait until the engine call is in flight
    progress
        .wait_for(|s| s.stage == Some(Stage::Transform))
        .await
        .unwrap();
    let mut rx = orchestrator.subscribe();

    orchestrator.abandon();
    gate.notify_one();

    match task.await.unwrap() {
        Err(Error::SessionAbandoned { session }) => assert_eq!(session, SessionId(1)),
        other => panic!("expected SessionAbandoned, got {:?}", other.map(|s| s.stage())),
    }
    assert!(drain(&mut rx).is_empty());
    assert_eq!(progress.borrow().stage, Some(Stage::Transform));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.event_capacity = 0;
    let result = Orchestrator::new(config, Arc::new(StubLauncher::returning(b"x")));
    assert!(matches!(result, Err(Error::Config { .. })));
}
