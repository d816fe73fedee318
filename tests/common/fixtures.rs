//! Upload payloads and configuration fixtures

use moneyball_pipeline::config::ScriptSource;
use moneyball_pipeline::{Config, FileHandle, Orchestrator, Role, UploadBatch};
use tempfile::TempDir;

/// Column headings of a player export
pub const HEADINGS: [&str; 6] = ["Name", "Position", "Age", "Club", "Value", "Wage"];

/// Build a player-table export of roughly `target_bytes` bytes
pub fn player_export(label: &str, target_bytes: usize) -> String {
    let mut html = format!(
        "<html>\n<head><title>{label}</title></head>\n<body>\n<table>\n<thead><tr>"
    );
    for heading in HEADINGS {
        html.push_str(&format!("<th>{heading}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    let footer = "</tbody>\n</table>\n</body>\n</html>\n";
    let mut row = 0;
    while html.len() + footer.len() < target_bytes {
        html.push_str(&format!(
            "<tr><td>Player {row}</td><td>AM (C)</td><td>{}</td><td>{label} FC</td><td>£{}K</td><td>£{}K p/w</td></tr>\n",
            18 + row % 17,
            100 + row,
            5 + row % 40
        ));
        row += 1;
    }
    html.push_str(footer);
    html
}

/// Config whose processing script is a temp file
///
/// Keep the returned directory alive for the duration of the test.
pub fn test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let script = temp_dir.path().join("fm_processor.py");
    std::fs::write(
        &script,
        "def main(signed_html, loans_html, universal_html):\n    return b''\n",
    )
    .expect("write script");

    let mut config = Config::default();
    config.engine.script = ScriptSource::Path(script);
    (config, temp_dir)
}

/// A batch holding three valid exports of the given size
pub fn complete_batch(orchestrator: &Orchestrator, size: usize) -> UploadBatch {
    let mut batch = orchestrator.new_batch();
    for role in Role::ALL {
        let file = FileHandle::from_text(format!("{role}.html"), player_export(role.label(), size));
        let violations = batch.assign(role, file);
        assert!(violations.is_empty(), "{role}: {violations:?}");
    }
    batch
}
