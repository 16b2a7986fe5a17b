// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::Path;

use serde_json::Value;
use storyloom::artifact::FsArtifacts;
use storyloom::autosave::{shadow_path, AutosaveOutcome, RecoveryChoice};
use storyloom::config::Settings;
use storyloom::editor::{Editor, OpenOutcome};
use storyloom::model::{NodeId, Position};
use storyloom::ops::Selection;

fn editor_in(dir: &Path) -> Editor {
    let settings_path = dir.join("settings.toml");
    let settings = Settings::load(&settings_path).expect("settings");
    Editor::new(FsArtifacts::new(dir), settings, Some(settings_path))
}

#[test]
fn session_writes_project_documents_and_reopens() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let project = tmp.path().join("castle.json");

    let mut editor = editor_in(tmp.path());
    let gate = editor.add_node("The Gate", Position::new(0.0, 0.0)).expect("add");
    let hall = editor.add_node("Great Hall", Position::new(200.0, 40.0)).expect("add");
    editor.connect(gate, hall, "has the key").expect("connect");
    editor.save_as(&project).expect("save");

    let doc = fs::read_to_string(tmp.path().join("docs/node_1.md")).expect("placeholder");
    assert_eq!(doc, "# The Gate\n");

    let json: Value = serde_json::from_slice(&fs::read(&project).expect("read")).expect("json");
    assert_eq!(json["nodes"][1]["summary"], "Great Hall");
    assert_eq!(json["nodes"][1]["doc"], "docs/node_2.md");
    assert_eq!(json["edges"][0]["condition"], "has the key");

    let mut reopened = editor_in(tmp.path());
    let outcome = reopened
        .startup(|_| RecoveryChoice::Defer)
        .expect("startup");
    assert_eq!(outcome, Some(OpenOutcome::Opened));
    assert_eq!(reopened.graph(), editor.graph());
    assert_eq!(reopened.next_node_id(), NodeId::new(3));
}

#[test]
fn existing_documents_survive_reload() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let project = tmp.path().join("castle.json");

    let mut editor = editor_in(tmp.path());
    editor.add_node("The Gate", Position::default()).expect("add");
    editor.save_as(&project).expect("save");
    let doc = tmp.path().join("docs/node_1.md");
    fs::write(&doc, "# The Gate\n\nThe portcullis is down.\n").expect("write scene");

    let mut reopened = editor_in(tmp.path());
    reopened.open(&project, |_| RecoveryChoice::Defer).expect("open");
    assert!(fs::read_to_string(&doc).expect("scene").contains("portcullis"));
}

#[test]
fn crash_after_autosave_is_recoverable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let project = tmp.path().join("castle.json");

    let mut editor = editor_in(tmp.path());
    let gate = editor.add_node("The Gate", Position::default()).expect("add");
    editor.save_as(&project).expect("save");
    let yard = editor.add_node("Courtyard", Position::new(150.0, 0.0)).expect("add");
    editor.connect(gate, yard, "").expect("connect");
    assert!(matches!(editor.autosave_tick(), AutosaveOutcome::Written { .. }));
    drop(editor);

    let mut recovered = editor_in(tmp.path());
    let outcome = recovered
        .startup(|offer| {
            assert_eq!(offer.project_path, project);
            assert!(offer.project_exists);
            RecoveryChoice::Restore
        })
        .expect("startup");
    assert_eq!(outcome, Some(OpenOutcome::Restored));
    assert_eq!(recovered.graph().edge_count(), 1);
    assert!(recovered.is_dirty());

    recovered
        .delete_selection(&Selection::nodes([yard]))
        .expect("delete");
    recovered.save().expect("save");
    assert!(!shadow_path(&project).exists());
    assert!(!recovered.is_dirty());

    let mut fresh = editor_in(tmp.path());
    fresh.open(&project, |_| panic!("shadow was consumed")).expect("open");
    assert_eq!(fresh.graph().node_count(), 1);
    assert_eq!(fresh.graph().edge_count(), 0);
}
