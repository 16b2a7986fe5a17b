// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storyloom CLI entrypoint.
//!
//! Reads editing commands from stdin, one per line, and fires autosave ticks on the configured
//! interval. Type `help` for the command list.

use std::error::Error;
use std::path::PathBuf;

use storyloom::artifact::FsArtifacts;
use storyloom::autosave::{AutosaveOutcome, RecoveryChoice, RecoveryOffer};
use storyloom::config::Settings;
use storyloom::editor::{Editor, OpenOutcome};
use storyloom::model::{Color, EdgeKey, NodeId, Position};
use storyloom::ops::{Delta, Selection};
use storyloom::store::{ProjectStore, WriteDurability};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<project.json>] [--settings <file>] [--durable-writes]\n  {program} [--project <project.json>] [--settings <file>] [--durable-writes]\n\nWithout a project the last opened one is reopened, if any.\n--settings overrides the settings file (default: the platform config directory).\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

const HELP: &str = "\
commands:
  add <x> <y> [summary]            new node
  connect <from> <to> [condition]  new edge
  delete <id>...                   delete nodes and their edges
  unlink <from> <to> [condition]   delete one edge
  move <id> <x> <y>                move a node
  summary <id> <text>              edit a node summary
  condition <from> <to> <old> | <new>
  color <id> <#rrggbb>             change a node color
  doc <id>                         open the linked document
  undo | redo | list | new
  save | save-as <path> | open <path>
  autosave on|off [minutes]
  quit";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    project: Option<String>,
    settings: Option<String>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--project" => {
                if options.project.is_some() {
                    return Err(());
                }
                options.project = Some(args.next().ok_or(())?);
            }
            "--settings" => {
                if options.settings.is_some() {
                    return Err(());
                }
                options.settings = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.project.is_some() {
                    return Err(());
                }
                options.project = Some(arg);
            }
        }
    }

    Ok(options)
}

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Add { position: Position, summary: String },
    Connect(EdgeKey),
    Delete(Vec<NodeId>),
    Unlink(EdgeKey),
    Move { id: NodeId, position: Position },
    Summary { id: NodeId, text: String },
    Condition { key: EdgeKey, text: String },
    Color { id: NodeId, color: Color },
    Doc(NodeId),
    Undo,
    Redo,
    List,
    New,
    Save,
    SaveAs(PathBuf),
    Open(PathBuf),
    Autosave { enabled: bool, minutes: Option<u32> },
    Help,
    Quit,
}

fn parse_id(raw: Option<&str>) -> Result<NodeId, String> {
    let raw = raw.ok_or("missing node id")?;
    raw.parse().map_err(|_| format!("invalid node id `{raw}`"))
}

fn parse_coord(raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.ok_or("missing coordinate")?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("invalid coordinate `{raw}`")),
    }
}

fn report(delta: Option<Delta>) {
    match delta {
        Some(delta) => println!("changed {delta}"),
        None => println!("no change"),
    }
}

/// Splits off `count` whitespace-separated words and returns them with the trimmed rest.
fn split_words(line: &str, count: usize) -> (Vec<&str>, &str) {
    let mut words = Vec::with_capacity(count);
    let mut rest = line.trim_start();
    while words.len() < count && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        words.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    (words, rest.trim_end())
}

fn parse_request(line: &str) -> Result<Option<Request>, String> {
    let (head, rest) = split_words(line, 1);
    let Some(&verb) = head.first() else {
        return Ok(None);
    };

    let request = match verb {
        "add" => {
            let (words, summary) = split_words(rest, 2);
            Request::Add {
                position: Position::new(parse_coord(words.first().copied())?, parse_coord(words.get(1).copied())?),
                summary: summary.to_owned(),
            }
        }
        "connect" | "unlink" => {
            let (words, condition) = split_words(rest, 2);
            let key = EdgeKey::new(
                parse_id(words.first().copied())?,
                parse_id(words.get(1).copied())?,
                condition,
            );
            if verb == "connect" {
                Request::Connect(key)
            } else {
                Request::Unlink(key)
            }
        }
        "delete" => {
            let ids = rest
                .split_whitespace()
                .map(|raw| parse_id(Some(raw)))
                .collect::<Result<Vec<_>, _>>()?;
            if ids.is_empty() {
                return Err("delete needs at least one node id".to_owned());
            }
            Request::Delete(ids)
        }
        "move" => {
            let (words, _) = split_words(rest, 3);
            Request::Move {
                id: parse_id(words.first().copied())?,
                position: Position::new(parse_coord(words.get(1).copied())?, parse_coord(words.get(2).copied())?),
            }
        }
        "summary" => {
            let (words, text) = split_words(rest, 1);
            Request::Summary {
                id: parse_id(words.first().copied())?,
                text: text.to_owned(),
            }
        }
        "condition" => {
            let (words, tail) = split_words(rest, 2);
            let (old, new) = tail
                .split_once('|')
                .ok_or("expected `<old> | <new>`")?;
            Request::Condition {
                key: EdgeKey::new(
                    parse_id(words.first().copied())?,
                    parse_id(words.get(1).copied())?,
                    old.trim(),
                ),
                text: new.trim().to_owned(),
            }
        }
        "color" => {
            let (words, _) = split_words(rest, 2);
            let raw = words.get(1).copied().ok_or("missing color")?;
            Request::Color {
                id: parse_id(words.first().copied())?,
                color: raw.parse::<Color>().map_err(|err| err.to_string())?,
            }
        }
        "doc" => Request::Doc(parse_id(rest.split_whitespace().next())?),
        "undo" => Request::Undo,
        "redo" => Request::Redo,
        "list" => Request::List,
        "new" => Request::New,
        "save" => Request::Save,
        "save-as" | "open" => {
            if rest.is_empty() {
                return Err(format!("{verb} needs a path"));
            }
            let path = PathBuf::from(rest);
            if verb == "open" {
                Request::Open(path)
            } else {
                Request::SaveAs(path)
            }
        }
        "autosave" => {
            let (words, _) = split_words(rest, 2);
            let enabled = match words.first().copied() {
                Some("on") => true,
                Some("off") => false,
                _ => return Err("expected `autosave on|off [minutes]`".to_owned()),
            };
            let minutes = words
                .get(1)
                .map(|raw| raw.parse::<u32>().map_err(|_| format!("invalid minutes `{raw}`")))
                .transpose()?;
            Request::Autosave { enabled, minutes }
        }
        "help" | "?" => Request::Help,
        "quit" | "exit" => Request::Quit,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(request))
}

type StdinLines = Lines<BufReader<Stdin>>;

async fn prompt_recovery(
    offer: &RecoveryOffer,
    lines: &mut StdinLines,
) -> Result<RecoveryChoice, Box<dyn Error>> {
    eprintln!(
        "an autosave of {} was found at {}",
        offer.project_path.display(),
        offer.shadow_path.display()
    );
    loop {
        eprintln!("restore it? [r]estore / [d]iscard / [l]ater");
        let Some(answer) = lines.next_line().await? else {
            return Ok(RecoveryChoice::Defer);
        };
        match answer.trim() {
            "r" | "restore" => return Ok(RecoveryChoice::Restore),
            "d" | "discard" => return Ok(RecoveryChoice::Discard),
            "l" | "later" | "" => return Ok(RecoveryChoice::Defer),
            _ => {}
        }
    }
}

async fn open_with_prompt(
    editor: &mut Editor,
    path: PathBuf,
    lines: &mut StdinLines,
) -> Result<OpenOutcome, Box<dyn Error>> {
    let choice = match editor.autosave().check_recovery(&path) {
        Some(offer) => prompt_recovery(&offer, lines).await?,
        None => RecoveryChoice::Defer,
    };
    Ok(editor.open(path, |_| choice)?)
}

fn autosave_ticker(editor: &Editor) -> Interval {
    let period = editor.autosave().interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn print_graph(editor: &Editor) {
    let graph = editor.graph();
    for node in graph.nodes() {
        let position = node.position();
        println!(
            "node {} ({}, {}) {} {:?} -> {}",
            node.id(),
            position.x,
            position.y,
            node.color(),
            node.summary(),
            node.artifact_path().display()
        );
    }
    for edge in graph.edges() {
        println!("edge {}", edge.key());
    }
    let path = editor
        .project_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<untitled>".to_owned());
    let marker = if editor.is_dirty() { " *" } else { "" };
    println!("{path}{marker}");
}

enum Flow {
    Continue,
    Rearm,
    Quit,
}

async fn handle(
    editor: &mut Editor,
    request: Request,
    lines: &mut StdinLines,
) -> Result<Flow, Box<dyn Error>> {
    match request {
        Request::Add { position, summary } => {
            let id = editor.add_node(&summary, position)?;
            println!("added node {id}");
        }
        Request::Connect(key) => {
            let key = editor.connect(key.from, key.to, &key.condition)?;
            println!("connected {key}");
        }
        Request::Delete(ids) => match editor.delete_selection(&Selection::nodes(ids))? {
            Some(delta) => println!("deleted {delta}"),
            None => println!("nothing to delete"),
        },
        Request::Unlink(key) => {
            match editor.delete_selection(&Selection::default().with_edge(key))? {
                Some(delta) => println!("deleted {delta}"),
                None => println!("no such edge"),
            }
        }
        Request::Move { id, position } => report(editor.move_nodes(None, [(id, position)])?),
        Request::Summary { id, text } => report(editor.update_summary(id, &text)?),
        Request::Condition { key, text } => report(editor.update_condition(&key, &text)?),
        Request::Color { id, color } => report(editor.set_color(id, color)?),
        Request::Doc(id) => editor.open_artifact(id)?,
        Request::Undo => {
            let label = editor.history().undo_label();
            match (label, editor.undo()) {
                (Some(label), Some(delta)) => println!("undid {label} {delta}"),
                _ => println!("nothing to undo"),
            }
        }
        Request::Redo => {
            let label = editor.history().redo_label();
            match (label, editor.redo()) {
                (Some(label), Some(delta)) => println!("redid {label} {delta}"),
                _ => println!("nothing to redo"),
            }
        }
        Request::List => print_graph(editor),
        Request::New => editor.new_project(),
        Request::Save => editor.save()?,
        Request::SaveAs(path) => editor.save_as(path)?,
        Request::Open(path) => match open_with_prompt(editor, path, lines).await? {
            OpenOutcome::Deferred => println!("open deferred"),
            OpenOutcome::Restored => println!("restored from autosave; save to keep it"),
            OpenOutcome::Opened => println!("opened"),
        },
        Request::Autosave { enabled, minutes } => {
            let mut settings = editor.settings().clone();
            settings.autosave_enabled = enabled;
            if let Some(minutes) = minutes {
                settings.autosave_interval_minutes = minutes;
            }
            editor.apply_settings(settings);
            return Ok(Flow::Rearm);
        }
        Request::Help => println!("{HELP}"),
        Request::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn run(mut editor: Editor, project: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match project {
        Some(path) => {
            if let Err(err) = open_with_prompt(&mut editor, path.clone(), &mut lines).await {
                eprintln!("storyloom: could not open {}: {err}", path.display());
            }
        }
        None => {
            let choice = match editor
                .settings()
                .last_project_path
                .as_deref()
                .and_then(|path| editor.autosave().check_recovery(path))
            {
                Some(offer) => prompt_recovery(&offer, &mut lines).await?,
                None => RecoveryChoice::Defer,
            };
            if let Err(err) = editor.startup(|_| choice) {
                eprintln!("storyloom: could not reopen last project: {err}");
            }
        }
    }

    let mut ticker = autosave_ticker(&editor);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let request = match parse_request(&line) {
                    Ok(Some(request)) => request,
                    Ok(None) => continue,
                    Err(message) => {
                        eprintln!("storyloom: {message}");
                        continue;
                    }
                };
                match handle(&mut editor, request, &mut lines).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Rearm) => ticker = autosave_ticker(&editor),
                    Ok(Flow::Quit) => break,
                    Err(err) => eprintln!("storyloom: {err}"),
                }
            }
            _ = ticker.tick() => {
                if let AutosaveOutcome::Written { path, .. } = editor.autosave_tick() {
                    tracing::info!(path = %path.display(), "autosaved");
                }
            }
        }
    }

    if editor.is_dirty() {
        eprintln!("storyloom: exiting with unsaved changes");
    }
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "storyloom".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();

        let settings_path = options
            .settings
            .map(PathBuf::from)
            .or_else(Settings::default_path);
        let settings = match settings_path.as_deref() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let store = if options.durable_writes {
            ProjectStore::new().with_durability(WriteDurability::Durable)
        } else {
            ProjectStore::new()
        };
        let artifacts = FsArtifacts::new(std::env::current_dir()?);
        let editor = Editor::new(artifacts, settings, settings_path).with_store(store);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(run(editor, options.project.map(PathBuf::from)))?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("storyloom: {err}");
        std::process::exit(1);
    }
}
