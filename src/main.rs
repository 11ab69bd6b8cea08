//! notedown - command line front end
//!
//! Loads a markdown file into an in-memory buffer, applies editor actions
//! to it and prints the result.
//!
//! ```text
//! notedown note.md --select 0:0-0:5 -a bold -a heading --in-place
//! notedown note.md -a link --url https://example.com --render
//! ```

use clap::Parser;
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use notedown::config::load_config;
use notedown::controller::{Action, ActionOutcome, DialogRequest, EditorController};
use notedown::editor::{EditorSurface, LineBuffer, Selection};
use notedown::error::{Error, Result};
use notedown::markdown::ComrakRenderer;

#[derive(Parser, Debug)]
#[command(name = "notedown", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Action to apply (bold, italic, strikethrough, heading, link, attachment,
    /// code, hr, list, numberedList, undo, redo); repeatable, applied in order
    #[arg(short, long = "action", value_name = "ACTION")]
    actions: Vec<Action>,

    /// Selection to act on, as LINE:CH or LINE:CH-LINE:CH (zero-based)
    #[arg(long, value_name = "RANGE")]
    select: Option<Selection>,

    /// URL given to the link dialog; without it link actions are cancelled
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Markup given to the attachment dialog
    #[arg(long, value_name = "TEXT")]
    attachment: Option<String>,

    /// Write the result back to FILE instead of printing it
    #[arg(long)]
    in_place: bool,

    /// Print the rendered preview HTML
    #[arg(long)]
    render: bool,

    /// Print the note data (content, tags, tasks) as JSON
    #[arg(long)]
    data: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("notedown: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_config();
    let text = fs::read_to_string(&cli.file)?;
    info!("Loaded {} ({} bytes)", cli.file.display(), text.len());

    let mut buffer = LineBuffer::from_text(&text).with_max_undo(settings.max_undo);
    if let Some(selection) = cli.select {
        buffer.check_pos(selection.start)?;
        buffer.check_pos(selection.end)?;
        buffer.set_selection(selection);
    }

    let renderer = ComrakRenderer::new(settings.markdown.clone());
    let mut controller = EditorController::with_settings(buffer, renderer, &settings)?;

    for &action in &cli.actions {
        let now = Instant::now();
        if let ActionOutcome::AwaitingDialog(request) = controller.run(action, now)? {
            let answer = match request {
                DialogRequest::Link => cli.url.clone(),
                DialogRequest::Attachment => cli.attachment.clone(),
            };
            controller.resolve_dialog(answer, now)?;
        }
    }

    let content = controller.editor().value();
    if cli.in_place {
        fs::write(&cli.file, &content)?;
        info!("Wrote {}", cli.file.display());
    } else {
        println!("{}", content);
    }

    if cli.render {
        println!("{}", controller.html());
    }

    if cli.data {
        let json = serde_json::to_string_pretty(&controller.get_data())
            .map_err(|e| Error::Application(format!("Failed to serialize note data: {}", e)))?;
        println!("{}", json);
    }

    Ok(())
}
