use std::{
    env,
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use crossterm::event::{
    self,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    format_file_size,
    MatchKind,
    ScanEngine,
    ScanOptions,
};
use ratatui::layout::{
    Constraint,
    Layout,
};
use tui_logger::Drain;
use ui::{
    AppView,
    TuiAppLoggerWidget,
};

use crate::args::Args;

mod args;
mod term;
mod ui;
mod utils;

fn resolve_roots(roots: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if roots.is_empty() {
        return Ok(vec![dunce::canonicalize(env::current_dir()?)?]);
    }

    let mut result = Vec::with_capacity(roots.len());
    for root in roots {
        match dunce::canonicalize(root) {
            Ok(path) => result.push(path),
            /* let the engine report the precondition failure */
            Err(_) => result.push(root.clone()),
        }
    }

    Ok(result)
}

fn print_targets(engine: &ScanEngine, roots: Vec<PathBuf>, include_sizes: bool) {
    let options = ScanOptions {
        include_sizes,
        ..Default::default()
    };

    let mut count = 0;
    let mut size_total = 0;
    for target in engine.scan(roots, options) {
        let kind = match target.kind() {
            MatchKind::Folder => "FOLDER",
            MatchKind::File => "file",
        };

        println!(
            "{:<6} {:>10}  {}  [{}]",
            kind,
            format_file_size(target.size_bytes()),
            target.path().display(),
            target.matched_pattern()
        );

        count += 1;
        size_total += target.size_bytes();
    }

    println!("{} targets, {} total", count, format_file_size(size_total));
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.ui_logger && !args.list {
        let tui_log_drain = Drain::new();
        env_logger::builder()
            .format(move |_buf, record| Ok(tui_log_drain.log(record)))
            .init();
    } else {
        env_logger::init();
    }

    let roots = resolve_roots(&args.root)?;
    for root in &roots {
        log::debug!("Root path: {}", root.display());
    }

    let engine = match ScanEngine::validate_roots(&roots)
        .and_then(|_| ScanEngine::new(args.patterns()))
    {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("Invalid arguments: {:#}", err);
            return Ok(());
        }
    };

    let include_sizes = !args.no_sizes;
    if args.list {
        print_targets(&engine, roots, include_sizes);
        return Ok(());
    }

    let mut terminal = term::setup()?;
    let mut view = AppView::new(&engine, roots, include_sizes, args.dry_run);

    loop {
        terminal.draw(|frame| {
            if args.ui_logger {
                let layout =
                    Layout::horizontal(&[Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(frame.size());

                frame.render_widget(&view, layout[0]);
                frame.render_widget(TuiAppLoggerWidget, layout[1]);
            } else {
                frame.render_widget(&view, frame.size());
            }
        })?;

        view.poll();

        if event::poll(Duration::from_millis(16))? {
            let event = event::read()?;
            view.handle_event(&event);
            if let event::Event::Key(key) = event {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    if view.can_quit() {
                        break;
                    }

                    log::info!("Sweep in progress, press Esc to cancel it before quitting");
                }
            }
        }
    }

    Ok(())
}
