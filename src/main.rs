//! `qrshare` terminal shell.
//!
//! Every stdin line replaces the input text. `:tap` shares the current image, `:dismiss`
//! closes the status message and `:quit` exits.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use qrshare::config::Config;
use qrshare::export::{FileExportSink, ShareRequest, ShareSink};
use qrshare::helper::to_terminal_string;
use qrshare::logging::{init_logging, LogConfig};
use qrshare::qrcode::QrEncoder;
use qrshare::session::{Session, UiEvent, View};

#[derive(Debug, Parser)]
#[command(name = "qrshare", version, about = "Type text, get a QR code, share it as PNG")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory exported images are written under (overrides the config file).
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prints share requests instead of opening a platform chooser.
struct StdoutShare;

impl ShareSink for StdoutShare {
    fn share(&self, request: &ShareRequest) {
        println!(
            "[{}] {} ({}) \"{}\"",
            request.chooser_title,
            request.artifact.uri(),
            request.mime_type,
            request.caption
        );
    }
}

fn parse_line(line: &str) -> UiEvent {
    match line.trim_end_matches(['\r', '\n']) {
        ":tap" => UiEvent::ImageActivated,
        ":dismiss" => UiEvent::DismissStatus,
        ":quit" => UiEvent::Quit,
        text => UiEvent::TextChanged(text.to_string()),
    }
}

#[derive(Default)]
struct Printer {
    generation: Option<u64>,
    label: Option<&'static str>,
    status: Option<String>,
}

impl Printer {
    fn show(&mut self, view: &View) {
        if let Some(frame) = &view.frame {
            if self.generation != Some(frame.generation.value()) {
                self.generation = Some(frame.generation.value());
                print!("{}", to_terminal_string(&frame.matrix, 2));
            }
        }
        if self.label != Some(view.label) {
            self.label = Some(view.label);
            println!("{}: {}", view.title, view.label);
        }
        let status = view.status.as_ref().map(|s| format!("{} [{}]", s.text, s.action_label));
        if status != self.status {
            if let Some(text) = &status {
                println!("{text}");
            }
            self.status = status;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&LogConfig::from_verbosity(cli.verbose)) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let mut config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if cli.export_dir.is_some() {
        config.export_dir = cli.export_dir;
    }

    let sink = FileExportSink::new(config.export_root());
    let mut session = match Session::new(&config, Arc::new(QrEncoder), sink, StdoutShare) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(export_root = %config.export_root().display(), "session started");

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(parse_line(&line)).await.is_err() {
                break;
            }
        }
    });

    let mut printer = Printer::default();
    session.run(rx, |view| printer.show(view)).await;
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(":tap"), UiEvent::ImageActivated);
        assert_eq!(parse_line(":dismiss"), UiEvent::DismissStatus);
        assert_eq!(parse_line(":quit\r"), UiEvent::Quit);
        assert_eq!(parse_line("hello"), UiEvent::TextChanged("hello".into()));
        assert_eq!(parse_line(""), UiEvent::TextChanged(String::new()));
    }
}
