//! Terminal front end: reads line commands, prints the derived view.

use std::sync::Arc;

use anyhow::Context;
use tokio::{io::{AsyncBufReadExt, BufReader}, sync::mpsc};

use crate::{
    client::HttpBackend,
    config::StudioConfig,
    controller::{Controller, Event, TabView, View},
    models::{LifecycleState, ResultTab},
    runtime::{Runtime, Surface},
};

const HELP: &str = "commands: business <text> | topic <text> | generate | tab strategy|visuals | copy | rerender | help | quit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Send(Event),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "business" => Command::Send(Event::EditBusiness(rest.to_string())),
        "topic" => Command::Send(Event::EditTopic(rest.to_string())),
        "generate" | "go" => Command::Send(Event::Submit),
        "tab" => match rest.to_ascii_lowercase().as_str() {
            "strategy" | "1" => Command::Send(Event::SelectTab(ResultTab::Strategy)),
            "visuals" | "2" => Command::Send(Event::SelectTab(ResultTab::Visuals)),
            other => return Err(format!("unknown tab '{other}'")),
        },
        "copy" => Command::Send(Event::CopyToClipboard),
        "rerender" => Command::Send(Event::ForceRerender),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => return Err("empty command".into()),
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(cmd)
}

/// Prints each distinct view once.
#[derive(Default)]
pub struct TerminalSurface {
    last: Option<View>,
}

impl Surface for TerminalSurface {
    fn render(&mut self, view: &View) {
        if self.last.as_ref() == Some(view) {
            return;
        }
        println!("{}", format_view(view));
        self.last = Some(view.clone());
    }

    fn write_clipboard(&mut self, text: &str) {
        println!("📋 Copied:\n{text}");
    }

    fn notify(&mut self, message: &str) {
        println!("⚠️  {message}");
    }
}

pub fn format_view(view: &View) -> String {
    let status = match view.lifecycle {
        LifecycleState::Idle => "READY",
        LifecycleState::InFlight => "GENERATING",
        LifecycleState::Complete => "COMPLETE",
        LifecycleState::Failed => "FAILED",
    };
    let mut out = format!("── PRACHAR.AI // {status} ──");
    for line in &view.logs {
        out.push('\n');
        out.push_str(line);
    }
    match &view.tab {
        TabView::AwaitingInput if !view.loading => out.push_str("\nAwaiting Input Parameters..."),
        TabView::AwaitingInput => {}
        TabView::Strategy { hook, offer, cta, captions, copied } => {
            out.push_str("\n01 // STRATEGY CORE");
            out.push_str(&format!("\n  The Hook:  {hook}\n  The Offer: {offer}\n  Action:    {cta}"));
            for (i, caption) in captions.iter().enumerate() {
                out.push_str(&format!("\n  {}. {caption}", i + 1));
            }
            if *copied {
                out.push_str("\n  ✓ copied");
            }
        }
        TabView::Visuals { image, badge, status } => {
            out.push_str("\n02 // VISUAL ASSETS");
            if let Some(url) = image {
                out.push_str(&format!("\n  {url}"));
            }
            for line in status.iter().flatten() {
                out.push_str(&format!("\n  {line}"));
            }
            out.push_str(&format!("\n  {badge}"));
        }
    }
    out
}

pub async fn run(config: StudioConfig) -> anyhow::Result<()> {
    tracing::info!("🎬 Studio talking to {}", config.api_url);
    let backend = Arc::new(HttpBackend::new(config.api_url.clone()).with_asset_timeout(config.asset_timeout));
    let runtime = Runtime::new(Controller::new(config.rerender), backend, TerminalSurface::default(), config);
    let (tx, rx) = mpsc::channel(32);
    let studio = tokio::spawn(runtime.run(rx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match parse_command(&line) {
            Ok(Command::Send(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(e) => println!("{e}; {HELP}"),
        }
    }
    drop(tx);
    studio.await.context("studio loop panicked")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RerenderPolicy, models::GenerationResult};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("business  Tech Club "), Ok(Command::Send(Event::EditBusiness("Tech Club".into()))));
        assert_eq!(parse_command("GENERATE"), Ok(Command::Send(Event::Submit)));
        assert_eq!(parse_command("tab visuals"), Ok(Command::Send(Event::SelectTab(ResultTab::Visuals))));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert!(parse_command("tab nowhere").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn formats_idle_and_complete_views() {
        let mut c = Controller::new(RerenderPolicy::Asset);
        assert!(format_view(&c.view()).contains("Awaiting Input Parameters..."));

        c.handle(Event::EditBusiness("Cafe".into()));
        c.handle(Event::EditTopic("Diwali".into()));
        c.handle(Event::Submit);
        let cycle = c.state().cycle;
        c.handle(Event::Response {
            cycle,
            outcome: Ok(GenerationResult { hook: "H".into(), captions: vec!["A".into()], ..Default::default() }),
        });
        let text = format_view(&c.view());
        assert!(text.starts_with("── PRACHAR.AI // COMPLETE ──"));
        assert!(text.contains("The Hook:  H"));
        assert!(text.contains("\n  1. A"));
    }
}
