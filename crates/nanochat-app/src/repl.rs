//! Line-oriented front end driving the chat orchestrator.

use std::io::Write;

use futures_util::StreamExt;
use nanochat_common::{NanochatError, Result};
use nanochat_config::schema::SamplingConfig;
use nanochat_core::{ChatError, ChatOrchestrator, StreamStatus};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{self, Command, HELP};
use crate::render::{self, StreamPrinter};

pub async fn run(chat: &mut ChatOrchestrator, sampling: &SamplingConfig) -> Result<()> {
    let mut out = std::io::stdout();
    render::transcript(&mut out, &chat.view())?;
    writeln!(out, "(type /help for commands)")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        // Once a Ctrl-C handler is installed SIGINT no longer exits, so it
        // is also watched here.
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match command::parse(&line) {
            Command::Empty => {}
            Command::Prompt(text) => prompt(chat, &mut out, &text).await?,
            Command::Temperature(value) => {
                let value = sampling.snap_temperature(value);
                report(&mut out, chat.set_temperature(value).await)?;
                render::stats(&mut out, chat.state().stats())?;
            }
            Command::TopK(value) => {
                let value = sampling.clamp_top_k(value);
                report(&mut out, chat.set_top_k(value).await)?;
                render::stats(&mut out, chat.state().stats())?;
            }
            Command::Clear => {
                report(&mut out, chat.clear().await)?;
                render::transcript(&mut out, &chat.view())?;
            }
            Command::Raw => {
                if chat.toggle_raw() {
                    render::raw(&mut out, &chat.view())?;
                } else {
                    writeln!(out, "(raw view off)")?;
                }
            }
            Command::Stats => render::stats(&mut out, chat.state().stats())?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => break,
            Command::Invalid(message) => writeln!(out, "?? {message}")?,
        }
    }
    Ok(())
}

/// Send one prompt, printing the answer as it streams. Ctrl-C abandons it.
async fn prompt(chat: &mut ChatOrchestrator, out: &mut impl Write, text: &str) -> Result<()> {
    let mut updates = match chat.submit(text).await {
        Ok(updates) => updates,
        Err(e) => return report(out, Err(e)),
    };

    write!(out, "nano: ")?;
    let mut printer = StreamPrinter::new();
    let interrupted = loop {
        tokio::select! {
            update = updates.next() => {
                let Some(update) = update else {
                    break false;
                };
                printer.show(out, &update.content)?;
                let status = chat
                    .apply(update)
                    .map_err(|e| NanochatError::Chat(e.to_string()))?;
                if status != StreamStatus::Streaming {
                    break false;
                }
            }
            _ = tokio::signal::ctrl_c() => break true,
        }
    };
    printer.finish(out)?;

    if interrupted {
        drop(updates);
        report(out, chat.cancel().await)?;
        render::notices(out, &chat.view())?;
    }

    if chat.state().show_raw() {
        render::raw(out, &chat.view())?;
    }
    Ok(())
}

/// Print a non-fatal failure inline; only I/O problems propagate.
fn report(out: &mut impl Write, result: std::result::Result<(), ChatError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(ChatError::Invariant(e)) => Err(NanochatError::Chat(e.to_string())),
        Err(e) => {
            writeln!(out, "!! {e}")?;
            Ok(())
        }
    }
}
