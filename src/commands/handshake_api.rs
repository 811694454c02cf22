use crate::config::Config;
use crate::peer::connection::RtcEngine;
use crate::peer::events::{EventReceiver, EventSink, PeerEvent};
use crate::signaling::SignalingAdapter;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

type StdinLines = Lines<BufReader<Stdin>>;

/// A-сторона: offer → stdout, answer ← файл или stdin, дальше чат
pub async fn offer(config: Config, answer_file: Option<PathBuf>) -> Result<()> {
    config.validate()?;
    let (events, mut rx) = EventSink::new();
    let format = config.token_format;
    let mut adapter = SignalingAdapter::new(RtcEngine::new(config, events), format);

    let token = adapter
        .offer_token()
        .await
        .context("could not create offer")?;
    eprintln!("Offer token, pass it to the other peer:");
    println!("{token}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = match answer_file {
        Some(path) => read_token_file(&path).await?,
        None => {
            eprintln!("Paste base64 answer from the other peer:");
            read_token_line(&mut lines).await?
        }
    };

    adapter
        .apply_answer(&answer)
        .await
        .context("could not apply answer")?;
    eprintln!("Answer set, data channel should open shortly");

    relay(adapter.engine(), &mut rx, &mut lines).await
}

/// B-сторона: offer ← файл или stdin, answer → stdout, дальше чат
pub async fn answer(config: Config, offer_file: PathBuf) -> Result<()> {
    config.validate()?;
    let (events, mut rx) = EventSink::new();
    let format = config.token_format;
    let mut adapter = SignalingAdapter::new(RtcEngine::new(config, events), format);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let offer = if offer_file.as_os_str() == "-" {
        eprintln!("Paste base64 offer from the other peer:");
        read_token_line(&mut lines).await?
    } else {
        info!("Loading offer token from {}", offer_file.display());
        read_token_file(&offer_file).await?
    };

    let token = adapter
        .accept_offer(&offer)
        .await
        .context("could not answer offer")?;
    eprintln!("Answer token, pass it back to the offering peer:");
    println!("{token}");

    relay(adapter.engine(), &mut rx, &mut lines).await
}

/// Строки из stdin уходят в канал, входящие сообщения печатаются.
/// Выход по EOF, Ctrl-C или закрытию соединения.
async fn relay(engine: &RtcEngine, rx: &mut EventReceiver, lines: &mut StdinLines) -> Result<()> {
    let mut stdin_open = true;
    let outcome = loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(PeerEvent::Message(text)) => println!("< {text}"),
                Some(PeerEvent::ChannelOpen { label }) => {
                    eprintln!("Data channel '{label}' open, type to send");
                }
                Some(PeerEvent::Connected) => {}
                Some(PeerEvent::ChannelClosed { label }) => {
                    info!("Channel '{}' closed by peer", label);
                    break Ok(());
                }
                Some(PeerEvent::Disconnected) | None => break Ok(()),
                Some(PeerEvent::Failed) => break Err(anyhow::anyhow!("peer connection failed")),
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => {
                    if let Err(e) = engine.send_text(line).await {
                        warn!("Message not sent: {}", e);
                    }
                }
                // stdin закрыт, но входящие ещё печатаем
                Ok(None) => stdin_open = false,
                Err(e) => break Err(e.into()),
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    engine.close().await;
    outcome
}

async fn read_token_file(path: &Path) -> Result<String> {
    let token = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read token from {}", path.display()))?;
    Ok(token.trim().to_owned())
}

async fn read_token_line(lines: &mut StdinLines) -> Result<String> {
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            return Ok(line.to_owned());
        }
    }
    bail!("stdin closed before a token was pasted")
}
