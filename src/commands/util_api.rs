use crate::peer::token::{self, TokenFormat};
use crate::peer::types::{SdpType, SessionDescription};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// сырой SDP → токен
pub async fn encode(
    sdp_type: SdpType,
    sdp_file: Option<PathBuf>,
    format: TokenFormat,
) -> Result<()> {
    let sdp = match sdp_file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("could not read SDP from {}", path.display()))?,
        None => read_stdin().await?,
    };
    if sdp.trim().is_empty() {
        bail!("SDP is empty");
    }

    let sd = SessionDescription { sdp, sdp_type };
    println!("{}", token::encode(&sd, format)?);
    Ok(())
}

/// токен → JSON для просмотра
pub async fn decode(token: String) -> Result<()> {
    let token = if token == "-" { read_stdin().await? } else { token };
    let sd = token::decode(&token)?;
    println!("{}", serde_json::to_string_pretty(&sd)?);
    Ok(())
}

async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("could not read stdin")?;
    Ok(buf)
}
