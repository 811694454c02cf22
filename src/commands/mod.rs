pub mod handshake_api;
pub mod util_api;

use crate::config::{
    default_ice_servers, Config, DEFAULT_GATHER_TIMEOUT, DEFAULT_GREETING, DEFAULT_LABEL,
};
use crate::peer::token::TokenFormat;
use crate::peer::types::{IceServerConfig, SdpType, ServerKind};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "manual-signaling", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub net: NetArgs,

    /// Фильтр логов в синтаксисе RUST_LOG, например `debug` или `webrtc=warn,info`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args)]
pub struct NetArgs {
    /// Дополнительный STUN сервер (можно несколько раз)
    #[arg(long = "stun", global = true)]
    pub stun: Vec<String>,

    #[arg(long, global = true)]
    pub turn: Option<String>,

    #[arg(long, global = true)]
    pub turn_username: Option<String>,

    #[arg(long, global = true)]
    pub turn_credential: Option<String>,

    /// Не добавлять STUN серверы Google
    #[arg(long, global = true)]
    pub no_default_ice: bool,

    #[arg(long, global = true, default_value_t = DEFAULT_GATHER_TIMEOUT.as_secs())]
    pub gather_timeout_secs: u64,

    #[arg(long, global = true, default_value = DEFAULT_LABEL)]
    pub label: String,

    #[arg(long, global = true)]
    pub greeting: Option<String>,

    #[arg(long, global = true)]
    pub no_greeting: bool,

    #[arg(long, global = true, value_enum, default_value_t = TokenFormat::Plain)]
    pub format: TokenFormat,
}

impl NetArgs {
    pub fn into_config(self) -> Config {
        let mut ice_servers = if self.no_default_ice {
            Vec::new()
        } else {
            default_ice_servers()
        };
        ice_servers.extend(self.stun.into_iter().map(IceServerConfig::stun));
        if let Some(url) = self.turn {
            ice_servers.push(IceServerConfig {
                kind: ServerKind::Turn,
                url,
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        let greeting = if self.no_greeting {
            None
        } else {
            Some(self.greeting.unwrap_or_else(|| DEFAULT_GREETING.into()))
        };

        Config {
            ice_servers,
            gather_timeout: Duration::from_secs(self.gather_timeout_secs),
            data_channel_label: self.label,
            greeting,
            token_format: self.format,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// A-сторона: печатает offer, ждёт answer, потом чат по каналу
    Offer {
        /// Файл с answer-токеном; без него токен читается из stdin
        #[arg(long)]
        answer_file: Option<PathBuf>,
    },
    /// B-сторона: читает offer, печатает answer, потом чат по каналу
    Answer {
        /// Файл с offer-токеном, `-` для stdin
        #[arg(long, default_value = "./offer.b64")]
        offer_file: PathBuf,
    },
    /// Упаковать сырой SDP в токен
    Encode {
        #[arg(long = "type", value_enum)]
        sdp_type: SdpTypeArg,

        /// Файл с SDP; без него SDP читается из stdin
        #[arg(long)]
        sdp_file: Option<PathBuf>,
    },
    /// Показать содержимое токена
    Decode {
        /// Токен, `-` для stdin
        token: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SdpTypeArg {
    Offer,
    Answer,
}

impl From<SdpTypeArg> for SdpType {
    fn from(arg: SdpTypeArg) -> Self {
        match arg {
            SdpTypeArg::Offer => SdpType::Offer,
            SdpTypeArg::Answer => SdpType::Answer,
        }
    }
}

pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Offer { answer_file } => handshake_api::offer(config, answer_file).await,
        Commands::Answer { offer_file } => handshake_api::answer(config, offer_file).await,
        Commands::Encode { sdp_type, sdp_file } => {
            util_api::encode(sdp_type.into(), sdp_file, config.token_format).await
        }
        Commands::Decode { token } => util_api::decode(token).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["manual-signaling", "offer"]).unwrap();
        let cfg = cli.net.into_config();
        let default = Config::default();

        assert_eq!(cfg.ice_servers, default.ice_servers);
        assert_eq!(cfg.gather_timeout, default.gather_timeout);
        assert_eq!(cfg.data_channel_label, default.data_channel_label);
        assert_eq!(cfg.greeting, default.greeting);
        assert_eq!(cfg.token_format, TokenFormat::Plain);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "manual-signaling",
            "answer",
            "--offer-file",
            "-",
            "--no-default-ice",
            "--turn",
            "relay.example.org:3478",
            "--turn-username",
            "u",
            "--turn-credential",
            "p",
            "--format",
            "compressed",
            "--no-greeting",
        ])
        .unwrap();

        assert!(matches!(
            &cli.command,
            Commands::Answer { offer_file } if offer_file.as_os_str() == "-"
        ));
        let cfg = cli.net.into_config();
        assert_eq!(
            cfg.ice_servers,
            vec![IceServerConfig::turn("relay.example.org:3478", "u", "p")]
        );
        assert_eq!(cfg.token_format, TokenFormat::Compressed);
        assert_eq!(cfg.greeting, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn encode_requires_type() {
        assert!(Cli::try_parse_from(["manual-signaling", "encode"]).is_err());
    }
}
