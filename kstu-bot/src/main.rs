use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use sentry::types::Dsn;
use sqlx::postgres::PgConnectOptions;
use time::UtcOffset;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use kstu_notify::telegram::Telegram;
use kstu_schedule::store::PostgresLessonStore;
use kstu_schedule::week::WeekVariantResolver;
use kstu_schedule::ScheduleLookup;

use crate::handler::Handler;

mod command;
mod handler;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Args {
  #[arg(long, short, env = "KSTU_BOT_TELEGRAM_TOKEN")]
  telegram_token: String,
  /// Self-hosted Bot API server, defaults to api.telegram.org
  #[arg(long, env = "KSTU_BOT_TELEGRAM_API_URL")]
  telegram_api_url: Option<Url>,
  /// Seconds a single getUpdates request may wait for new messages
  #[arg(long, env = "KSTU_BOT_POLL_TIMEOUT", default_value_t = 30)]
  poll_timeout: u64,
  #[arg(long, env = "KSTU_BOT_DB_HOST", default_value = "localhost")]
  db_host: String,
  #[arg(long, env = "KSTU_BOT_DB_PORT", default_value_t = 5432)]
  db_port: u16,
  #[arg(long, env = "KSTU_BOT_DB_NAME")]
  db_name: String,
  #[arg(long, env = "KSTU_BOT_DB_USER")]
  db_user: String,
  #[arg(long, env = "KSTU_BOT_DB_PASSWORD")]
  db_password: String,
  /// Offset of the campus clock, decides when a new week starts
  #[arg(
    long,
    env = "KSTU_BOT_UTC_OFFSET_HOURS",
    default_value_t = 3,
    allow_negative_numbers = true
  )]
  utc_offset_hours: i8,
  #[arg(long, env = "KSTU_BOT_SENTRY_DSN")]
  sentry_dsn: Option<Dsn>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let _sentry = sentry::init(sentry::ClientOptions {
    dsn: args.sentry_dsn.clone(),
    release: sentry::release_name!(),
    ..Default::default()
  });

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .with(sentry_tracing::layer())
    .init();

  let store = PostgresLessonStore::new(
    PgConnectOptions::new()
      .host(&args.db_host)
      .port(args.db_port)
      .database(&args.db_name)
      .username(&args.db_user)
      .password(&args.db_password),
  );
  let resolver = WeekVariantResolver::new(UtcOffset::from_hms(args.utc_offset_hours, 0, 0)?);

  let telegram = match &args.telegram_api_url {
    Some(api_url) => Telegram::with_api_url(api_url.as_str(), &args.telegram_token)?,
    None => Telegram::new(&args.telegram_token)?,
  };

  info!(
    "Started, this is the {} week",
    resolver.current_variant().russian_name()
  );

  let mut handler = Handler::new(ScheduleLookup::new(store, resolver), &telegram);
  match telegram.get_me().await?.username {
    Some(username) => {
      info!("Answering commands addressed to @{}", username);
      handler = handler.with_bot_username(username);
    }
    None => warn!("Bot account has no username, answering every addressed command"),
  }

  let mut offset = None;

  loop {
    let updates = tokio::select! {
      _ = tokio::signal::ctrl_c() => {
        info!("Received ctrl-c, stopping");
        break;
      }
      updates = telegram.get_updates(offset, args.poll_timeout) => updates,
    };

    let updates = match updates {
      Ok(updates) => updates,
      Err(err) => {
        error!("Error polling telegram updates: {:#}", err);
        tokio::time::sleep(POLL_RETRY_DELAY).await;
        continue;
      }
    };

    // strictly one after another, the next update waits for the previous reply
    for update in updates {
      offset = Some(update.update_id + 1);

      let Some(message) = update.message else {
        continue;
      };
      let Some(text) = message.text else {
        warn!("Ignoring non-text message in chat {}", message.chat.id);
        continue;
      };

      if let Err(err) = handler.handle(message.chat.id, &text).await {
        error!(
          "Error answering {:?} in chat {}: {:#}",
          text, message.chat.id, err
        );
      }
    }
  }

  Ok(())
}
