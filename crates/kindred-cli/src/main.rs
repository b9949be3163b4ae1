//! `kindred` — command-line client for the Kindred match service.
//!
//! # Usage
//!
//! ```
//! kindred --url http://localhost:5310 --user u1 candidates
//! kindred --user u1 like u2
//! kindred --config ~/.config/kindred/config.toml matches
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig, SwipeOutcome};
use serde::Deserialize;
use serde_json::json;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "kindred", about = "Command-line client for the Kindred match service")]
struct Args {
  /// Path to a TOML config file (url, user, admin_token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the kindred server (default: http://localhost:5310).
  #[arg(long, env = "KINDRED_URL")]
  url: Option<String>,

  /// Identity to act as (forwarded as x-user-id).
  #[arg(long, env = "KINDRED_USER")]
  user: Option<String>,

  /// Admin bearer token; only needed for `reset`.
  #[arg(long, env = "KINDRED_ADMIN_TOKEN")]
  admin_token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register or update your profile.
  Profile {
    #[command(subcommand)]
    action: ProfileAction,
  },
  /// Like a profile.
  Like { target_id: String },
  /// Pass on a profile.
  Pass { target_id: String },
  /// Show your recorded decision on a profile, if any.
  Status { target_id: String },
  /// List profiles you have not yet decided on.
  Candidates,
  /// List your matches.
  Matches,
  /// Admin: wipe a user's outgoing swipe ledger.
  Reset { user_id: String },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
  /// Create or replace your profile.
  Set {
    #[arg(long)]
    display_name: String,
    /// Comma-separated, between one and five.
    #[arg(long, value_delimiter = ',')]
    interests: Vec<String>,
    #[arg(long, value_enum)]
    preference: Preference,
    #[arg(long, value_enum)]
    availability: Slot,
    #[arg(long)]
    voice_intro: Option<String>,
  },
  /// Show a profile (defaults to your own).
  Show { user_id: Option<String> },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preference {
  Workout,
  Meal,
  Cowork,
  Chat,
}

impl Preference {
  fn wire(self) -> &'static str {
    match self {
      Self::Workout => "workout",
      Self::Meal => "meal",
      Self::Cowork => "cowork",
      Self::Chat => "chat",
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Slot {
  Mornings,
  Lunchtime,
  Afternoons,
  Evenings,
}

impl Slot {
  fn wire(self) -> &'static str {
    match self {
      Self::Mornings => "mornings",
      Self::Lunchtime => "lunchtime",
      Self::Afternoons => "afternoons",
      Self::Evenings => "evenings",
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:         String,
  #[serde(default)]
  user:        String,
  #[serde(default)]
  admin_token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:    args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5310".to_string()),
    user_id:     args
      .user
      .or_else(|| (!file_cfg.user.is_empty()).then(|| file_cfg.user.clone()))
      .context("no identity set; pass --user or set user in the config file")?,
    admin_token: args.admin_token.or_else(|| {
      (!file_cfg.admin_token.is_empty()).then(|| file_cfg.admin_token.clone())
    }),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Profile { action } => run_profile(&client, action).await,
    Command::Like { target_id } => run_swipe(&client, &target_id, true).await,
    Command::Pass { target_id } => run_swipe(&client, &target_id, false).await,
    Command::Status { target_id } => run_status(&client, &target_id).await,
    Command::Candidates => run_candidates(&client).await,
    Command::Matches => run_matches(&client).await,
    Command::Reset { user_id } => run_reset(&client, &user_id).await,
  }
}

async fn run_profile(client: &ApiClient, action: ProfileAction) -> Result<()> {
  match action {
    ProfileAction::Set {
      display_name,
      interests,
      preference,
      availability,
      voice_intro,
    } => {
      let profile = client
        .set_profile(json!({
          "display_name": display_name,
          "interests": interests,
          "connection_preference": preference.wire(),
          "availability": availability.wire(),
          "voice_intro": voice_intro,
        }))
        .await?;
      println!("profile saved for {}", profile.user_id);
      Ok(())
    }
    ProfileAction::Show { user_id } => {
      let id = user_id.as_deref().unwrap_or_else(|| client.user_id());
      match client.get_profile(id).await? {
        None => println!("{id}: not registered"),
        Some(p) => {
          println!("{} ({})", p.display_name, p.user_id);
          println!("  interests:    {}", p.interests.join(", "));
          println!("  prefers:      {:?}", p.connection_preference);
          println!("  available:    {:?}", p.availability);
          if let Some(intro) = &p.voice_intro {
            println!("  voice intro:  {intro}");
          }
        }
      }
      Ok(())
    }
  }
}

async fn run_swipe(client: &ApiClient, target_id: &str, liked: bool) -> Result<()> {
  match client.swipe(target_id, liked).await? {
    SwipeOutcome::AlreadyDecided => {
      println!("already decided on {target_id}");
    }
    SwipeOutcome::Recorded(result) if result.matched => {
      let other = result
        .new_match
        .as_ref()
        .and_then(|m| m.other(&result.decision.swiper_id))
        .map(|u| u.to_string())
        .unwrap_or_else(|| target_id.to_string());
      println!("it's a match with {other}!");
    }
    SwipeOutcome::Recorded(_) => {
      println!("recorded {} on {target_id}", if liked { "like" } else { "pass" });
    }
  }
  Ok(())
}

async fn run_status(client: &ApiClient, target_id: &str) -> Result<()> {
  match client.get_swipe(target_id).await? {
    None => println!("no decision on {target_id} yet"),
    Some(d) => println!(
      "{} on {} at {}",
      if d.liked { "liked" } else { "passed" },
      d.target_id,
      d.decided_at.format("%Y-%m-%d %H:%M")
    ),
  }
  Ok(())
}

async fn run_candidates(client: &ApiClient) -> Result<()> {
  let candidates = client.candidates().await?;
  if candidates.is_empty() {
    println!("all caught up — no new profiles");
  }
  for id in candidates {
    println!("{id}");
  }
  Ok(())
}

async fn run_matches(client: &ApiClient) -> Result<()> {
  let matches = client.matches().await?;
  if matches.is_empty() {
    println!("no matches yet");
  }
  for m in matches {
    println!(
      "{} <-> {}  (matched {})",
      m.user_a_id,
      m.user_b_id,
      m.matched_at.format("%Y-%m-%d %H:%M")
    );
  }
  Ok(())
}

async fn run_reset(client: &ApiClient, user_id: &str) -> Result<()> {
  let deleted = client.reset(user_id).await?;
  println!("deleted {deleted} decisions for {user_id}");
  Ok(())
}
