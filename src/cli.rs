use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use log::info;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::Token;
use crate::compose::NotificationComposer;
use crate::config::Config;
use crate::enricher::{Enricher, Providers};
use crate::output;
use crate::providers::{parse_revision_uri, CodePipelineClient, GitHubClient};
use crate::sinks::{ChannelSettings, NotificationSink, SlackSink, StdoutSink};

const DRY_RUN_CHANNEL: &str = "#dry-run";

#[derive(Parser)]
#[command(name = "cinotify")]
#[command(author, version, about = "CI/CD pipeline notifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true, env = "CINOTIFY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich pipeline state-change events and send notifications
    Handle {
        /// File holding one event or a JSON array of events; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        event: String,

        /// Print chat payloads instead of posting them
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Pretty-print dry-run payloads
        #[arg(short, long, default_value_t = false)]
        pretty: bool,
    },

    /// Show the repository coordinates parsed from a commit URL
    ParseRevision { url: String },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Handle {
                event,
                dry_run,
                pretty,
            } => {
                let config = Config::load(self.config.as_deref())?;
                execute_handle(&config, event, *dry_run, *pretty).await
            }
            Commands::ParseRevision { url } => execute_parse_revision(url),
        }
    }
}

async fn execute_handle(config: &Config, source: &str, dry_run: bool, pretty: bool) -> Result<()> {
    let events = read_events(source)?;
    info!("Handling {} event(s)", events.len());

    let enricher = build_enricher(config, dry_run, pretty)?;

    let outcomes = join_all(events.iter().map(|event| enricher.handle(event))).await;
    for outcome in &outcomes {
        output::print_outcome(outcome);
    }

    Ok(())
}

fn build_enricher(config: &Config, dry_run: bool, pretty: bool) -> Result<Enricher> {
    let timeout = config.timeouts.provider();

    let sink: Arc<dyn NotificationSink> = if dry_run {
        let settings = ChannelSettings {
            channel: config
                .slack
                .channel
                .clone()
                .unwrap_or_else(|| DRY_RUN_CHANNEL.to_string()),
            channel_important: config.slack.channel_important.clone(),
            username: config.slack.username.clone(),
            icon_emoji: config.slack.icon_emoji.clone(),
        };
        Arc::new(StdoutSink::new(settings, pretty))
    } else {
        config.validate_for_delivery()?;
        Arc::new(SlackSink::from_config(&config.slack, timeout)?)
    };

    let pipelines = Arc::new(CodePipelineClient::new(&config.codepipeline.base_url, timeout)?);
    let token = config.github.token.as_deref().map(Token::from);
    let commits = Arc::new(GitHubClient::new(&config.github.base_url, token, timeout)?);

    let providers = Providers {
        execution: pipelines.clone(),
        history: pipelines.clone(),
        actions: pipelines,
        commits,
    };

    Ok(Enricher::new(
        providers,
        sink,
        NotificationComposer::new(config.codepipeline.region.clone()),
        timeout,
    ))
}

fn read_events(source: &str) -> Result<Vec<Value>> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read events from stdin")?;
        buf
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read events from {}", path.display()))?
    };

    parse_events(&contents)
}

/// Accepts a single event or a JSON array of events.
fn parse_events(contents: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(contents).context("Events input is not valid JSON")?;
    Ok(match value {
        Value::Array(events) => events,
        event => vec![event],
    })
}

fn execute_parse_revision(url: &str) -> Result<()> {
    let revision = parse_revision_uri(url)?;
    println!("host:  {}", revision.host);
    println!("owner: {}", revision.owner);
    println!("repo:  {}", revision.repo);
    println!("sha:   {}", revision.sha);
    Ok(())
}
