mod analyzer;
mod cache;
mod config;
mod llm;
mod matchmaker;
mod news;
mod starter_gen;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use uuid::Uuid;

use kindred_core::now_unix_secs;
use kindred_store::{Preferences, Store};

use crate::analyzer::PatternAnalyzer;
use crate::config::Config;
use crate::llm::{HttpTextGenerator, TextGenerator};
use crate::matchmaker::Matchmaker;
use crate::news::{HttpNewsSource, NewsSource};
use crate::starter_gen::StarterGenerator;

#[derive(Parser)]
#[command(name = "kindred", about = "Conversation compatibility and matchmaking CLI")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a user's recent messages into a conversation pattern
    Analyze {
        /// User to analyze
        user: String,
    },

    /// Discover new compatible matches for a user
    Discover {
        /// User to find matches for
        user: String,
    },

    /// Accept a pending match and open a conversation
    Accept {
        /// Match id
        match_id: Uuid,

        /// Acting user (must be a participant)
        #[arg(long)]
        user: String,
    },

    /// Decline a pending match
    Decline {
        /// Match id
        match_id: Uuid,

        /// Acting user (must be a participant)
        #[arg(long)]
        user: String,
    },

    /// Show a user's stored conversation pattern
    Pattern {
        /// User to show
        user: String,
    },

    /// Show or update a user's matching preferences
    Prefs {
        /// User whose preferences to show or change
        user: String,

        /// Enable or disable matching
        #[arg(long)]
        enabled: Option<bool>,

        /// Maximum matches created per UTC day
        #[arg(long)]
        daily_cap: Option<i64>,

        /// Minimum compatibility score
        #[arg(long)]
        min_score: Option<i64>,

        /// Add a user to the block list
        #[arg(long)]
        block: Option<String>,
    },

    /// Record a chat message for later analysis
    AddMessage {
        /// Message author
        user: String,

        /// Message text
        text: String,
    },

    /// Send a message in a networking conversation
    Send {
        /// Conversation id
        conversation_id: Uuid,

        /// Sending user
        #[arg(long)]
        user: String,

        /// Message text
        text: String,
    },

    /// Show database statistics
    Stats,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn open_store(config: &Config) -> Result<Store> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    Store::open(&config.db_path()).context("failed to open database")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::from_env();

    match &cli.command {
        Commands::Analyze { user } => cmd_analyze(&config, user).await,
        Commands::Discover { user } => cmd_discover(&config, user),
        Commands::Accept { match_id, user } => cmd_accept(&config, *match_id, user).await,
        Commands::Decline { match_id, user } => cmd_decline(&config, *match_id, user),
        Commands::Pattern { user } => cmd_pattern(&config, user),
        Commands::Prefs {
            user,
            enabled,
            daily_cap,
            min_score,
            block,
        } => cmd_prefs(&config, user, *enabled, *daily_cap, *min_score, block.as_deref()),
        Commands::AddMessage { user, text } => cmd_add_message(&config, user, text),
        Commands::Send {
            conversation_id,
            user,
            text,
        } => cmd_send(&config, *conversation_id, user, text),
        Commands::Stats => cmd_stats(&config),
    }
}

async fn cmd_analyze(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(generator) = HttpTextGenerator::from_config(config) else {
        anyhow::bail!("analysis needs a text generator; set KINDRED_LLM_URL");
    };

    let analyzer = PatternAnalyzer::new(&store, &generator);
    match analyzer.analyze(user).await {
        Some(pattern) => {
            println!(
                "analyzed {user}: style={}, interests=[{}]",
                pattern.communication_style.as_str(),
                pattern.interests.join(", ")
            );
        }
        None => println!("no pattern produced for {user} (no recent messages or unusable profile)"),
    }
    Ok(())
}

fn cmd_discover(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config)?;
    let created = Matchmaker::new(&store).find_new_matches(user, now_unix_secs())?;

    if created.is_empty() {
        println!("no new matches for {user}");
        return Ok(());
    }
    for m in &created {
        println!("{}  {}  score={}  {}", m.id, m.user_id_2, m.score, m.match_reason);
    }
    println!("{} new match(es)", created.len());
    Ok(())
}

async fn cmd_accept(config: &Config, match_id: Uuid, user: &str) -> Result<()> {
    let store = open_store(config)?;
    let generator = HttpTextGenerator::from_config(config);
    let news = HttpNewsSource::from_config(config);
    let mut starters = StarterGenerator::new(
        generator.as_ref().map(|g| g as &dyn TextGenerator),
        news.as_ref().map(|n| n as &dyn NewsSource),
        SmallRng::from_os_rng(),
    );

    let result = Matchmaker::new(&store)
        .accept_match(user, match_id, &mut starters, now_unix_secs())
        .await?;
    match result {
        Some(conv) => {
            println!("accepted. conversation {} opened", conv.id);
            println!("starter: {}", conv.starter);
        }
        None => println!("match not accepted (not found, not yours, or already resolved)"),
    }
    Ok(())
}

fn cmd_decline(config: &Config, match_id: Uuid, user: &str) -> Result<()> {
    let store = open_store(config)?;
    let declined = Matchmaker::new(&store).decline_match(user, match_id, now_unix_secs())?;
    if declined {
        println!("declined");
    } else {
        println!("match not declined (not found, not yours, or already resolved)");
    }
    Ok(())
}

fn cmd_pattern(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config)?;
    match store.get_pattern(user)? {
        Some(p) => {
            println!("user:        {}", p.user_id);
            println!("style:       {}", p.communication_style.as_str());
            println!("length:      {}", p.response_length.as_str());
            println!("curiosity:   {}", p.curiosity_level);
            println!("depth:       {}", p.topic_depth);
            println!("questions:   {}", p.question_asking);
            println!("intellect:   {}", p.intellectual_curiosity);
            println!("empathy:     {}", p.emotional_intelligence);
            println!("interests:   [{}]", p.interests.join(", "));
            println!("topics:      [{}]", p.conversation_topics.join(", "));
            println!("analyzed_at: {}", kindred_core::unix_to_iso8601(p.last_analyzed));
        }
        None => println!("no pattern stored for {user}"),
    }
    Ok(())
}

fn cmd_prefs(
    config: &Config,
    user: &str,
    enabled: Option<bool>,
    daily_cap: Option<i64>,
    min_score: Option<i64>,
    block: Option<&str>,
) -> Result<()> {
    let store = open_store(config)?;
    let mut prefs = store.preferences(user)?.unwrap_or(Preferences {
        user_id: user.to_string(),
        enabled: false,
        daily_cap: 3,
        min_score: 60,
        blocked: Vec::new(),
    });

    let changing = enabled.is_some() || daily_cap.is_some() || min_score.is_some() || block.is_some();
    if let Some(v) = enabled {
        prefs.enabled = v;
    }
    if let Some(v) = daily_cap {
        prefs.daily_cap = v;
    }
    if let Some(v) = min_score {
        prefs.min_score = v;
    }
    if let Some(b) = block
        && !prefs.blocked.iter().any(|u| u == b)
    {
        prefs.blocked.push(b.to_string());
    }
    if changing {
        store.set_preferences(&prefs)?;
    }

    println!("user:      {}", prefs.user_id);
    println!("enabled:   {}", prefs.enabled);
    println!("daily_cap: {}", prefs.daily_cap);
    println!("min_score: {}", prefs.min_score);
    println!("blocked:   [{}]", prefs.blocked.join(", "));
    Ok(())
}

fn cmd_add_message(config: &Config, user: &str, text: &str) -> Result<()> {
    let store = open_store(config)?;
    let id = store.record_message(user, text, now_unix_secs())?;
    println!("recorded {id}");
    Ok(())
}

fn cmd_send(config: &Config, conversation_id: Uuid, user: &str, text: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(conv) = store.get_conversation(conversation_id)? else {
        anyhow::bail!("no such conversation");
    };
    if conv.user_id_1 != user && conv.user_id_2 != user {
        anyhow::bail!("{user} is not a participant in this conversation");
    }

    store.append_conversation_message(conversation_id, user, text, now_unix_secs())?;
    if store.activate_conversation(conversation_id)? {
        println!("sent (conversation now active)");
    } else {
        println!("sent");
    }
    Ok(())
}

fn cmd_stats(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let conn = store.conn();

    let count = |sql: &str| -> Result<i64> {
        conn.query_row(sql, [], |row| row.get(0))
            .context("stats query failed")
    };

    println!("patterns:      {}", count("SELECT COUNT(*) FROM conversation_patterns")?);
    println!("messages:      {}", count("SELECT COUNT(*) FROM messages")?);
    println!(
        "matches:       {}",
        count("SELECT COUNT(*) FROM user_matches")?
    );
    println!(
        "  pending:     {}",
        count("SELECT COUNT(*) FROM user_matches WHERE status = 'pending'")?
    );
    println!(
        "  accepted:    {}",
        count("SELECT COUNT(*) FROM user_matches WHERE status = 'accepted'")?
    );
    println!(
        "conversations: {}",
        count("SELECT COUNT(*) FROM networking_conversations")?
    );
    println!(
        "activity:      {}",
        count("SELECT COUNT(*) FROM networking_activity")?
    );
    Ok(())
}
