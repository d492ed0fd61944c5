//! VoiceAid - quick phrases spoken aloud, on repeat
//!
//! Command-line front end for the phrase book, the repeating announcer, the
//! emergency alert, speech practice and the mood log.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voiceaid::announce::{AnnouncementService, EventSender};
use voiceaid::config::Config;
use voiceaid::emergency::EmergencyAlert;
use voiceaid::mood::{self, Emotion, MoodLog};
use voiceaid::notify::{LogNotifier, Notifier};
use voiceaid::phrases::{self, PhraseBook, PhraseCategory};
use voiceaid::therapy::{self, TherapySession};
use voiceaid::tts::{self, VoiceSettings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the XDG config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage quick phrases
    Phrases {
        #[command(subcommand)]
        action: PhraseAction,
    },
    /// Speak a phrase repeatedly until Ctrl-C
    Speak {
        /// Phrase id (see `phrases list`)
        id: String,
        /// Stop automatically after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Emergency contacts and alert
    Emergency {
        #[command(subcommand)]
        action: EmergencyAction,
    },
    /// Read-aloud speech practice
    Therapy {
        #[command(subcommand)]
        action: TherapyAction,
    },
    /// Mood log
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },
}

#[derive(Subcommand, Debug)]
enum PhraseAction {
    /// List phrases
    List {
        /// Only show one category (emergency, daily, custom)
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a custom phrase
    Add { text: String },
    /// Change a custom phrase
    Edit { id: String, text: String },
    /// Delete a custom phrase
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum EmergencyAction {
    /// Show contacts in the order they would be notified
    Contacts,
    /// Show medical information
    Medical,
    /// Trigger the alert and notify every available contact
    Trigger,
    /// Call one contact directly
    Call { id: String },
}

#[derive(Subcommand, Debug)]
enum TherapyAction {
    /// List the exercises
    List,
    /// Hear an exercise spoken once
    Listen { number: usize },
    /// Score what you said against an exercise
    Score {
        number: usize,
        /// Transcript of your attempt
        spoken: String,
    },
}

#[derive(Subcommand, Debug)]
enum MoodAction {
    /// Record how you feel (happy, neutral, sad, anxious)
    Log { emotion: String },
    /// Take a placeholder reading
    Check,
    /// Show recent readings and the trend
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Setup logging (RUST_LOG wins over config)
    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🗣️ VoiceAid v{} starting...", env!("CARGO_PKG_VERSION"));
    voiceaid::i18n::init(Some(&config.ui_language));

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    match args.command {
        Commands::Phrases { action } => run_phrases(&config, notifier, action).await,
        Commands::Speak { id, seconds } => run_speak(&config, notifier, &id, seconds).await,
        Commands::Emergency { action } => run_emergency(&config, notifier, action).await,
        Commands::Therapy { action } => run_therapy(&config, notifier, action).await,
        Commands::Mood { action } => run_mood(&config, notifier, action),
    }
}

async fn run_phrases(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    action: PhraseAction,
) -> Result<()> {
    let mut book = PhraseBook::open(phrases::open_store(config), notifier).await?;

    match action {
        PhraseAction::List { category } => {
            let filter = match category {
                Some(c) => Some(
                    c.parse::<PhraseCategory>()
                        .map_err(|_| anyhow::anyhow!("Unknown category '{}'", c))?,
                ),
                None => None,
            };
            for phrase in book.phrases() {
                if filter.is_some_and(|f| f != phrase.category) {
                    continue;
                }
                let marker = if phrase.is_default { " " } else { "*" };
                println!(
                    "{}{:>16}  [{:<9}]  {}",
                    marker,
                    phrase.id,
                    phrase.category.label(),
                    phrase.text
                );
            }
        }
        PhraseAction::Add { text } => {
            let phrase = book.add(&text).await?;
            println!("{}", phrase.id);
        }
        PhraseAction::Edit { id, text } => book.edit(&id, &text).await?,
        PhraseAction::Delete { id } => book.delete(&id).await?,
    }
    Ok(())
}

async fn run_speak(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    id: &str,
    seconds: Option<u64>,
) -> Result<()> {
    let book = PhraseBook::open(phrases::open_store(config), notifier.clone()).await?;
    let phrase = book
        .get(id)
        .ok_or_else(|| voiceaid::error::VoiceAidError::PhraseNotFound(id.to_string()))?
        .clone();

    let (announcer, service) = AnnouncementService::start(config, notifier).await?;
    announcer.speak(&phrase.id, &phrase.text)?;

    let mut state = announcer.subscribe();
    let started = matches!(
        tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| !s.is_idle())).await,
        Ok(Ok(_))
    );
    if !started {
        anyhow::bail!("Could not start speaking '{}'", phrase.text);
    }

    let limit = async {
        match seconds {
            Some(s) => tokio::time::sleep(Duration::from_secs(s)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("⏹️ Interrupted"),
        _ = limit => info!("⏱️ Time limit reached"),
        // The engine failing ends the session on its own
        _ = state.wait_for(|s| s.is_idle()) => warn!("Announcement ended"),
    }

    announcer.teardown()?;
    drop(announcer);
    service.await?;
    Ok(())
}

async fn run_emergency(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    action: EmergencyAction,
) -> Result<()> {
    let mut alert = EmergencyAlert::new(config, notifier);

    match action {
        EmergencyAction::Contacts => {
            for contact in voiceaid::emergency::contact_order(alert.contacts()) {
                println!(
                    "{}. {} ({}) {}",
                    contact.priority, contact.name, contact.relation, contact.phone
                );
            }
        }
        EmergencyAction::Medical => {
            for line in alert.medical_info().summary() {
                println!("{}", line);
            }
        }
        EmergencyAction::Trigger => {
            alert.trigger()?;
            tokio::select! {
                _ = alert.wait_contacted() => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            info!(
                "📞 {} contacts notified in {}",
                alert.contacted(),
                alert.elapsed_display()
            );
            alert.cancel();
        }
        EmergencyAction::Call { id } => {
            let contact = alert.call(&id)?;
            println!("{} {}", contact.name, contact.phone);
        }
    }
    Ok(())
}

async fn run_therapy(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    action: TherapyAction,
) -> Result<()> {
    let mut session = TherapySession::new(notifier);

    match action {
        TherapyAction::List => {
            for (i, exercise) in session.exercises().iter().enumerate() {
                println!(
                    "{}. [{:<12}] {:<18} {}",
                    i + 1,
                    exercise.difficulty.label(),
                    exercise.category,
                    exercise.text
                );
            }
        }
        TherapyAction::Listen { number } => {
            let text = session.select(number)?.text.clone();
            let (events, mut inbox) = EventSender::channel();
            let engine = tts::create_engine(config, events).await?;
            therapy::listen(
                engine.as_ref(),
                &mut inbox,
                &text,
                VoiceSettings::from_config(config),
            )
            .await?;
        }
        TherapyAction::Score { number, spoken } => {
            session.select(number)?;
            let accuracy = session.score(&spoken);
            session.finish_attempt();
            let (position, total) = session.position();
            println!("Exercise {} of {}: {}", position, total, session.exercise().text);
            println!("Accuracy: {}% ({})", accuracy, session.rating().label());
        }
    }
    Ok(())
}

fn run_mood(config: &Config, notifier: Arc<dyn Notifier>, action: MoodAction) -> Result<()> {
    let mut log = MoodLog::open(PathBuf::from(&config.mood_log_path), notifier)?;

    match action {
        MoodAction::Log { emotion } => {
            let emotion: Emotion = emotion.parse()?;
            log.log_manual(emotion)?;
        }
        MoodAction::Check => {
            let reading = log.placeholder_reading(&mut rand::thread_rng())?;
            println!("{} ({}%)", reading.emotion.label(), reading.confidence);
        }
        MoodAction::History => {
            for reading in log.history() {
                println!(
                    "{}  {:<8} {:>3}%",
                    reading.timestamp.format("%Y-%m-%d %H:%M"),
                    reading.emotion.label(),
                    reading.confidence
                );
            }
            if let Some(average) = log.average() {
                println!("Average: {:.1}", average);
            }
            println!("Trend: {}", mood::format_trend(log.trend()));
        }
    }
    Ok(())
}
