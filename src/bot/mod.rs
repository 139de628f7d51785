//! Telegram bot module - commands, plan generation and workout reminders

pub mod parsers;
pub mod render;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use teloxide::{prelude::*, types::ChatId, utils::command::BotCommands};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{Database, SetLog};
use crate::planner::Planner;
use crate::progression;
use crate::tips;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type Subscribers = Arc<Mutex<HashSet<ChatId>>>;
type Db = Arc<Mutex<Database>>;

/// How often the reminder loop compares plans against the clock.
const REMINDER_TICK_SECS: u64 = 30;

/// Replies to /ask are cut to this length, like the rest of the coach's
/// short-answer surface.
const MAX_ASK_REPLY_CHARS: usize = 500;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Bot commands:")]
pub enum Command {
    #[command(description = "Start")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Generate a weekly plan, e.g. /plan 3 days strength")]
    Plan(String),
    #[command(description = "Log a set: /log Bench 3x5 @ 60kg RPE7")]
    Log(String),
    #[command(description = "Today's session")]
    Today,
    #[command(description = "Training statistics")]
    Stats,
    #[command(description = "Ask the coach a question")]
    Ask(String),
    #[command(description = "Set your timezone, e.g. /timezone Europe/Berlin")]
    Timezone(String),
    #[command(description = "Enable workout reminders")]
    Remind,
    #[command(description = "Disable workout reminders")]
    Stop,
}

/// Start the Telegram bot with the reminder loop.
pub async fn run_bot(token: String, db_path: &str) -> anyhow::Result<()> {
    let bot = Bot::new(token);
    let config = Config::from_env();
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set: /plan and /ask will be degraded");
    }
    let catalog = Arc::new(Catalog::load_bundled()?);
    info!(exercises = catalog.len(), "catalog loaded");

    let planner = Arc::new(Planner::new(&config, catalog));
    let db: Db = Arc::new(Mutex::new(Database::open(db_path)?));
    let subscribers: Subscribers = Arc::new(Mutex::new(HashSet::new()));

    // Reminder background task
    let reminder_bot = bot.clone();
    let reminder_db = db.clone();
    let reminder_subs = subscribers.clone();
    tokio::spawn(async move {
        reminder_task(reminder_bot, reminder_db, reminder_subs).await;
    });

    let handler = dptree::entry().branch(
        Update::filter_message()
            .filter_command::<Command>()
            .endpoint(handle_command),
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![db, planner, subscribers])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Background task that pings subscribers when a planned session starts.
async fn reminder_task(bot: Bot, db: Db, subscribers: Subscribers) {
    info!("Reminder task started (tick: {} seconds)", REMINDER_TICK_SECS);
    let mut sent: HashSet<(ChatId, String)> = HashSet::new();

    loop {
        tokio::time::sleep(Duration::from_secs(REMINDER_TICK_SECS)).await;

        let now = Local::now();
        let weekday = now.format("%a").to_string();
        let hhmm = now.format("%H:%M").to_string();
        let slot = format!("{} {}", now.format("%Y-%m-%d"), hhmm);

        let subs: Vec<ChatId> = subscribers.lock().await.iter().copied().collect();
        for chat_id in subs {
            let plan = match db.lock().await.get_plan(chat_id.0) {
                Ok(plan) => plan,
                Err(e) => {
                    error!("Failed to load plan for {}: {}", chat_id, e);
                    continue;
                }
            };
            let Some(plan) = plan else { continue };
            let Some(day) = plan.day_for(&weekday) else { continue };
            if day.time != hhmm || !sent.insert((chat_id, slot.clone())) {
                continue;
            }

            let tip = tips::random_tip();
            let text = format!(
                "⏰ Workout time!\n\n{}\n{} {}",
                render::day_block(day),
                tip.category.emoji(),
                tip.text
            );
            if let Err(e) = bot.send_message(chat_id, text).await {
                error!("Failed to send reminder to {}: {}", chat_id, e);
            }
        }

        // The dedup set only needs to cover the current minute.
        if sent.len() > 10_000 {
            sent.clear();
        }
    }
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: Db,
    planner: Arc<Planner>,
    subscribers: Subscribers,
) -> HandlerResult {
    // Channel posts and the like carry no sender; ignore them.
    let Some(user_id) = msg.from.as_ref().map(|u| u.id.0 as i64) else {
        return Ok(());
    };

    match cmd {
        Command::Start => {
            db.lock().await.ensure_user(user_id)?;
            let text = "🏋️ repcoach\n\n\
                Your AI fitness coach.\n\n\
                /plan <request> - generate a weekly plan\n\
                /log <exercise> 3x5 @ 60kg - record a set\n\
                /today - today's session\n\
                /stats - training statistics\n\
                /ask <question> - ask the coach\n\
                /remind - workout reminders";
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }

        Command::Plan(request) => {
            let request = request.trim().to_string();
            if request.is_empty() {
                bot.send_message(
                    msg.chat.id,
                    "Tell me what you want, e.g. /plan 3 days per week, 45 min, dumbbells only",
                )
                .await?;
                return Ok(());
            }

            bot.send_message(msg.chat.id, "⏳ Building your plan, give me a moment...")
                .await?;

            // Snapshot what we need, then release the lock for the LLM
            // round trips. A second /plan racing this one is resolved by
            // last-writer-wins on the plan row.
            let (timezone, existing) = {
                let db = db.lock().await;
                (db.user_tz(user_id)?, db.get_plan(user_id)?)
            };

            match planner.generate_schedule(&request, &timezone, existing.as_ref()).await {
                Ok(plan) => {
                    db.lock().await.upsert_plan(user_id, &plan)?;
                    bot.send_message(msg.chat.id, render::plan_message(&plan)).await?;
                    info!("User {} got a new plan ({} days)", user_id, plan.days.len());
                }
                Err(e) => {
                    error!("Plan generation failed for {}: {}", user_id, e);
                    bot.send_message(msg.chat.id, e.user_message()).await?;
                }
            }
        }

        Command::Log(entry) => {
            let Some(set) = parsers::parse_set(&entry) else {
                bot.send_message(msg.chat.id, "Format: /log Bench 3x5 @ 60kg RPE7").await?;
                return Ok(());
            };

            let (history, rendered) = {
                let db = db.lock().await;
                db.log_set(&SetLog {
                    id: None,
                    tg_user_id: user_id,
                    exercise: set.exercise.clone(),
                    sets: set.sets,
                    reps: set.reps,
                    weight_kg: set.weight_kg,
                    rpe: set.rpe,
                    is_warmup: false,
                    logged_at: Utc::now(),
                })?;
                let history = db.last_sets_for_exercise(user_id, &set.exercise, 3)?;
                let rpe = set
                    .rpe
                    .map(|r| format!(" RPE{}", render::fmt_num(r)))
                    .unwrap_or_default();
                let rendered = format!(
                    "✅ Logged: {} {}x{} @ {}kg{}",
                    set.exercise,
                    set.sets,
                    set.reps,
                    render::fmt_num(set.weight_kg),
                    rpe
                );
                (history, rendered)
            };

            let text = format!("{rendered}\n{}", load_suggestion(&history, set.reps));
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Today => {
            let plan = db.lock().await.get_plan(user_id)?;
            let weekday = Local::now().format("%a").to_string();
            bot.send_message(msg.chat.id, render::today_message(plan.as_ref(), &weekday))
                .await?;
        }

        Command::Stats => {
            let sets = db.lock().await.sets_for_user(user_id)?;
            bot.send_message(msg.chat.id, render::stats_message(&sets, Utc::now()))
                .await?;
        }

        Command::Ask(question) => {
            let question = question.trim().to_string();
            if question.is_empty() {
                bot.send_message(msg.chat.id, "Ask me anything, e.g. /ask how often should I deadlift?")
                    .await?;
                return Ok(());
            }
            let answer = match planner.client().completion(&question).await {
                Ok(mut answer) => {
                    if answer.chars().count() > MAX_ASK_REPLY_CHARS {
                        answer = answer.chars().take(MAX_ASK_REPLY_CHARS).collect::<String>() + "...";
                    }
                    answer
                }
                Err(e) => {
                    warn!("Ask fell back to canned advice: {}", e);
                    tips::fallback_advice().to_string()
                }
            };
            bot.send_message(msg.chat.id, answer).await?;
        }

        Command::Timezone(tz) => {
            let tz = tz.trim().to_string();
            if tz.is_empty() || tz.len() > 64 || tz.contains(char::is_whitespace) {
                bot.send_message(msg.chat.id, "Usage: /timezone Europe/Berlin").await?;
                return Ok(());
            }
            db.lock().await.set_user_tz(user_id, &tz)?;
            bot.send_message(msg.chat.id, format!("🌍 Timezone set to {tz}")).await?;
        }

        Command::Remind => {
            let mut subs = subscribers.lock().await;
            subs.insert(msg.chat.id);
            bot.send_message(
                msg.chat.id,
                "✅ Reminders on! I'll ping you when a planned session starts.\n/stop - disable",
            )
            .await?;
            info!("User {} subscribed to reminders", msg.chat.id);
        }

        Command::Stop => {
            let was_subscribed = subscribers.lock().await.remove(&msg.chat.id);
            if was_subscribed {
                bot.send_message(msg.chat.id, "🔕 Reminders off.\n/remind - enable again").await?;
                info!("User {} unsubscribed from reminders", msg.chat.id);
            } else {
                bot.send_message(msg.chat.id, "Reminders are already off.\n/remind - enable").await?;
            }
        }
    }

    Ok(())
}

/// Follow-up line after a logged set: either a next-load suggestion or a
/// deload hint when the weight has stalled for consecutive sessions.
fn load_suggestion(history: &[SetLog], rep_goal: i32) -> String {
    let Some(latest) = history.first() else {
        return String::new();
    };

    let mut stalls = 0;
    for pair in history.windows(2) {
        if pair[0].weight_kg <= pair[1].weight_kg {
            stalls += 1;
        } else {
            break;
        }
    }
    if progression::should_deload(stalls) {
        return "📉 Stalled for a few sessions - consider dropping ~10% and building back up."
            .to_string();
    }

    let next = progression::next_load(Some(latest.weight_kg), true, rep_goal);
    format!("Next time try {} kg.", render::fmt_num(next))
}
