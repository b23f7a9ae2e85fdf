use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use tomodoro::audio::CuePlayer;
use tomodoro::stats::{load_statistics, StatsPeriod, StatsView};
use tomodoro::timer::{format_clock, Severity, TimerEvent, TimerMode, TimerPhase};
use tomodoro::{
    ApiClient, HttpApi, SettingsStore, TaskBoard, Theme, TimerController, DEFAULT_BASE_URL,
};

fn settings_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tomodoro");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("settings.json"))
}

fn mode_name(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Work => "work",
        TimerMode::ShortBreak => "short break",
        TimerMode::LongBreak => "long break",
    }
}

fn badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[ok]",
        Severity::Error => "[!!]",
        Severity::Info => "[--]",
    }
}

/// Seconds rendered the way the dashboard shows work time: `47m 05s`, or
/// just `32s` under a minute.
fn format_work_seconds(total: u64) -> String {
    let minutes = total / 60;
    let seconds = total % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

fn print_stats(view: &StatsView) {
    if view.synthetic {
        println!("(backend unreachable — showing sample data)");
    }
    let width = view
        .series
        .labels
        .iter()
        .map(|l| l.len())
        .max()
        .unwrap_or(0);
    println!("{:width$}  {:>8}  {:>4}  {:>4}", "", "minutes", "full", "half");
    for i in 0..view.series.len() {
        println!(
            "{:width$}  {:>8.1}  {:>4}  {:>4}",
            view.series.labels[i],
            view.series.minute_totals[i],
            view.series.full_counts[i],
            view.series.half_counts[i],
        );
    }
    let summary = &view.summary;
    println!(
        "total {} · {} full · {} half · avg {:.0}m per {}",
        format_work_seconds((summary.total_work_minutes * 60.0).round().max(0.0) as u64),
        summary.full_pomodoros,
        summary.half_pomodoros,
        summary.average_minutes,
        match view.period {
            StatsPeriod::Monthly => "month",
            _ => "day",
        },
    );
    match &summary.best_bucket {
        Some(best) => println!("best: {best}"),
        None => println!("best: -"),
    }
    for rollup in &view.task_rollups {
        println!(
            "  {} — {} full / {} half, {}",
            rollup.task_text,
            rollup.full_pomodoros,
            rollup.half_pomodoros,
            format_work_seconds((rollup.total_minutes * 60.0).round().max(0.0) as u64),
        );
    }
}

async fn print_tasks(board: &TaskBoard) {
    let tasks = board.tasks().await;
    if tasks.is_empty() {
        println!("no tasks yet — add one with: add <text>");
        return;
    }
    let selected = board.selected().await;
    for task in tasks {
        let marker = if selected == Some(task.id) { ">" } else { " " };
        let done = if task.completed { "x" } else { " " };
        println!("{marker} [{done}] {:>3}  {}", task.id, task.text);
    }
}

const HELP: &str = "\
commands:
  start | stop | finish          drive the timer
  mode work|short|long           switch timer mode
  tasks                          list tasks
  add <text>                     create a task
  select <id> | done <id> | del <id>
  stats [daily|weekly|monthly]   show statistics
  volume [0-100]                 show or set cue volume
  theme light|dark               switch theme preference
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let base_url =
        std::env::var("TOMODORO_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let api: Arc<dyn ApiClient> = Arc::new(HttpApi::new(base_url.clone())?);
    let settings = Arc::new(SettingsStore::new(settings_path()?)?);

    println!("tomodoro — {base_url}");
    match api.current_user().await {
        Ok(Some(user)) => println!("signed in as {}", user.email),
        Ok(None) => println!("browsing as guest"),
        Err(err) => {
            warn!("could not check the account: {err}");
            println!("browsing as guest");
        }
    }

    let board = TaskBoard::new(api.clone());
    board.refresh().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let timer = TimerController::new(api.clone(), board.clone(), tx);

    // The host side of the side-effect contract: notices go to the screen,
    // cues go to the speaker, counters go under the clock.
    let cues = CuePlayer::new();
    let event_settings = settings.clone();
    tokio::spawn(async move {
        let mut last_phase: Option<TimerPhase> = None;
        while let Some(event) = rx.recv().await {
            match event {
                TimerEvent::StateChanged { state } => {
                    let phase_changed = last_phase != Some(state.phase);
                    last_phase = Some(state.phase);
                    // One line per minute is enough for a terminal.
                    if phase_changed
                        || state.remaining_seconds % 60 == 0
                        || state.remaining_seconds <= 5
                    {
                        println!(
                            "[{}] {} ({:?})",
                            format_clock(state.remaining_seconds),
                            mode_name(state.mode),
                            state.phase,
                        );
                    }
                }
                TimerEvent::Notice { notice } => {
                    println!("{} {}", badge(notice.severity), notice.message);
                }
                TimerEvent::Cue { cue } => {
                    if let Err(err) = cues.play(cue, event_settings.cue_gain()) {
                        log::debug!("cue skipped: {err}");
                    }
                }
                TimerEvent::TodayTotals {
                    full_pomodoros,
                    half_pomodoros,
                    work_seconds,
                } => {
                    println!(
                        "today: {full_pomodoros} full · {half_pomodoros} half · {}",
                        format_work_seconds(work_seconds)
                    );
                }
            }
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "start" => {
                let _ = timer.start().await; // failures arrive as notices
            }
            "stop" => timer.stop().await,
            "finish" => {
                let _ = timer.finish().await;
            }
            "mode" => match rest {
                "work" => timer.set_mode(TimerMode::Work).await,
                "short" => timer.set_mode(TimerMode::ShortBreak).await,
                "long" => timer.set_mode(TimerMode::LongBreak).await,
                _ => println!("usage: mode work|short|long"),
            },
            "tasks" => {
                board.refresh().await;
                print_tasks(&board).await;
            }
            "add" => match board.add(rest).await {
                Ok(task) => println!("added task {}", task.id),
                Err(err) => println!("{} {err}", badge(Severity::Error)),
            },
            "select" | "done" | "del" => match rest.parse::<i64>() {
                Ok(id) => match command {
                    "select" => {
                        if board.select(id).await {
                            println!("selected task {id}");
                        } else {
                            println!("task {id} cannot be selected");
                        }
                    }
                    "done" => match board.set_completed(id, true).await {
                        Ok(_) => println!("task {id} completed"),
                        Err(err) => println!("{} {err}", badge(Severity::Error)),
                    },
                    _ => match board.delete(id).await {
                        Ok(()) => println!("task {id} deleted"),
                        Err(err) => println!("{} {err}", badge(Severity::Error)),
                    },
                },
                Err(_) => println!("usage: {command} <id>"),
            },
            "stats" => {
                let period = if rest.is_empty() {
                    Ok(StatsPeriod::Daily)
                } else {
                    rest.parse::<StatsPeriod>()
                };
                match period {
                    Ok(period) => print_stats(&load_statistics(api.as_ref(), period).await),
                    Err(err) => println!("{err}"),
                }
            }
            "volume" => {
                if rest.is_empty() {
                    println!("volume: {}", settings.sound_volume());
                } else {
                    match rest.parse::<u8>() {
                        Ok(volume) => {
                            settings.set_sound_volume(volume)?;
                            println!("volume: {}", settings.sound_volume());
                        }
                        Err(_) => println!("usage: volume <0-100>"),
                    }
                }
            }
            "theme" => match rest {
                "light" => {
                    settings.set_theme(Theme::Light)?;
                    println!("theme: light");
                }
                "dark" => {
                    settings.set_theme(Theme::Dark)?;
                    println!("theme: dark");
                }
                _ => println!("usage: theme light|dark"),
            },
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try: help)"),
        }
    }

    Ok(())
}
