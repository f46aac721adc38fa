use clap::{Parser, Subcommand};
use lazyrunner_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::{iter, thread};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lazyrunner")]
#[command(about = "Training companion for runners: mobility, strengthening and weekly planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or update the profile
    Profile {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New level (débutant, intermédiaire, avancé)
        #[arg(long)]
        level: Option<String>,
    },

    /// List catalog exercises with their preference marker
    Exercises {
        /// Only one session type (mobility, strengthening)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Cycle the preference of an exercise (white → green → red → white)
    Cycle {
        /// Exercise id, e.g. mob_1
        id: String,
    },

    /// Clear every exercise preference
    ResetPreferences,

    /// Weekly training plan
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },

    /// Training alerts
    Alert {
        #[command(subcommand)]
        action: AlertCommand,
    },

    /// Run a guided session
    Session {
        /// mobility or strengthening
        kind: String,

        /// Countdown per mobility exercise
        #[arg(long)]
        exercise_seconds: Option<u32>,

        /// Rest after each strengthening exercise
        #[arg(long)]
        rest_seconds: Option<u32>,

        /// Lengthen the countdown (exercise or rest) by this many 15 s steps
        #[arg(long, value_name = "STEPS", default_value_t = 0)]
        longer: u32,

        /// Shorten the countdown (exercise or rest) by this many 15 s steps
        #[arg(long, value_name = "STEPS", default_value_t = 0)]
        shorter: u32,

        /// Run without waiting for the clock, validating automatically (for testing)
        #[arg(long)]
        simulate: bool,

        /// Do not log the session
        #[arg(long)]
        dry_run: bool,
    },

    /// This week's sessions against the weekly plan
    Stats,

    /// Show recent sessions of the current profile
    History {
        /// Window in days
        #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
        days: i64,

        /// Also write the listed sessions to a CSV file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Forget the current profile; the next command starts a fresh one
    Logout,
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Show the whole week
    Show,

    /// Replace the plan of one day
    Set {
        /// lundi .. dimanche
        day: String,

        #[arg(long)]
        running: bool,

        #[arg(long)]
        mobility: bool,

        #[arg(long)]
        strengthening: bool,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum AlertCommand {
    /// Add an alert and schedule its notifications
    Add {
        day: String,

        /// HH:MM
        time: String,

        label: String,

        /// running, mobility or strengthening
        #[arg(long = "type", default_value = "running")]
        training_type: String,

        /// #RRGGBB; defaults to the training type's color
        #[arg(long)]
        color: Option<String>,
    },

    /// List alerts
    List {
        #[arg(long)]
        day: Option<String>,

        /// Order each day by time instead of creation
        #[arg(long)]
        sorted: bool,
    },

    /// Change fields of an alert
    Update {
        id: String,

        #[arg(long)]
        day: Option<String>,

        #[arg(long, conflicts_with = "position")]
        time: Option<String>,

        /// Place on the day bar instead of giving a time: 100 is 00:00, 0 is 23:59
        #[arg(long, value_name = "PERCENT")]
        position: Option<f64>,

        #[arg(long)]
        label: Option<String>,

        #[arg(long = "type")]
        training_type: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Delete an alert and cancel its notifications
    Remove { id: String },
}

/// Stores under the data directory
struct Paths {
    store: JsonStore,
    log: WorkoutLog,
}

impl Paths {
    fn new(data_dir: PathBuf) -> Self {
        let store = JsonStore::new(data_dir);
        Self {
            log: WorkoutLog::new(store.workouts_path()),
            store,
        }
    }
}

fn main() -> ExitCode {
    lazyrunner_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(data_dir);

    // Older installs only have preferences.json; a failed migration must not block startup
    if let Err(e) = paths
        .store
        .migrate_legacy_preferences(&config.profile.default_name)
    {
        tracing::warn!("Legacy preferences migration failed: {}", e);
    }

    match cli.command {
        Commands::Profile { name, level } => cmd_profile(&paths, &config, name, level),
        Commands::Exercises { kind } => cmd_exercises(&paths, &config, kind),
        Commands::Cycle { id } => cmd_cycle(&paths, &config, &id),
        Commands::ResetPreferences => {
            paths
                .store
                .update_profile(&config.profile.default_name, |p| {
                    p.reset_preferences();
                    Ok(())
                })?;
            println!("✓ Preferences reset");
            Ok(())
        }
        Commands::Plan { action } => cmd_plan(&paths, &config, action),
        Commands::Alert { action } => cmd_alert(&paths, action),
        Commands::Session {
            kind,
            exercise_seconds,
            rest_seconds,
            longer,
            shorter,
            simulate,
            dry_run,
        } => {
            let session_type: SessionType = kind.parse()?;
            let mut settings = SessionSettings::from(&config);
            if let Some(seconds) = exercise_seconds {
                settings.exercise_seconds = seconds;
            }
            if let Some(seconds) = rest_seconds {
                settings.rest_seconds = seconds;
            }
            let adjusted = match session_type {
                SessionType::Mobility => &mut settings.exercise_seconds,
                SessionType::Strengthening => &mut settings.rest_seconds,
            };
            *adjusted = adjust_duration(*adjusted, longer, shorter);
            cmd_session(&paths, &config, session_type, settings, simulate, dry_run)
        }
        Commands::Stats => cmd_stats(&paths, &config),
        Commands::History { days, export } => cmd_history(&paths, &config, days, export),
        Commands::Logout => {
            if paths.store.logout()? {
                println!("✓ Logged out");
            } else {
                println!("No profile to log out");
            }
            Ok(())
        }
    }
}

/// Step a duration the way the duration picker does, floored at zero
fn adjust_duration(seconds: u32, longer: u32, shorter: u32) -> u32 {
    let mut setter = Timer::setter(seconds);
    for _ in 0..longer {
        setter.increment();
    }
    for _ in 0..shorter {
        setter.decrement();
    }
    setter.seconds()
}

fn cmd_profile(
    paths: &Paths,
    config: &Config,
    name: Option<String>,
    level: Option<String>,
) -> Result<()> {
    let level = level.map(|l| l.parse::<Level>()).transpose()?;

    let (profile, ()) = paths.store.update_profile(&config.profile.default_name, |p| {
        if let Some(ref name) = name {
            p.rename(name)?;
        }
        if let Some(level) = level {
            p.set_level(level);
        }
        Ok(())
    })?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROFIL");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Name:   {}", profile.name);
    println!("  Level:  {}", profile.level);
    println!("  Since:  {}", profile.created_at.format("%Y-%m-%d"));
    println!("  Marked: {} exercises", profile.exercise_preferences.len());
    println!();
    Ok(())
}

fn cmd_exercises(paths: &Paths, config: &Config, kind: Option<String>) -> Result<()> {
    let kinds = match kind {
        Some(k) => vec![k.parse::<SessionType>()?],
        None => vec![SessionType::Mobility, SessionType::Strengthening],
    };

    let catalog = get_default_catalog();
    let profile = paths.store.load_profile_or_default(&config.profile.default_name);

    for session_type in kinds {
        println!("\n{}", session_type.to_string().to_uppercase());
        for annotated in profile.annotate(catalog.by_session_type(session_type)) {
            let exercise = &annotated.exercise;
            let reps = reps_for_level(exercise, profile.level)
                .map(|r| format!("  ({} reps)", r))
                .unwrap_or_default();
            println!(
                "  {} {:<6} {}{}",
                annotated.preference.marker(),
                exercise.id(),
                exercise.name(),
                reps
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_cycle(paths: &Paths, config: &Config, id: &str) -> Result<()> {
    let exercise = get_default_catalog()
        .get(id)
        .ok_or_else(|| Error::UnknownExercise(id.to_string()))?;

    let (_, preference) = paths
        .store
        .update_profile(&config.profile.default_name, |p| Ok(p.cycle_preference(id)))?;

    println!("{} {} ({})", preference.marker(), exercise.name(), preference);
    Ok(())
}

fn cmd_plan(paths: &Paths, config: &Config, action: PlanCommand) -> Result<()> {
    match action {
        PlanCommand::Show => {
            let profile = paths.store.load_profile_or_default(&config.profile.default_name);
            for day in Weekday::ALL {
                let plan = profile.weekly_plan.day(day);
                let planned: Vec<String> = TrainingType::ALL
                    .iter()
                    .filter(|t| plan.includes(**t))
                    .map(|t| format!("{} {}", t.emoji(), t.label()))
                    .collect();
                let summary = if planned.is_empty() {
                    "-".to_string()
                } else {
                    planned.join(", ")
                };
                match plan.notes {
                    Some(ref notes) => println!("{:<9} {}  ({})", day.as_str(), summary, notes),
                    None => println!("{:<9} {}", day.as_str(), summary),
                }
            }
            Ok(())
        }
        PlanCommand::Set {
            day,
            running,
            mobility,
            strengthening,
            notes,
        } => {
            let day: Weekday = day.parse()?;
            let plan = DayPlan {
                running,
                mobility,
                strengthening,
                notes: notes.filter(|n| !n.trim().is_empty()),
            };
            paths.store.update_profile(&config.profile.default_name, |p| {
                p.weekly_plan.set_day(day, plan);
                Ok(())
            })?;
            println!("✓ Plan updated for {}", day);
            Ok(())
        }
    }
}

fn cmd_alert(paths: &Paths, action: AlertCommand) -> Result<()> {
    let mut alerts = AlertStore::new(paths.store.load_alerts()?);
    let now = chrono::Local::now().naive_local();

    match action {
        AlertCommand::Add {
            day,
            time,
            label,
            training_type,
            color,
        } => {
            let training_type: TrainingType = training_type.parse()?;
            let color = color.unwrap_or_else(|| training_type.default_color().to_string());
            let alert = alerts.add_alert(
                day.parse()?,
                time.parse()?,
                &label,
                &color,
                training_type,
            )?;
            paths.store.save_alerts(alerts.alerts())?;

            let mut notifier = OutboxNotifier::open(paths.store.notifications_path());
            if notifier.request_permission() {
                notifications::schedule_alert(&mut notifier, &alert, now);
            } else {
                tracing::warn!("Notification permission denied; alert saved without reminders");
            }

            println!("✓ Alert added: {}", alert.id);
        }
        AlertCommand::List { day, sorted } => {
            let days = match day {
                Some(d) => vec![d.parse::<Weekday>()?],
                None => Weekday::ALL.to_vec(),
            };
            for day in days {
                let listed = if sorted {
                    alerts.chronological_alerts_for_day(day)
                } else {
                    alerts.alerts_for_day(day)
                };
                for alert in listed {
                    println!(
                        "{:<9} {} {:>3.0}% {} {} [{}] {}",
                        day.as_str(),
                        alert.time,
                        time_to_position(alert.time),
                        alert.training_type.emoji(),
                        alert.label,
                        alert.color,
                        alert.id
                    );
                }
            }
        }
        AlertCommand::Update {
            id,
            day,
            time,
            position,
            label,
            training_type,
            color,
        } => {
            let id = parse_alert_id(&id)?;
            let time = match position {
                Some(position) => Some(position_to_time(position)),
                None => time.map(|t| t.parse()).transpose()?,
            };
            let update = AlertUpdate {
                day: day.map(|d| d.parse()).transpose()?,
                time,
                label,
                color,
                training_type: training_type.map(|t| t.parse()).transpose()?,
            };
            let alert = alerts.update_alert(id, update)?;
            paths.store.save_alerts(alerts.alerts())?;

            let mut notifier = OutboxNotifier::open(paths.store.notifications_path());
            notifications::schedule_alert(&mut notifier, &alert, now);

            println!("✓ Alert updated: {} {} {}", alert.day, alert.time, alert.label);
        }
        AlertCommand::Remove { id } => {
            let id = parse_alert_id(&id)?;
            let removed = alerts.remove_alert(id)?;
            paths.store.save_alerts(alerts.alerts())?;

            let mut notifier = OutboxNotifier::open(paths.store.notifications_path());
            notifications::cancel_alert(&mut notifier, removed.id);

            println!("✓ Alert removed: {}", removed.label);
        }
    }

    Ok(())
}

fn parse_alert_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| Error::AlertNotFound(id.to_string()))
}

fn cmd_session(
    paths: &Paths,
    config: &Config,
    session_type: SessionType,
    settings: SessionSettings,
    simulate: bool,
    dry_run: bool,
) -> Result<()> {
    if settings.exercise_seconds == 0 || settings.rest_seconds == 0 {
        return Err(Error::Config("session durations must be greater than 0".into()));
    }

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    // A logged session needs a profile that outlives this run
    let profile = if dry_run {
        paths.store.load_profile_or_default(&config.profile.default_name)
    } else {
        paths
            .store
            .update_profile(&config.profile.default_name, |_| Ok(()))?
            .0
    };
    let exercises = profile.eligible_exercises(catalog.by_session_type(session_type));
    let mut session = Session::start(session_type, exercises, settings)?;

    display_header(&session);

    let level = profile.level;
    let mut observer = |session: &Session, event: &SessionEvent| {
        display_event(session, event, level, simulate);
    };

    let outcome = if simulate {
        let script = simulated_script(&session);
        drive(&mut session, script, &mut observer)
    } else {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::every_second(tx.clone());
        spawn_input_reader(tx);

        let outcome = drive(&mut session, rx.iter(), &mut observer);
        drop(ticker);
        outcome
    };

    if outcome.is_none() {
        for event in session.stop_session() {
            display_event(&session, &event, level, simulate);
        }
    }

    let record = match session.record(profile.id) {
        Some(record) => record,
        None => return Err(Error::Other("session did not finish".into())),
    };

    println!();
    println!("  Temps total: {}", format_seconds(record.elapsed_seconds));
    println!(
        "  Exercices:   {}/{}",
        record.exercises_done, record.exercises_total
    );

    if dry_run {
        println!("\n[Dry run - not logging session]");
        return Ok(());
    }

    paths.log.record(&record)?;
    println!("\n✓ Session logged!");
    Ok(())
}

/// Events a user would produce: mobility just lets time run, strengthening
/// validates each exercise immediately and rests in full
fn simulated_script(session: &Session) -> Vec<DriverEvent> {
    let settings = session.settings();
    let count = session.exercises().len();

    match session.session_type() {
        SessionType::Mobility => {
            vec![DriverEvent::Tick; settings.exercise_seconds as usize * count]
        }
        SessionType::Strengthening => (0..count)
            .flat_map(|_| {
                iter::once(DriverEvent::Validate)
                    .chain(iter::repeat(DriverEvent::Tick).take(settings.rest_seconds as usize))
            })
            .collect(),
    }
}

/// Enter validates, `p` pauses or resumes, `q` stops; closing stdin stops as well
fn spawn_input_reader(sink: mpsc::Sender<DriverEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let event = match line {
                Ok(ref input) if input.trim().eq_ignore_ascii_case("q") => DriverEvent::Stop,
                Ok(ref input) if input.trim().eq_ignore_ascii_case("p") => {
                    DriverEvent::TogglePause
                }
                Ok(_) => DriverEvent::Validate,
                Err(_) => break,
            };
            if sink.send(event).is_err() || event == DriverEvent::Stop {
                return;
            }
        }
        let _ = sink.send(DriverEvent::Stop);
    });
}

fn display_header(session: &Session) {
    let title = match session.session_type() {
        SessionType::Mobility => "MOBILITÉ",
        SessionType::Strengthening => "RENFORCEMENT",
    };
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SÉANCE {}", title);
    println!("╰─────────────────────────────────────────╯");

    let settings = session.settings();
    let count = session.exercises().len() as u32;
    match session.session_type() {
        SessionType::Mobility => {
            let total = Timer::display(settings.exercise_seconds.saturating_mul(count));
            let each = Timer::display(settings.exercise_seconds);
            println!("  Durée totale:       {}", total.format());
            println!("  Temps par exercice: {}", each.format());
            println!("  'p' + Enter to pause, 'q' + Enter to stop");
        }
        SessionType::Strengthening => {
            let rest = Timer::display(settings.rest_seconds);
            println!("  Séries totales:     {}", count);
            println!("  Temps de repos:     {}", rest.format());
            println!("  Enter when the exercise is done, 'q' + Enter to stop");
            println!("  'p' + Enter pauses the rest");
        }
    }
}

fn display_event(session: &Session, event: &SessionEvent, level: Level, quiet_ticks: bool) {
    match event {
        SessionEvent::ExerciseStarted { index } => {
            let exercise = &session.exercises()[*index];
            println!();
            println!(
                "  [{}/{}] {}",
                index + 1,
                session.exercises().len(),
                exercise.name()
            );
            println!("  {}", exercise.description());
            match reps_for_level(exercise, level) {
                Some(reps) => println!("  → {} reps", reps),
                None => println!(
                    "  → {}",
                    format_seconds(session.settings().exercise_seconds)
                ),
            }
        }
        SessionEvent::RestStarted { seconds, .. } => {
            println!("\n  Repos: {}", format_seconds(*seconds));
        }
        SessionEvent::CountdownToggled { running } => {
            if *running {
                println!("\n  ▶  Reprise");
            } else {
                println!("\n  ⏸  Pause");
            }
        }
        SessionEvent::Tick(snapshot) => {
            if quiet_ticks {
                return;
            }
            let countdown = snapshot
                .countdown_remaining
                .map(|s| format!("  ⏳ {}", format_seconds(s)))
                .unwrap_or_default();
            print!(
                "\r  ⏱  {}{}    ",
                format_seconds(snapshot.elapsed_seconds),
                countdown
            );
            let _ = io::stdout().flush();
        }
        SessionEvent::Finished(outcome) => {
            println!();
            match outcome {
                Outcome::Completed => println!("\n✓ Séance terminée !"),
                Outcome::Aborted => println!("\n✗ Séance interrompue"),
            }
        }
    }
}

fn cmd_stats(paths: &Paths, config: &Config) -> Result<()> {
    let profile = paths.store.load_profile_or_default(&config.profile.default_name);
    let entries = paths.log.entries_for(profile.id)?;
    let stats = weekly_stats(&entries, &profile.weekly_plan, &chrono::Local::now());

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CETTE SEMAINE (depuis le {})", stats.week_start.format("%d/%m"));
    println!("╰─────────────────────────────────────────╯");
    println!();
    for (session_type, training) in [
        (SessionType::Mobility, TrainingType::Mobility),
        (SessionType::Strengthening, TrainingType::Strengthening),
    ] {
        let totals = stats.for_type(session_type);
        let aborted = if totals.aborted > 0 {
            format!("  ({} interrompue(s))", totals.aborted)
        } else {
            String::new()
        };
        println!(
            "  {} {:<13} {} / {} séances{}",
            training.emoji(),
            training.label(),
            totals.completed,
            totals.planned,
            aborted
        );
    }

    let days: Vec<&str> = stats.training_days.iter().map(|d| d.as_str()).collect();
    println!();
    println!("  Temps actif: {} min", stats.active_minutes());
    println!(
        "  Jours:       {}",
        if days.is_empty() { "-".to_string() } else { days.join(", ") }
    );
    println!();
    Ok(())
}

fn cmd_history(
    paths: &Paths,
    config: &Config,
    days: i64,
    export: Option<PathBuf>,
) -> Result<()> {
    let profile = paths.store.load_profile_or_default(&config.profile.default_name);
    let entries = paths.log.recent_for(profile.id, chrono::Utc::now(), days)?;

    if let Some(path) = export {
        let file = std::fs::File::create(&path)?;
        let written = export_csv(&entries, file)?;
        println!("✓ Exported {} sessions to {}", written, path.display());
    }

    if entries.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {:<13} {:<9} {}  {}/{}",
            entry
                .started_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            entry.session_type.as_str(),
            entry.outcome.to_string(),
            format_seconds(entry.elapsed_seconds),
            entry.exercises_done,
            entry.exercises_total
        );
    }

    let total_seconds: u64 = entries.iter().map(|e| u64::from(e.elapsed_seconds)).sum();
    println!();
    println!("  {} sessions, {} min", entries.len(), total_seconds / 60);
    Ok(())
}
