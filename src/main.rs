use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::Level;

use lyra::{ANSWER_SLOTS, CategoryFilter, Config, FormState, Mode, Session, TargetAi, export};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Turn rough ideas into optimized prompts")]
struct Cli {
    /// Path to a TOML config file (default: ./lyra.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive form (default)
    Form,

    /// Assemble a prompt once and print it
    Build {
        /// The rough idea (defaults to the template's idea when --template is given)
        #[arg(long)]
        rough: Option<String>,

        /// Target assistant (default from config: ChatGPT)
        #[arg(long, value_enum)]
        target: Option<TargetAi>,

        /// Prompt style (default from config: DETAIL)
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Clarifying answer, in slot order (up to three)
        #[arg(long = "answer", value_name = "TEXT")]
        answers: Vec<String>,

        /// Max length / tokens constraint
        #[arg(long, default_value = "")]
        max_length: String,

        /// Special instructions (style guides, constraints)
        #[arg(long, default_value = "")]
        extras: String,

        /// Start from the starter template with this ID
        #[arg(long, value_name = "ID")]
        template: Option<i64>,

        /// Do not append this run to the session history
        #[arg(long)]
        no_save: bool,

        /// Also write optimized_prompt.txt and optimized_prompt.md
        #[arg(long)]
        export: bool,
    },

    /// List starter templates
    Templates {
        /// Only show templates in this category ("All" for every category)
        #[arg(long, default_value = "All")]
        category: String,
    },

    /// Show the most recent session history rows
    History {
        /// Number of rows (default from config: 20)
        #[arg(long)]
        rows: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Command::Form);

    let interactive = matches!(command, Command::Form);
    init_tracing(cli.verbose, interactive, config.log_file.as_deref())?;

    let session = Session::open(&config);

    match command {
        Command::Form => {
            lyra::ui::run(&session, &config.defaults).context("terminal form failed")?;
        }
        Command::Build {
            rough,
            target,
            mode,
            answers,
            max_length,
            extras,
            template,
            no_save,
            export: write_files,
        } => {
            if answers.len() > ANSWER_SLOTS {
                bail!(
                    "at most {ANSWER_SLOTS} answers are supported, got {}",
                    answers.len()
                );
            }

            let mut form = FormState::new(&config.defaults);
            if let Some(id) = template {
                let Some(template) = session.templates().get(id) else {
                    bail!("no template with ID {id}");
                };
                form.apply_template(template);
            }
            if let Some(rough) = rough {
                form.rough_idea = rough;
            }
            form.target_ai = target.unwrap_or(form.target_ai);
            form.mode = mode.unwrap_or(form.mode);
            for (slot, answer) in form.answer_inputs.iter_mut().zip(answers) {
                *slot = answer;
            }
            form.max_length = max_length;
            form.extra_instructions = extras;
            form.auto_save = form.auto_save && !no_save;

            // No rough idea means no output, not an error.
            let render = session.render(&form);
            if render.optimized.is_empty() {
                tracing::info!("rough idea is empty, nothing to assemble");
                return Ok(());
            }
            println!("{}", render.optimized);

            if let Some(Err(e)) = render.saved {
                eprintln!("warning: {:#}", anyhow::Error::from(e));
            }
            if write_files {
                for path in export::export_all(session.export_dir(), &render.optimized)? {
                    eprintln!("wrote {}", path.display());
                }
            }
        }
        Command::Templates { category } => {
            let store = session.templates();
            if let Some(error) = session.templates_error() {
                bail!("templates unavailable: {error}");
            }
            if store.is_empty() {
                println!(
                    "No templates found. You can add {} later.",
                    session.templates_path().display()
                );
                return Ok(());
            }

            let categories = store.categories();
            println!("Categories: All, {}", categories.join(", "));
            let filter = CategoryFilter::from(category.as_str());
            for template in store.filter_by_category(&filter) {
                println!("{:>4}  {}", template.id, template.label());
                if !template.tags.is_empty() {
                    println!("      tags: {}", template.tags);
                }
                if !template.suggested_questions.is_empty() {
                    println!("      questions: {}", template.suggested_questions);
                }
            }
        }
        Command::History { rows } => {
            let rows = session
                .log()
                .tail(rows.unwrap_or(session.history_rows()))
                .context("cannot show session history")?;
            if rows.is_empty() {
                println!("No sessions saved yet. Enable auto-save to log runs.");
            }
            for row in rows {
                println!(
                    "{}  {:<7}  {:<6}  {:>5} chars  {}",
                    row.timestamp,
                    row.target_ai,
                    row.mode,
                    row.optimized_length,
                    row.rough_idea.lines().next().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber.
///
/// Commands log to stderr. The interactive form owns the terminal, so it
/// logs to the configured file or not at all.
fn init_tracing(
    verbose: u8,
    interactive: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    if !interactive {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file '{}'", path.display()))?;
        tracing_subscriber::fmt()
            .with_max_level(level.max(Level::INFO))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}
