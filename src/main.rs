use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blog::app::{self, AppState, Command, NotificationKind};
use blog::{Config, Language, PostDraft};

#[derive(Parser)]
#[command(name = "blog")]
#[command(about = "Render and publish bilingual blog posts")]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = "blog.toml")]
    config: PathBuf,

    /// Log at info level (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a markdown file to HTML
    Render {
        /// Input markdown file
        input: PathBuf,

        /// Output HTML file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the post list as HTML, newest first
    List {
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Print one post as HTML
    Show {
        id: u64,

        #[arg(long)]
        lang: Option<Language>,
    },
    /// Publish a new post to the saved-posts file
    Publish(PublishArgs),
}

#[derive(Args)]
struct PublishArgs {
    /// Admin code from the config's [admin] section
    #[arg(long)]
    code: String,

    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    title_zh: String,

    /// Markdown file with the post body
    #[arg(long)]
    content_file: PathBuf,

    /// Markdown file with the Chinese body
    #[arg(long)]
    content_zh_file: Option<PathBuf>,

    #[arg(long, default_value = "")]
    excerpt: String,

    #[arg(long, default_value = "")]
    excerpt_zh: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    tags: String,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render { input, output } => render(&input, output.as_deref()),
        Commands::List { lang } => {
            let state = load_state(&cli.config, lang)?;
            println!("{}", app::render_post_list(&state));
            Ok(())
        }
        Commands::Show { id, lang } => {
            let mut state = load_state(&cli.config, lang)?;
            state.dispatch(Command::ShowPost(id))?;
            let html = app::render_post(&state, id).context("post vanished after lookup")?;
            println!("{html}");
            Ok(())
        }
        Commands::Publish(args) => publish(&cli.config, args),
    }
}

fn load_state(config_path: &Path, lang: Option<Language>) -> anyhow::Result<AppState> {
    let config = Config::load(config_path)?;
    let mut state = AppState::from_config(&config);
    if let Some(lang) = lang {
        state.language = lang;
    }
    Ok(state)
}

fn render(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let markdown = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let html = blog::translate(&markdown);

    match output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Created {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn publish(config_path: &Path, args: PublishArgs) -> anyhow::Result<()> {
    let mut state = load_state(config_path, None)?;

    let content = fs::read_to_string(&args.content_file)
        .with_context(|| format!("reading {}", args.content_file.display()))?;
    let content_zh = match &args.content_zh_file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => String::new(),
    };

    state.dispatch(Command::OpenAdmin)?;
    for note in state.dispatch(Command::SubmitCode(args.code))? {
        if note.kind == NotificationKind::Error {
            bail!(note.message);
        }
    }

    let draft = PostDraft {
        title: args.title,
        title_zh: args.title_zh,
        content,
        content_zh,
        excerpt: args.excerpt,
        excerpt_zh: args.excerpt_zh,
        tags: args.tags,
    };
    for note in state.dispatch(Command::Publish(draft))? {
        eprintln!("{}", note.message);
    }
    Ok(())
}
