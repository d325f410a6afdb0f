mod config;
mod repl;
mod report;

use clap::{Parser, Subcommand};

use crate::config::{Options, Settings};

#[derive(Parser)]
#[command(author, version, about = "Parses code-switched sentences into binary-branching trees")]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one sentence and exit
    Parse {
        #[arg(required = true)]
        sentence: Vec<String>,
    },
    /// Interactive shell (the default)
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.options.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let settings = Settings::resolve(&cli.options)?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Parse { sentence } => {
            let grammar = settings.grammar()?;
            print!("{}", report::parse_and_render(&sentence.join(" "), &grammar, &settings)?);
            Ok(())
        }
        Command::Repl => repl::run(&settings),
    }
}
