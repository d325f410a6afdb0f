use std::io::{self, BufRead, Write};

use crate::config::Settings;
use crate::report;

const HELP: &str = "\
Commands:
  parse <sentence>   parse a sentence (a bare sentence works too)
  reload             reload lexicon files
  help               show this message
  exit               quit";

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Empty,
    Exit,
    Help,
    Reload,
    Parse(&'a str),
}

fn parse_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => ReplCommand::Empty,
        "exit" | "quit" if rest.is_empty() => ReplCommand::Exit,
        "help" | "?" if rest.is_empty() => ReplCommand::Help,
        "reload" if rest.is_empty() => ReplCommand::Reload,
        "parse" => ReplCommand::Parse(rest),
        _ => ReplCommand::Parse(line),
    }
}

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut grammar = settings.grammar()?;
    let lexica: Vec<&str> = grammar.registry().ids().collect();
    println!("🌏 Code-switching parser ({})", lexica.join(", "));
    println!("{HELP}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Exit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Reload => match settings.grammar() {
                Ok(fresh) => {
                    grammar = fresh;
                    println!("🔄 Reloaded {} lexica", grammar.registry().len());
                }
                Err(e) => println!("❌ Reload failed, keeping previous lexica: {e:#}"),
            },
            ReplCommand::Parse("") => println!("Usage: parse <sentence>"),
            ReplCommand::Parse(sentence) => match report::parse_and_render(sentence, &grammar, settings) {
                Ok(text) => print!("{text}"),
                Err(e) => println!("❌ {e:#}"),
            },
        }
    }

    Ok(())
}
