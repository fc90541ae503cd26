use clap::Parser;
use dirs::home_dir;
use log::{debug, info};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use rlambd::{
    cli::{Args, Commands},
    environment::Env,
    error::Result,
    extensions::ResultExtensions,
    grammar::load_grammar,
    parser::parse,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    runtime::{interpret, Value},
    tokenizer::tokenize,
};
use std::{fs, path::PathBuf};

fn load_grammar_resource(path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = path {
        let rules = load_grammar(&path)?;
        info!("loaded {} grammar rules from {:?}", rules.len(), path);
    }
    Ok(())
}

fn report(outcomes: Vec<Result<Option<Value>>>) {
    for outcome in outcomes {
        match outcome {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(err) => eprintln!("{}", err),
        }
    }
}

fn run_file(file: PathBuf, grammar: Option<PathBuf>) -> Result<()> {
    load_grammar_resource(grammar)?;

    let source = fs::read_to_string(file)?;

    let tokens = tokenize(&source)?;
    let program = parse(&tokens)?;

    let env = Env::new();
    report(interpret(&program, &env));

    Ok(())
}

fn check_file(file: PathBuf, grammar: Option<PathBuf>) -> Result<()> {
    load_grammar_resource(grammar)?;

    let source = fs::read_to_string(file)?;

    let tokens = tokenize(&source)?;
    dbg!(&tokens);

    let program = parse(&tokens)?;
    dbg!(&program);

    Ok(())
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".rlambd_history"))
        .and_then(|path| FileBackedHistory::with_file(20, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let prompt = REPLPrompt;

    // One environment for the whole session, so definitions persist
    let env = Env::new();

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                Result::pure(())
                    .and_then(|_| tokenize(&buffer))
                    .and_then(|tokens| parse(&tokens))
                    .map(|program| {
                        report(interpret(&program, &env));
                    })
                    .inspect_err(|err| {
                        eprintln!("{}", err);
                    })
                    .ok();
            }
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Run { file, grammar } => {
            info!("FILE MODE");
            debug!("file: {:?}", file);

            run_file(file, grammar)
                .inspect_err(|err| {
                    eprintln!("{}", err);
                })
                .ok();
        }
        Commands::Check { file, grammar } => {
            info!("CHECK MODE");
            debug!("file: {:?}", file);

            check_file(file, grammar)
                .inspect_err(|err| {
                    eprintln!("{}", err);
                })
                .ok();
        }
        Commands::Repl => {
            info!("REPL MODE");

            run_repl()
                .inspect_err(|err| {
                    eprintln!("{}", err);
                })
                .ok();
        }
    }
    Ok(())
}
