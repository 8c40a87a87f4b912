//! Terminal playback of a saved graph.
//!
//! Choices come either from a scripted list (`--choices 2,1,b`) or from
//! stdin, one per line. Choices are numbered from 1 and `b` steps back.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use cq_core::{FsStore, Node, sanitize_name};
use cq_logic::VariableStore;
use cq_runtime::{DialogueSession, EntryPoint, RuntimeError, SessionConfig};

/// Where the next player input comes from.
enum Input {
    Scripted(std::vec::IntoIter<String>),
    Stdin(io::Lines<io::StdinLock<'static>>),
}

impl Input {
    fn next_line(&mut self) -> Option<String> {
        match self {
            Self::Scripted(choices) => {
                let choice = choices.next()?;
                println!("  > {choice}");
                Some(choice)
            }
            Self::Stdin(lines) => {
                print!("  > ");
                let _ = io::stdout().flush();
                lines.next()?.ok()
            }
        }
    }
}

/// One parsed line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Choose(usize),
    Back,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "b" | "back" => Some(Command::Back),
        "q" | "quit" => Some(Command::Quit),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map(Command::Choose),
    }
}

pub fn run(
    dir: &Path,
    graph_name: &str,
    node: Option<&str>,
    choices: Option<Vec<String>>,
    max_steps: usize,
) -> Result<(), String> {
    let mut session = DialogueSession::with_store(VariableStore::new(), SessionConfig::default());
    session
        .load_graph(&FsStore::new(dir), graph_name)
        .map_err(|e| e.to_string())?;

    let file = sanitize_name(graph_name);
    let entry = match node {
        Some(name) => {
            let graph = session
                .graph(&file)
                .ok_or_else(|| format!("graph not loaded: \"{file}\""))?;
            let id = super::find_node(graph, name)?;
            let node_name = graph.node(id).map(|n| n.name.clone()).unwrap_or_default();
            EntryPoint::node(file, node_name)
        }
        None => EntryPoint::graph(file),
    };

    let mut input = match choices {
        Some(choices) => Input::Scripted(choices.into_iter()),
        None => Input::Stdin(io::stdin().lock().lines()),
    };

    let first = session.start_entry(entry).map_err(|e| e.to_string())?;
    print_node(first);

    for _ in 0..max_steps {
        let Some(current) = session.current() else {
            return Err("dialogue lost its current node".into());
        };

        // Nodes with a single way forward advance on their own.
        if current.choices.len() <= 1 {
            match session.advance(0).map_err(|e| e.to_string())? {
                Some(next) => print_node(next),
                None => {
                    println!("  {}", "(end)".dimmed());
                    return Ok(());
                }
            }
            continue;
        }

        print_choices(current);
        let Some(line) = input.next_line() else {
            return Ok(());
        };

        match parse_command(&line) {
            Some(Command::Choose(index)) => match session.advance(index) {
                Ok(Some(next)) => print_node(next),
                Ok(None) => {
                    println!("  {}", "(end)".dimmed());
                    return Ok(());
                }
                Err(RuntimeError::InvalidChoiceIndex { count, .. }) => {
                    println!("  Pick a choice between 1 and {count}.");
                }
                Err(e) => return Err(e.to_string()),
            },
            Some(Command::Back) => match session.go_back().map_err(|e| e.to_string())? {
                Some(previous) => print_node(previous),
                None => println!("  Nothing to go back to."),
            },
            Some(Command::Quit) => return Ok(()),
            None => println!("  Unrecognized input: \"{}\"", line.trim()),
        }
    }

    println!("  (stopped after {max_steps} steps)");
    Ok(())
}

fn print_node(node: &Node) {
    println!();
    println!("  {}", node.name.bold());
    for line in node.text.lines() {
        println!("  {}", line.trim());
    }
}

fn print_choices(node: &Node) {
    for (i, choice) in node.choices.iter().enumerate() {
        println!("    {}. {}", i + 1, choice.text);
    }
}
