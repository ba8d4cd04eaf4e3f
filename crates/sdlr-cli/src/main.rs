mod grammars;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use grammars::Bundled;
use sdlr::{dfa::DFA, grammar::Grammar, table::LRTable};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The bundled grammar to work on.
    #[arg(short, long, value_enum, default_value_t = Bundled::Calculator)]
    grammar: Bundled,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the symbols and the nullable, FIRST and FOLLOW sets.
    Sets,
    /// Print the LR(1) automaton with its row assignment.
    Automaton,
    /// Print the synthesized parse table.
    Table,
    /// Parse whitespace-separated words and print the resulting tree.
    Eval {
        /// The input, e.g. `3 * ( 4 + 56 )`.
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let grammar = args
        .grammar
        .grammar()
        .with_context(|| anyhow::anyhow!("failed to define the grammar {:?}", args.grammar))?;

    match &args.command {
        Command::Sets => print_sets(&grammar),
        Command::Automaton => print!("{}", render_automaton(&grammar)?),
        Command::Table => {
            let table = LRTable::generate(&grammar).context("failed to synthesize the table")?;
            print!("{}", table.display());
        }
        Command::Eval { input } => {
            let table = LRTable::generate(&grammar).context("failed to synthesize the table")?;
            let tokens = input.split_whitespace().map(|word| {
                let kind = args
                    .grammar
                    .classify(word, &grammar)
                    .ok_or_else(|| format!("unknown word `{}'", word))?;
                Ok::<_, String>((kind, word))
            });
            let tree = table.parse(tokens).context("failed to evaluate the input")?;
            println!("{}", tree);
        }
    }

    Ok(())
}

fn render_automaton(g: &Grammar) -> anyhow::Result<String> {
    let dfa = DFA::generate(g).context("failed to build the automaton")?;
    Ok(format!(
        "{}\n{} nodes merged into {} rows\n",
        dfa.display(g),
        dfa.len(),
        dfa.num_rows()
    ))
}

fn print_sets(g: &Grammar) {
    println!("## grammar");
    print!("{}", g);

    println!("\n## symbols");
    println!(
        "alphabet: {}",
        join(g.alphabet().iter().map(|s| g.symbol_name(*s)))
    );
    println!("terminals: {}", join(g.terminals().map(|(_, n)| n)));
    println!("nonterminals: {}", join(g.nonterminals().map(|(_, n)| n)));
    println!(
        "nullables: {}",
        join(g.nullables().iter().map(|n| g.nonterminal_name(*n)))
    );

    println!("\n## FIRST");
    for (n, set) in g.first_sets().iter() {
        println!("{}: {}", g.nonterminal_name(n), set.display(g));
    }

    println!("\n## FOLLOW");
    for (n, set) in g.follow_sets().iter() {
        println!("{}: {}", g.nonterminal_name(n), set.display(g));
    }
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" ")
}
