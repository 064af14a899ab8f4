//! Epigraph CLI: the `epigraph` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands, QueueCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            store,
            index,
            queue,
            out,
            json,
        } => commands::apply::run(store, index, queue, out, json),

        Commands::Search {
            query,
            facet,
            page,
            per_page,
            store,
            index,
            queue,
            json,
        } => commands::search::run(commands::search::Args {
            query,
            facet,
            page,
            per_page,
            store,
            index,
            queue,
            json,
        }),

        Commands::Tag {
            item,
            add,
            remove,
            creator,
            store,
            index,
            queue,
            json,
        } => commands::tag::run(commands::tag::Args {
            item,
            add,
            remove,
            creator,
            store,
            index,
            queue,
            json,
        }),

        Commands::Queue { command } => match command {
            QueueCommands::List { store, queue, json } => {
                commands::queue::run_list(store, queue, json)
            }
            QueueCommands::Check {
                store,
                index,
                queue,
                json,
            } => commands::queue::run_check(store, index, queue, json),
        },
    }
}
