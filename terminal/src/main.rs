//! postwall terminal
//!
//! Reads the post feed from the configured document store and prints it.
//! Pressing enter scrolls past the last post, which loads the next page.
//! Configuration comes from environment variables (see `Config`).

mod command;
mod render;
mod viewport;

use std::sync::Arc;

use anyhow::{Context, Result};
use postwall_feed::adapters::{FirestoreFeedRepository, StaticIdentity};
use postwall_feed::app::{PostDraft, PostService};
use postwall_feed::{Config, FeedLoader};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use command::{Command, HELP};
use render::FeedPrinter;
use viewport::TerminalViewport;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is the feed
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,postwall_feed=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        project = %config.firestore_project_id,
        collection = %config.collection,
        page_size = config.page_size,
        "Starting postwall"
    );

    let repo = Arc::new(FirestoreFeedRepository::from_config(&config));
    let viewport = Arc::new(TerminalViewport::new());
    let (loader, feed) = FeedLoader::new(Arc::clone(&repo), Arc::clone(&viewport), config.page_size);
    let loader_task = tokio::spawn(loader.run());
    let posts = PostService::new(repo, Arc::new(StaticIdentity::from_config(&config)));

    println!("{}\n", HELP);
    feed.mount();

    let mut views = feed.subscribe();
    let mut printer = FeedPrinter::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                for block in printer.show(&view) {
                    println!("{}", block);
                }
                if view.is_drained() {
                    println!("(all loaded posts were deleted, press enter to load more)");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Command::More => {
                        // No sentinel left once deletions drain the list
                        if !viewport.scroll_to_bottom() {
                            if feed.view().is_drained() {
                                feed.load_more();
                            } else {
                                println!("(nothing more to load)");
                            }
                        }
                    }
                    Command::Retry => feed.retry(),
                    Command::Refresh => {
                        printer.clear();
                        feed.refresh();
                    }
                    Command::Post(body) => {
                        let draft = PostDraft {
                            body,
                            ..Default::default()
                        };
                        match posts.create(draft).await {
                            Ok(item) => {
                                println!("Posted {}", item.id);
                                printer.clear();
                                feed.refresh();
                            }
                            Err(e) => println!("Could not post: {}", e),
                        }
                    }
                    Command::Delete(id) => {
                        let target = feed
                            .item_props()
                            .into_iter()
                            .find(|props| props.id().as_str() == id);
                        match target {
                            Some(props) => match posts.delete_from_feed(&props).await {
                                Ok(()) => println!("Deleted {}", id),
                                Err(e) => println!("Could not delete {}: {}", id, e),
                            },
                            None => println!("No post {} in the feed", id),
                        }
                    }
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                    Command::Unknown(input) => println!("Unknown command: {} (type `help`)", input),
                }
            }
        }
    }

    feed.unmount();
    loader_task.await.context("Feed loader panicked")?;

    Ok(())
}
