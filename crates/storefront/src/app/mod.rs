use std::{sync::Arc, time::Duration};

use catalog::{ApiClient, FileSlots, FilterStore, SearchController};
use futures::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::{
    commands::{self, Command},
    config::AppConfig,
    error::Result,
    view::{self, TerminalView},
};

type Controller = SearchController<ApiClient, FileSlots, TerminalView>;

pub struct App {
    controller: Controller,
}

impl App {
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = ApiClient::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .token(config.token.as_deref())
            .build()?;
        let store = FilterStore::new(FileSlots::new(&config.state_path));
        let controller = SearchController::new(Arc::new(client), store, TerminalView);
        Ok(Self { controller })
    }

    pub async fn run(&self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Reads commands while requests are in flight.
    ///
    /// Queries and category fetches run in `pending`; input keeps being read,
    /// so a second submit can overtake the first. Quit drops whatever is still
    /// running, end of input waits for it.
    async fn run_with<R: AsyncBufRead + Unpin>(&self, input: R) -> Result<()> {
        let mut pending: FuturesUnordered<BoxFuture<'_, ()>> = FuturesUnordered::new();

        let start = self.controller.start();
        pending.push(
            async move {
                let report = start.await;
                tracing::debug!(
                    "session ready (categories: {:?}, search: {:?})",
                    report.categories.as_ref().ok(),
                    report.search
                );
            }
            .boxed(),
        );
        println!("{}", view::format_filter(&self.controller.filter()));

        let mut lines = input.lines();
        loop {
            tokio::select! {
                Some(()) = pending.next(), if !pending.is_empty() => {}
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        while pending.next().await.is_some() {}
                        break;
                    };
                    match commands::parse(&line) {
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(command)) => {
                            if let Some(task) = self.handle(command) {
                                pending.push(task);
                            }
                        }
                        Ok(None) => {}
                        Err(message) => eprintln!("{}", view::format_error(&message)),
                    }
                }
            }
        }

        drop(pending);
        self.controller.flush().await;
        Ok(())
    }

    /// Runs a command. Commands that talk to the server come back as a task
    /// for the caller to drive.
    fn handle(&self, command: Command) -> Option<BoxFuture<'_, ()>> {
        match command {
            Command::Edit(edit) => {
                self.controller.edit(edit);
                None
            }
            Command::Submit => {
                let search = self.controller.submit();
                Some(
                    async move {
                        search.await;
                    }
                    .boxed(),
                )
            }
            Command::Categories => Some(
                async move {
                    let _ = self.controller.refresh_categories().await;
                }
                .boxed(),
            ),
            Command::Filter => {
                println!("{}", view::format_filter(&self.controller.filter()));
                None
            }
            Command::Help => {
                println!("{}", commands::HELP);
                None
            }
            Command::Quit => None,
        }
    }
}
