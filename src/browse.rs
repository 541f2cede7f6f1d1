//! Interactive line-based front end for a [`SearchSession`]
//!
//! Each input line replaces the search term. `:n`/`:next` advances to the
//! next clip and `:q`/`:quit` leaves. Fetches run as separate tasks and
//! report back over a channel, so typing never waits on the network.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::client::{FetchError, SegmentSource};
use crate::segment::Segment;
use crate::session::{Outcome, RequestToken, SearchRequest, SearchSession};

type Response = (RequestToken, Result<Vec<Segment>, FetchError>);

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Term(String),
    Next,
    Quit,
}

impl Input {
    /// Commands tolerate surrounding whitespace; search terms are kept as typed
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":n" | ":next" => Input::Next,
            ":q" | ":quit" => Input::Quit,
            _ => Input::Term(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Drives a session from an input stream and renders every change to `output`
pub struct Browser<W> {
    session: SearchSession,
    source: Arc<dyn SegmentSource>,
    output: W,
    responses_tx: mpsc::UnboundedSender<Response>,
    responses_rx: mpsc::UnboundedReceiver<Response>,
    in_flight: usize,
}

impl<W: AsyncWrite + Unpin> Browser<W> {
    pub fn new(source: Arc<dyn SegmentSource>, output: W) -> Self {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Self {
            session: SearchSession::new(source.variant()),
            source,
            output,
            responses_tx,
            responses_rx,
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Run until `:q` or until input ends and every outstanding fetch has answered
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        let mut input_open = true;

        self.render().await?;

        loop {
            if !input_open && self.in_flight == 0 {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) => {
                        if !self.handle_input(Input::parse(&line)).await? {
                            break;
                        }
                    }
                    None => input_open = false,
                },
                Some((token, result)) = self.responses_rx.recv() => {
                    self.handle_response(token, result).await?;
                }
                else => break,
            }
        }

        self.output.flush().await?;
        Ok(())
    }

    /// Apply one input line; returns `false` when the user asked to quit
    pub async fn handle_input(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Quit => return Ok(false),
            Input::Next => self.session.next(),
            Input::Term(term) => {
                if let Some(request) = self.session.set_search_term(term) {
                    self.spawn_fetch(request);
                }
            }
        }
        self.render().await?;
        Ok(true)
    }

    pub async fn handle_response(
        &mut self,
        token: RequestToken,
        result: Result<Vec<Segment>, FetchError>,
    ) -> Result<()> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match self.session.apply(token, result) {
            Outcome::Stale | Outcome::Ignored => Ok(()),
            Outcome::Replaced(_) | Outcome::Failed => self.render().await,
        }
    }

    fn spawn_fetch(&mut self, request: SearchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.responses_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = source.fetch(&request.term).await;
            if tx.send((request.token, result)).is_err() {
                debug!("Browser closed before response {:?} arrived", request.token);
            }
        });
    }

    async fn render(&mut self) -> Result<()> {
        let frame = format!("{}\n{}", "─".repeat(40), self.session.view());
        self.output.write_all(frame.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}
