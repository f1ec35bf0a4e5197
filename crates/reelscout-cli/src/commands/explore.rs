//! Line-driven explorer over a live feed.
//!
//! Every plain line replaces the contents of the search box, so typing
//! `d`, `du`, `dune` on successive lines behaves like keystrokes: only the
//! last one survives the debounce. Lines starting with `:` are commands.
//! A render task redraws whenever the feed publishes a new snapshot.

use super::auth::restore_auth;
use super::render;
use crate::boundary;
use crate::output::Output;
use color_eyre::Result;
use reelscout_config::Config;
use reelscout_core::{DetailController, FeedController, FeedMode, FeedSettings, FeedView, FilterChange};
use reelscout_models::{ImageSize, MediaKind, SortOrder};
use reelscout_sources::TmdbClient;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const HELP: &str = "\
Type to search; each line replaces the search box.
  :enter            run the search now
  :pick N           choose suggestion N
  :blur / :focus    leave or return to the search box
  :genre ID|none    filter by genre
  :year YYYY|none   filter by release year
  :rating N|none    minimum rating
  :sort KEY         popularity.desc, vote_average.desc, release_date.desc, title.asc, ...
  :clear            drop all filters
  :more             scroll to the bottom (loads the next page)
  :scroll PX        sentinel is PX away from the viewport
  :kind movie|series
  :open N           show details for row N
  :help
  :quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ExploreCommand {
    Type(String),
    Enter,
    Pick(usize),
    Blur,
    Focus,
    Filter(FilterChange),
    Clear,
    Scroll(u32),
    Kind(MediaKind),
    Open(usize),
    Help,
    Quit,
}

fn optional<T: std::str::FromStr>(arg: &str) -> Result<Option<T>, String> {
    if arg.eq_ignore_ascii_case("none") || arg.is_empty() {
        return Ok(None);
    }
    arg.parse::<T>()
        .map(Some)
        .map_err(|_| format!("'{}' is not a valid value", arg))
}

/// 1-based row number from the user into a 0-based index.
fn row_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("'{}' is not a row number", arg)),
    }
}

impl ExploreCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let Some(command) = line.strip_prefix(':') else {
            return Ok(ExploreCommand::Type(line.to_string()));
        };
        let (name, arg) = command
            .trim()
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((command.trim(), ""));

        match name {
            "enter" | "search" => Ok(ExploreCommand::Enter),
            "pick" => row_index(arg).map(ExploreCommand::Pick),
            "blur" => Ok(ExploreCommand::Blur),
            "focus" => Ok(ExploreCommand::Focus),
            "genre" => optional(arg).map(|g| ExploreCommand::Filter(FilterChange::Genre(g))),
            "year" => optional(arg).map(|y| ExploreCommand::Filter(FilterChange::Year(y))),
            "rating" => optional(arg).map(|r| ExploreCommand::Filter(FilterChange::MinRating(r))),
            "sort" => arg
                .parse::<SortOrder>()
                .map(|s| ExploreCommand::Filter(FilterChange::Sort(s))),
            "clear" => Ok(ExploreCommand::Clear),
            "more" => Ok(ExploreCommand::Scroll(0)),
            "scroll" => arg
                .parse::<u32>()
                .map(ExploreCommand::Scroll)
                .map_err(|_| format!("'{}' is not a distance", arg)),
            "kind" => arg
                .parse::<MediaKind>()
                .map(ExploreCommand::Kind)
                .map_err(|e| e.to_string()),
            "open" => row_index(arg).map(ExploreCommand::Open),
            "help" | "?" => Ok(ExploreCommand::Help),
            "quit" | "q" | "exit" => Ok(ExploreCommand::Quit),
            other => Err(format!("Unknown command ':{}' (try :help)", other)),
        }
    }
}

/// What was last drawn, so identical snapshots are not redrawn.
#[derive(Debug, Clone, PartialEq, Default)]
struct Frame {
    feed: Option<(FeedMode, String, u32, Vec<u64>, Option<String>)>,
    suggestions: Vec<u64>,
}

impl Frame {
    fn of(view: &FeedView) -> Self {
        let feed = (!view.loading).then(|| {
            (
                view.mode,
                view.search_text.trim().to_string(),
                view.page,
                view.items.iter().map(|i| i.id).collect(),
                view.error.as_ref().map(|e| e.to_string()),
            )
        });
        Self {
            feed,
            suggestions: view.visible_suggestions().iter().map(|i| i.id).collect(),
        }
    }
}

fn spawn_renderer(mut updates: watch::Receiver<FeedView>, output: Output) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = Frame::default();
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            let frame = Frame::of(&view);

            if frame.feed.is_some() && frame.feed != last.feed {
                boundary::guarded("feed", &output, || render::render_feed(&view, &output));
                last.feed = frame.feed;
            }
            if frame.suggestions != last.suggestions {
                if !frame.suggestions.is_empty() {
                    output.println("Suggestions:");
                    boundary::guarded("suggestions", &output, || {
                        render::render_suggestions(view.visible_suggestions(), &output)
                    });
                }
                last.suggestions = frame.suggestions;
            }
        }
    })
}

pub async fn run_explore(config: &Config, kind: MediaKind, output: &Output) -> Result<()> {
    let client = super::catalog(config)?;
    let feed = FeedController::new(client.clone(), kind, FeedSettings::from(&config.feed));
    let details = DetailController::new(client.clone());
    let (_, auth) = restore_auth()?;

    match auth.session() {
        Some(session) => output.info(format!("Signed in as {}. Type :help for commands.", session.user)),
        None => output.info("Type :help for commands."),
    }

    let renderer = spawn_renderer(feed.subscribe(), *output);
    feed.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ExploreCommand::parse(line.trim_end()) {
            Ok(command) => command,
            Err(e) => {
                output.warn(e);
                continue;
            }
        };
        if command == ExploreCommand::Quit {
            break;
        }
        dispatch(command, &feed, &details, &client, output).await;
    }

    renderer.abort();
    Ok(())
}

/// Fetching commands run on their own task so input keeps flowing while a
/// request is in flight; the render task shows the outcome.
async fn dispatch(
    command: ExploreCommand,
    feed: &FeedController,
    details: &DetailController,
    client: &Arc<TmdbClient>,
    output: &Output,
) {
    let feed = feed.clone();
    match command {
        ExploreCommand::Type(text) => feed.set_search_term(&text).await,
        ExploreCommand::Enter => {
            tokio::spawn(async move { feed.search().await });
        }
        ExploreCommand::Pick(index) => {
            if feed.view().visible_suggestions().get(index).is_none() {
                output.warn("No such suggestion");
                return;
            }
            tokio::spawn(async move { feed.select_suggestion(index).await });
        }
        ExploreCommand::Blur => feed.blur(),
        ExploreCommand::Focus => feed.focus(),
        ExploreCommand::Filter(change) => {
            tokio::spawn(async move { feed.set_filter(change).await });
        }
        ExploreCommand::Clear => {
            tokio::spawn(async move { feed.clear_filters().await });
        }
        ExploreCommand::Scroll(distance) => {
            let view = feed.view();
            if !view.sentinel_attached {
                output.info(if view.mode == FeedMode::Search {
                    "Search results are a single page"
                } else {
                    "Nothing more to load"
                });
                return;
            }
            if distance > feed.settings().scroll_threshold {
                output.info("Keep scrolling...");
                return;
            }
            tokio::spawn(async move { feed.sentinel_visible(distance).await });
        }
        ExploreCommand::Kind(kind) => {
            tokio::spawn(async move { feed.set_kind(kind).await });
        }
        ExploreCommand::Open(index) => {
            let view = feed.view();
            let Some(item) = view.items.get(index) else {
                output.warn("No such row");
                return;
            };
            let (kind, id) = (item.kind, item.id);
            let details = details.clone();
            let client = client.clone();
            let output = *output;
            tokio::spawn(async move {
                details.load(kind, id).await;
                let view = details.view();
                // A newer :open may have replaced this one
                if view.target != Some((kind, id)) {
                    return;
                }
                match (&view.details, &view.error) {
                    (Some(d), _) => {
                        let poster = d
                            .poster_path
                            .as_deref()
                            .map(|p| client.image_url(ImageSize::W342, p));
                        boundary::guarded("details", &output, || {
                            render::render_details(d, poster.as_deref(), &output)
                        });
                    }
                    (None, Some(e)) => output.error(format!("Failed to load details: {}", e)),
                    (None, None) => {}
                }
            });
        }
        ExploreCommand::Help => output.println(HELP),
        ExploreCommand::Quit => {}
    }
}
