//! `browse`: interactive explorer on stdin.

use std::fmt::Write as _;
use std::io::Write as _;
use std::str::FromStr;

use bucketscope_core::listing::{DELIMITER, parent_path};
use bucketscope_core::loader::{HandleRegistry, ImageSlot, ResourceIdentity};
use bucketscope_core::navigation::{NavigationState, Navigator};
use bucketscope_core::scenes::ColumnPolicy;
use bucketscope_core::summary::SummaryService;
use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{list, scene_image};
use crate::render;

/// Tracing target for the interactive loop.
const TRACING_TARGET: &str = "bucketscope_cli::browse";

const HELP: &str = "\
Commands:
  ls                          show the current folder
  cd <folder>                 open a folder (`..` goes up, `/a/b/` is absolute)
  up                          parent folder
  root                        bucket root
  retry                       repeat the last listing
  scene <n>                   scene details and image
  gallery                     load every image of the folder
  summarize                   model-written overview of the scenes
  connect <bucket> <token> [path]
  disconnect
  help
  quit";

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Empty,
    List,
    Cd(String),
    Up,
    Root,
    Retry,
    Scene(usize),
    Gallery,
    Summarize,
    Connect {
        bucket: String,
        token: String,
        path: String,
    },
    Disconnect,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Empty);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("ls" | "list", []) => Self::List,
            ("cd", [".."]) | ("up", []) => Self::Up,
            ("cd", ["/"]) | ("root", []) => Self::Root,
            ("cd", [target]) => Self::Cd((*target).to_owned()),
            ("retry", []) => Self::Retry,
            ("scene", [index]) => Self::Scene(
                index
                    .parse()
                    .map_err(|_| format!("not a scene number: {index}"))?,
            ),
            ("gallery", []) => Self::Gallery,
            ("summarize" | "summary", []) => Self::Summarize,
            ("connect", [bucket, token]) => Self::Connect {
                bucket: (*bucket).to_owned(),
                token: (*token).to_owned(),
                path: String::new(),
            },
            ("connect", [bucket, token, path]) => Self::Connect {
                bucket: (*bucket).to_owned(),
                token: (*token).to_owned(),
                path: (*path).to_owned(),
            },
            ("disconnect", []) => Self::Disconnect,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit" | "q", []) => Self::Quit,
            _ => return Err(format!("unknown command: {line} (type `help`)")),
        };
        Ok(command)
    }
}

/// Target prefix of `cd` relative to `current`.
fn resolve_cd(current: &str, target: &str) -> String {
    let (base, target) = match target.strip_prefix(DELIMITER) {
        Some(absolute) => ("", absolute),
        None => (current, target),
    };
    let target = target.trim_end_matches(DELIMITER);
    if target.is_empty() {
        base.to_owned()
    } else {
        format!("{base}{target}{DELIMITER}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Session state of the interactive loop.
struct Browser {
    navigator: Navigator,
    summary: Option<SummaryService>,
    columns: ColumnPolicy,
    registry: HandleRegistry,
    gallery: Vec<ImageSlot>,
    detail: ImageSlot,
}

impl Browser {
    fn new(navigator: Navigator, summary: Option<SummaryService>, columns: ColumnPolicy) -> Self {
        let registry = HandleRegistry::new();
        let detail = ImageSlot::new(navigator.store().clone(), registry.clone());
        Self {
            navigator,
            summary,
            columns,
            registry,
            gallery: Vec::new(),
            detail,
        }
    }

    /// Releases every image handle held by the views.
    fn release_images(&mut self) {
        self.gallery.clear();
        self.detail.clear();
    }

    async fn apply(&mut self, command: BrowseCommand, out: &mut String) -> Flow {
        let navigation = match command {
            BrowseCommand::Empty => return Flow::Continue,
            BrowseCommand::Quit => return Flow::Quit,
            BrowseCommand::Help => {
                out.push_str(HELP);
                out.push('\n');
                return Flow::Continue;
            }
            BrowseCommand::List => {
                out.push_str(&list::page(&self.navigator, self.columns));
                return Flow::Continue;
            }
            BrowseCommand::Scene(index) => {
                self.show_scene(index, out).await;
                return Flow::Continue;
            }
            BrowseCommand::Gallery => {
                self.show_gallery(out).await;
                return Flow::Continue;
            }
            BrowseCommand::Summarize => {
                self.show_summary(out).await;
                return Flow::Continue;
            }
            BrowseCommand::Disconnect => {
                self.navigator.disconnect();
                self.release_images();
                out.push_str("Disconnected.\n");
                return Flow::Continue;
            }
            BrowseCommand::Connect {
                bucket,
                token,
                path,
            } => {
                self.release_images();
                self.navigator.authenticate(bucket, token, path).await.map(|_| ())
            }
            BrowseCommand::Retry => self.navigator.retry().await.map(|_| ()),
            BrowseCommand::Root => self.navigator.navigate("").await.map(|_| ()),
            BrowseCommand::Up => {
                let parent = parent_path(self.navigator.listed_path());
                self.navigator.navigate(parent).await.map(|_| ())
            }
            BrowseCommand::Cd(target) => {
                let path = resolve_cd(self.navigator.listed_path(), &target);
                self.navigator.navigate(path).await.map(|_| ())
            }
        };

        match navigation {
            Ok(()) => {
                // Images of the previous listing are no longer on screen.
                if self.navigator.state() == &NavigationState::Ready {
                    self.release_images();
                }
                out.push_str(&list::page(&self.navigator, self.columns));
            }
            Err(error) => {
                let _ = writeln!(out, "{}", error.display_message());
            }
        }
        Flow::Continue
    }

    async fn show_scene(&mut self, index: usize, out: &mut String) {
        let Some(record) = self.navigator.scenes().get(index) else {
            let _ = writeln!(
                out,
                "No scene #{index}: {} scene(s) here.",
                self.navigator.scenes().len()
            );
            return;
        };

        out.push_str(&render::scene_detail(index, record));
        match scene_image(&self.navigator, record) {
            Some(identity) => {
                let name = identity.name.clone();
                let state = self.detail.load(identity).await;
                out.push_str(&render::load_state(&name, state));
                out.push('\n');
            }
            None => self.detail.clear(),
        }
    }

    async fn show_gallery(&mut self, out: &mut String) {
        let Some(context) = self.navigator.context() else {
            out.push_str("Not connected.\n");
            return;
        };

        let identities: Vec<ResourceIdentity> = self
            .navigator
            .listing()
            .images()
            .map(|item| {
                ResourceIdentity::new(&context.bucket, &item.name, context.token.clone())
            })
            .collect();

        if identities.is_empty() {
            out.push_str("No images here.\n");
            return;
        }

        let store = self.navigator.store().clone();
        self.gallery
            .resize_with(identities.len(), || ImageSlot::new(store.clone(), self.registry.clone()));

        tracing::debug!(
            target: TRACING_TARGET,
            images = identities.len(),
            "Loading gallery"
        );

        let names: Vec<String> = identities.iter().map(|id| id.name.clone()).collect();
        let states = join_all(
            self.gallery
                .iter_mut()
                .zip(identities)
                .map(|(slot, identity)| slot.load(identity)),
        )
        .await;

        for (name, state) in names.iter().zip(states) {
            let label = name.rsplit(DELIMITER).next().unwrap_or(name);
            out.push_str(&render::load_state(label, state));
            out.push('\n');
        }
    }

    async fn show_summary(&mut self, out: &mut String) {
        let Some(summary) = &self.summary else {
            out.push_str("Summaries need GEMINI_API_KEY.\n");
            return;
        };

        match self.navigator.summarize(summary).await {
            Some(text) => {
                out.push_str(text);
                out.push('\n');
            }
            None => out.push_str("No scenes to summarize.\n"),
        }
    }
}

/// Runs the read-eval-print loop until `quit` or end of input.
pub async fn run(
    navigator: Navigator,
    summary: Option<SummaryService>,
    columns: ColumnPolicy,
) -> anyhow::Result<()> {
    let mut browser = Browser::new(navigator, summary, columns);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", list::page(&browser.navigator, browser.columns));
    println!("Type `help` for commands.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut out = String::new();
        let flow = match line.parse::<BrowseCommand>() {
            Ok(command) => browser.apply(command, &mut out).await,
            Err(message) => {
                out.push_str(&message);
                out.push('\n');
                Flow::Continue
            }
        };
        print!("{out}");

        if flow == Flow::Quit {
            break;
        }
    }

    browser.release_images();
    tracing::debug!(
        target: TRACING_TARGET,
        live_handles = browser.registry.live_count(),
        released = browser.registry.released_count(),
        "Browse session ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use bucketscope_core::mock::{MockObjectStore, MockTextGenerator};
    use bucketscope_core::store::ObjectStoreService;

    use super::*;

    fn store() -> MockObjectStore {
        MockObjectStore::new()
            .with_object(
                "demo",
                "shots/scenes.json",
                br#"[{"id":1,"image":"a.png"},{"id":2,"thumbnail":"b.jpg"}]"#.to_vec(),
                "application/json",
            )
            .with_object("demo", "shots/a.png", b"aa".to_vec(), "image/png")
            .with_object("demo", "shots/b.jpg", b"bbb".to_vec(), "image/jpeg")
            .with_object("demo", "shots/day2/c.png", b"c".to_vec(), "image/png")
    }

    async fn connected(mock: &MockObjectStore, summary: Option<SummaryService>) -> Browser {
        let mut navigator = Navigator::new(ObjectStoreService::new(mock.clone()));
        navigator.authenticate("demo", "token", "").await.unwrap();
        Browser::new(navigator, summary, ColumnPolicy::FirstRecord)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("".parse(), Ok(BrowseCommand::Empty));
        assert_eq!("cd ..".parse(), Ok(BrowseCommand::Up));
        assert_eq!("cd shots".parse(), Ok(BrowseCommand::Cd("shots".into())));
        assert_eq!("  scene 3 ".parse(), Ok(BrowseCommand::Scene(3)));
        assert_eq!(
            "connect b t p/".parse(),
            Ok(BrowseCommand::Connect {
                bucket: "b".into(),
                token: "t".into(),
                path: "p/".into()
            })
        );
        assert!("scene x".parse::<BrowseCommand>().is_err());
        assert!("dance".parse::<BrowseCommand>().is_err());
    }

    #[test]
    fn test_resolve_cd() {
        assert_eq!(resolve_cd("", "shots"), "shots/");
        assert_eq!(resolve_cd("shots/", "day2/"), "shots/day2/");
        assert_eq!(resolve_cd("shots/", "/other"), "other/");
        assert_eq!(resolve_cd("shots/", "/"), "");
    }

    #[tokio::test]
    async fn test_navigation_and_scene_detail() {
        let mock = store();
        let mut browser = connected(&mock, None).await;

        let mut out = String::new();
        browser.apply(BrowseCommand::Cd("shots".into()), &mut out).await;
        assert!(out.contains("gs://demo / [shots]"));
        assert!(out.contains("Scenes (2):"));

        let mut out = String::new();
        browser.apply(BrowseCommand::Scene(0), &mut out).await;
        assert!(out.contains("Scene #0"));
        assert!(out.contains("shots/a.png: blob:bucketscope/"));

        let mut out = String::new();
        browser.apply(BrowseCommand::Scene(9), &mut out).await;
        assert!(out.contains("No scene #9"));

        let mut out = String::new();
        browser.apply(BrowseCommand::Up, &mut out).await;
        assert!(out.contains("[gs://demo]"));
        assert_eq!(browser.registry.live_count(), 0);
    }

    #[tokio::test]
    async fn test_gallery_loads_each_image_once() {
        let mock = store();
        let mut browser = connected(&mock, None).await;
        let mut out = String::new();
        browser.apply(BrowseCommand::Cd("shots".into()), &mut out).await;

        let mut out = String::new();
        browser.apply(BrowseCommand::Gallery, &mut out).await;
        assert!(out.contains("a.png: blob:bucketscope/"));
        assert!(out.contains("b.jpg: blob:bucketscope/"));
        assert_eq!(browser.registry.live_count(), 2);

        browser.apply(BrowseCommand::Gallery, &mut String::new()).await;
        let image_fetches = mock
            .fetch_calls()
            .into_iter()
            .filter(|name| name != "shots/scenes.json")
            .count();
        assert_eq!(image_fetches, 2);

        browser.apply(BrowseCommand::Disconnect, &mut String::new()).await;
        assert_eq!(browser.registry.live_count(), 0);
        assert_eq!(browser.registry.released_count(), 2);
    }

    #[tokio::test]
    async fn test_summary_requires_scenes_and_model() {
        let mock = store();
        let mut browser = connected(&mock, None).await;
        let mut out = String::new();
        browser.apply(BrowseCommand::Summarize, &mut out).await;
        assert_eq!(out, "Summaries need GEMINI_API_KEY.\n");

        let generator = MockTextGenerator::responding("Two scenes.");
        let mut browser = connected(&mock, Some(SummaryService::new(generator.clone()))).await;

        let mut out = String::new();
        browser.apply(BrowseCommand::Summarize, &mut out).await;
        assert_eq!(out, "No scenes to summarize.\n");

        browser.apply(BrowseCommand::Cd("shots".into()), &mut String::new()).await;
        let mut out = String::new();
        browser.apply(BrowseCommand::Summarize, &mut out).await;
        assert_eq!(out, "Two scenes.\n");
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_navigation_offers_retry() {
        let mock = store();
        let mut browser = connected(&mock, None).await;

        mock.fail_listings(bucketscope_core::Error::request().with_message("denied"));
        let mut out = String::new();
        browser.apply(BrowseCommand::Cd("shots".into()), &mut out).await;
        assert!(out.contains("Error: denied (type `retry`)"));

        mock.clear_failures();
        let mut out = String::new();
        browser.apply(BrowseCommand::Retry, &mut out).await;
        assert!(out.contains("Scenes (2):"));
    }

    #[tokio::test]
    async fn test_failed_cd_keeps_scene_images_in_listed_folder() {
        let mock = store();
        let mut browser = connected(&mock, None).await;
        browser.apply(BrowseCommand::Cd("shots".into()), &mut String::new()).await;

        mock.fail_listings(bucketscope_core::Error::request().with_message("denied"));
        browser.apply(BrowseCommand::Cd("missing".into()), &mut String::new()).await;
        assert_eq!(browser.navigator.scenes().len(), 2);

        let mut out = String::new();
        browser.apply(BrowseCommand::Scene(0), &mut out).await;
        assert!(out.contains("shots/a.png: blob:bucketscope/"));
        assert!(!mock.fetch_calls().iter().any(|name| name.contains("missing")));

        mock.clear_failures();
        browser.apply(BrowseCommand::Cd("day2".into()), &mut String::new()).await;
        assert_eq!(browser.navigator.listed_path(), "shots/day2/");
    }

    #[tokio::test]
    async fn test_successful_retry_releases_previous_images() {
        let mock = store().with_object("demo", "other/d.png", b"d".to_vec(), "image/png");
        let mut browser = connected(&mock, None).await;
        browser.apply(BrowseCommand::Cd("shots".into()), &mut String::new()).await;
        browser.apply(BrowseCommand::Gallery, &mut String::new()).await;
        assert_eq!(browser.registry.live_count(), 2);

        mock.fail_listings(bucketscope_core::Error::request().with_message("denied"));
        browser.apply(BrowseCommand::Cd("/other".into()), &mut String::new()).await;
        assert_eq!(browser.registry.live_count(), 2);

        mock.clear_failures();
        browser.apply(BrowseCommand::Retry, &mut String::new()).await;
        assert_eq!(browser.navigator.state(), &NavigationState::Ready);
        assert_eq!(browser.navigator.listed_path(), "other/");
        assert_eq!(browser.registry.live_count(), 0);
    }

    #[tokio::test]
    async fn test_quit_and_help() {
        let mock = store();
        let mut browser = connected(&mock, None).await;
        let mut out = String::new();
        assert_eq!(browser.apply(BrowseCommand::Help, &mut out).await, Flow::Continue);
        assert!(out.starts_with("Commands:"));
        assert_eq!(browser.apply(BrowseCommand::Quit, &mut out).await, Flow::Quit);
    }
}
