//! selector-inspector CLI
//!
//! `listen` receives locators picked in the browser; `locate` derives them
//! for a CSS selector on a page loaded in headless Chrome; `links` exports
//! the `href`s of the elements a selector matches.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use selector_inspector::bridge::DEFAULT_PORT;
use selector_inspector::browser::{BrowserSession, LaunchOptions, normalize_url};
use selector_inspector::listener::{ListenerConfig, LocatorListener};
use selector_inspector::{LinkFormat, LocatedElement, Locator, write_links};
use tokio::sync::{mpsc, oneshot};

#[derive(Parser)]
#[command(name = "selector-inspector")]
#[command(version)]
#[command(about = "Receive and derive CSS/XPath element locators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Receive locators sent by the in-page picker
    Listen {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Print one JSON object per line instead of tab-separated text
        #[arg(long)]
        json: bool,
    },
    /// Derive locators for every element matching a CSS selector
    Locate {
        /// Page to load
        url: String,

        /// CSS selector of the elements to locate
        selector: String,

        #[command(flatten)]
        browser: BrowserArgs,
    },
    /// Export the links of every element matching a CSS selector
    Links {
        /// Page to load
        url: String,

        /// CSS selector of the link elements
        selector: String,

        /// Write CSV with a `url` header
        #[arg(long, conflicts_with = "txt")]
        csv: bool,

        /// Write one URL per line (default)
        #[arg(long)]
        txt: bool,

        /// Output file (default: stdout)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Keep only links containing this text (e.g. "/products/")
        #[arg(long, value_name = "TEXT")]
        contains: Option<String>,

        #[command(flatten)]
        browser: BrowserArgs,
    },
}

#[derive(Args)]
struct BrowserArgs {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<String>,
}

impl BrowserArgs {
    fn launch_options(self) -> LaunchOptions {
        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(path) = self.chrome_path {
            options = options.chrome_path(path);
        }
        options
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Listen { host, port, json } => listen(ListenerConfig::new(host, port), json).await,
        Command::Locate { url, selector, browser } => {
            let options = browser.launch_options();
            let located = tokio::task::spawn_blocking(move || locate(options, &url, &selector))
                .await
                .context("locate task panicked")??;

            for element in located {
                println!("{}", serde_json::to_string(&element)?);
            }
            Ok(())
        }
        Command::Links {
            url,
            selector,
            csv,
            txt: _,
            output,
            contains,
            browser,
        } => {
            let options = browser.launch_options();
            let mut links = tokio::task::spawn_blocking(move || page_links(options, &url, &selector))
                .await
                .context("links task panicked")??;

            if let Some(needle) = contains {
                links.retain(|link| link.contains(&needle));
            }
            if links.is_empty() {
                log::warn!("No links found");
            }

            let format = if csv { LinkFormat::Csv } else { LinkFormat::Txt };
            match output {
                Some(path) => {
                    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
                    write_links(&links, format, BufWriter::new(file))?;
                    log::info!("Wrote {} links to {}", links.len(), path.display());
                }
                None => write_links(&links, format, io::stdout().lock())?,
            }
            Ok(())
        }
    }
}

async fn listen(config: ListenerConfig, json: bool) -> Result<()> {
    let listener = LocatorListener::bind(&config).await?;
    let (tx, rx) = mpsc::unbounded_channel::<Locator>();
    let (stop_tx, stop_rx) = oneshot::channel();

    let printer = tokio::spawn(drain_locators(rx, stop_rx, move |locator| print_locator(&locator, json)));

    eprintln!("Right-click elements in the page; press Ctrl-C to stop");
    listener
        .serve(tx, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = stop_tx.send(());
    let printed = printer.await.context("printer task panicked")?;
    log::debug!("printed {} locators", printed);
    Ok(())
}

/// Hand every received locator to `emit` until `stop` fires, then flush what
/// is still queued. Picker connections may outlive the server, so the
/// channel is closed rather than waited on.
async fn drain_locators<F>(
    mut rx: mpsc::UnboundedReceiver<Locator>,
    mut stop: oneshot::Receiver<()>,
    mut emit: F,
) -> usize
where
    F: FnMut(Locator),
{
    let mut count = 0;
    loop {
        tokio::select! {
            biased;
            received = rx.recv() => match received {
                Some(locator) => {
                    emit(locator);
                    count += 1;
                }
                None => return count,
            },
            _ = &mut stop => break,
        }
    }

    rx.close();
    while let Some(locator) = rx.recv().await {
        emit(locator);
        count += 1;
    }
    count
}

fn print_locator(locator: &Locator, json: bool) {
    if json {
        match serde_json::to_string(locator) {
            Ok(line) => println!("{}", line),
            Err(e) => log::warn!("Failed to encode locator: {}", e),
        }
    } else {
        println!("{}\t{}", locator.css, locator.xpath);
    }
}

fn open(options: LaunchOptions, url: &str) -> Result<BrowserSession> {
    let session = BrowserSession::launch(options)?;
    session.navigate(url)?;
    Ok(session)
}

fn page_links(options: LaunchOptions, url: &str, selector: &str) -> Result<Vec<String>> {
    let url = normalize_url(url);
    let session = open(options, &url)?;

    let links = session
        .links(selector)
        .with_context(|| format!("Failed to collect links for '{}' on {}", selector, url))?;

    session.close()?;
    Ok(links)
}

fn locate(options: LaunchOptions, url: &str, selector: &str) -> Result<Vec<LocatedElement>> {
    let url = normalize_url(url);
    let session = open(options, &url)?;

    let located = session
        .locate(selector)
        .with_context(|| format!("Failed to locate '{}' on {}", selector, url))?;

    for element in located.iter().filter(|e| !e.is_unique()) {
        log::warn!(
            "{} is not unique ({} css / {} xpath matches)",
            element.locator.css,
            element.css_matches,
            element.xpath_matches
        );
    }

    session.close()?;
    Ok(located)
}
