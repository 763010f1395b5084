//! Line-oriented live search.
//!
//! Plain lines replace the query text; lines starting with `:` are
//! commands. Results are printed by a task watching the session, so they
//! appear whenever a debounced evaluation publishes.

use std::sync::Arc;

use foodtruck_core::AppConfig;
use foodtruck_search::{AddressOutcome, SearchSession, SearchSnapshot, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::{fetch, render, search};

const HELP: &str = "\
commands:
  <text>           search by name, food items, facility type or status
  :radius N        set the search radius in miles
  :address TEXT    search around an address
  :clear           drop the address and search by text only
  :all             show or hide map markers
  :show N          details for result N
  :quit            exit
";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReplCommand {
    Query(String),
    Radius(f64),
    Address(String),
    Clear,
    ToggleAll,
    Show(usize),
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    pub(crate) fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(command) = line.strip_prefix(':') else {
            return Self::Query(line.to_owned());
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "radius" => arg.parse::<f64>().map_or_else(
                |_| Self::Invalid(format!(":radius expects a number of miles, got '{arg}'")),
                Self::Radius,
            ),
            "address" if arg.is_empty() => Self::Invalid(":address expects an address".to_owned()),
            "address" => Self::Address(arg.to_owned()),
            "clear" => Self::Clear,
            "all" => Self::ToggleAll,
            "show" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => Self::Show(n),
                _ => Self::Invalid(format!(":show expects a result number, got '{arg}'")),
            },
            "help" | "h" => Self::Help,
            "quit" | "q" => Self::Quit,
            other => Self::Invalid(format!("unknown command ':{other}' (try :help)")),
        }
    }
}

/// Prints results each time a new evaluation is published.
async fn print_updates(mut rx: watch::Receiver<SearchSnapshot>) {
    let mut last_generation = rx.borrow_and_update().generation;
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.generation != last_generation {
            last_generation = snapshot.generation;
            print!("{}", render::render_results(&snapshot));
        }
    }
}

fn spawn_address_search(
    session: &SearchSession,
    geocoder: &Arc<foodtruck_client::GeocodeClient>,
    address: String,
) {
    let session = session.clone();
    let geocoder = Arc::clone(geocoder);
    tokio::spawn(async move {
        match session.submit_address(geocoder.as_ref(), &address).await {
            Ok(AddressOutcome::OutOfRegion(_)) => {
                println!("'{address}' is outside the service area");
            }
            Ok(AddressOutcome::Scheduled(_) | AddressOutcome::Superseded) => {}
            Err(e) => println!("Search failed: {e}"),
        }
    });
}

pub(crate) async fn run_repl(config: &AppConfig) -> anyhow::Result<()> {
    let geocoder = match search::geocode_client(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::info!(error = %e, "address search disabled");
            None
        }
    };

    let session = SearchSession::new(SessionConfig::from_app_config(config));
    session.replace_working_set(fetch::load_or_empty(config).await);
    println!(
        "{} vendors loaded. Type to search, :help for commands.",
        session.working_set().len()
    );

    let printer = tokio::spawn(print_updates(session.subscribe()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Query(text) => session.set_query(text),
            ReplCommand::Radius(miles) => {
                let used = session.set_radius(miles);
                println!("radius: {used} mi");
            }
            ReplCommand::Address(address) => match &geocoder {
                Some(geocoder) => spawn_address_search(&session, geocoder, address),
                None => println!("address search is disabled: set FOODTRUCK_GEOCODER_TOKEN"),
            },
            ReplCommand::Clear => {
                if session.clear_reference_point() {
                    println!("address cleared");
                }
            }
            ReplCommand::ToggleAll => {
                let shown = session.toggle_show_all();
                println!("markers {}", if shown { "shown" } else { "hidden" });
            }
            ReplCommand::Show(n) => {
                let snapshot = session.snapshot();
                let selected = snapshot
                    .vendors
                    .get(n - 1)
                    .and_then(|v| session.select_vendor(&v.id));
                match selected {
                    Some(vendor) => print!("{}", render::render_detail(&vendor)),
                    None => println!("no result #{n}"),
                }
            }
            ReplCommand::Help => print!("{HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => println!("{message}"),
        }
    }

    printer.abort();
    Ok(())
}
