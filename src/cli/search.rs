//! Search command handlers.
//!
//! Implements `search-demo` and the interactive `search` mode.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

use super::connect;
use crate::backend::SearchBackend;
use crate::config::AppConfig;
use crate::reports::SummaryReporter;
use crate::search::CatalogSearch;

/// Hits shown per interactive query.
const INTERACTIVE_RESULT_SIZE: usize = 5;

/// Hits shown per demo query.
const DEMO_RESULT_SIZE: usize = 3;

const HELP: &str = "Available commands:
  tool <name>     - Search by tool name
  website <url>   - Search by website
  cpe <pattern>   - Search by CPE pattern
  vendor <name>   - Search by vendor
  stats           - Show statistics
  quit            - Exit";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Tool(String),
    Website(String),
    Cpe(String),
    Vendor(String),
    Stats,
    Quit,
    Invalid(String),
}

impl InteractiveCommand {
    /// Parse a line; blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (command, query) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let command = command.to_lowercase();
        let parsed = match (command.as_str(), query.is_empty()) {
            ("quit" | "exit", _) => Self::Quit,
            ("stats", _) => Self::Stats,
            ("tool", false) => Self::Tool(query.to_string()),
            ("website", false) => Self::Website(query.to_string()),
            ("cpe", false) => Self::Cpe(query.to_string()),
            ("vendor", false) => Self::Vendor(query.to_string()),
            _ => Self::Invalid(line.to_string()),
        };
        Some(parsed)
    }
}

/// Run the search-demo command.
pub fn run_search_demo(config: &AppConfig, colored: bool) -> Result<()> {
    let client = connect(config)?;
    let doc_count = client.document_count().context("Failed to read index size")?;
    if doc_count == 0 {
        bail!("No data in index. Please run parse-and-index first.");
    }
    println!("Index contains {doc_count} documents.");

    let search = CatalogSearch::new(&client).with_fuzziness(config.matching.fuzziness.clone());
    let reporter = SummaryReporter::new().colored(colored);

    let demos = [
        search.search_by_name("apache", DEMO_RESULT_SIZE),
        search.search_by_website("github.com", DEMO_RESULT_SIZE),
        search.search_by_vendor_product(Some("apache"), None, None, DEMO_RESULT_SIZE),
    ];
    for results in demos.iter().flatten() {
        println!();
        println!("{}", reporter.search_results(results, DEMO_RESULT_SIZE));
    }

    if let Some(stats) = search.statistics() {
        println!();
        println!("{}", reporter.index_summary(&stats));
    }
    Ok(())
}

/// Run the interactive search mode on stdin/stdout.
pub fn run_interactive_search(config: &AppConfig, colored: bool) -> Result<()> {
    let client = connect(config)?;
    let search = CatalogSearch::new(&client).with_fuzziness(config.matching.fuzziness.clone());
    let reporter = SummaryReporter::new().colored(colored);

    println!("Interactive search mode");
    println!("{HELP}");
    let stdin = io::stdin();
    interactive_loop(&search, &reporter, &mut stdin.lock(), &mut io::stdout())?;
    Ok(())
}

/// Read commands until `quit` or end of input, printing results to `output`.
pub fn interactive_loop<B, R, W>(
    search: &CatalogSearch<B>,
    reporter: &SummaryReporter,
    input: &mut R,
    output: &mut W,
) -> io::Result<()>
where
    B: SearchBackend,
    R: BufRead,
    W: Write,
{
    let size = INTERACTIVE_RESULT_SIZE;
    loop {
        write!(output, "\n> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let Some(command) = InteractiveCommand::parse(&line) else {
            continue;
        };

        let results = match command {
            InteractiveCommand::Quit => break,
            InteractiveCommand::Stats => {
                match search.statistics() {
                    Some(stats) => writeln!(output, "{}", reporter.index_summary(&stats))?,
                    None => writeln!(output, "Statistics unavailable.")?,
                }
                continue;
            }
            InteractiveCommand::Invalid(_) => {
                writeln!(output, "Invalid command. Type 'quit' to exit.")?;
                continue;
            }
            InteractiveCommand::Tool(name) => search.search_by_name(&name, size),
            InteractiveCommand::Website(url) => search.search_by_website(&url, size),
            InteractiveCommand::Cpe(pattern) => search.search_by_cpe_pattern(&pattern, size),
            InteractiveCommand::Vendor(vendor) => {
                search.search_by_vendor_product(Some(&vendor), None, None, size)
            }
        };

        match results {
            Some(results) => writeln!(output, "{}", reporter.search_results(&results, size))?,
            None => writeln!(output, "Search failed.")?,
        }
    }
    writeln!(output, "Goodbye!")?;
    Ok(())
}
