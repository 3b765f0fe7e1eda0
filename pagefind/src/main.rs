use std::{env, fs, io, process::ExitCode};

use find_core::{
    browser::DfsFragmentBrowser,
    finder::{Finder, SubstringFinder},
    tree, FindConfig, FindMatch, FindOutcome, FindSession,
};
use kuchiki::{traits::*, NodeRef};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: pagefind <file.html> <query> [--count N] [--json] [--all]";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    path: String,
    query: String,
    count: usize,
    json: bool,
    all: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut count = 1;
    let mut json = false;
    let mut all = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--all" => all = true,
            "--count" => {
                let value = iter.next().ok_or("--count needs a value")?;
                count = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("--count must be a positive number, got {value:?}"))?;
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => positional.push(other.to_string()),
        }
    }
    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(path), Some(query), None) => Ok(Args {
            path,
            query,
            count,
            json,
            all,
        }),
        _ => Err(USAGE.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct MatchReport {
    text: String,
    start: String,
    start_offset: usize,
    end: String,
    end_offset: usize,
    fragments: usize,
}

impl From<&FindMatch> for MatchReport {
    fn from(found: &FindMatch) -> Self {
        Self {
            text: found.text(),
            start: found.start().text(),
            start_offset: found.start_offset(),
            end: found.end().text(),
            end_offset: found.end_offset(),
            fragments: found.fragment_count(),
        }
    }
}

fn load_config() -> FindConfig {
    let mut config = match FindConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring settings: {}", e);
            FindConfig::default()
        }
    };
    if let Some(on) = env::var("PAGEFIND_INSTRUMENTATION")
        .ok()
        .map(|s| !s.is_empty() && s != "0")
    {
        config.instrumentation = on;
    }
    config
}

fn body_of(document: &NodeRef) -> NodeRef {
    document
        .select_first("body")
        .map(|body| body.as_node().clone())
        .unwrap_or_else(|_| document.clone())
}

/// Lists every occurrence without touching the document.
fn list_all(
    document: &NodeRef,
    query: &str,
    config: &FindConfig,
) -> find_core::Result<Vec<FindMatch>> {
    let root = body_of(document);
    tree::normalize(&root);
    let browser = DfsFragmentBrowser::with_excluded(root, &config.excluded_tags);
    let mut finder = SubstringFinder::new(browser);
    let mut found = Vec::new();
    while let Some(next) = finder.find_next(query)? {
        found.push(next);
    }
    Ok(found)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    serde_json::to_writer_pretty(io::stdout().lock(), value).map_err(|e| e.to_string())?;
    println!();
    Ok(())
}

fn run(args: &Args, config: FindConfig) -> Result<bool, String> {
    let contents =
        fs::read_to_string(&args.path).map_err(|e| format!("Failed to read {}: {}", args.path, e))?;
    let document = kuchiki::parse_html().one(contents);

    if args.all {
        let found = list_all(&document, &args.query, &config).map_err(|e| e.to_string())?;
        debug!(query = %args.query, matches = found.len(), "listed all occurrences");
        if args.json {
            let reports: Vec<MatchReport> = found.iter().map(MatchReport::from).collect();
            print_json(&reports)?;
        } else {
            for (i, m) in found.iter().enumerate() {
                println!(
                    "[{}] {:?} ({:?}@{}..{:?}@{})",
                    i,
                    m.text(),
                    m.start().text(),
                    m.start_offset(),
                    m.end().text(),
                    m.end_offset()
                );
            }
        }
        return Ok(!found.is_empty());
    }

    let mut session = FindSession::for_document(&document, config);
    let mut outcome = session.set_query(&args.query).map_err(|e| e.to_string())?;
    for _ in 1..args.count {
        if outcome != FindOutcome::Found {
            break;
        }
        outcome = session.find_next().map_err(|e| e.to_string())?;
    }
    if !outcome.is_found() {
        eprintln!("No occurrence of {:?} in {}", args.query, args.path);
        return Ok(false);
    }
    if args.json {
        // Fragment text is only whole again once the markers are gone.
        let found = session.current_match().cloned();
        session.clear().map_err(|e| e.to_string())?;
        if let Some(found) = found {
            print_json(&MatchReport::from(&found))?;
        }
    } else {
        println!("{}", document.to_string());
    }
    Ok(true)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    match run(&args, load_config()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_in_any_position() {
        let parsed = parse_args(&args(&["--json", "page.html", "--count", "3", "foo"])).unwrap();
        assert_eq!(
            parsed,
            Args {
                path: "page.html".into(),
                query: "foo".into(),
                count: 3,
                json: true,
                all: false,
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(&args(&["page.html"])).is_err());
        assert!(parse_args(&args(&["page.html", "foo", "extra"])).is_err());
        assert!(parse_args(&args(&["page.html", "foo", "--count", "0"])).is_err());
        assert!(parse_args(&args(&["page.html", "foo", "--count"])).is_err());
        assert!(parse_args(&args(&["page.html", "foo", "--verbose"])).is_err());
    }

    #[test]
    fn lists_every_occurrence_outside_excluded_tags() {
        let document = kuchiki::parse_html()
            .one("<p>Foo bar</p><script>foo()</script><p>fo<b>o</b></p>".to_string());
        let found = list_all(&document, "foo", &FindConfig::default()).unwrap();
        let reports: Vec<MatchReport> = found.iter().map(MatchReport::from).collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].text, "Foo");
        assert_eq!(reports[0].fragments, 1);
        assert_eq!(reports[1].text, "foo");
        assert_eq!(reports[1].start, "fo");
        assert_eq!(reports[1].end, "o");
        assert_eq!(reports[1].fragments, 2);
    }
}
