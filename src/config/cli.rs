use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "incity-content")]
#[command(about = "Query and shape InCity Research site content")]
pub struct CliConfig {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read content from a local export (JSON array or NDJSON) instead of the store
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingKind {
    People,
    Publications,
    Projects,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Home page lists
    Home,
    People {
        #[arg(long)]
        role: Option<String>,
    },
    Person {
        slug: String,
    },
    Publications {
        #[arg(long = "type")]
        document_type: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        q: Option<String>,
    },
    Publication {
        slug: String,
    },
    Projects {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        q: Option<String>,
    },
    Project {
        slug: String,
    },
    /// Distinct years and document types present in the data
    Facets,
    /// Print the store query a listing URL resolves to, without running it
    Query {
        #[arg(value_enum)]
        listing: ListingKind,
        /// URL query string, e.g. "type=journal&year=2024"
        #[arg(default_value = "")]
        query_string: String,
    },
}

impl Command {
    /// Listing flags as the URL query string a browser would send. Values
    /// stay raw; the resolver decides what is valid.
    pub fn listing_query_string(&self) -> String {
        let pairs: Vec<(&str, &Option<String>)> = match self {
            Command::People { role } => vec![("role", role)],
            Command::Publications {
                document_type,
                year,
                author,
                q,
            } => vec![
                ("type", document_type),
                ("year", year),
                ("author", author),
                ("q", q),
            ],
            Command::Projects { theme, status, q } => {
                vec![("theme", theme), ("status", status), ("q", q)]
            }
            _ => Vec::new(),
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publications_flags() {
        let cli = CliConfig::parse_from([
            "incity-content",
            "--verbose",
            "publications",
            "--type",
            "journal",
            "--q",
            "smart city",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.log_format, LogFormat::Compact);
        assert_eq!(
            cli.command.listing_query_string(),
            "type=journal&q=smart+city"
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::parse_from([
            "incity-content",
            "person",
            "sarah-chen",
            "--fixture",
            "export.ndjson",
            "--log-format",
            "json",
        ]);

        assert_eq!(cli.fixture, Some(PathBuf::from("export.ndjson")));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Person { ref slug } if slug == "sarah-chen"));
        assert_eq!(cli.command.listing_query_string(), "");
    }

    #[test]
    fn test_query_subcommand() {
        let cli = CliConfig::parse_from(["incity-content", "query", "projects", "theme=policy"]);
        match cli.command {
            Command::Query {
                listing,
                query_string,
            } => {
                assert_eq!(listing, ListingKind::Projects);
                assert_eq!(query_string, "theme=policy");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
