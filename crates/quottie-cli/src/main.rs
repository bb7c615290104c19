use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use quottie_core::{
    AppContainer, Author, Config, DarkThemeConfig, LoadState, Quote, ResultFilter, SortField,
    SortOrder,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quottie")]
#[command(version, about = "Browse, search and bookmark quotes from the terminal", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, env = "QUOTTIE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ListArgs {
    /// Free-text search; lists everything when empty
    #[arg(short, long, default_value = "")]
    query: String,

    #[arg(long, default_value = "date-added")]
    sort: SortField,

    #[arg(long, default_value = "desc")]
    order: SortOrder,

    /// Restrict to an author slug (repeatable)
    #[arg(long = "slug")]
    slugs: Vec<String>,

    /// How many pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Items per page (overrides config)
    #[arg(long)]
    page_size: Option<u32>,
}

impl ListArgs {
    /// The query is trimmed here so the search sent and the search recorded
    /// are the same string
    fn filter(&self) -> ResultFilter {
        ResultFilter {
            query: self.query.trim().to_string(),
            sort_field: self.sort,
            sort_order: self.order,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Quotes,
    Authors,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search quotes
    Quotes(ListArgs),
    /// List or search authors
    Authors(ListArgs),
    /// Show one quote
    Quote {
        id: String,
        /// Bookmark it as well
        #[arg(long)]
        bookmark: bool,
    },
    /// Show one author
    Author {
        id: String,
        /// Bookmark it as well
        #[arg(long)]
        bookmark: bool,
    },
    /// Show the quote of the day
    Today {
        #[arg(long)]
        bookmark: bool,
    },
    /// Show random quotes
    Random {
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
    /// List bookmarks
    Bookmarks { kind: Kind },
    /// Remove a bookmark
    Unbookmark { kind: Kind, id: String },
    /// Show recent searches
    Recent {
        /// Forget them instead
        #[arg(long)]
        clear: bool,
    },
    /// Show or change preferences
    #[command(subcommand)]
    Prefs(PrefsCommands),
    /// Show who made this
    About,
}

#[derive(Subcommand)]
enum PrefsCommands {
    Show,
    /// follow-system, light or dark
    Theme { value: DarkThemeConfig },
    Onboarding {
        #[arg(action = clap::ArgAction::Set)]
        hide: bool,
    },
    ReviewShown {
        #[arg(action = clap::ArgAction::Set)]
        shown: bool,
    },
    /// Add to the cumulative usage time
    AddUsage { millis: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quottie=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::load()?,
    };
    debug!(
        database = %config.storage.database_path()?.display(),
        preferences = %config.storage.preferences_path()?.display(),
        quotes_url = %config.network.quotes_url,
        "Resolved configuration"
    );
    let app = AppContainer::from_config(&config)?;

    match cli.command {
        Commands::Quotes(args) => {
            let page_size = args.page_size.unwrap_or(config.paging.page_size);
            let filter = args.filter();
            remember_search(&app, &filter).await?;

            let mut pager = app.quotes.get_paged(filter, args.slugs.clone(), page_size);
            load_pages(&mut pager, args.pages).await?;
            for quote in pager.items() {
                print_quote(quote);
            }
        }
        Commands::Authors(args) => {
            let page_size = args.page_size.unwrap_or(config.paging.page_size);
            let filter = args.filter();
            remember_search(&app, &filter).await?;

            let mut pager = app.authors.get_paged(filter, args.slugs.clone(), page_size);
            load_pages(&mut pager, args.pages).await?;
            for author in pager.items() {
                print_author(author);
            }
        }
        Commands::Quote { id, bookmark } => {
            let quote = app.quotes.get_detail(&id).await?;
            if bookmark {
                app.quotes.save_bookmark(&quote, true).await?;
            }
            print_quote(&quote);
            if !quote.tags.is_empty() {
                println!("  tags: {}", quote.tags.join(", "));
            }
        }
        Commands::Author { id, bookmark } => {
            let author = app.authors.get_detail(&id).await?;
            if bookmark {
                app.authors.save_bookmark(&author, true).await?;
            }
            print_author(&author);
            if !author.bio.is_empty() {
                println!("\n{}", author.bio);
            }
            if !author.image.is_empty() {
                println!("\nPortrait: {}", author.image);
            }
        }
        Commands::Today { bookmark } => {
            let quote = app.quotes.get_quote_of_the_day().await?;
            if bookmark {
                app.quotes.save_bookmark(&quote, true).await?;
            }
            print_quote(&quote);
        }
        Commands::Random { count } => {
            for quote in app.quotes.get_random_quotes(count).await? {
                print_quote(&quote);
            }
        }
        Commands::Bookmarks { kind } => match kind {
            Kind::Quotes => {
                let quotes = app.quotes.bookmark_list_stream().next().await.transpose()?;
                for quote in quotes.unwrap_or_default() {
                    print_quote(&quote);
                }
            }
            Kind::Authors => {
                let authors = app.authors.bookmark_list_stream().next().await.transpose()?;
                for author in authors.unwrap_or_default() {
                    print_author(&author);
                }
            }
        },
        Commands::Unbookmark { kind, id } => match kind {
            Kind::Quotes => app.quotes.delete_bookmark(&id).await?,
            Kind::Authors => app.authors.delete_bookmark(&id).await?,
        },
        Commands::Recent { clear } => {
            if clear {
                app.search.clear_recent_searches().await?;
            } else {
                let recent = app
                    .search
                    .get_recent_search_queries(config.paging.recent_search_limit)
                    .next()
                    .await
                    .transpose()?;
                for entry in recent.unwrap_or_default() {
                    println!("{}  {}", entry.queried_date.format("%Y-%m-%d %H:%M"), entry.query);
                }
            }
        }
        Commands::Prefs(command) => {
            let prefs = &app.user_data;
            match command {
                PrefsCommands::Show => {}
                PrefsCommands::Theme { value } => prefs.set_dark_theme_config(value).await?,
                PrefsCommands::Onboarding { hide } => prefs.set_should_hide_onboarding(hide).await?,
                PrefsCommands::ReviewShown { shown } => prefs.set_review_shown(shown).await?,
                PrefsCommands::AddUsage { millis } => prefs.add_usage_time(millis).await?,
            }
            let data = prefs.current();
            println!("theme:            {}", data.dark_theme_config);
            println!("hide onboarding:  {}", data.should_hide_onboarding);
            println!("review shown:     {}", data.is_review_shown);
            println!("usage time:       {}s", data.total_usage_time_ms / 1000);
        }
        Commands::About => {
            let user = app.github_user.get_github_user().await?;
            println!("{} (@{})", user.name, user.login);
            if !user.bio.is_empty() {
                println!("    {}", user.bio);
            }
            println!("{}", user.html_url);
        }
    }

    Ok(())
}

async fn remember_search(app: &AppContainer, filter: &ResultFilter) -> anyhow::Result<()> {
    if !filter.query.is_empty() {
        debug!(query = %filter.query, "Recording search");
        app.search.insert_or_replace_recent_search(&filter.query).await?;
    }
    Ok(())
}

async fn load_pages<T: Send + 'static>(
    pager: &mut quottie_core::Pager<T>,
    pages: u32,
) -> anyhow::Result<()> {
    debug!(pages, "Loading pages");
    for _ in 0..pages {
        match pager.load_next().await {
            LoadState::Idle => {}
            LoadState::EndReached => break,
            LoadState::Error(err) => return Err(err.clone().into()),
        }
    }
    Ok(())
}

fn print_quote(quote: &Quote) {
    let mark = if quote.is_bookmarked { "*" } else { " " };
    println!("{} \"{}\"\n    - {} [{}]", mark, quote.content, quote.author, quote.id);
}

fn print_author(author: &Author) {
    let mark = if author.is_bookmarked { "*" } else { " " };
    println!(
        "{} {} ({} quotes) [{}]",
        mark, author.name, author.quote_count, author.id
    );
    if !author.description.is_empty() {
        println!("    {}", author.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_args(args: &[&str]) -> ListArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Quotes(args) | Commands::Authors(args) => args,
            _ => panic!("expected a list command"),
        }
    }

    #[test]
    fn test_filter_trims_query() {
        let args = list_args(&["quottie", "quotes", "--query", "  love  ", "--order", "asc"]);
        let filter = args.filter();
        assert_eq!(filter.query, "love");
        assert_eq!(filter.sort_order, SortOrder::Asc);
        assert_eq!(filter.sort_field, SortField::DateAdded);
    }

    #[test]
    fn test_blank_query_lists_everything() {
        let args = list_args(&["quottie", "authors", "--query", "   "]);
        assert!(args.filter().query.is_empty());
    }
}
