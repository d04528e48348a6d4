use anyhow::{bail, Context, Result};
use catalogctl::config::Configuration;
use catalogctl::http::HttpClient;
use catalogctl::loader::LoadReport;
use catalogctl::models::EntityId;
use catalogctl::sections::{
    Confirm, DeleteOutcome, EpisodeForm, MovieForm, SeasonForm, ShowForm,
};
use catalogctl::session::SessionStore;
use catalogctl::tmdb::TmdbClient;
use catalogctl::Console;
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collection counts
    Summary,
    /// Manage TV shows
    #[command(subcommand)]
    Shows(ShowsCommand),
    /// Manage seasons
    #[command(subcommand)]
    Seasons(SeasonsCommand),
    /// Manage episodes
    #[command(subcommand)]
    Episodes(EpisodesCommand),
    /// Manage movies and the featured rail
    #[command(subcommand)]
    Movies(MoviesCommand),
    /// Import metadata from TMDB
    #[command(subcommand)]
    Import(ImportCommand),
    /// Assign one playback URL per line to a season's episodes
    AssignUrls {
        #[arg(long)]
        season: u64,
        /// Episode id to start from
        #[arg(long)]
        start: u64,
        /// File with one URL per line; stdin when omitted or `-`
        #[arg(long)]
        file: Option<String>,
    },
    /// Locally stored session state
    #[command(subcommand)]
    Session(SessionCommand),
    /// Resolve a stored poster value to its display URL
    Poster { raw: String },
}

#[derive(Args)]
struct DeleteArgs {
    id: u64,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum ShowsCommand {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        tmdb_id: String,
        #[arg(long, default_value = "")]
        thumbnail: String,
    },
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        tmdb_id: Option<String>,
        #[arg(long)]
        thumbnail: Option<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum SeasonsCommand {
    List {
        #[arg(long)]
        show: Option<u64>,
    },
    Add {
        #[arg(long)]
        show: u64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        order: i64,
        /// Save as draft instead of published
        #[arg(long)]
        draft: bool,
    },
    Edit {
        id: u64,
        #[arg(long)]
        show: Option<u64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        order: Option<i64>,
        #[arg(long)]
        published: Option<bool>,
    },
    Delete(DeleteArgs),
}

#[derive(Args)]
struct EpisodeFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    file_source: Option<String>,
    #[arg(long)]
    source_type: Option<String>,
    #[arg(long)]
    file_url: Option<String>,
    #[arg(long)]
    order: Option<i64>,
    #[arg(long)]
    runtime: Option<String>,
    #[arg(long)]
    poster: Option<String>,
}

impl EpisodeFields {
    fn apply(self, form: &mut EpisodeForm) {
        let EpisodeFields {
            name,
            description,
            file_source,
            source_type,
            file_url,
            order,
            runtime,
            poster,
        } = self;
        overlay(&mut form.name, name);
        overlay(&mut form.description, description);
        overlay(&mut form.file_source, file_source);
        overlay(&mut form.source_type, source_type);
        overlay(&mut form.file_url, file_url);
        overlay(&mut form.order, order);
        overlay(&mut form.runtime, runtime);
        overlay(&mut form.poster, poster);
    }
}

#[derive(Subcommand)]
enum EpisodesCommand {
    List {
        #[arg(long)]
        season: Option<u64>,
    },
    Add {
        #[arg(long)]
        season: u64,
        /// Defaults to the season's show
        #[arg(long)]
        series: Option<u64>,
        #[command(flatten)]
        fields: EpisodeFields,
    },
    Edit {
        id: u64,
        #[arg(long)]
        season: Option<u64>,
        #[arg(long)]
        series: Option<u64>,
        #[command(flatten)]
        fields: EpisodeFields,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum MoviesCommand {
    List {
        #[arg(long)]
        featured: bool,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        thumbnail: String,
        #[arg(long)]
        featured: bool,
    },
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        thumbnail: Option<String>,
    },
    Feature {
        id: u64,
    },
    Unfeature {
        id: u64,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum ImportCommand {
    /// Register a season's episodes from TMDB
    Episodes {
        #[arg(long)]
        show: u64,
        #[arg(long)]
        season: u64,
        /// Only these episode numbers (comma separated)
        #[arg(long, value_delimiter = ',')]
        pick: Vec<i64>,
        /// Only print what would be registered
        #[arg(long)]
        dry_run: bool,
    },
    /// Register a show's seasons from TMDB
    Seasons {
        #[arg(long)]
        show: u64,
        #[arg(long, value_delimiter = ',')]
        pick: Vec<i64>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Store a TMDB token that overrides the config file
    Token { value: String },
    /// Forget stored session state
    Logout,
    Show,
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(|_: &str| true)
    } else {
        Box::new(|prompt: &str| {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
    }
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so tables on stdout stay pipeable
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Session(command) => {
            return run_session(&SessionStore::default_location()?, command)
        }
        Command::Poster { raw } => {
            let config = Configuration::from_file(&cli.config).unwrap_or_default();
            let images =
                catalogctl::poster::ImageResolver::new(config.image_base_url(), config.placeholder());
            println!("{}", images.resolve(&raw));
            return Ok(());
        }
        _ => {}
    }

    let config = Configuration::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    info!("Configuration loaded from: {}", cli.config);

    let mut console = Console::from_config(&config)?;
    eprintln!("Loading catalog from {}...", console.api().base_url());
    let report = console.load().await;
    eprintln!("Loaded: {report}");
    report_load(&report)?;

    match cli.command {
        Command::Summary => {
            let s = console.summary();
            println!("TV shows   {:>6}", s.shows);
            println!("Seasons    {:>6}", s.seasons);
            println!("Episodes   {:>6}", s.episodes);
            println!("Movies     {:>6}", s.movies);
            println!("Featured   {:>6}", s.featured);
        }
        Command::Shows(command) => run_shows(&mut console, command).await?,
        Command::Seasons(command) => run_seasons(&mut console, command).await?,
        Command::Episodes(command) => run_episodes(&mut console, command).await?,
        Command::Movies(command) => run_movies(&mut console, command).await?,
        Command::Import(command) => {
            let token = SessionStore::default_location()?.load()?.tmdb_token;
            let tmdb = TmdbClient::from_config(
                HttpClient::new(config.request_timeout()?)?,
                &config,
                token,
            )?;
            run_import(&mut console, &tmdb, command).await?;
        }
        Command::AssignUrls {
            season,
            start,
            file,
        } => {
            let text = match file.as_deref() {
                None | Some("-") => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading URLs from {path}"))?,
            };
            let report = console
                .assign_urls(EntityId(season), EntityId(start), &text, |done, total| {
                    eprintln!("{done}/{total}");
                })
                .await?;
            println!(
                "Matched {} episodes: {} updated, {} failed",
                report.matched, report.updated, report.failed
            );
        }
        Command::Session(_) | Command::Poster { .. } => unreachable!("handled before loading"),
    }

    Ok(())
}

/// Partial loads carry on with what arrived; a backend that answered nothing
/// at all ends the run.
fn report_load(report: &LoadReport) -> Result<()> {
    let outcomes = [
        ("tv_shows", &report.shows),
        ("seasons", &report.seasons),
        ("episodes", &report.episodes),
        ("movies", &report.movies),
    ];
    for (name, outcome) in outcomes {
        if !outcome.is_loaded() {
            warn!("{}: {}", name, outcome);
        }
    }
    if outcomes.iter().all(|(_, outcome)| !outcome.is_loaded()) {
        bail!("could not load the catalog: {}", report.shows);
    }
    Ok(())
}

fn print_deleted(outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Cancelled => println!("Cancelled."),
        DeleteOutcome::Deleted(removed) if removed.movies > 0 => println!("Deleted."),
        DeleteOutcome::Deleted(removed) => println!(
            "Deleted ({} seasons, {} episodes removed with it).",
            removed.seasons, removed.episodes
        ),
    }
}

async fn run_shows(console: &mut Console, command: ShowsCommand) -> Result<()> {
    match command {
        ShowsCommand::List => {
            println!("{:>6}  {:<40}  {:>8}  POSTER", "ID", "TITLE", "TMDB");
            for show in console.shows() {
                println!(
                    "{:>6}  {:<40}  {:>8}  {}",
                    show.id,
                    show.title,
                    show.tmdb_id,
                    console.images().resolve(&show.thumbnail)
                );
            }
        }
        ShowsCommand::Add {
            title,
            tmdb_id,
            thumbnail,
        } => {
            let form = ShowForm {
                title,
                tmdb_id,
                thumbnail,
            };
            match console.create_show(&form).await? {
                Some(show) => println!("Created show {}", show.id),
                None => println!("Created show"),
            }
        }
        ShowsCommand::Edit {
            id,
            title,
            tmdb_id,
            thumbnail,
        } => {
            let id = EntityId(id);
            let mut form = console.show_form(id)?;
            overlay(&mut form.title, title);
            overlay(&mut form.tmdb_id, tmdb_id);
            overlay(&mut form.thumbnail, thumbnail);
            console.update_show(id, &form).await?;
            println!("Updated show {id}");
        }
        ShowsCommand::Delete(args) => {
            let outcome = console
                .delete_show(EntityId(args.id), confirmer(args.yes).as_ref())
                .await?;
            print_deleted(outcome);
        }
    }
    Ok(())
}

async fn run_seasons(console: &mut Console, command: SeasonsCommand) -> Result<()> {
    match command {
        SeasonsCommand::List { show } => {
            println!(
                "{:>6}  {:>6}  {:<36}  {:>5}  STATUS",
                "ID", "SHOW", "NAME", "ORDER"
            );
            for season in console.seasons(show.map(EntityId)) {
                println!(
                    "{:>6}  {:>6}  {:<36}  {:>5}  {}",
                    season.id,
                    season
                        .show_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "?".into()),
                    season.season_name,
                    season.order,
                    if season.status { "published" } else { "draft" }
                );
            }
        }
        SeasonsCommand::Add {
            show,
            name,
            order,
            draft,
        } => {
            let form = SeasonForm {
                show_id: Some(EntityId(show)),
                name,
                order,
                published: !draft,
            };
            match console.create_season(&form).await? {
                Some(season) => println!("Created season {}", season.id),
                None => println!("Created season"),
            }
        }
        SeasonsCommand::Edit {
            id,
            show,
            name,
            order,
            published,
        } => {
            let id = EntityId(id);
            let mut form = console.season_form(id)?;
            if let Some(show) = show {
                form.show_id = Some(EntityId(show));
            }
            overlay(&mut form.name, name);
            overlay(&mut form.order, order);
            overlay(&mut form.published, published);
            console.update_season(id, &form).await?;
            println!("Updated season {id}");
        }
        SeasonsCommand::Delete(args) => {
            let outcome = console
                .delete_season(EntityId(args.id), confirmer(args.yes).as_ref())
                .await?;
            print_deleted(outcome);
        }
    }
    Ok(())
}

async fn run_episodes(console: &mut Console, command: EpisodesCommand) -> Result<()> {
    match command {
        EpisodesCommand::List { season } => {
            println!(
                "{:>6}  {:>6}  {:>5}  {:<36}  {:<10}  URL",
                "ID", "SEASON", "ORDER", "NAME", "RUNTIME"
            );
            for episode in console.episodes(season.map(EntityId)) {
                println!(
                    "{:>6}  {:>6}  {:>5}  {:<36}  {:<10}  {}",
                    episode.id,
                    episode.season_id,
                    episode.order,
                    episode.episode_name,
                    episode.runtime,
                    episode.file_url
                );
            }
        }
        EpisodesCommand::Add {
            season,
            series,
            fields,
        } => {
            let mut form = EpisodeForm {
                season_id: Some(EntityId(season)),
                series_id: series.map(EntityId),
                ..EpisodeForm::default()
            };
            fields.apply(&mut form);
            match console.create_episode(&form).await? {
                Some(episode) => println!("Created episode {}", episode.id),
                None => println!("Created episode"),
            }
        }
        EpisodesCommand::Edit {
            id,
            season,
            series,
            fields,
        } => {
            let id = EntityId(id);
            let mut form = console.episode_form(id)?;
            if let Some(season) = season {
                form.season_id = Some(EntityId(season));
            }
            if let Some(series) = series {
                form.series_id = Some(EntityId(series));
            }
            fields.apply(&mut form);
            console.update_episode(id, &form).await?;
            println!("Updated episode {id}");
        }
        EpisodesCommand::Delete(args) => {
            let outcome = console
                .delete_episode(EntityId(args.id), confirmer(args.yes).as_ref())
                .await?;
            print_deleted(outcome);
        }
    }
    Ok(())
}

async fn run_movies(console: &mut Console, command: MoviesCommand) -> Result<()> {
    match command {
        MoviesCommand::List { featured } => {
            println!("{:>6}  {:<40}  {:<8}  POSTER", "ID", "TITLE", "FEATURED");
            for movie in console.movies(featured) {
                println!(
                    "{:>6}  {:<40}  {:<8}  {}",
                    movie.id,
                    movie.title,
                    if movie.is_featured { "yes" } else { "no" },
                    console.images().resolve(&movie.thumbnail)
                );
            }
        }
        MoviesCommand::Add {
            title,
            thumbnail,
            featured,
        } => {
            let form = MovieForm {
                title,
                thumbnail,
                featured,
            };
            match console.create_movie(&form).await? {
                Some(movie) => println!("Created movie {}", movie.id),
                None => println!("Created movie"),
            }
        }
        MoviesCommand::Edit {
            id,
            title,
            thumbnail,
        } => {
            let id = EntityId(id);
            let mut form = console.movie_form(id)?;
            overlay(&mut form.title, title);
            overlay(&mut form.thumbnail, thumbnail);
            console.update_movie(id, &form).await?;
            println!("Updated movie {id}");
        }
        MoviesCommand::Feature { id } => {
            console.set_featured(EntityId(id), true).await?;
            println!("Movie {id} is featured");
        }
        MoviesCommand::Unfeature { id } => {
            console.set_featured(EntityId(id), false).await?;
            println!("Movie {id} removed from featured");
        }
        MoviesCommand::Delete(args) => {
            let outcome = console
                .delete_movie(EntityId(args.id), confirmer(args.yes).as_ref())
                .await?;
            print_deleted(outcome);
        }
    }
    Ok(())
}

async fn run_import(console: &mut Console, tmdb: &TmdbClient, command: ImportCommand) -> Result<()> {
    let report = match command {
        ImportCommand::Episodes {
            show,
            season,
            pick,
            dry_run,
        } => {
            let (show, season) = (EntityId(show), EntityId(season));
            if dry_run {
                for draft in console.preview_episodes(tmdb, show, season).await? {
                    println!(
                        "{:>3}  {:<40}  {:<8}  {}",
                        draft.order,
                        draft.episode_name,
                        draft.runtime,
                        console.images().resolve(&draft.poster)
                    );
                }
                return Ok(());
            }
            let pick = (!pick.is_empty()).then_some(pick.as_slice());
            console.import_episodes(tmdb, show, season, pick).await?
        }
        ImportCommand::Seasons {
            show,
            pick,
            dry_run,
        } => {
            let show = EntityId(show);
            if dry_run {
                for draft in console.preview_seasons(tmdb, show).await? {
                    println!("{:>3}  {}", draft.order, draft.season_name);
                }
                return Ok(());
            }
            let pick = (!pick.is_empty()).then_some(pick.as_slice());
            console.import_seasons(tmdb, show, pick).await?
        }
    };

    println!("Registered {}/{}", report.registered, report.attempted);
    for (number, reason) in &report.failed {
        println!("  #{number}: {reason}");
    }
    if report.attempted > 0 && report.registered == 0 {
        bail!("nothing was registered");
    }
    Ok(())
}

fn run_session(sessions: &SessionStore, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Token { value } => {
            let mut session = sessions.load()?;
            session.tmdb_token = Some(value);
            sessions.save(&session)?;
            println!("TMDB token saved to {}", sessions.path().display());
        }
        SessionCommand::Logout => {
            sessions.clear()?;
            println!("Session cleared");
        }
        SessionCommand::Show => {
            let session = sessions.load()?;
            println!("Session file: {}", sessions.path().display());
            println!(
                "TMDB token:   {}",
                if session.tmdb_token.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
        }
    }
    Ok(())
}
