use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lernkarten_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lernkarten")]
#[command(about = "Study cards for materials science: import, browse and drill", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a single card and print its id
    Add {
        #[arg(long)]
        topic: String,

        /// Formel, Definition, Graph, Erklärung (other values are kept as-is)
        #[arg(long = "type")]
        card_type: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        /// Defaults to the configured category
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        latex: Option<String>,
    },

    /// Import cards from a JSON file, skipping probable duplicates
    Import {
        file: PathBuf,

        /// Import duplicates anyway, under new ids
        #[arg(long)]
        replace_all: bool,
    },

    /// List cards, sorted by id
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show one card as JSON
    Show { id: String },

    /// Edit a card in place (its id never changes)
    Update {
        id: String,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long = "type")]
        card_type: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// LaTeX source; pass an empty string to clear it
        #[arg(long)]
        latex: Option<String>,

        #[arg(long)]
        image_needed: Option<bool>,
    },

    /// Delete a card permanently
    Delete { id: String },

    /// Print the id a new card would get
    NextId {
        #[arg(long)]
        topic: String,

        #[arg(long = "type")]
        card_type: String,
    },

    /// Drill the selected cards
    Review {
        #[command(flatten)]
        filter: FilterArgs,

        /// Answer "know" to every card (for testing)
        #[arg(long, conflicts_with = "auto_again_first")]
        auto_know: bool,

        /// Answer "again" to the first card once, then "know" (for testing)
        #[arg(long, conflicts_with = "auto_know")]
        auto_again_first: bool,
    },

    /// Show recent review sessions
    History {
        /// Window in days (defaults to the configured value)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Export cards to CSV
    Export {
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    #[arg(long)]
    topic: Option<String>,

    #[arg(long = "type")]
    card_type: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// Substring of title or content
    #[arg(long)]
    search: Option<String>,
}

impl From<FilterArgs> for CardFilter {
    fn from(args: FilterArgs) -> Self {
        CardFilter {
            topic: args.topic,
            card_type: args.card_type.map(CardType::from),
            category: args.category.map(CardCategory::from),
            search: args.search,
        }
    }
}

/// Paths and settings shared by all commands
struct Context {
    config: Config,
    store: CardStore,
    review_log_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    lernkarten_core::logging::init_for_verbosity(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let ctx = Context {
        store: CardStore::in_dir(&data_dir),
        review_log_path: data_dir.join("reviews.jsonl"),
        config,
    };

    match cli.command {
        Commands::Add {
            topic,
            card_type,
            title,
            content,
            category,
            latex,
        } => {
            let mut new_card = NewCard::new(title, topic, CardType::from(card_type));
            new_card.content = content;
            new_card.category = category.map(CardCategory::from);
            new_card.details.latex = latex;
            cmd_add(&ctx, new_card)
        }
        Commands::Import { file, replace_all } => cmd_import(&ctx, &file, replace_all),
        Commands::List { filter } => cmd_list(&ctx, filter.into()),
        Commands::Show { id } => cmd_show(&ctx, &id),
        Commands::Update {
            id,
            topic,
            card_type,
            category,
            title,
            content,
            latex,
            image_needed,
        } => {
            let patch = CardPatch {
                topic,
                card_type: card_type.map(CardType::from),
                category: category.map(CardCategory::from),
                title,
                content,
                latex,
                image_needed,
            };
            cmd_update(&ctx, &id, patch)
        }
        Commands::Delete { id } => cmd_delete(&ctx, &id),
        Commands::NextId { topic, card_type } => cmd_next_id(&ctx, &topic, card_type),
        Commands::Review {
            filter,
            auto_know,
            auto_again_first,
        } => {
            let mode = if auto_know {
                AnswerMode::AutoKnow
            } else if auto_again_first {
                AnswerMode::AutoAgainFirst
            } else {
                AnswerMode::Interactive
            };
            cmd_review(&ctx, filter.into(), mode)
        }
        Commands::History { days } => cmd_history(&ctx, days),
        Commands::Export { file, filter } => cmd_export(&ctx, &file, filter.into()),
    }
}

fn cmd_add(ctx: &Context, new_card: NewCard) -> Result<()> {
    if let Some(field) = new_card.blank_field() {
        return Err(Error::BlankField(field));
    }

    let generator = ctx.config.id_generator()?;
    let default_category = ctx.config.default_category();

    let id = ctx.store.transaction(|cards| {
        Ok(cards.insert(new_card, &generator, &default_category).id.clone())
    })?;

    println!("✓ Added {}", id);
    Ok(())
}

fn cmd_import(ctx: &Context, file: &Path, replace_all: bool) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let candidates = parse_import_json(&contents)?;

    let generator = ctx.config.id_generator()?;
    let strategy = if replace_all {
        ImportStrategy::ReplaceAll
    } else {
        ImportStrategy::SkipDuplicates
    };
    let importer = Importer::new(&generator)
        .strategy(strategy)
        .mode(ctx.config.fingerprint_mode())
        .default_category(ctx.config.default_category());

    let report = ctx
        .store
        .transaction(|cards| Ok(cards.import(candidates, &importer)))?;

    println!("✓ Imported {} cards", report.imported_count);
    if report.duplicate_count > 0 {
        let verb = if replace_all { "imported anyway" } else { "skipped" };
        println!("  {} probable duplicates {}", report.duplicate_count, verb);
    }
    for card in &report.imported_cards {
        println!("  {}  {}", card.id, card.title);
    }
    Ok(())
}

fn cmd_list(ctx: &Context, filter: CardFilter) -> Result<()> {
    let collection = ctx.store.load()?;
    let cards = filter.apply(&collection.cards);

    if cards.is_empty() {
        println!("No cards found.");
        return Ok(());
    }

    for card in &cards {
        println!(
            "{:<12} {:<11} {:<16} {:<20} {}",
            card.id, card.card_type, card.category, card.topic, card.title
        );
    }
    println!("\n{} of {} cards", cards.len(), collection.cards.len());
    Ok(())
}

fn cmd_show(ctx: &Context, id: &str) -> Result<()> {
    let collection = ctx.store.load()?;
    let card = collection
        .get(id)
        .ok_or_else(|| Error::CardNotFound(id.to_string()))?;
    println!("{}", serde_json::to_string_pretty(card)?);
    Ok(())
}

fn cmd_update(ctx: &Context, id: &str, patch: CardPatch) -> Result<()> {
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    ctx.store.transaction(|cards| cards.update(id, patch).map(|_| ()))?;
    println!("✓ Updated {}", id);
    Ok(())
}

fn cmd_delete(ctx: &Context, id: &str) -> Result<()> {
    let card = ctx.store.transaction(|cards| cards.delete(id))?;
    println!("✓ Deleted {} ({})", card.id, card.title);
    Ok(())
}

fn cmd_next_id(ctx: &Context, topic: &str, card_type: String) -> Result<()> {
    let generator = ctx.config.id_generator()?;
    let collection = ctx.store.load()?;
    let id = generator.generate(topic, &CardType::from(card_type), collection.id_pool());
    println!("{}", id);
    Ok(())
}

fn cmd_history(ctx: &Context, days: Option<i64>) -> Result<()> {
    let days = days.unwrap_or(ctx.config.review.history_days);
    let sessions = load_recent_sessions(&ctx.review_log_path, days)?;

    if sessions.is_empty() {
        println!("No review sessions in the last {} days.", days);
        return Ok(());
    }

    for session in &sessions {
        println!(
            "{}  {:>3} cards  {:>3}%  ({} answers)",
            session.finished_at.format("%Y-%m-%d %H:%M"),
            session.card_count,
            session.percentage,
            session.total_seen
        );
    }

    let summary = summarize(&sessions);
    println!(
        "\n{} sessions, {} cards, average {}%",
        summary.sessions, summary.cards_reviewed, summary.average_percentage
    );
    Ok(())
}

fn cmd_export(ctx: &Context, file: &Path, filter: CardFilter) -> Result<()> {
    let collection = ctx.store.load()?;
    let cards = filter.apply(&collection.cards);
    let count = export_cards_csv(cards, file)?;
    println!("✓ Exported {} cards to {}", count, file.display());
    Ok(())
}

// ============================================================================
// Review
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum AnswerMode {
    Interactive,
    AutoKnow,
    AutoAgainFirst,
}

enum UserAction {
    Flip,
    Know,
    Again,
    Quit,
}

fn cmd_review(ctx: &Context, filter: CardFilter, mode: AnswerMode) -> Result<()> {
    let collection = ctx.store.load()?;
    let cards: Vec<Card> = filter.apply(&collection.cards).into_iter().cloned().collect();

    let mut deck = ReviewDeck::new();
    if !deck.start(cards) {
        println!("No cards match - nothing to review.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut missed_once = false;

    loop {
        let started_at = Utc::now();

        while deck.phase() == Phase::Learning {
            if !deck.is_flipped() {
                display_front(&deck);
            }

            let action = match mode {
                AnswerMode::Interactive => prompt_user_action(&mut input, deck.is_flipped())?,
                _ if !deck.is_flipped() => UserAction::Flip,
                AnswerMode::AutoAgainFirst if !missed_once => {
                    missed_once = true;
                    UserAction::Again
                }
                _ => UserAction::Know,
            };

            match action {
                UserAction::Flip => {
                    deck.flip();
                    if deck.is_flipped() {
                        if let Some(card) = deck.current() {
                            display_back(card);
                        }
                    }
                }
                UserAction::Know => {
                    deck.know();
                }
                UserAction::Again => {
                    if deck.again() {
                        println!("  ↻ Back to the end of the deck");
                    }
                }
                UserAction::Quit => {
                    deck.back();
                    println!("\nSession abandoned - nothing logged.");
                    return Ok(());
                }
            }
        }

        let session = ReviewSession {
            id: uuid::Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            card_count: deck.total_cards(),
            known_count: deck.known_count(),
            total_seen: deck.total_seen(),
            percentage: deck.percentage(),
        };
        let mut log = JsonlReviewLog::new(&ctx.review_log_path);
        log.append(&session)?;

        println!("\n✓ Session complete!");
        println!("  Known: {} of {} ({}%)", session.known_count, session.card_count, session.percentage);
        println!("  Answers: {}", session.total_seen);

        if mode != AnswerMode::Interactive || !prompt_restart(&mut input)? {
            deck.back();
            return Ok(());
        }
        deck.restart();
    }
}

fn display_front(deck: &ReviewDeck<Card>) {
    let snapshot = deck.snapshot();
    let Some(card) = snapshot.current else {
        return;
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  Card {}/{}  ·  known {}",
        snapshot.current_index + 1,
        snapshot.deck_len,
        snapshot.known_count
    );
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {} · {} · {}", card.topic, card.card_type, card.category);
    println!("  {}", card.title);
    println!();
}

fn display_back(card: &Card) {
    println!("─────────────────────────────────────────");
    if !card.content.is_empty() {
        println!("  {}", card.content);
    }
    if let Some(ref latex) = card.details.latex {
        println!("  ∑ {}", latex);
    }
    for var in &card.details.variables {
        if var.unit.is_empty() {
            println!("    {}  {}", var.symbol, var.name);
        } else {
            println!("    {}  {} [{}]", var.symbol, var.name, var.unit);
        }
    }
    if let Some(ref unit) = card.details.result_unit {
        println!("  → Unit: {}", unit);
    }
    if let Some(ref conditions) = card.details.conditions {
        println!("  → Conditions: {}", conditions);
    }
    if let Some(ref axes) = card.details.axes {
        println!("  → Axes: x = {}, y = {}", axes.x, axes.y);
    }
    for feature in &card.details.key_features {
        println!("  • {}", feature);
    }
    println!();
}

fn prompt_user_action(input: &mut impl BufRead, flipped: bool) -> Result<UserAction> {
    if flipped {
        print!("'k' know, 'a' again, Enter flips back, 'q' quits > ");
    } else {
        print!("Enter to flip, 'q' to quit > ");
    }
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(UserAction::Quit);
    }

    let action = match line.trim().to_lowercase().as_str() {
        "q" => UserAction::Quit,
        "k" if flipped => UserAction::Know,
        "a" if flipped => UserAction::Again,
        _ => UserAction::Flip,
    };
    Ok(action)
}

fn prompt_restart(input: &mut impl BufRead) -> Result<bool> {
    print!("'r' + Enter to drill the same cards again, Enter to finish > ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("r"))
}
