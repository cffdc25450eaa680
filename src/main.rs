use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use optlist::config::{self, Config};
use optlist::filter::{self, FilterParams, FilteredOptionsRequest, OptionsResult};
use optlist::format;
use optlist::model::Snapshot;
use optlist::option::{ListOption, OptionKind, Section};
use optlist::sections::{self, SectionParams};
use optlist::store;

#[derive(Parser, Debug)]
#[command(name = "optlist", about = "Search and group picker options from a store snapshot")]
struct Cli {
    /// Configuration file (defaults to <config dir>/optlist/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search reports and contacts
    Search(SearchArgs),
    /// Category sections (hierarchical)
    Categories(TaxonomyArgs),
    /// Tag sections
    Tags(TaxonomyArgs),
    /// Tax rate sections (selection by tax code)
    TaxRates(TaxonomyArgs),
    /// Format every contact as a member list row
    Members(OutputArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Store snapshot as JSON
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Print JSON instead of tab-separated rows
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// New chat picker
    NewChat,
    /// Global search
    Search,
    /// Share destination picker
    Share,
    /// Workspace member invite
    Members,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[command(flatten)]
    output: OutputArgs,

    #[arg(long, value_enum, default_value_t = Preset::NewChat)]
    preset: Preset,

    /// Already selected login (repeatable)
    #[arg(long = "selected", value_name = "LOGIN")]
    selected: Vec<String>,

    /// Login to leave out (repeatable)
    #[arg(long = "exclude", value_name = "LOGIN")]
    exclude: Vec<String>,

    /// Recent reports to show without a search term
    #[arg(long)]
    max_recent: Option<usize>,

    /// Search input
    #[arg(default_value = "")]
    query: String,
}

#[derive(Args, Debug)]
struct TaxonomyArgs {
    #[command(flatten)]
    output: OutputArgs,

    /// Selected name, or tax code for tax rates (repeatable)
    #[arg(long = "selected", value_name = "NAME")]
    selected: Vec<String>,

    /// Search input
    #[arg(default_value = "")]
    query: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    init_tracing(&config);
    config.warn_unknown_keys();

    match cli.command {
        Command::Search(args) => handle_search(args, &config),
        Command::Categories(args) => handle_taxonomy(args, &config, Taxonomy::Categories),
        Command::Tags(args) => handle_taxonomy(args, &config, Taxonomy::Tags),
        Command::TaxRates(args) => handle_taxonomy(args, &config, Taxonomy::TaxRates),
        Command::Members(args) => handle_members(args, &config),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_snapshot(args: &OutputArgs) -> Result<Snapshot> {
    store::load_snapshot(&args.snapshot).context("unable to load store snapshot")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

fn handle_search(args: SearchArgs, config: &Config) -> Result<()> {
    let snapshot = load_snapshot(&args.output)?;

    let result = match args.preset {
        Preset::NewChat => {
            let request = FilteredOptionsRequest {
                filter: FilterParams {
                    selected_logins: args.selected,
                    exclude_logins: args.exclude,
                    max_recent_reports: args.max_recent,
                    ..FilterParams::new(args.query.as_str())
                },
                ..Default::default()
            };
            let options = filter::get_filtered_options(&snapshot, config, &request);
            OptionsResult {
                recent_reports: options.recent_reports,
                personal_details: options.personal_details,
                user_to_invite: options.user_to_invite,
            }
        }
        Preset::Search => filter::get_search_options(&snapshot, config, &args.query),
        Preset::Share => filter::get_share_destination_options(
            &snapshot,
            config,
            &args.query,
            &args.selected,
            &args.exclude,
        ),
        Preset::Members => {
            filter::get_member_invite_options(&snapshot, config, &args.query, &args.exclude)
        }
    };

    if args.output.json {
        return print_json(&result);
    }

    let total = result.recent_reports.len()
        + result.personal_details.len()
        + usize::from(result.user_to_invite.is_some());
    if total == 0 {
        println!("No matches for \"{}\"", args.query);
        return Ok(());
    }
    println!("Found {} option(s) matching \"{}\"", total, args.query);

    // kind<TAB>key<TAB>text<TAB>alternate text
    for option in result
        .recent_reports
        .iter()
        .chain(&result.personal_details)
        .chain(result.user_to_invite.as_ref())
    {
        println!(
            "{}\t{}\t{}\t{}",
            kind_label(option),
            option.key_for_list,
            option.text,
            option.alternate_text
        );
    }
    Ok(())
}

fn kind_label(option: &ListOption) -> &'static str {
    match option.kind {
        OptionKind::Report { .. } => "report",
        OptionKind::Contact { .. } => "contact",
        OptionKind::Invite { .. } => "invite",
        OptionKind::CategoryLeaf { .. } => "category",
        OptionKind::CategoryAncestor { .. } => "ancestor",
        OptionKind::Tag => "tag",
        OptionKind::TaxRate { .. } => "tax-rate",
    }
}

// =============================================================================
// Taxonomies
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum Taxonomy {
    Categories,
    Tags,
    TaxRates,
}

fn handle_taxonomy(args: TaxonomyArgs, config: &Config, taxonomy: Taxonomy) -> Result<()> {
    let snapshot = load_snapshot(&args.output)?;
    let params = SectionParams::new(config, &args.query).selected(&args.selected);

    let built = match taxonomy {
        Taxonomy::Categories => sections::category_sections(
            &snapshot.categories,
            &params.recently_used(&snapshot.recently_used_categories),
        ),
        Taxonomy::Tags => sections::tag_sections(
            &snapshot.tags,
            &params.recently_used(&snapshot.recently_used_tags),
        ),
        Taxonomy::TaxRates => sections::tax_rate_sections(snapshot.tax_rates.as_ref(), &params),
    };

    if args.output.json {
        return print_json(&built);
    }
    print_sections(&built);
    Ok(())
}

/// title<TAB>key<TAB>text<TAB>state, one row per option. Untitled sections
/// print `-` as their title.
fn print_sections(built: &[Section]) {
    for section in built {
        let title = if section.title.is_empty() {
            "-"
        } else {
            section.title.as_str()
        };
        for option in &section.data {
            let state = if option.is_disabled {
                "disabled"
            } else if option.is_selected {
                "selected"
            } else {
                ""
            };
            println!("{}\t{}\t{}\t{}", title, option.key_for_list, option.text, state);
        }
    }
}

// =============================================================================
// Members
// =============================================================================

fn handle_members(args: OutputArgs, config: &Config) -> Result<()> {
    let snapshot = load_snapshot(&args)?;
    let members: Vec<ListOption> = snapshot
        .personal_details
        .values()
        .map(|detail| format::format_member_for_list(detail, config))
        .collect();

    if args.json {
        return print_json(&members);
    }
    for member in &members {
        println!(
            "{}\t{}\t{}",
            member.key_for_list,
            member.text,
            if member.is_selected { "selected" } else { "" }
        );
    }
    Ok(())
}
