//! Command execution
//!
//! Every command loads the configuration, opens the file-backed preference
//! store and then drives a [`Screen`] the same way the web UI does.

use crate::table::{render_import_report, render_view};
use crate::{
    Cli, ColumnsArgs, Command, ExportArgs, ImportArgs, ListArgs, QueryArgs, ReferenceArgs,
    SearchAction, SearchesArgs, SourceArgs,
};
use anyhow::{Context, Result, bail};
use roster_core::{SortDirection, UserType};
use roster_grid::{
    FilePreferenceStore, PersonFilters, PreferenceKey, PreferenceStore, SavedSearch, Screen,
    ScreenDefinition, SortSpec, TracingNotifier, export_csv, export_file_name, parse_import,
    validate_import,
};
use roster_model::{
    CONFIG_FILE_NAME, GridConfig, ReferenceData, parse_cities, parse_listing, parse_roles,
    parse_states,
};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared state for one invocation
struct Session {
    config: GridConfig,
    user_id: Option<String>,
    store: FilePreferenceStore,
    color: bool,
}

impl Session {
    fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let config = GridConfig::load_or_default(&config_path)
            .with_context(|| format!("loading configuration {}", config_path.display()))?;
        let user_id = cli.user.clone().or_else(|| config.user_id.clone());
        let store = FilePreferenceStore::new(config.resolved_preferences_dir());
        tracing::debug!("Preferences stored in {}", store.dir().display());
        Ok(Self {
            config,
            user_id,
            store,
            color: !cli.no_color && std::io::stdout().is_terminal(),
        })
    }

    fn key(&self, user_type: UserType) -> PreferenceKey {
        PreferenceKey::new(self.user_id.as_deref(), user_type.screen_name())
    }
}

/// Run a parsed command line, writing results to `out`
pub async fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let ctx = Session::load(cli)?;
    match &cli.command {
        Command::List(args) => list(&ctx, args, out).await,
        Command::Export(args) => export(&ctx, args, out).await,
        Command::Import(args) => import(args, ctx.color, out).await,
        Command::Columns(args) => columns(&ctx, args, out),
        Command::Searches(args) => searches(&ctx, args, out),
    }
}

// ============================================================================
// Loading
// ============================================================================

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// Load whichever reference tables were given
pub async fn load_reference(args: &ReferenceArgs) -> Result<ReferenceData> {
    let mut reference = ReferenceData::empty();
    if let Some(path) = &args.states {
        reference = reference.with_states(parse_states(&read_file(path).await?)?);
    }
    if let Some(path) = &args.cities {
        reference = reference.with_cities(parse_cities(&read_file(path).await?)?);
    }
    if let Some(path) = &args.roles {
        reference = reference.with_roles(parse_roles(&read_file(path).await?)?);
    }
    Ok(reference)
}

async fn open_screen(ctx: &Session, source: &SourceArgs) -> Result<Screen> {
    let user_type = source.screen.screen;
    let mut screen = Screen::new(user_type, &ctx.config, Arc::new(TracingNotifier));

    let reference = load_reference(&source.reference).await?;
    screen.apply_reference(Ok(reference));

    let text = read_file(&source.records).await?;
    let records = parse_listing(&text, user_type)
        .with_context(|| format!("parsing {}", source.records.display()))?;
    screen.apply_fetch(Ok(records));
    Ok(screen)
}

/// Map a column id (or a flattened key) to the key it sorts by
fn resolve_sort_key(definition: &ScreenDefinition, column: &str) -> Result<String> {
    if let Some(descriptor) = definition.columns.get(column) {
        return match &descriptor.sort_key {
            Some(key) => Ok(key.clone()),
            None => bail!("column '{}' is not sortable", column),
        };
    }
    if let Some(descriptor) = definition
        .columns
        .all()
        .iter()
        .find(|c| c.sort_key.as_deref() == Some(column))
    {
        return Ok(descriptor.sort_key.clone().unwrap_or_default());
    }
    bail!(
        "unknown column '{}' for {}; expected one of: {}",
        column,
        definition.name,
        definition.columns.ids().join(", ")
    )
}

fn requested_sort(definition: &ScreenDefinition, query: &QueryArgs) -> Result<Option<SortSpec>> {
    query
        .sort
        .as_deref()
        .map(|column| -> Result<SortSpec> {
            let direction = if query.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            Ok(SortSpec::new(resolve_sort_key(definition, column)?, direction))
        })
        .transpose()
}

fn find_saved(ctx: &Session, user_type: UserType, name: &str) -> Result<SavedSearch> {
    ctx.store
        .load_saved_searches(&ctx.key(user_type))?
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .with_context(|| format!("no saved search named '{name}'"))
}

/// Apply a saved search (if named), then the explicit flags on top
fn apply_query(ctx: &Session, screen: &mut Screen, query: &QueryArgs) -> Result<()> {
    let user_type = screen.user_type();
    if let Some(name) = &query.saved {
        let saved = find_saved(ctx, user_type, name)?;
        screen.apply_saved_search(&saved);
    }
    if query.has_filters() {
        let filters = query.filters(screen.filters().clone());
        screen.set_filters(filters);
    }
    if let Some(search) = &query.search {
        screen.set_search(search.clone());
    }
    if let Some(sort) = requested_sort(screen.definition(), query)? {
        screen.grid_mut().set_sort(Some(sort));
    }
    Ok(())
}

/// Per-run columns win over the saved column set
fn apply_columns(
    ctx: &Session,
    screen: &mut Screen,
    columns: Option<&Vec<String>>,
) -> Result<()> {
    let visible = match columns {
        Some(ids) => {
            screen
                .definition()
                .columns
                .check_ids(&screen.definition().name, ids)?;
            Some(ids.clone())
        }
        None => ctx.store.load_columns(&ctx.key(screen.user_type()))?,
    };
    screen.grid_mut().set_visible_columns(visible);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn list<W: Write>(ctx: &Session, args: &ListArgs, out: &mut W) -> Result<()> {
    let mut screen = open_screen(ctx, &args.source).await?;
    apply_query(ctx, &mut screen, &args.query)?;
    apply_columns(ctx, &mut screen, args.columns.as_ref())?;
    if let Some(page_size) = args.page_size {
        if !ctx.config.allows_page_size(page_size) {
            bail!(
                "page size {} is not allowed; expected one of: {}",
                page_size,
                ctx.config
                    .page_size_options
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        screen.grid_mut().set_page_size(page_size);
    }
    screen.grid_mut().go_to_page(args.page);

    let view = screen.view();
    write!(out, "{}", render_view(&view, ctx.color))?;
    Ok(())
}

async fn export<W: Write>(ctx: &Session, args: &ExportArgs, out: &mut W) -> Result<()> {
    let mut screen = open_screen(ctx, &args.source).await?;
    apply_query(ctx, &mut screen, &args.query)?;
    apply_columns(ctx, &mut screen, args.columns.as_ref())?;

    let grid = screen.grid();
    let columns = grid.columns().visible(grid.visible_columns());
    let rows = grid.filtered_rows();
    let csv = export_csv(&columns, &rows);

    match &args.out {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export_file_name(
                    &screen.definition().name,
                    chrono::Local::now().date_naive(),
                ))
            } else {
                path.clone()
            };
            tokio::fs::write(&path, csv.as_bytes())
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Exported {} rows to {}", rows.len(), path.display());
            writeln!(out, "Exported {} rows to {}", rows.len(), path.display())?;
        }
        None => writeln!(out, "{csv}")?,
    }
    Ok(())
}

async fn import<W: Write>(args: &ImportArgs, color: bool, out: &mut W) -> Result<()> {
    let text = read_file(&args.file).await?;
    let rows = parse_import(&text).with_context(|| format!("parsing {}", args.file.display()))?;
    let reference = load_reference(&args.reference).await?;
    let report = validate_import(&rows, args.screen.screen, &reference)?;

    write!(out, "{}", render_import_report(&report, color))?;
    if args.json {
        let payloads: Vec<_> = report.accepted.iter().map(|a| &a.payload).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&payloads)?)?;
    }
    Ok(())
}

fn columns<W: Write>(ctx: &Session, args: &ColumnsArgs, out: &mut W) -> Result<()> {
    let user_type = args.screen.screen;
    let definition = ScreenDefinition::for_user_type(user_type);
    let key = ctx.key(user_type);

    if let Some(ids) = &args.set {
        definition.columns.check_ids(&definition.name, ids)?;
        ctx.store.save_columns(&key, ids)?;
        writeln!(out, "Saved {} visible columns for {}", ids.len(), definition.name)?;
        return Ok(());
    }
    if args.reset {
        ctx.store.clear_columns(&key)?;
        writeln!(out, "Showing every column for {}", definition.name)?;
        return Ok(());
    }

    let saved = ctx.store.load_columns(&key)?;
    let visible: Vec<&str> = definition
        .columns
        .visible(saved.as_deref())
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    for column in definition.columns.all() {
        let mark = if visible.contains(&column.id.as_str()) { "x" } else { " " };
        writeln!(out, "[{}] {:<12} {}", mark, column.id, column.title)?;
    }
    Ok(())
}

fn searches<W: Write>(ctx: &Session, args: &SearchesArgs, out: &mut W) -> Result<()> {
    let user_type = args.screen.screen;
    let definition = ScreenDefinition::for_user_type(user_type);
    let key = ctx.key(user_type);

    match &args.action {
        SearchAction::List => {
            let saved = ctx.store.load_saved_searches(&key)?;
            if saved.is_empty() {
                writeln!(out, "No saved searches for {}", definition.name)?;
            }
            for search in saved {
                writeln!(
                    out,
                    "{}  {}  {}",
                    search.name,
                    describe(&search),
                    search.modified_at.format("%Y-%m-%d %H:%M")
                )?;
            }
        }
        SearchAction::Save { label, query } => {
            let sort = requested_sort(&definition, query)?;
            let search = SavedSearch::new(label.clone(), query.filters(PersonFilters::new()))
                .with_search(query.search.clone().unwrap_or_default())
                .with_sort(sort);
            ctx.store.save_search(&key, search)?;
            writeln!(out, "Saved search '{}' for {}", label.trim(), definition.name)?;
        }
        SearchAction::Delete { name } => {
            ctx.store.delete_search(&key, name)?;
            writeln!(out, "Deleted search '{}' from {}", name.trim(), definition.name)?;
        }
    }
    Ok(())
}

/// One-line summary of what a saved search constrains
fn describe(search: &SavedSearch) -> String {
    let filters = &search.filters;
    let mut parts: Vec<String> = [
        ("name", &filters.name),
        ("email", &filters.email),
        ("phone", &filters.phone),
        ("role", &filters.role_id),
        ("state", &filters.state_id),
        ("city", &filters.city_id),
        ("status", &filters.status),
    ]
    .iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| format!("{label}={}", value.trim()))
    .collect();
    if !search.search.trim().is_empty() {
        parts.push(format!("search=\"{}\"", search.search.trim()));
    }
    if let Some(sort) = &search.sort {
        parts.push(format!("sort={} {}", sort.key, sort.direction.short_name()));
    }
    if parts.is_empty() {
        "(no filters)".to_string()
    } else {
        parts.join(" ")
    }
}

// ============================================================================
// Tests
// ============================================================================
