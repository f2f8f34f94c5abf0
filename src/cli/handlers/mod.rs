use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Local;
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::storage::FileStorage;
use crate::model::board::{BoardColor, PALETTE};
use crate::model::config::AppConfig;
use crate::model::task::ContentKind;
use crate::ops::board_ops::{BoardStats, board_stats};
use crate::ops::relocate::MoveRequest;
use crate::ops::task_ops::{self, TaskUpdate};
use crate::ops::{check, search};
use crate::session::{Applied, Intent, Session};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: the resolved data directory, the config read
/// from it, and an open session over file storage there.
struct Context {
    data_dir: PathBuf,
    config: AppConfig,
    session: Session<FileStorage>,
}

impl Context {
    fn open(data_dir: Option<&str>) -> Result<Context, Box<dyn std::error::Error>> {
        let data_dir = config_io::resolve_data_dir(data_dir.map(Path::new));
        let config = config_io::read_config(&data_dir)?;
        log::debug!("data dir {}", data_dir.display());
        let session = Session::open(FileStorage::new(&data_dir), &config);
        Ok(Context {
            data_dir,
            config,
            session,
        })
    }

    /// Apply an intent, turning a rejected one into an error for the user.
    fn apply(&mut self, intent: Intent) -> Result<Applied, Box<dyn std::error::Error>> {
        let applied = self.session.try_dispatch(intent)?;
        if self.session.save_failed() {
            return Err(format!(
                "change could not be saved to {}",
                self.session.storage().path_for(self.session.key()).display()
            )
            .into());
        }
        Ok(applied)
    }

    fn apply_created(&mut self, intent: Intent) -> Result<String, Box<dyn std::error::Error>> {
        match self.apply(intent)? {
            Applied::Created(id) => Ok(id),
            Applied::Changed => Err("nothing was created".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let mut ctx = Context::open(cli.data_dir.as_deref())?;

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(&ctx, args, json),
        Commands::Show(args) => cmd_show(&ctx, args, json),
        Commands::Search(args) => cmd_search(&ctx, args, json),
        Commands::Stats => cmd_stats(&ctx, json),
        Commands::Check => cmd_check(&ctx, json),
        Commands::Config(args) => cmd_config(&ctx, args),

        // Write commands
        Commands::Board(cmd) => cmd_board(&mut ctx, cmd.action, json),
        Commands::Add(args) => cmd_add(&mut ctx, args, json),
        Commands::Sub(args) => cmd_sub(&mut ctx, args, json),
        Commands::Rm(args) => cmd_rm(&mut ctx, args),
        Commands::Set(args) => cmd_set(&mut ctx, args),
        Commands::Item(cmd) => cmd_item(&mut ctx, cmd.action),
        Commands::Tag(args) => cmd_tag(&mut ctx, args),
        Commands::Mv(args) => cmd_mv(&mut ctx, args),

        // Data exchange
        Commands::Export(args) => cmd_export(&ctx, args),
        Commands::Import(args) => cmd_import(&mut ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs, json: bool) -> CmdResult {
    let forest = ctx.session.forest();
    let boards = match args.board {
        Some(ref id) => vec![forest.board(id).ok_or_else(|| format!("board not found: {}", id))?],
        None => forest.sorted_boards(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&boards)?);
        return Ok(());
    }

    let mut first = true;
    for board in boards {
        if !first {
            println!();
        }
        first = false;
        println!("{}", format_board_header(board, args.ids));
        let mut lines = Vec::new();
        format_task_tree(&board.tasks, 0, args.ids, &mut lines);
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs, json: bool) -> CmdResult {
    let task = task_ops::find_task(ctx.session.forest(), &args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_search(ctx: &Context, args: SearchArgs, json: bool) -> CmdResult {
    let forest = ctx.session.forest();
    let re = Regex::new(&args.pattern)?;
    let hits = search::search_tasks(forest, &re);

    if json {
        let out: Vec<SearchHitJson> = hits
            .iter()
            .map(|hit| SearchHitJson {
                board: hit.board_id.clone(),
                task_id: hit.task_id.clone(),
                title: task_ops::find_task(forest, &hit.task_id)
                    .map(|t| t.title.clone())
                    .unwrap_or_default(),
                field: hit.field.name(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    // One line per task, however many of its fields matched
    let mut seen = HashSet::new();
    for hit in &hits {
        if !seen.insert(&hit.task_id) {
            continue;
        }
        match task_ops::find_task(forest, &hit.task_id) {
            Some(task) => println!("[{}] {}", hit.board_id, format_task_line(task, true)),
            None => println!("[{}] {} (in {})", hit.board_id, hit.task_id, hit.field.name()),
        }
    }
    Ok(())
}

fn cmd_stats(ctx: &Context, json: bool) -> CmdResult {
    let today = Local::now().date_naive();
    let boards = ctx.session.forest().sorted_boards();
    let per_board: Vec<(&str, &str, BoardStats)> = boards
        .iter()
        .map(|b| (b.id.as_str(), b.title.as_str(), board_stats(b, today)))
        .collect();
    let mut totals = BoardStats::default();
    for (_, _, stats) in &per_board {
        totals.add(stats);
    }

    if json {
        let out = StatsJson {
            boards: per_board
                .iter()
                .map(|(id, title, stats)| BoardStatsEntryJson {
                    id: id.to_string(),
                    title: title.to_string(),
                    stats: stats.into(),
                })
                .collect(),
            totals: (&totals).into(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let width = per_board
        .iter()
        .map(|(_, title, _)| title.chars().count())
        .max()
        .unwrap_or(0)
        .max("total".len());
    for (_, title, stats) in &per_board {
        println!("{}", format_stats_row(title, stats, width));
    }
    println!("{}", format_stats_row("total", &totals, width));
    Ok(())
}

fn format_stats_row(label: &str, stats: &BoardStats, width: usize) -> String {
    let mut row = format!(
        "{:<width$}  {:>3} tasks  high {:>2}  medium {:>2}  low {:>2}",
        label,
        stats.total,
        stats.high,
        stats.medium,
        stats.low,
        width = width
    );
    if stats.overdue > 0 {
        row.push_str(&format!("  ({} overdue)", stats.overdue));
    }
    row
}

fn cmd_check(ctx: &Context, json: bool) -> CmdResult {
    let issues = check::check_forest(ctx.session.forest());
    let has_errors = issues.iter().any(check::CheckIssue::is_error);

    if json {
        let out = CheckJson {
            ok: !has_errors,
            issues: issues.iter().map(ToString::to_string).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if issues.is_empty() {
        println!("ok");
    } else {
        for issue in &issues {
            let level = if issue.is_error() { "error" } else { "warning" };
            println!("{}: {}", level, issue);
        }
    }

    if has_errors {
        return Err("data has errors".into());
    }
    Ok(())
}

fn cmd_config(ctx: &Context, args: ConfigArgs) -> CmdResult {
    if args.init {
        let path = config_io::write_config(&ctx.data_dir, &ctx.config)?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    println!("# data dir: {}", ctx.data_dir.display());
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Board commands
// ---------------------------------------------------------------------------

fn cmd_board(ctx: &mut Context, action: BoardAction, json: bool) -> CmdResult {
    match action {
        BoardAction::Add { title } => {
            let id = ctx.apply_created(Intent::AddBoard { title })?;
            print_created(&id, json)
        }
        BoardAction::Rm { id } => {
            ctx.apply(Intent::DeleteBoard {
                board_id: id.clone(),
            })?;
            println!("{} deleted", id);
            Ok(())
        }
        BoardAction::Rename { id, title } => {
            ctx.apply(Intent::RenameBoard {
                board_id: id.clone(),
                title,
            })?;
            println!("{} renamed", id);
            Ok(())
        }
        BoardAction::Color { id, color } => {
            let color = BoardColor::parse_name(&color).ok_or_else(|| {
                let names: Vec<&str> = PALETTE.iter().map(|c| c.name()).collect();
                format!("unknown color '{}' (expected one of: {})", color, names.join(", "))
            })?;
            ctx.apply(Intent::RecolorBoard {
                board_id: id.clone(),
                color,
            })?;
            println!("{} is now {}", id, color);
            Ok(())
        }
        BoardAction::Mv { id, before } => {
            ctx.apply(Intent::Move(MoveRequest::Board {
                source_board_id: id.clone(),
                target_board_id: before.clone(),
            }))?;
            println!("{} moved before {}", id, before);
            Ok(())
        }
    }
}

fn print_created(id: &str, json: bool) -> CmdResult {
    if json {
        let out = CreatedJson { id: id.to_string() };
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs, json: bool) -> CmdResult {
    let id = ctx.apply_created(Intent::AddTask {
        board_id: args.board,
        title: args.title,
    })?;
    print_created(&id, json)
}

fn cmd_sub(ctx: &mut Context, args: SubArgs, json: bool) -> CmdResult {
    let id = ctx.apply_created(Intent::AddSubtask {
        parent_id: args.parent,
        title: args.title,
    })?;
    print_created(&id, json)
}

fn cmd_rm(ctx: &mut Context, args: RmArgs) -> CmdResult {
    let removed = task_ops::find_task(ctx.session.forest(), &args.id)
        .map(|t| t.subtree_size())
        .unwrap_or(0);
    ctx.apply(Intent::DeleteTask {
        task_id: args.id.clone(),
    })?;
    if removed > 1 {
        println!("{} deleted with {} subtasks", args.id, removed - 1);
    } else {
        println!("{} deleted", args.id);
    }
    Ok(())
}

fn cmd_set(ctx: &mut Context, args: SetArgs) -> CmdResult {
    let update = TaskUpdate::parse(&args.field, &args.value)?;
    ctx.apply(Intent::UpdateTask {
        task_id: args.id.clone(),
        update,
    })?;
    println!("{} {} updated", args.id, args.field.to_lowercase());
    Ok(())
}

fn cmd_item(ctx: &mut Context, action: ItemAction) -> CmdResult {
    match action {
        ItemAction::Add { id, kind, text } => {
            let kind = ContentKind::parse_name(&kind)
                .ok_or_else(|| format!("unknown item kind '{}' (bullet or numbered)", kind))?;
            ctx.apply(Intent::AddContentItem {
                task_id: id.clone(),
                kind,
                text: text.unwrap_or_default(),
            })?;
            let index = task_ops::find_task(ctx.session.forest(), &id)
                .map(|t| t.content.len().saturating_sub(1))
                .unwrap_or(0);
            println!("{} item {} added", id, index);
            Ok(())
        }
        ItemAction::Edit { id, index, text } => {
            ctx.apply(Intent::UpdateContentItem {
                task_id: id.clone(),
                index,
                text,
            })?;
            println!("{} item {} updated", id, index);
            Ok(())
        }
        ItemAction::Rm { id, index } => {
            ctx.apply(Intent::DeleteContentItem {
                task_id: id.clone(),
                index,
            })?;
            println!("{} item {} removed", id, index);
            Ok(())
        }
    }
}

fn cmd_tag(ctx: &mut Context, args: TagArgs) -> CmdResult {
    let tag = args.tag.trim_start_matches('#').to_string();
    if args.remove {
        ctx.apply(Intent::RemoveTag {
            task_id: args.id.clone(),
            tag: tag.clone(),
        })?;
        println!("{} -#{}", args.id, tag);
    } else {
        ctx.apply(Intent::AddTag {
            task_id: args.id.clone(),
            tag: tag.clone(),
        })?;
        println!("{} +#{}", args.id, tag);
    }
    Ok(())
}

fn cmd_mv(ctx: &mut Context, args: MvArgs) -> CmdResult {
    let request = match (args.board, args.onto) {
        (Some(board_id), None) => MoveRequest::Task {
            task_id: args.id.clone(),
            target_board_id: board_id,
            target_task_id: None,
        },
        (None, Some(onto)) => {
            let location = task_ops::find_task_location(ctx.session.forest(), &onto)
                .ok_or_else(|| format!("task not found: {}", onto))?;
            MoveRequest::Task {
                task_id: args.id.clone(),
                target_board_id: location.board_id,
                target_task_id: Some(onto),
            }
        }
        _ => return Err("give exactly one of --board or --onto".into()),
    };
    ctx.apply(Intent::Move(request))?;
    println!("{} moved", args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Data exchange
// ---------------------------------------------------------------------------

fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let dest = args.path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let written = ctx.session.export_to(&dest)?;
    println!("exported to {}", written.display());
    Ok(())
}

fn cmd_import(ctx: &mut Context, args: ImportArgs) -> CmdResult {
    let path = PathBuf::from(&args.path);
    if !ctx.session.import_from(&path) {
        return Err(format!("{} is not a usable board export", path.display()).into());
    }
    if ctx.session.save_failed() {
        return Err("imported boards could not be saved".into());
    }
    let forest = ctx.session.forest();
    println!(
        "imported {} boards, {} tasks",
        forest.boards.len(),
        forest.task_count()
    );
    Ok(())
}
