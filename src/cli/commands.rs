use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kb", about = concat!("kanban v", env!("CARGO_PKG_VERSION"), " - boards, tasks, and tasks inside tasks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all boards and their tasks
    List(ListArgs),
    /// Show one task in full
    Show(ShowArgs),
    /// Board management
    Board(BoardCmd),
    /// Add a task to a board (top level)
    Add(AddArgs),
    /// Add a subtask under an existing task
    Sub(SubArgs),
    /// Delete a task and all its subtasks
    Rm(RmArgs),
    /// Set a task field (title, description, due, priority)
    Set(SetArgs),
    /// Add, edit or remove content items
    Item(ItemCmd),
    /// Add or remove tags
    Tag(TagArgs),
    /// Move a task to a board or under another task
    Mv(MvArgs),
    /// Search tasks by regex
    Search(SearchArgs),
    /// Show task statistics per board
    Stats,
    /// Validate data integrity
    Check,
    /// Write all boards to a JSON file
    Export(ExportArgs),
    /// Replace all boards with the contents of an exported JSON file
    Import(ImportArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only this board
    pub board: Option<String>,
    /// Show task IDs
    #[arg(long)]
    pub ids: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// Board args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardCmd {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Add a new board
    Add {
        /// Title (default from config)
        title: Option<String>,
    },
    /// Delete a board and all its tasks
    Rm { id: String },
    /// Rename a board
    Rename { id: String, title: String },
    /// Change a board's colour
    Color {
        id: String,
        /// One of: blue, green, purple, orange, pink, teal, red, yellow, gray
        color: String,
    },
    /// Move a board so it sits immediately before another
    Mv {
        id: String,
        /// Board to place it before
        #[arg(long)]
        before: String,
    },
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Board ID
    pub board: String,
    /// Task title (default from config)
    pub title: Option<String>,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task ID
    pub parent: String,
    /// Subtask title (default from config)
    pub title: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct SetArgs {
    /// Task ID
    pub id: String,
    /// title, description, due (YYYY-MM-DD, empty to clear) or priority (low|medium|high)
    pub field: String,
    /// New value
    pub value: String,
}

#[derive(Args)]
pub struct ItemCmd {
    #[command(subcommand)]
    pub action: ItemAction,
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Append a content item
    Add {
        /// Task ID
        id: String,
        /// bullet or numbered
        kind: String,
        /// Item text
        text: Option<String>,
    },
    /// Change a content item's text
    Edit {
        id: String,
        /// Zero-based item index
        index: usize,
        text: String,
    },
    /// Remove a content item
    Rm {
        id: String,
        /// Zero-based item index
        index: usize,
    },
}

#[derive(Args)]
pub struct TagArgs {
    /// Task ID
    pub id: String,
    /// Tag (with or without #)
    pub tag: String,
    /// Remove instead of add
    #[arg(long)]
    pub remove: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID
    pub id: String,
    /// Make it a top-level task of this board
    #[arg(long, conflicts_with = "onto", required_unless_present = "onto")]
    pub board: Option<String>,
    /// Make it the last subtask of this task
    #[arg(long)]
    pub onto: Option<String>,
}

// ---------------------------------------------------------------------------
// Data exchange args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Destination file or directory (default: current directory)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Exported JSON file
    pub path: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write a config.toml with the current values into the data directory
    #[arg(long)]
    pub init: bool,
}
