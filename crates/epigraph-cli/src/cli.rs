use clap::{Parser, Subcommand};

pub const DEFAULT_STORE_ROOT: &str = ".";
pub const DEFAULT_INDEX_PATH: &str = "app/index.json";
pub const DEFAULT_QUEUE_PATH: &str = "annotations/change-queue.json";

#[derive(Parser)]
#[command(
    name = "epigraph",
    about = "Epigraph: reconcile the annotation change queue and query the effective index",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay the change queue onto the base index (offline reconciliation)
    Apply {
        /// Root directory of the local store
        #[arg(long, default_value = DEFAULT_STORE_ROOT)]
        store: String,

        /// Store path of the published index
        #[arg(long, default_value = DEFAULT_INDEX_PATH)]
        index: String,

        /// Store path of the change queue
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        queue: String,

        /// Write the effective index document to this file
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a faceted query against the effective index
    Search {
        /// Query phrase (token match over tags and document ids)
        query: Vec<String>,

        /// Facet filter, `key=value` (repeatable; OR within a key)
        #[arg(long = "facet")]
        facet: Vec<String>,

        /// 1-based result page (out-of-range values clamp)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Items per page
        #[arg(long, default_value_t = epigraph_search::ITEMS_PER_PAGE)]
        per_page: usize,

        /// Root directory of the local store
        #[arg(long, default_value = DEFAULT_STORE_ROOT)]
        store: String,

        /// Store path of the published index
        #[arg(long, default_value = DEFAULT_INDEX_PATH)]
        index: String,

        /// Store path of the change queue
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        queue: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stage tag edits on items and commit them to the change queue
    Tag {
        /// Annotation id to edit (repeatable)
        #[arg(long = "item", required = true)]
        item: Vec<String>,

        /// Tag name to add (repeatable)
        #[arg(long = "add")]
        add: Vec<String>,

        /// Tag name to remove (repeatable)
        #[arg(long = "remove")]
        remove: Vec<String>,

        /// Creator recorded on the change record
        #[arg(long, default_value = "epigraph-cli")]
        creator: String,

        /// Root directory of the local store
        #[arg(long, default_value = DEFAULT_STORE_ROOT)]
        store: String,

        /// Store path of the published index
        #[arg(long, default_value = DEFAULT_INDEX_PATH)]
        index: String,

        /// Store path of the change queue
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        queue: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the persisted change queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// List the queued change records in order
    List {
        /// Root directory of the local store
        #[arg(long, default_value = DEFAULT_STORE_ROOT)]
        store: String,

        /// Store path of the change queue
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        queue: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check queue records against the index and the tag syntax gate
    Check {
        /// Root directory of the local store
        #[arg(long, default_value = DEFAULT_STORE_ROOT)]
        store: String,

        /// Store path of the published index
        #[arg(long, default_value = DEFAULT_INDEX_PATH)]
        index: String,

        /// Store path of the change queue
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        queue: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
