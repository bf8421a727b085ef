use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clef")]
#[command(version, about = "Student records, calendar posts and statistics for La CLEF")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Pin "today" to a fixed day (YYYY-MM-DD) instead of the system clock
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a clef workspace in the current directory
    Init,

    /// Manage FLCE students
    Student(StudentCommand),

    /// Manage Accueil calendar posts
    Post(PostCommand),

    /// Manage FLCE seasons
    Season(SeasonCommand),

    /// Manage dashboard users
    User(UserCommand),

    /// Show dashboard statistics
    Stats(StatsCommand),

    /// Check a student form without saving it
    Validate {
        #[command(flatten)]
        form: StudentArgs,

        /// Output the messages as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Student form fields. On edit, only the given fields change.
#[derive(Args, Debug, Default, Clone)]
pub struct StudentArgs {
    #[arg(long = "first-name")]
    pub first_name: Option<String>,

    #[arg(long = "last-name")]
    pub last_name: Option<String>,

    /// Class code (e.g. B1)
    #[arg(long = "class")]
    pub class_code: Option<String>,

    #[arg(long)]
    pub note: Option<String>,

    /// Gender (M, F, X)
    #[arg(long)]
    pub gender: Option<String>,

    /// Arrival date (YYYY-MM-DD)
    #[arg(long)]
    pub arrival: Option<String>,

    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    pub departure: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long = "birth-date")]
    pub birth_date: Option<String>,

    #[arg(long = "birth-place")]
    pub birth_place: Option<String>,

    #[arg(long = "au-pair", value_name = "BOOL")]
    pub au_pair: Option<bool>,

    /// Pre-registration; also sets the 150 deposit
    #[arg(long, value_name = "BOOL")]
    pub pre: Option<bool>,

    /// 150 deposit; also sets pre-registration
    #[arg(long, value_name = "BOOL")]
    pub paid150: Option<bool>,

    #[arg(long = "paid-total", value_name = "BOOL")]
    pub paid_total: Option<bool>,

    /// The student has left
    #[arg(long, value_name = "BOOL")]
    pub left: Option<bool>,

    /// Dossier (case) number
    #[arg(long)]
    pub dossier: Option<String>,

    #[arg(long = "family-name1")]
    pub family_name1: Option<String>,

    #[arg(long = "family-name2")]
    pub family_name2: Option<String>,

    #[arg(long = "family-mail")]
    pub family_mail: Option<String>,
}

#[derive(Args, Debug)]
pub struct StudentCommand {
    #[command(subcommand)]
    pub action: StudentAction,
}

#[derive(Subcommand, Debug)]
pub enum StudentAction {
    /// Add a student
    Add {
        #[command(flatten)]
        form: StudentArgs,

        #[arg(long)]
        json: bool,
    },

    /// Edit a student
    Edit {
        /// Student ID (UUID or prefix)
        id: String,

        #[command(flatten)]
        form: StudentArgs,

        #[arg(long)]
        json: bool,
    },

    /// List students
    List {
        /// Only one tab (lead, pre, enrolled, left)
        #[arg(long)]
        tab: Option<String>,

        /// Filter string, e.g. "gender:F class:b1 age:>20"
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Sort by name (last, first)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        json: bool,
    },

    /// Show a student
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Delete a student
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct PostCommand {
    #[command(subcommand)]
    pub action: PostAction,
}

#[derive(Subcommand, Debug)]
pub enum PostAction {
    /// Add a calendar post
    Add {
        title: String,

        #[arg(long)]
        author: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD); defaults to the start day
        #[arg(long)]
        end: Option<String>,

        /// Post type (info, absence, event, remplacement, retard)
        #[arg(long = "type", default_value = "info")]
        post_type: String,

        /// Show in the featured sidebar
        #[arg(long)]
        featured: bool,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List posts, newest first
    List {
        /// all, today, since-yesterday, since-week or a YYYY-MM-DD day
        #[arg(long, conflicts_with = "archive")]
        filter: Option<String>,

        /// Archive view: all, past, scheduled, date or a YYYY-MM-DD day
        #[arg(long)]
        archive: Option<String>,

        /// Only posts by this author
        #[arg(long)]
        author: Option<String>,

        /// Featured posts running today
        #[arg(long, conflicts_with_all = ["filter", "archive"])]
        featured: bool,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        json: bool,
    },

    /// Delete a post
    Delete {
        id: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct SeasonCommand {
    #[command(subcommand)]
    pub action: SeasonAction,
}

#[derive(Subcommand, Debug)]
pub enum SeasonAction {
    /// Add a season
    Add {
        /// Season code (e.g. 2024-2025)
        code: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Mark as the current season
        #[arg(long)]
        current: bool,

        #[arg(long)]
        json: bool,
    },

    /// List seasons and the one selected for display
    List {
        /// Previously selected season ID
        #[arg(long)]
        remember: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user profile
    Add {
        email: String,

        /// USER, ACCUEIL, FLCE, ADMIN or SUPER_ADMIN
        #[arg(long, default_value = "USER")]
        role: String,

        #[arg(long = "first-name")]
        first_name: Option<String>,

        #[arg(long = "last-name")]
        last_name: Option<String>,

        /// Email of the user performing the change
        #[arg(long = "as", value_name = "EMAIL")]
        caller: Option<String>,
    },

    /// Change a user's role
    SetRole {
        email: String,

        role: String,

        #[arg(long = "as", value_name = "EMAIL")]
        caller: String,
    },

    /// Delete a user profile
    Delete {
        email: String,

        #[arg(long = "as", value_name = "EMAIL")]
        caller: String,
    },

    /// List user profiles
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct StatsCommand {
    #[command(subcommand)]
    pub view: StatsView,
}

#[derive(Subcommand, Debug)]
pub enum StatsView {
    /// Calendar post statistics
    Accueil {
        /// Render a markdown report
        #[arg(long, conflicts_with = "json")]
        markdown: bool,

        #[arg(long)]
        json: bool,
    },

    /// Student registration statistics
    Flce {
        #[arg(long, conflicts_with = "json")]
        markdown: bool,

        #[arg(long)]
        json: bool,
    },
}
