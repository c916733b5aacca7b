use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mihrab", version, author, about = "A terminal prayer-times board for the masjid")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show prayer times for a day and the countdown to the next prayer
    Times {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Print only the next prayer and time remaining
    Next,
    /// Show whether the Jummah and Shabe Miraj banners are up right now
    Occasions,
    /// Monthly timetable with Ishraq and Duha al-Kubra
    Calendar {
        /// Month number (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Emit CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Read a surah, or search surah names
    Quran {
        /// Surah number (1-114)
        number: Option<u32>,
        /// Filter the surah list by name or number
        #[arg(long, conflicts_with = "number")]
        search: Option<String>,
    },
    /// Daily reminder management
    Remind {
        #[command(subcommand)]
        action: RemindCommands,
    },
    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings back to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemindCommands {
    /// Show the full schedule (built-in, prayer and custom reminders)
    List,
    /// Add a custom daily reminder
    Add {
        /// Time of day, HH:MM
        time: String,
        /// Reminder title
        title: String,
        /// Optional body text
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Remove a custom reminder by id
    Remove {
        id: i64,
    },
    /// Replace custom reminders from a SCHEDULE_NOTIFICATION JSON message
    Schedule {
        /// Path to the JSON file, or "-" for stdin
        source: String,
    },
    /// Print reminders due this minute
    Due,
}
