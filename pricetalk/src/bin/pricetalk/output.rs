use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use pricetalk::{
    Comment, CommentView, DeleteReceipt, Post, PostView, Reply, ReplyView, Thread, UserProfile, Votes,
};

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Trait for data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay + ?Sized,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Status lines are suppressed for JSON so the output stays parseable.
    fn chatty(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.success)
            } else {
                format!("{} {}", ICONS.success.color(THEME.success), message.color(THEME.success))
            };
            println!("{output}");
        }
    }

    /// Errors are always shown, even in quiet mode.
    pub fn error(&self, message: &str) {
        let output = if self.options.no_color {
            format!("{} {message}", ICONS.error)
        } else {
            format!("{} {}", ICONS.error.color(THEME.error), message.color(THEME.error))
        };
        eprintln!("{output}");
    }

    pub fn warning(&self, message: &str) {
        if self.chatty() {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.warning)
            } else {
                format!("{} {}", ICONS.warning.color(THEME.warning), message.color(THEME.warning))
            };
            println!("{output}");
        }
    }

    /// Display verbose information (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.arrow)
            } else {
                format!("{} {}", ICONS.arrow.color(THEME.muted), message.color(THEME.muted))
            };
            eprintln!("{output}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.chatty() {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.info)
            } else {
                format!("{} {}", ICONS.info.color(THEME.info), message.color(THEME.info))
            };
            println!("{output}");
        }
    }

    pub fn bullet(&self, text: &str) {
        if self.chatty() {
            let output = if self.options.no_color {
                format!("  {} {text}", ICONS.bullet)
            } else {
                format!("  {} {text}", ICONS.bullet.color(THEME.muted))
            };
            println!("{output}");
        }
    }
}

fn create_table(options: &GlobalOptions) -> Table {
    let mut table = Table::new();
    if options.no_color {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    } else {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    }
    table
}

fn add_table_header(table: &mut Table, options: &GlobalOptions, headers: &[&str]) {
    let cells: Vec<Cell> = headers
        .iter()
        .map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(cells);
}

fn key_value_table(options: &GlobalOptions, rows: Vec<(&str, String)>) -> Table {
    let mut table = create_table(options);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

fn votes_label(votes: &Votes) -> String {
    format!("{} {}  {} {}", ICONS.like, votes.likes(), ICONS.dislike, votes.dislikes())
}

fn votes_cell(votes: &Votes, options: &GlobalOptions) -> Cell {
    let cell = Cell::new(votes_label(votes));
    if options.no_color {
        return cell;
    }
    match votes.likes().cmp(&votes.dislikes()) {
        std::cmp::Ordering::Greater => cell.fg(TableColor::Green),
        std::cmp::Ordering::Less => cell.fg(TableColor::Red),
        std::cmp::Ordering::Equal => cell,
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

impl TableDisplay for Post {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        key_value_table(
            options,
            vec![
                ("ID", self.id.clone()),
                ("Author", self.author_id.clone()),
                ("Title", self.title.clone()),
                ("Description", self.description.clone()),
                ("Votes", votes_label(&self.votes)),
                ("Comments", self.comments.len().to_string()),
                ("Created", timestamp(&self.created_at)),
                ("Updated", timestamp(&self.updated_at)),
            ],
        )
    }

    fn to_compact(&self) -> String {
        format!("post {} \"{}\" {}", self.id, self.title, votes_label(&self.votes))
    }
}

impl TableDisplay for Comment {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        key_value_table(
            options,
            vec![
                ("ID", self.id.clone()),
                ("Author", self.author_id.clone()),
                ("Body", self.body.clone()),
                ("Votes", votes_label(&self.votes)),
                ("Replies", self.replies.len().to_string()),
                ("Created", timestamp(&self.created_at)),
            ],
        )
    }

    fn to_compact(&self) -> String {
        format!("comment {} {}", self.id, votes_label(&self.votes))
    }
}

impl TableDisplay for Reply {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        key_value_table(
            options,
            vec![
                ("ID", self.id.clone()),
                ("Comment", self.comment_id.clone()),
                ("Author", self.author_id.clone()),
                ("Text", self.text.clone()),
                ("Votes", votes_label(&self.votes)),
                ("Created", timestamp(&self.created_at)),
            ],
        )
    }

    fn to_compact(&self) -> String {
        format!("reply {} {}", self.id, votes_label(&self.votes))
    }
}

impl TableDisplay for [PostView] {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        if self.is_empty() {
            table.add_row(vec![Cell::new("No posts found")]);
            return table;
        }
        add_table_header(&mut table, options, &["ID", "Title", "Author", "Votes", "Comments", "Created"]);
        for view in self {
            table.add_row(vec![
                Cell::new(&view.post.id),
                Cell::new(excerpt(&view.post.title, 48)),
                Cell::new(view.author.label()),
                votes_cell(&view.post.votes, options),
                Cell::new(view.comment_count),
                Cell::new(timestamp(&view.post.created_at)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Posts: {}", self.len())
    }
}

fn add_comment_rows(table: &mut Table, options: &GlobalOptions, view: &CommentView) {
    table.add_row(vec![
        Cell::new("comment"),
        Cell::new(&view.comment.id),
        Cell::new(view.author.label()),
        Cell::new(excerpt(&view.comment.body, 60)),
        votes_cell(&view.comment.votes, options),
    ]);
    for reply in &view.replies {
        table.add_row(vec![
            Cell::new(format!("  {} reply", ICONS.branch)),
            Cell::new(&reply.reply.id),
            Cell::new(reply.author.label()),
            Cell::new(excerpt(&reply.reply.text, 60)),
            votes_cell(&reply.reply.votes, options),
        ]);
    }
}

const THREAD_HEADERS: &[&str] = &["Kind", "ID", "Author", "Text", "Votes"];

impl TableDisplay for Thread {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(&mut table, options, THREAD_HEADERS);
        table.add_row(vec![
            Cell::new("post").add_attribute(Attribute::Bold),
            Cell::new(&self.post.id),
            Cell::new(self.author.label()),
            Cell::new(format!("{}\n{}", self.post.title, excerpt(&self.post.description, 60))),
            votes_cell(&self.post.votes, options),
        ]);
        for comment in &self.comments {
            add_comment_rows(&mut table, options, comment);
        }
        table
    }

    fn to_compact(&self) -> String {
        let replies: usize = self.comments.iter().map(|comment| comment.replies.len()).sum();
        format!(
            "thread {} comments={} replies={} {}",
            self.post.id,
            self.comments.len(),
            replies,
            votes_label(&self.post.votes)
        )
    }
}

impl TableDisplay for CommentView {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(&mut table, options, THREAD_HEADERS);
        add_comment_rows(&mut table, options, self);
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "comment {} replies={} {}",
            self.comment.id,
            self.replies.len(),
            votes_label(&self.comment.votes)
        )
    }
}

impl TableDisplay for [ReplyView] {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        if self.is_empty() {
            table.add_row(vec![Cell::new("No replies found")]);
            return table;
        }
        add_table_header(&mut table, options, &["ID", "Author", "Text", "Votes", "Created"]);
        for view in self {
            table.add_row(vec![
                Cell::new(&view.reply.id),
                Cell::new(view.author.label()),
                Cell::new(excerpt(&view.reply.text, 60)),
                votes_cell(&view.reply.votes, options),
                Cell::new(timestamp(&view.reply.created_at)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Replies: {}", self.len())
    }
}

impl TableDisplay for DeleteReceipt {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut rows = vec![("Deleted", format!("{} {}", self.kind, self.id))];
        if !self.deleted_comments.is_empty() {
            rows.push(("Comments", self.deleted_comments.join("\n")));
        }
        if !self.deleted_replies.is_empty() {
            rows.push(("Replies", self.deleted_replies.join("\n")));
        }
        if let Some(parent) = &self.detached_from {
            rows.push(("Detached from", parent.clone()));
        }
        key_value_table(options, rows)
    }

    fn to_compact(&self) -> String {
        format!(
            "deleted {} {} comments={} replies={}",
            self.kind,
            self.id,
            self.deleted_comments.len(),
            self.deleted_replies.len()
        )
    }
}

impl TableDisplay for UserProfile {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        key_value_table(
            options,
            vec![
                ("User", self.user_id.clone()),
                ("Display name", self.display_name().unwrap_or_default()),
            ],
        )
    }

    fn to_compact(&self) -> String {
        format!("{} {}", self.user_id, self.display_name().unwrap_or_default())
    }
}
