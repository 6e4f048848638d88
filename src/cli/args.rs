//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueHint};

use crate::domain::LinkTarget;

/// Navigation menu engine: flat weighted menu records <-> editable nested tree
#[derive(Parser, Debug)]
#[command(name = "navtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Menu records file (default: settings menu_file)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "NAVTREE_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the menu as a tree
    Tree,

    /// Print normalized records (renumbered weights)
    Flatten {
        /// Write the normalized records back to the menu file
        #[arg(short, long)]
        write: bool,
    },

    /// Print the path of an entry
    Locate {
        /// Entry identifier
        id: String,
    },

    /// Append a new entry
    Add {
        /// Display label
        #[arg(short, long)]
        label: String,
        #[command(flatten)]
        link: LinkArgs,
        /// Parent entry identifier (default: top level)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Change label or link of an entry (children are kept)
    Edit {
        /// Entry identifier
        id: String,
        /// New display label
        #[arg(short, long)]
        label: Option<String>,
        #[command(flatten)]
        link: OptionalLinkArgs,
    },

    /// Delete an entry and everything below it
    Remove {
        /// Entry identifier
        id: String,
    },

    /// Move an entry (with its subtree) to another parent or level
    Move {
        /// Entry identifier
        id: String,
        /// New parent identifier (default: top level)
        #[arg(short, long)]
        parent: Option<String>,
        /// Position among the new siblings, 0-based (default: last)
        #[arg(long)]
        position: Option<usize>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Link target of a new entry: exactly one of content id or URL.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["content", "url"])))]
pub struct LinkArgs {
    /// Content identifier to link to (becomes the entry id)
    #[arg(short, long)]
    pub content: Option<String>,
    /// External URL to link to
    #[arg(short, long, value_hint = ValueHint::Url)]
    pub url: Option<String>,
}

/// Optional replacement link target.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("new_target").required(false).args(["content", "url"])))]
pub struct OptionalLinkArgs {
    /// Content identifier to link to (becomes the entry id)
    #[arg(short, long)]
    pub content: Option<String>,
    /// External URL to link to
    #[arg(short, long, value_hint = ValueHint::Url)]
    pub url: Option<String>,
}

fn to_link(content: &Option<String>, url: &Option<String>) -> Option<LinkTarget> {
    match (content, url) {
        (Some(c), _) => Some(LinkTarget::Content(c.clone())),
        (None, Some(u)) => Some(LinkTarget::External(u.clone())),
        (None, None) => None,
    }
}

impl LinkArgs {
    pub fn to_link(&self) -> Option<LinkTarget> {
        to_link(&self.content, &self.url)
    }
}

impl OptionalLinkArgs {
    pub fn to_link(&self) -> Option<LinkTarget> {
        to_link(&self.content, &self.url)
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a template config file
    Template,
    /// Show config file locations
    Path,
}
