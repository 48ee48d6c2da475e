use anyhow::Result;
use clap::Subcommand;

use pricetalk::PostSort;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Publishing",
        commands: &[
            "pricetalk --user u1 post create --title \"Oat milk prices\" --description \"Where is it cheapest?\"",
            "pricetalk --user u1 post edit <post-id> --description \"Updated with weekend deals\"",
        ],
    },
    ExampleGroup {
        title: "Browsing",
        commands: &[
            "pricetalk --user u1 post list                    # Newest first",
            "pricetalk --user u1 post list --sort most_likes  # Most liked first",
            "pricetalk --user u1 --output json post list      # Machine readable",
        ],
    },
    ExampleGroup {
        title: "Moderation",
        commands: &["pricetalk --user mod --admin post delete <post-id>"],
    },
];

#[derive(Subcommand)]
pub enum PostCommands {
    /// Publish a new post
    #[command(name = "create")]
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// Change the title and/or description of a post
    #[command(name = "edit")]
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a post and its comments
    #[command(name = "delete")]
    Delete { id: String },

    /// List posts
    #[command(name = "list")]
    List {
        /// newest, oldest, most_likes or most_comments
        #[arg(long, default_value_t = PostSort::Newest)]
        sort: PostSort,
    },
}

pub async fn handle_post_commands(command: PostCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    match command {
        PostCommands::Create { title, description } => {
            let post = ctx.forum.create_post(ctx.caller(), &title, &description).await?;
            output.success(&format!("Created post {}", post.id));
            output.display(&post)?;
        }
        PostCommands::Edit { id, title, description } => {
            let post = ctx
                .forum
                .edit_post(ctx.caller(), &id, title.as_deref(), description.as_deref())
                .await?;
            output.success(&format!("Updated post {}", post.id));
            output.display(&post)?;
        }
        PostCommands::Delete { id } => {
            let receipt = ctx.forum.delete_post(ctx.caller(), &id).await?;
            output.success(&format!("Deleted post {id}"));
            if !receipt.deleted_replies.is_empty() || !receipt.deleted_comments.is_empty() {
                output.verbose(&format!(
                    "cascade removed {} comment(s) and {} reply(ies)",
                    receipt.deleted_comments.len(),
                    receipt.deleted_replies.len()
                ));
            }
            output.display(&receipt)?;
        }
        PostCommands::List { sort } => {
            let posts = ctx.forum.list_posts(ctx.caller(), sort).await?;
            output.display(posts.as_slice())?;
        }
    }

    Ok(())
}
