use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Commenting",
        commands: &[
            "pricetalk --user u2 comment add <post-id> \"Store B has it for 1.99\"",
            "pricetalk --user u2 comment edit <comment-id> \"Store B has it for 1.89 now\"",
        ],
    },
    ExampleGroup {
        title: "Reading",
        commands: &["pricetalk --user u2 comment show <comment-id>   # Comment with its replies"],
    },
];

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a post
    #[command(name = "add")]
    Add { post_id: String, body: String },

    /// Replace the body of a comment
    #[command(name = "edit")]
    Edit { id: String, body: String },

    /// Delete a comment
    #[command(name = "delete")]
    Delete { id: String },

    /// Show a comment with its replies
    #[command(name = "show")]
    Show { id: String },
}

pub async fn handle_comment_commands(command: CommentCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    match command {
        CommentCommands::Add { post_id, body } => {
            let comment = ctx.forum.create_comment(ctx.caller(), &post_id, &body).await?;
            output.success(&format!("Added comment {} to post {post_id}", comment.id));
            output.display(&comment)?;
        }
        CommentCommands::Edit { id, body } => {
            let comment = ctx.forum.edit_comment(ctx.caller(), &id, &body).await?;
            output.success(&format!("Updated comment {}", comment.id));
            output.display(&comment)?;
        }
        CommentCommands::Delete { id } => {
            let receipt = ctx.forum.delete_comment(ctx.caller(), &id).await?;
            output.success(&format!("Deleted comment {id}"));
            if receipt.detached_from.is_none() && !ctx.forum.cascade_policy().prune_deleted_comments {
                output.info("The post keeps listing this comment id; thread reads skip it");
            }
            output.display(&receipt)?;
        }
        CommentCommands::Show { id } => {
            let view = ctx.forum.get_comment(ctx.caller(), &id).await?;
            output.display(&view)?;
        }
    }

    Ok(())
}
