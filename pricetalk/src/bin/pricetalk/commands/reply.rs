use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Replying",
    commands: &[
        "pricetalk --user u1 reply add <comment-id> \"Thanks, going tomorrow\"",
        "pricetalk --user u1 reply list <comment-id>",
        "pricetalk --user u1 reply delete <reply-id>",
    ],
}];

#[derive(Subcommand)]
pub enum ReplyCommands {
    /// Reply to a comment
    #[command(name = "add")]
    Add { comment_id: String, text: String },

    /// Replace the text of a reply
    #[command(name = "edit")]
    Edit { id: String, text: String },

    /// Delete a reply and unlink it from its comment
    #[command(name = "delete")]
    Delete { id: String },

    /// List the replies of a comment
    #[command(name = "list")]
    List { comment_id: String },
}

pub async fn handle_reply_commands(command: ReplyCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    match command {
        ReplyCommands::Add { comment_id, text } => {
            let reply = ctx.forum.create_reply(ctx.caller(), &comment_id, &text).await?;
            output.success(&format!("Added reply {} to comment {comment_id}", reply.id));
            output.display(&reply)?;
        }
        ReplyCommands::Edit { id, text } => {
            let reply = ctx.forum.edit_reply(ctx.caller(), &id, &text).await?;
            output.success(&format!("Updated reply {}", reply.id));
            output.display(&reply)?;
        }
        ReplyCommands::Delete { id } => {
            let receipt = ctx.forum.delete_reply(ctx.caller(), &id).await?;
            output.success(&format!("Deleted reply {id}"));
            output.display(&receipt)?;
        }
        ReplyCommands::List { comment_id } => {
            let replies = ctx.forum.replies_for_comment(ctx.caller(), &comment_id).await?;
            output.display(replies.as_slice())?;
        }
    }

    Ok(())
}
