use anyhow::Result;
use clap::Args;

use pricetalk::{EntityKind, VoteAction, Votes};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Voting",
    commands: &[
        "pricetalk --user u2 vote post <post-id> like",
        "pricetalk --user u2 vote post <post-id> dislike     # Switches an existing like",
        "pricetalk --user u2 vote comment <comment-id> unlike",
    ],
}];

#[derive(Args)]
pub struct VoteArgs {
    /// post, comment or reply
    pub kind: EntityKind,

    pub id: String,

    /// like, unlike, dislike or undislike
    pub action: VoteAction,
}

pub async fn handle_vote(args: VoteArgs, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    let VoteArgs { kind, id, action } = args;
    let caller = ctx.caller();

    match kind {
        EntityKind::Post => {
            let post = ctx.forum.vote_post(caller, &id, action).await?;
            report(output, kind, &id, action, &post.votes);
            output.display(&post)?;
        }
        EntityKind::Comment => {
            let comment = ctx.forum.vote_comment(caller, &id, action).await?;
            report(output, kind, &id, action, &comment.votes);
            output.display(&comment)?;
        }
        EntityKind::Reply => {
            let reply = ctx.forum.vote_reply(caller, &id, action).await?;
            report(output, kind, &id, action, &reply.votes);
            output.display(&reply)?;
        }
    }

    Ok(())
}

fn report(output: &OutputManager, kind: EntityKind, id: &str, action: VoteAction, votes: &Votes) {
    output.success(&format!(
        "{action} on {kind} {id} recorded ({} likes, {} dislikes)",
        votes.likes(),
        votes.dislikes()
    ));
}
