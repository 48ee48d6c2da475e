use anyhow::Result;

use crate::context::AppContext;
use crate::output::OutputManager;

pub async fn handle_thread(post_id: &str, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    let thread = ctx.forum.read_thread(ctx.caller(), post_id).await?;
    if !thread.dangling_comments.is_empty() {
        output.warning(&format!(
            "{} deleted comment(s) are still listed on this post",
            thread.dangling_comments.len()
        ));
    }
    output.display(&thread)
}
