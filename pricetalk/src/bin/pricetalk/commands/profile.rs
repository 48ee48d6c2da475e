use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;
use crate::output::OutputManager;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Set the display name shown next to your posts, comments and replies
    #[command(name = "set")]
    Set {
        #[arg(long)]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
}

pub async fn handle_profile_commands(command: ProfileCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    match command {
        ProfileCommands::Set { first_name, last_name } => {
            let profile = ctx.forum.set_profile(ctx.caller(), &first_name, &last_name).await?;
            output.success(&format!("Profile updated for {}", profile.user_id));
            output.display(&profile)?;
        }
    }

    Ok(())
}
