use petsignal_core::NewPost;

use crate::{args::CommentCommand, commands::CommandContext};

pub async fn comment_cmd(mut ctx: CommandContext, command: CommentCommand) -> anyhow::Result<()> {
    let client = ctx.client()?;

    match command {
        CommentCommand::List { alert_id } => {
            let posts = client.list_posts(alert_id).await?;
            ctx.printer.posts(&posts)?;
        }
        CommentCommand::Add { alert_id, text } => {
            let post = NewPost {
                username: ctx.username()?,
                content: text.join(" "),
            };

            let created = client.create_post(alert_id, &post).await?;
            ctx.printer.posts(std::slice::from_ref(&created))?;
        }
    }

    Ok(())
}
