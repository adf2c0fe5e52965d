use crate::cli::CommentAction;
use crate::context::CliContext;
use crate::output;
use taskboard_domain::User;

pub async fn handle(ctx: &CliContext, actor: &User, action: CommentAction) -> anyhow::Result<()> {
    let tickets = &ctx.app.tickets;
    match action {
        CommentAction::Add { ticket_id, text } => {
            let comment = tickets.add_comment(actor, ticket_id, &text).await?;
            ctx.save().await?;
            output::output_success(&comment);
        }
        CommentAction::List { ticket_id } => {
            let comments = tickets.list_comments(actor, ticket_id).await?;
            output::output_list(comments);
        }
        CommentAction::Delete { id } => {
            let comment = tickets.delete_comment(actor, id).await?;
            ctx.save().await?;
            output::output_success(&comment);
        }
    }
    Ok(())
}
