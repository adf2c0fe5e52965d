use crate::cli::BoardAction;
use crate::context::CliContext;
use crate::output;
use taskboard_domain::{BoardUpdate, User};

pub async fn handle(ctx: &CliContext, actor: &User, action: BoardAction) -> anyhow::Result<()> {
    let boards = &ctx.app.boards;
    match action {
        BoardAction::Create { title, description } => {
            let board = boards.create_board(actor, &title, description).await?;
            ctx.save().await?;
            output::output_success(&board);
        }
        BoardAction::List => {
            let list = boards.list_boards(actor).await?;
            output::output_list(list);
        }
        BoardAction::Get { id } => {
            let board = boards.get_board(actor, id).await?;
            output::output_success(&board);
        }
        BoardAction::Update {
            id,
            title,
            description,
        } => {
            let update = BoardUpdate { title, description };
            let board = boards.update_board(actor, id, update).await?;
            ctx.save().await?;
            output::output_success(&board);
        }
        BoardAction::Delete { id } => {
            boards.delete_board(actor, id).await?;
            ctx.save().await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
        BoardAction::AddMember { id, user_id } => {
            let board = boards.add_member(actor, id, user_id).await?;
            ctx.save().await?;
            output::output_success(&board);
        }
        BoardAction::RemoveMember { id, user_id } => {
            let board = boards.remove_member(actor, id, user_id).await?;
            ctx.save().await?;
            output::output_success(&board);
        }
    }
    Ok(())
}
