use crate::cli::ColumnAction;
use crate::context::CliContext;
use crate::output;
use taskboard_domain::User;

pub async fn handle(ctx: &CliContext, actor: &User, action: ColumnAction) -> anyhow::Result<()> {
    let boards = &ctx.app.boards;
    match action {
        ColumnAction::Add {
            board_id,
            title,
            position,
        } => {
            let column = boards.add_column(actor, board_id, &title, position).await?;
            ctx.save().await?;
            output::output_success(&column);
        }
        ColumnAction::List { board_id } => {
            let columns = boards.list_columns(actor, board_id).await?;
            output::output_list(columns);
        }
        ColumnAction::Rename { id, title } => {
            let column = boards.rename_column(actor, id, &title).await?;
            ctx.save().await?;
            output::output_success(&column);
        }
        ColumnAction::Move { id, position } => {
            let columns = boards.move_column(actor, id, position).await?;
            ctx.save().await?;
            output::output_list(columns);
        }
        ColumnAction::Delete { id } => {
            boards.delete_column(actor, id).await?;
            ctx.save().await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
    }
    Ok(())
}
