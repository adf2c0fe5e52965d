use crate::cli::RoleArg;
use crate::context::CliContext;
use crate::output;

pub async fn handle_register(
    ctx: &CliContext,
    name: String,
    email: String,
    role: Option<RoleArg>,
) -> anyhow::Result<()> {
    let user = ctx
        .app
        .users
        .register_user(&name, &email, role.map(Into::into))
        .await?;
    ctx.save().await?;
    output::output_success(user.summary());
    Ok(())
}

pub async fn handle_list(ctx: &CliContext) -> anyhow::Result<()> {
    let users = ctx.app.users.list_users().await?;
    output::output_list(users);
    Ok(())
}
