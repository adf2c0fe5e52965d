use crate::cli::{TicketAction, TicketCreateArgs, TicketListArgs, TicketUpdateArgs};
use crate::context::CliContext;
use crate::output;
use serde_json::{json, Map, Value};
use taskboard_domain::{
    NewTicket, TicketPriority, TicketQuery, TicketStatus, TicketUpdate, User,
};

pub async fn handle(ctx: &CliContext, actor: &User, action: TicketAction) -> anyhow::Result<()> {
    let tickets = &ctx.app.tickets;
    match action {
        TicketAction::Create(args) => {
            let input = build_new_ticket(args)?;
            let ticket = tickets.create(actor, input).await?;
            ctx.save().await?;
            output::output_success(&ticket);
        }
        TicketAction::Get { id } => {
            let details = tickets.get(actor, id).await?;
            output::output_success(&details);
        }
        TicketAction::List(args) => {
            let query = build_query(args)?;
            let page = tickets.list_tickets(actor, query).await?;
            output::output_success(&page);
        }
        TicketAction::Update(args) => {
            let id = args.id;
            let update = build_update(args)?;
            let ticket = tickets.update(actor, id, update).await?;
            ctx.save().await?;
            output::output_success(&ticket);
        }
        TicketAction::Move {
            id,
            column_id,
            position,
        } => {
            let outcome = tickets.move_ticket(actor, id, column_id, position).await?;
            ctx.save().await?;
            output::output_success(&outcome);
        }
        TicketAction::Delete { id, hard } => {
            let outcome = tickets.delete(actor, id, hard).await?;
            ctx.save().await?;
            output::output_success(&outcome);
        }
    }
    Ok(())
}

fn build_new_ticket(args: TicketCreateArgs) -> anyhow::Result<NewTicket> {
    let priority = args
        .priority
        .as_deref()
        .map(TicketPriority::parse)
        .transpose()?;
    Ok(NewTicket {
        title: args.title,
        description: args.description,
        priority,
        board_id: args.board_id,
        column_id: args.column_id,
        assignee: args.assignee,
    })
}

fn build_query(args: TicketListArgs) -> anyhow::Result<TicketQuery> {
    let priority = args
        .priority
        .as_deref()
        .map(TicketPriority::parse)
        .transpose()?;
    let status = match args.status.as_deref() {
        Some(raw) => Some(
            TicketStatus::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown status: {}", raw))?,
        ),
        None => None,
    };
    Ok(TicketQuery {
        board_id: args.board_id,
        column_id: args.column_id,
        assignee: args.assignee,
        priority,
        status,
        sort: args.sort.map(Into::into).unwrap_or_default(),
        ascending: args.ascending,
        page: args.page,
        limit: args.limit,
    })
}

/// Flags override keys of the same name in `--patch`.
fn build_update(args: TicketUpdateArgs) -> anyhow::Result<TicketUpdate> {
    let mut patch = match args.patch.as_deref() {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => fields,
            _ => anyhow::bail!("--patch must be a JSON object"),
        },
        None => Map::new(),
    };

    if let Some(title) = args.title {
        patch.insert("title".into(), json!(title));
    }
    if let Some(description) = args.description {
        patch.insert("description".into(), json!(description));
    }
    if let Some(priority) = args.priority {
        patch.insert("priority".into(), json!(priority));
    }
    if let Some(assignee) = args.assignee {
        patch.insert("assignee".into(), json!(assignee));
    } else if args.unassign {
        patch.insert("assignee".into(), Value::Null);
    }
    if let Some(column_id) = args.column_id {
        patch.insert("column".into(), json!(column_id));
    }

    Ok(TicketUpdate::from_json(Value::Object(patch))?)
}
