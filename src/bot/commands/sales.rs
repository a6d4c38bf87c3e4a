//! Sales Discord commands - `sales list`, `sales details` and `sales status`.
//!
//! Sales are created by checkout; the back-office only moves them forward:
//! pending to paid or cancelled, paid to completed or cancelled.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, is_admin},
        core::{money::format_brl, sale},
        entities::{SaleModel, SaleStatus},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    const LIST_LIMIT: usize = 20;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "Pending"]
        Pending,
        #[name = "Paid"]
        Paid,
        #[name = "Completed"]
        Completed,
        #[name = "Cancelled"]
        Cancelled,
    }

    impl From<StatusChoice> for SaleStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Pending => Self::Pending,
                StatusChoice::Paid => Self::Paid,
                StatusChoice::Completed => Self::Completed,
                StatusChoice::Cancelled => Self::Cancelled,
            }
        }
    }

    fn status_badge(status: SaleStatus) -> &'static str {
        match status {
            SaleStatus::Pending => "⏳ pending",
            SaleStatus::Paid => "💳 paid",
            SaleStatus::Completed => "✅ completed",
            SaleStatus::Cancelled => "❌ cancelled",
        }
    }

    /// Follow up on orders.
    #[poise::command(
        slash_command,
        subcommands("sales_list", "sales_details", "sales_status"),
        check = "is_admin"
    )]
    pub async fn sales(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Sales command. Available subcommands:\n\
            `/sales list` - Latest sales, optionally by status\n\
            `/sales details` - Everything about one sale\n\
            `/sales status` - Move a sale to its next status",
        )
        .await?;
        Ok(())
    }

    /// Lists the latest sales, newest first.
    #[poise::command(slash_command, rename = "list", check = "is_admin", ephemeral)]
    pub async fn sales_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only sales with this status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let data = ctx.data();
        let sales = sale::list_sales(&data.database, status.map(SaleStatus::from)).await?;

        if sales.is_empty() {
            ctx.say("No sales found.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = sales
            .iter()
            .take(LIST_LIMIT)
            .map(|s| {
                (
                    format!("#{} · {} × {}", s.id, s.quantity, s.product_name),
                    format!(
                        "{} · {} · {}",
                        format_brl(s.total_cents),
                        status_badge(s.status),
                        s.created_at.format("%d/%m/%Y %H:%M")
                    ),
                    false,
                )
            })
            .collect();

        let mut embed = serenity::CreateEmbed::default()
            .title("🧾 Sales")
            .color(data.theme().await.primary)
            .fields(fields);
        if sales.len() > LIST_LIMIT {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {LIST_LIMIT} of {}",
                sales.len()
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    fn details_embed(s: &SaleModel, color: u32) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::default()
            .title(format!("Sale #{}", s.id))
            .color(color)
            .field("Product", &s.product_name, true)
            .field("Quantity", s.quantity.to_string(), true)
            .field("Unit price", format_brl(s.unit_price_cents), true)
            .field("Total", format_brl(s.total_cents), true)
            .field("Status", status_badge(s.status), true)
            .field(
                "Created",
                s.created_at.format("%d/%m/%Y %H:%M UTC").to_string(),
                true,
            )
            .field(
                "Customer",
                s.customer_name.as_deref().unwrap_or("not informed"),
                true,
            )
            .field(
                "Phone",
                s.customer_phone.as_deref().unwrap_or("not informed"),
                true,
            );
        if let Some(buyer) = &s.buyer_id {
            embed = embed.field("Buyer", format!("<@{buyer}>"), true);
        }
        if let Some(code) = &s.pix_code {
            embed = embed.field("PIX code", format!("```{code}```"), false);
        }
        embed
    }

    /// Shows everything about one sale.
    #[poise::command(slash_command, rename = "details", check = "is_admin", ephemeral)]
    pub async fn sales_details(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sale number"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(found) = sale::get_sale_by_id(&data.database, id).await? else {
            ctx.say(format!("❌ Sale #{id} not found.")).await?;
            return Ok(());
        };

        let embed = details_embed(&found, data.theme().await.primary);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Moves a sale to its next status.
    #[poise::command(slash_command, rename = "status", check = "is_admin", ephemeral)]
    pub async fn sales_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sale number"] id: i64,
        #[description = "New status"] status: StatusChoice,
    ) -> Result<()> {
        let data = ctx.data();
        let next = SaleStatus::from(status);

        match sale::update_sale_status(&data.database, &data.feed, id, next).await {
            Ok(updated) => {
                let restock_note = if next == SaleStatus::Cancelled && updated.product_id.is_some() {
                    format!(" {} unit(s) returned to stock.", updated.quantity)
                } else {
                    String::new()
                };
                ctx.say(format!(
                    "✅ Sale #{id} is now {}.{restock_note}",
                    status_badge(updated.status)
                ))
                .await?;
            }
            Err(Error::InvalidStatusTransition { from, to }) => {
                ctx.say(format!(
                    "❌ Sale #{id} is {from}; it cannot become {to}."
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
