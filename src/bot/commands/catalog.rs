//! Catalog Discord commands - `catalog`, `product`, `buy` and `cancel_checkout`.
//!
//! These are the customer-facing commands. Buying runs the checkout session of the
//! caller: pending sales are stored and the reply carries the PIX code as text and
//! as a QR image. `/cart checkout` goes through the same `run_checkout`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            checkout::{CheckoutState, OrderForm, PaymentOffer, SubmitOutcome},
            money::format_brl,
            pix::PixError,
            product::{self, ProductOrder, ProductQuery, StockLevel},
            theme::Theme,
        },
        entities::ProductModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::{error, info};

    const QR_FILENAME: &str = "pix.png";

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum CatalogSort {
        #[name = "Name"]
        Name,
        #[name = "Lowest price"]
        PriceLow,
        #[name = "Highest price"]
        PriceHigh,
        #[name = "Newest"]
        Newest,
    }

    impl From<CatalogSort> for ProductOrder {
        fn from(sort: CatalogSort) -> Self {
            match sort {
                CatalogSort::Name => Self::NameAsc,
                CatalogSort::PriceLow => Self::PriceAsc,
                CatalogSort::PriceHigh => Self::PriceDesc,
                CatalogSort::Newest => Self::NewestFirst,
            }
        }
    }

    fn stock_line(p: &ProductModel) -> String {
        if p.stock_quantity > 0 {
            format!("{} in stock", p.stock_quantity)
        } else {
            StockLevel::OutOfStock.label().to_string()
        }
    }

    /// Browse the products on sale.
    #[poise::command(slash_command)]
    pub async fn catalog(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of the product name or description"] search: Option<String>,
        #[description = "Only products of this category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Sort order (defaults to name)"] sort: Option<CatalogSort>,
        #[description = "Page number, starting at 1"]
        #[min = 1]
        page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();

        let category_id = match category {
            Some(name) => {
                let categories = data.categories.snapshot().await;
                let Some(found) = categories.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
                else {
                    ctx.say(format!("❌ Category '{name}' not found.")).await?;
                    return Ok(());
                };
                Some(found.id)
            }
            None => None,
        };

        let query = ProductQuery {
            search,
            category_id,
            order: sort.map(ProductOrder::from).unwrap_or_default(),
            page: page.unwrap_or(1).saturating_sub(1),
            ..Default::default()
        };
        let page = product::list_products(&data.database, &query).await?;

        let settings = data.settings.snapshot().await;
        let theme = Theme::from_settings(settings.as_ref());
        let (title, welcome) = settings.map_or_else(
            || ("Catalog".to_string(), String::new()),
            |s| (s.company_name, s.welcome_message),
        );

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("🛍️ {title}"))
            .color(theme.primary);

        if page.items.is_empty() {
            embed = embed.description(if query.search.is_some() || category_id.is_some() {
                "No products match your search.".to_string()
            } else {
                "No products available at the moment.".to_string()
            });
        } else {
            if !welcome.is_empty() {
                embed = embed.description(welcome);
            }
            embed = embed.fields(page.items.iter().map(|p| {
                let mut value = format!("**{}** · {}", format_brl(p.price_cents), stock_line(p));
                if !p.description.is_empty() {
                    value.push('\n');
                    value.push_str(&p.description);
                }
                (p.name.clone(), value, false)
            }));
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Page {} of {} · {} products · /buy <product> to order",
                page.page + 1,
                page.total_pages.max(1),
                page.total_items
            )));
        }

        let mut reply = poise::CreateReply::default().embed(embed);
        if let Some(banner) = data.misconfiguration_banner().await {
            reply = reply.content(banner);
        }
        ctx.send(reply).await?;
        Ok(())
    }

    /// Shows one product in detail.
    #[poise::command(slash_command)]
    pub async fn product(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(prod) = product::get_product_by_name(&data.database, &name)
            .await?
            .filter(|p| p.is_active)
        else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        let category_name = match prod.category_id {
            Some(id) => data
                .categories
                .snapshot()
                .await
                .into_iter()
                .find(|c| c.id == id)
                .map(|c| c.name),
            None => None,
        };

        let mut embed = serenity::CreateEmbed::default()
            .title(&prod.name)
            .color(data.theme().await.primary)
            .field("Price", format_brl(prod.price_cents), true)
            .field("Availability", stock_line(&prod), true);
        if !prod.description.is_empty() {
            embed = embed.description(&prod.description);
        }
        if let Some(category_name) = category_name {
            embed = embed.field("Category", category_name, true);
        }
        if !prod.image_url.is_empty() {
            embed = embed.image(&prod.image_url);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Orders a product and shows the PIX code to pay for it.
    #[poise::command(slash_command)]
    pub async fn buy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to buy"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "How many (defaults to 1)"] quantity: Option<i64>,
        #[description = "Your name, for the seller"] customer_name: Option<String>,
        #[description = "Your phone number, for the seller"] customer_phone: Option<String>,
    ) -> Result<()> {
        let Some(prod) = product::get_product_by_name(&ctx.data().database, &product)
            .await?
            .filter(|p| p.is_active)
        else {
            ctx.say(format!("❌ Product '{product}' not found.")).await?;
            return Ok(());
        };

        let form = OrderForm::single(prod.id, quantity.unwrap_or(1))
            .with_customer(customer_name, customer_phone);
        run_checkout(ctx, form).await?;
        Ok(())
    }

    /// Runs the caller's checkout session for `form` and replies with the outcome.
    ///
    /// Returns the offer when a payment code was shown.
    pub(crate) async fn run_checkout(
        ctx: poise::Context<'_, BotData, Error>,
        form: OrderForm,
    ) -> Result<Option<Box<PaymentOffer>>> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();

        let session = match data.checkouts.get(user_id).await {
            Some(existing) => match existing.state().await {
                CheckoutState::Submitting => {
                    ctx.say("⏳ Your previous order is still being processed.")
                        .await?;
                    return Ok(None);
                }
                CheckoutState::Error(_) => {
                    existing.retry().await;
                    existing
                }
                CheckoutState::Idle => existing,
                CheckoutState::PayloadReady(_) | CheckoutState::Closed => {
                    data.checkouts.open(user_id).await
                }
            },
            None => data.checkouts.open(user_id).await,
        };

        ctx.defer_ephemeral().await?;

        let payment = data.payment_context().await;
        let outcome = session
            .submit(
                &data.database,
                &data.feed,
                &payment,
                form,
                Some(user_id.to_string()),
            )
            .await;

        match outcome {
            Ok(SubmitOutcome::Ready(offer)) => {
                info!(order_id = offer.order_id, user_id, "Checkout payload sent");
                send_payment(ctx, &offer, data.theme().await).await?;
                return Ok(Some(offer));
            }
            Ok(SubmitOutcome::Ignored) => {
                ctx.say("⏳ Your previous order is still being processed.")
                    .await?;
            }
            Ok(SubmitOutcome::Closed) => {
                ctx.say("Checkout closed.").await?;
            }
            Err(Error::InvalidQuantity { available: 0, .. }) => {
                ctx.say("❌ Sorry, that product is out of stock.").await?;
            }
            Err(Error::InvalidQuantity {
                requested,
                available,
            }) => {
                ctx.say(format!(
                    "❌ {requested} is not available: please choose between 1 and {available}."
                ))
                .await?;
            }
            Err(Error::Payment(PixError::MissingKey)) => {
                ctx.say(
                    data.misconfiguration_banner()
                        .await
                        .unwrap_or("⚠️ Checkout is unavailable right now."),
                )
                .await?;
            }
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => {
                error!("Checkout failed for user {user_id}: {e:?}");
                ctx.say("❌ We could not place your order right now. Please try again.")
                    .await?;
            }
        }
        Ok(None)
    }

    async fn send_payment(
        ctx: poise::Context<'_, BotData, Error>,
        offer: &PaymentOffer,
        theme: Theme,
    ) -> Result<()> {
        let items = offer
            .sales
            .iter()
            .map(|s| {
                format!(
                    "{}× {} · {}",
                    s.quantity,
                    s.product_name,
                    format_brl(s.total_cents)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("🧾 Order #{}", offer.order_id))
            .description("Pay with PIX: scan the QR code or copy the code below into your bank app.")
            .color(theme.secondary)
            .field("Items", items, false)
            .field("Total", format!("**{}**", format_brl(offer.total_cents)), true)
            .field(
                "PIX copia e cola",
                format!("```{}```", offer.charge.payload),
                false,
            )
            .footer(serenity::CreateEmbedFooter::new(
                "Your order stays pending until the store confirms the payment.",
            ));

        let mut reply = poise::CreateReply::default().ephemeral(true);
        match &offer.charge.qr_png {
            Some(png) => {
                embed = embed.image(format!("attachment://{QR_FILENAME}"));
                reply = reply.attachment(serenity::CreateAttachment::bytes(png.clone(), QR_FILENAME));
            }
            None => {
                let reason = offer
                    .charge
                    .render_warning
                    .as_ref()
                    .map_or_else(String::new, |w| format!(" ({w})"));
                reply = reply.content(format!(
                    "⚠️ The QR code could not be generated{reason}. The copyable code still works."
                ));
            }
        }

        ctx.send(reply.embed(embed)).await?;
        Ok(())
    }

    /// Closes your open checkout.
    #[poise::command(slash_command)]
    pub async fn cancel_checkout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let closed = ctx.data().checkouts.close(ctx.author().id.get()).await;
        let message = if closed {
            "Checkout closed. Orders already placed stay pending until the store reviews them."
        } else {
            "You have no open checkout."
        };
        ctx.send(poise::CreateReply::default().content(message).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
