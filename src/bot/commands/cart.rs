//! Cart Discord commands - `cart add|show|remove|clear|checkout`.
//!
//! The cart is kept per chat user in bot state. Checking out turns every line into
//! a pending sale in one transaction and shows a single PIX code for the total.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::catalog::run_checkout, handlers::autocomplete},
        core::{checkout::OrderForm, money::format_brl, product},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Your shopping cart.
    #[poise::command(
        slash_command,
        subcommands("cart_add", "cart_show", "cart_remove", "cart_clear", "cart_checkout")
    )]
    pub async fn cart(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Cart command. Available subcommands:\n\
            `/cart add` - Put a product in your cart\n\
            `/cart show` - See what is in your cart\n\
            `/cart remove` - Take a product out\n\
            `/cart clear` - Empty your cart\n\
            `/cart checkout` - Order everything and get the PIX code",
        )
        .await?;
        Ok(())
    }

    /// Adds a product to your cart.
    #[poise::command(slash_command, rename = "add", ephemeral)]
    pub async fn cart_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "How many (defaults to 1)"] quantity: Option<i64>,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(prod) = product::get_product_by_name(&data.database, &product)
            .await?
            .filter(|p| p.is_active)
        else {
            ctx.say(format!("❌ Product '{product}' not found.")).await?;
            return Ok(());
        };

        let quantity = quantity.unwrap_or(1);
        let user_id = ctx.author().id.get();
        match data.carts.add(user_id, &prod, quantity).await {
            Ok(cart) => {
                ctx.say(format!(
                    "🛒 {quantity}× '{}' added to your cart ({} in cart, {} total).",
                    prod.name,
                    cart.quantity_of(prod.id),
                    format_brl(cart.total_cents()?)
                ))
                .await?;
            }
            Err(Error::InvalidQuantity { available: 0, .. }) => {
                ctx.say(format!("❌ '{}' is out of stock.", prod.name)).await?;
            }
            Err(Error::InvalidQuantity { available, .. }) => {
                let in_cart = data.carts.get(user_id).await.quantity_of(prod.id);
                ctx.say(format!(
                    "❌ Only {available} of '{}' in stock and you already have {in_cart} in your cart.",
                    prod.name
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Shows what is in your cart.
    #[poise::command(slash_command, rename = "show", ephemeral)]
    pub async fn cart_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let cart = data.carts.get(ctx.author().id.get()).await;
        if cart.is_empty() {
            ctx.say("Your cart is empty. Use `/cart add` to put products in it.")
                .await?;
            return Ok(());
        }

        let mut lines = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            lines.push(format!(
                "{}× **{}** · {}",
                line.quantity,
                line.product_name,
                format_brl(line.total_cents()?)
            ));
        }

        let embed = serenity::CreateEmbed::default()
            .title("🛒 Your cart")
            .color(data.theme().await.primary)
            .description(lines.join("\n"))
            .field("Estimated total", format_brl(cart.total_cents()?), false)
            .footer(serenity::CreateEmbedFooter::new(
                "Prices and stock are checked again at /cart checkout",
            ));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Takes a product out of your cart.
    #[poise::command(slash_command, rename = "remove", ephemeral)]
    pub async fn cart_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let cart = data.carts.get(user_id).await;
        let Some(line) = cart
            .lines()
            .iter()
            .find(|l| l.product_name.eq_ignore_ascii_case(product.trim()))
        else {
            ctx.say(format!("'{product}' is not in your cart.")).await?;
            return Ok(());
        };

        data.carts.remove(user_id, line.product_id).await;
        ctx.say(format!("🗑️ '{}' removed from your cart.", line.product_name))
            .await?;
        Ok(())
    }

    /// Empties your cart.
    #[poise::command(slash_command, rename = "clear", ephemeral)]
    pub async fn cart_clear(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let message = if ctx.data().carts.clear(ctx.author().id.get()).await {
            "🗑️ Cart emptied."
        } else {
            "Your cart was already empty."
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Orders everything in your cart and shows the PIX code.
    #[poise::command(slash_command, rename = "checkout")]
    pub async fn cart_checkout(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your name, for the seller"] customer_name: Option<String>,
        #[description = "Your phone number, for the seller"] customer_phone: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let cart = data.carts.get(user_id).await;
        if cart.is_empty() {
            ctx.send(
                poise::CreateReply::default()
                    .content("Your cart is empty. Use `/cart add` first.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        let form = OrderForm::from_cart(&cart).with_customer(customer_name, customer_phone);
        if run_checkout(ctx, form).await?.is_some() {
            data.carts.clear(user_id).await;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
