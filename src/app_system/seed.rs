use rust_decimal::Decimal;

use crate::domain::ProductCreate;

const PRODUCT_IMAGE: &str = "https://placehold.co/400x400/7c3aed/ffffff?text=4E+Store";

/// The demo catalog the storefront ships with.
pub fn sample_products() -> Vec<ProductCreate> {
    let entries: [(&str, &str, i64, &str, i32); 8] = [
        (
            "Premium Gaming Account",
            "High-level gaming account with exclusive skins and achievements",
            4999,
            "Accounts",
            5,
        ),
        (
            "Discord Nitro 1 Year",
            "Full year of Discord Nitro with all premium features",
            9999,
            "Subscriptions",
            10,
        ),
        (
            "Game Keys Bundle",
            "Collection of popular game activation keys",
            7999,
            "Game Keys",
            15,
        ),
        (
            "VIP Server Access",
            "Lifetime access to premium VIP gaming servers",
            14999,
            "Access",
            3,
        ),
        (
            "Custom Bot Development",
            "Professional Discord bot tailored to your needs",
            19999,
            "Services",
            2,
        ),
        (
            "Exclusive Emote Pack",
            "Unique animated emotes for your Discord server",
            2999,
            "Digital Goods",
            20,
        ),
        (
            "Rare Collectible NFT",
            "Limited edition digital collectible with blockchain verification",
            29999,
            "Digital Goods",
            1,
        ),
        (
            "Pro Streaming Setup Guide",
            "Complete guide to professional streaming setup and configuration",
            3999,
            "Guides",
            50,
        ),
    ];

    entries
        .into_iter()
        .map(|(name, description, cents, category, in_stock)| ProductCreate {
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::new(cents, 2),
            category: category.to_string(),
            image_url: PRODUCT_IMAGE.to_string(),
            in_stock,
        })
        .collect()
}
