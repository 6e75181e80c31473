//! Catalog seeding for local development.
//!
//! Walks the same two-phase path the admin panel uses (draft, images,
//! finalize) so a seeded database looks exactly like a staff-authored one.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::info;

use marigold_admin::db::{ProductRepository, create_pool, products::ProductDraft};

use super::{CommandError, database_url};

struct SampleProduct {
    draft: ProductDraft,
    image_urls: Vec<String>,
}

fn samples() -> Vec<SampleProduct> {
    let strings = |values: &[&str]| values.iter().map(ToString::to_string).collect::<Vec<_>>();

    vec![
        SampleProduct {
            draft: ProductDraft {
                name: "Cotton Romper".to_string(),
                description: "Soft organic cotton romper with snap buttons.".to_string(),
                price: Decimal::from(250),
                colors: strings(&["Honey", "Navy"]),
                sizes: strings(&["0-3M", "3-6M", "6-12M"]),
                stock_by_size: Some(HashMap::from([
                    ("Honey-0-3M".to_string(), 10),
                    ("Honey-3-6M".to_string(), 6),
                    ("Navy-0-3M".to_string(), 4),
                ])),
                tags: strings(&["new", "organic"]),
                is_active: true,
            },
            image_urls: strings(&["/uploads/seed/romper-honey.jpg", "/uploads/seed/romper-navy.jpg"]),
        },
        SampleProduct {
            draft: ProductDraft {
                name: "Knit Dungarees".to_string(),
                description: "Chunky knit dungarees for cold days.".to_string(),
                price: Decimal::from(420),
                colors: strings(&["Cream"]),
                sizes: strings(&["6-12M", "12-18M"]),
                // Size-only keys: the same count applies across colors.
                stock_by_size: Some(HashMap::from([
                    ("6-12M".to_string(), 8),
                    ("12-18M".to_string(), 3),
                ])),
                tags: strings(&["winter"]),
                is_active: true,
            },
            image_urls: strings(&["/uploads/seed/dungarees-cream.jpg"]),
        },
        SampleProduct {
            draft: ProductDraft {
                name: "Sun Hat".to_string(),
                description: "Wide-brim hat, one size fits most.".to_string(),
                price: Decimal::from(120),
                colors: strings(&["Sky Blue"]),
                sizes: strings(&["One Size"]),
                // Untracked stock: never sells out.
                stock_by_size: None,
                tags: strings(&["summer", "accessories"]),
                is_active: true,
            },
            image_urls: strings(&["/uploads/seed/sun-hat.jpg"]),
        },
    ]
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    for sample in samples() {
        let id = repo.create_draft(&sample.draft).await?;
        repo.set_images(id, &sample.image_urls).await?;
        repo.finalize(id, &sample.draft).await?;
        info!(product_id = %id, name = %sample.draft.name, "seeded product");
    }

    info!("Seeding complete");
    Ok(())
}
